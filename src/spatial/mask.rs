//! Visibility masks restricting which grid cells are part of the puzzle

use crate::spatial::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How the mask point list is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskMode {
    /// Listed points are hidden, everything else is visible
    Hide,
    /// Only listed points are visible
    Show,
    /// Every cell is visible regardless of the list
    ShowAll,
}

/// Optional visibility mask attached to a level
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    /// Interpretation of `points`
    pub mode: MaskMode,
    /// Cells affected by the mask
    #[serde(default)]
    pub points: Vec<Point>,
}

impl Mask {
    /// Mask hiding exactly the given cells
    pub const fn hiding(points: Vec<Point>) -> Self {
        Self {
            mode: MaskMode::Hide,
            points,
        }
    }

    /// Check whether a cell is visible under this mask
    pub fn is_visible(&self, point: Point) -> bool {
        match self.mode {
            MaskMode::ShowAll => true,
            MaskMode::Hide => !self.points.contains(&point),
            MaskMode::Show => self.points.contains(&point),
        }
    }

    /// Precompute visibility lookups for repeated queries
    pub fn lookup(&self) -> MaskLookup {
        MaskLookup {
            mode: self.mode,
            points: self.points.iter().copied().collect(),
        }
    }
}

/// Hash-backed view of a mask for hot loops
#[derive(Clone, Debug)]
pub struct MaskLookup {
    mode: MaskMode,
    points: HashSet<Point>,
}

impl MaskLookup {
    /// Check whether a cell is visible
    pub fn is_visible(&self, point: Point) -> bool {
        match self.mode {
            MaskMode::ShowAll => true,
            MaskMode::Hide => !self.points.contains(&point),
            MaskMode::Show => self.points.contains(&point),
        }
    }
}

/// Visibility of a cell under an optional mask; no mask means everything is visible
pub fn is_visible(mask: Option<&Mask>, point: Point) -> bool {
    mask.is_none_or(|m| m.is_visible(point))
}
