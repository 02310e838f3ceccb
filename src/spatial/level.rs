//! Level description exchanged with the CLI, the validator and game clients

use crate::io::difficulty::Difficulty;
use crate::spatial::geometry::Point;
use crate::spatial::grid::grid_area;
use crate::spatial::mask::{self, Mask};
use crate::spatial::vine::Vine;
use serde::{Deserialize, Serialize};

/// Complete puzzle level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Level number
    pub id: u32,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Difficulty tier label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Grid dimensions as `[width, height]`
    pub grid_size: [usize; 2],
    /// Optional visibility mask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
    /// Vines in placement order
    pub vines: Vec<Vine>,
    /// Move allowance shown to the player
    #[serde(default)]
    pub max_moves: u32,
    /// Fewest moves needed to clear the level
    #[serde(default)]
    pub min_moves: u32,
    /// Complexity label derived from the difficulty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    /// Mistakes allowed before failing
    #[serde(default)]
    pub grace: u32,
    /// Color codes indexed by `Vine::color_index`
    #[serde(default)]
    pub color_scheme: Vec<String>,
    /// Seed that produced this level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_seed: Option<u64>,
    /// Whole-level attempts used by the generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_attempts: Option<usize>,
    /// Wall time spent generating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_elapsed_ms: Option<u64>,
    /// Generator quality score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_score: Option<f64>,
}

impl Level {
    /// Bare level with the given grid and vines
    pub const fn new(id: u32, width: usize, height: usize, vines: Vec<Vine>) -> Self {
        Self {
            id,
            name: None,
            difficulty: None,
            grid_size: [width, height],
            mask: None,
            vines,
            max_moves: 0,
            min_moves: 0,
            complexity: None,
            grace: 0,
            color_scheme: Vec::new(),
            generation_seed: None,
            generation_attempts: None,
            generation_elapsed_ms: None,
            generation_score: None,
        }
    }

    /// Grid width
    pub const fn width(&self) -> usize {
        self.grid_size[0]
    }

    /// Grid height
    pub const fn height(&self) -> usize {
        self.grid_size[1]
    }

    /// Number of grid cells, visible or not
    pub const fn total_cells(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    /// Grid area when the dimensions are usable, see `grid_area`
    pub fn checked_area(&self) -> Option<usize> {
        grid_area(self.width(), self.height())
    }

    /// Number of cells covered by vines
    pub fn occupied_cells(&self) -> usize {
        self.vines.iter().map(Vine::len).sum()
    }

    /// Check whether a cell is visible under the level mask
    pub fn is_cell_visible(&self, point: Point) -> bool {
        mask::is_visible(self.mask.as_ref(), point)
    }

    /// Number of visible cells
    pub fn visible_cells(&self) -> usize {
        let Some(mask) = &self.mask else {
            return self.total_cells();
        };
        let lookup = mask.lookup();
        (0..self.height())
            .flat_map(|y| (0..self.width()).map(move |x| Point::new(x as i32, y as i32)))
            .filter(|&p| lookup.is_visible(p))
            .count()
    }

    /// Fraction of visible cells covered by vines
    pub fn coverage(&self) -> f64 {
        let visible = self.visible_cells();
        if visible == 0 {
            return 0.0;
        }
        self.occupied_cells() as f64 / visible as f64
    }

    /// Look up a vine by identifier
    pub fn vine(&self, id: &str) -> Option<&Vine> {
        self.vines.iter().find(|v| v.id == id)
    }
}
