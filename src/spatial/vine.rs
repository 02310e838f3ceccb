//! The vine: an ordered chain of cells with a head direction

use crate::spatial::geometry::{Direction, Point};
use serde::{Deserialize, Serialize};

/// Movable puzzle piece
///
/// `ordered_path[0]` is the head and the last element is the tail. A well-formed
/// vine has at least two cells, Manhattan-adjacent consecutive cells, and a head
/// direction equal to the step from the neck to the head.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vine {
    /// Identifier unique within a level
    pub id: String,
    /// Direction the head travels when the vine moves
    pub head_direction: Direction,
    /// Cells from head to tail
    pub ordered_path: Vec<Point>,
    /// Index into the level color scheme
    #[serde(default)]
    pub color_index: usize,
}

impl Vine {
    /// Create a vine with the default color
    pub fn new(id: impl Into<String>, head_direction: Direction, ordered_path: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            head_direction,
            ordered_path,
            color_index: 0,
        }
    }

    /// Number of segments
    pub const fn len(&self) -> usize {
        self.ordered_path.len()
    }

    /// Check for a vine without segments
    pub const fn is_empty(&self) -> bool {
        self.ordered_path.is_empty()
    }

    /// Head cell
    pub fn head(&self) -> Option<Point> {
        self.ordered_path.first().copied()
    }

    /// Segment directly behind the head
    pub fn neck(&self) -> Option<Point> {
        self.ordered_path.get(1).copied()
    }

    /// Last segment
    pub fn tail(&self) -> Option<Point> {
        self.ordered_path.last().copied()
    }

    /// Cell the head would enter on its next move
    pub fn target(&self) -> Option<Point> {
        self.head().map(|head| head.step(self.head_direction))
    }

    /// Check whether the vine covers `point`
    pub fn contains(&self, point: Point) -> bool {
        self.ordered_path.contains(&point)
    }
}
