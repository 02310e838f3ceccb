//! Grid coordinates, head directions and snake-style movement
//!
//! The grid origin is the bottom-left cell: `up` increases `y` and `right` increases `x`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer grid coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Column, counted from the left edge
    pub x: i32,
    /// Row, counted from the bottom edge
    pub y: i32,
}

impl Point {
    /// Create a point from its coordinates
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring point one unit step in `direction`
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance between two points
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Orthogonal neighbours in `Direction::ALL` order
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.step(Direction::Up),
            self.step(Direction::Down),
            self.step(Direction::Left),
            self.step(Direction::Right),
        ]
    }

    /// Check the point lies inside a `width` x `height` grid
    pub const fn in_bounds(self, width: usize, height: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < width && (self.y as usize) < height
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Head direction of a vine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards the top edge (+y)
    Up,
    /// Towards the bottom edge (-y)
    Down,
    /// Towards the left edge (-x)
    Left,
    /// Towards the right edge (+x)
    Right,
}

impl Direction {
    /// Every direction, in a fixed order used wherever iteration must be reproducible
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector `(dx, dy)`
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// The reverse direction
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction of a unit step from `from` to `to`, if they are orthogonally adjacent
    pub const fn between(from: Point, to: Point) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (0, 1) => Some(Self::Up),
            (0, -1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }

    /// Lowercase name used in level files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Number of cells between `pos` and the grid edge when travelling in `direction`
///
/// A cell on the edge facing `direction` has distance zero.
pub const fn distance_to_edge(pos: Point, direction: Direction, width: usize, height: usize) -> i32 {
    match direction {
        Direction::Up => height as i32 - 1 - pos.y,
        Direction::Down => pos.y,
        Direction::Left => pos.x,
        Direction::Right => width as i32 - 1 - pos.x,
    }
}

/// Pick the exit direction towards the nearest edge
///
/// Ties resolve in the order left, right, down, up.
pub const fn choose_exit_direction(pos: Point, width: usize, height: usize) -> Direction {
    let mut best = Direction::Left;
    let mut best_distance = distance_to_edge(pos, Direction::Left, width, height);

    let right = distance_to_edge(pos, Direction::Right, width, height);
    if right < best_distance {
        best = Direction::Right;
        best_distance = right;
    }
    let down = distance_to_edge(pos, Direction::Down, width, height);
    if down < best_distance {
        best = Direction::Down;
        best_distance = down;
    }
    let up = distance_to_edge(pos, Direction::Up, width, height);
    if up < best_distance {
        best = Direction::Up;
    }
    best
}

/// All four directions ordered by distance to the edge, nearest first
///
/// The sort is stable so equal distances keep `Direction::ALL` order.
pub fn directions_by_edge_distance(pos: Point, width: usize, height: usize) -> [Direction; 4] {
    let mut directions = Direction::ALL;
    directions.sort_by_key(|&dir| distance_to_edge(pos, dir, width, height));
    directions
}

/// Advance a vine one step: the head moves by the unit delta and every other
/// segment moves into the cell previously held by the segment ahead of it
pub fn advance(positions: &[Point], direction: Direction) -> Vec<Point> {
    let mut next = Vec::with_capacity(positions.len());
    if let Some(&head) = positions.first() {
        next.push(head.step(direction));
        next.extend(positions.iter().take(positions.len() - 1).copied());
    }
    next
}

/// Check whether a position set left the grid cleanly through its head
pub fn is_clean_exit(positions: &[Point], width: usize, height: usize) -> bool {
    positions
        .first()
        .is_some_and(|head| !head.in_bounds(width, height))
}

/// Check whether the head has run into the vine's own body
///
/// Only the head can newly overlap after a step, since every body segment
/// moves into a cell the vine already held.
pub fn has_self_overlap(positions: &[Point]) -> bool {
    positions
        .split_first()
        .is_some_and(|(head, body)| body.contains(head))
}

/// Collision test for a freshly advanced vine
///
/// `blocked` reports whether an in-grid cell is held by a different active vine.
pub fn collides<F>(positions: &[Point], width: usize, height: usize, blocked: F) -> bool
where
    F: Fn(Point) -> bool,
{
    has_self_overlap(positions)
        || positions
            .iter()
            .any(|&p| p.in_bounds(width, height) && blocked(p))
}

/// Check whether any body segment lies on the straight ray in front of the head
///
/// Such a vine can never leave the grid, whatever else is cleared.
pub fn blocks_own_exit(path: &[Point], direction: Direction, width: usize, height: usize) -> bool {
    let Some((&head, body)) = path.split_first() else {
        return false;
    };
    let mut cursor = head.step(direction);
    while cursor.in_bounds(width, height) {
        if body.contains(&cursor) {
            return true;
        }
        cursor = cursor.step(direction);
    }
    false
}

/// Cells on the straight ray from `pos` (exclusive) to the grid edge
pub fn exit_ray(pos: Point, direction: Direction, width: usize, height: usize) -> Vec<Point> {
    let mut ray = Vec::new();
    let mut cursor = pos.step(direction);
    while cursor.in_bounds(width, height) {
        ray.push(cursor);
        cursor = cursor.step(direction);
    }
    ray
}
