//! Occupancy model mapping grid cells to the vines that cover them
//!
//! One instance exists per generation attempt or per solvability query. Cells are
//! addressed by `Point`; internally ownership lives in an `ndarray` matrix indexed
//! `[y, x]`, and visibility in a flat bitset indexed `y * width + x`.

use crate::algorithm::bitset::CellSet;
use crate::io::configuration::MAX_GRID_CELLS;
use crate::io::error::{Result, structural_violation};
use crate::spatial::geometry::{Direction, Point};
use crate::spatial::mask::Mask;
use crate::spatial::vine::Vine;
use ndarray::Array2;
use std::collections::HashMap;

/// Cell count of a `width` x `height` grid
///
/// `None` when either side is zero, the product overflows, or the area exceeds
/// `MAX_GRID_CELLS`.
pub fn grid_area(width: usize, height: usize) -> Option<usize> {
    width
        .checked_mul(height)
        .filter(|&area| area > 0 && area <= MAX_GRID_CELLS)
}

/// Cell to vine mapping with mask-aware coverage accounting
#[derive(Debug, Clone)]
pub struct Occupancy {
    width: usize,
    height: usize,
    /// Owning slot per cell (0 = empty, n = `slots[n - 1]`)
    owners: Array2<u32>,
    /// Cells that are part of the puzzle
    visible: CellSet,
    /// Interned vine identifiers
    slots: Vec<String>,
    slot_lookup: HashMap<String, u32>,
    occupied: usize,
}

impl Occupancy {
    /// Create an empty, fully visible grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            owners: Array2::zeros((height, width)),
            visible: CellSet::all(width * height),
            slots: Vec::new(),
            slot_lookup: HashMap::new(),
            occupied: 0,
        }
    }

    /// Create an empty grid honouring an optional visibility mask
    pub fn with_mask(width: usize, height: usize, mask: Option<&Mask>) -> Self {
        let mut occupancy = Self::new(width, height);
        if let Some(mask) = mask {
            let lookup = mask.lookup();
            for index in 0..width * height {
                let point = occupancy.point(index);
                if !lookup.is_visible(point) {
                    occupancy.visible.remove(index);
                }
            }
        }
        occupancy
    }

    /// Build occupancy for an existing vine list
    ///
    /// # Errors
    ///
    /// Returns a structural violation if any vine leaves the grid, covers a masked
    /// cell or overlaps an earlier vine
    pub fn from_vines(
        width: usize,
        height: usize,
        mask: Option<&Mask>,
        vines: &[Vine],
    ) -> Result<Self> {
        let mut occupancy = Self::with_mask(width, height, mask);
        for vine in vines {
            occupancy.insert(vine)?;
        }
        Ok(occupancy)
    }

    /// Grid width
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    /// Flat index of an in-bounds point
    pub const fn index(&self, point: Point) -> Option<usize> {
        if point.in_bounds(self.width, self.height) {
            Some(point.y as usize * self.width + point.x as usize)
        } else {
            None
        }
    }

    /// Point for a flat index
    pub const fn point(&self, index: usize) -> Point {
        if self.width == 0 {
            return Point::new(0, 0);
        }
        Point::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Check the point lies inside the grid
    pub const fn in_bounds(&self, point: Point) -> bool {
        point.in_bounds(self.width, self.height)
    }

    /// Check the point is inside the grid and not masked out
    pub fn is_visible(&self, point: Point) -> bool {
        self.index(point)
            .is_some_and(|index| self.visible.contains(index))
    }

    /// Check whether a vine covers the point
    pub fn is_occupied(&self, point: Point) -> bool {
        self.slot_at(point) > 0
    }

    /// Check the point is visible and uncovered
    pub fn is_free(&self, point: Point) -> bool {
        self.is_visible(point) && !self.is_occupied(point)
    }

    /// Identifier of the vine covering the point
    pub fn owner(&self, point: Point) -> Option<&str> {
        let slot = self.slot_at(point);
        if slot == 0 {
            return None;
        }
        self.slots.get(slot as usize - 1).map(String::as_str)
    }

    fn slot_at(&self, point: Point) -> u32 {
        if !self.in_bounds(point) {
            return 0;
        }
        self.owners
            .get([point.y as usize, point.x as usize])
            .copied()
            .unwrap_or(0)
    }

    fn slot_for(&mut self, id: &str) -> u32 {
        if let Some(&slot) = self.slot_lookup.get(id) {
            return slot;
        }
        self.slots.push(id.to_string());
        let slot = self.slots.len() as u32;
        self.slot_lookup.insert(id.to_string(), slot);
        slot
    }

    /// Check that every cell could be claimed by `vine_id`
    ///
    /// # Errors
    ///
    /// Returns a structural violation naming the first unavailable cell
    pub fn check_cells(&self, vine_id: &str, cells: &[Point]) -> Result<()> {
        for (i, &cell) in cells.iter().enumerate() {
            if !self.in_bounds(cell) {
                return Err(structural_violation(
                    vine_id,
                    Some(cell),
                    format!("cell {cell} out of bounds (grid {}x{})", self.width, self.height),
                ));
            }
            if !self.is_visible(cell) {
                return Err(structural_violation(
                    vine_id,
                    Some(cell),
                    format!("cell {cell} is masked out"),
                ));
            }
            if let Some(owner) = self.owner(cell) {
                return Err(structural_violation(
                    vine_id,
                    Some(cell),
                    format!("cell {cell} overlaps with vine {owner}"),
                ));
            }
            if cells.iter().take(i).any(|&earlier| earlier == cell) {
                return Err(structural_violation(
                    vine_id,
                    Some(cell),
                    format!("cell {cell} repeats within the vine"),
                ));
            }
        }
        Ok(())
    }

    /// Claim the cells of a vine
    ///
    /// # Errors
    ///
    /// Fails without modifying the grid if any cell is out of bounds, masked out
    /// or already occupied
    pub fn insert(&mut self, vine: &Vine) -> Result<()> {
        self.check_cells(&vine.id, &vine.ordered_path)?;
        let slot = self.slot_for(&vine.id);
        for &cell in &vine.ordered_path {
            if let Some(owner) = self.owners.get_mut([cell.y as usize, cell.x as usize]) {
                *owner = slot;
                self.occupied += 1;
            }
        }
        Ok(())
    }

    /// Release every cell currently held by the vine
    pub fn remove(&mut self, vine: &Vine) {
        let Some(&slot) = self.slot_lookup.get(&vine.id) else {
            return;
        };
        for &cell in &vine.ordered_path {
            if !self.in_bounds(cell) {
                continue;
            }
            if let Some(owner) = self.owners.get_mut([cell.y as usize, cell.x as usize]) {
                if *owner == slot {
                    *owner = 0;
                    self.occupied -= 1;
                }
            }
        }
    }

    /// Number of covered cells
    pub const fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Number of cells that are part of the puzzle
    pub fn visible_count(&self) -> usize {
        self.visible.count()
    }

    /// Covered fraction of the visible cells
    pub fn coverage(&self) -> f64 {
        let visible = self.visible_count();
        if visible == 0 {
            return 0.0;
        }
        self.occupied as f64 / visible as f64
    }

    /// Visible uncovered cells in row-major order (bottom row first)
    pub fn empty_cells(&self) -> Vec<Point> {
        (0..self.area())
            .map(|index| self.point(index))
            .filter(|&p| self.is_free(p))
            .collect()
    }

    /// Free orthogonal neighbours in `Direction::ALL` order
    pub fn free_neighbors(&self, point: Point) -> Vec<Point> {
        point
            .neighbors()
            .into_iter()
            .filter(|&n| self.is_free(n))
            .collect()
    }

    /// Number of free orthogonal neighbours
    pub fn free_neighbor_count(&self, point: Point) -> usize {
        point
            .neighbors()
            .into_iter()
            .filter(|&n| self.is_free(n))
            .count()
    }

    /// Number of free cells in the 3x3 block around the point
    ///
    /// Used to weight seed selection toward emptier neighbourhoods.
    pub fn emptiness(&self, point: Point) -> usize {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if self.is_free(Point::new(point.x + dx, point.y + dy)) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Check that no vine covers any cell between the point and the grid edge
    pub fn is_exit_path_clear(&self, point: Point, direction: Direction) -> bool {
        let mut cursor = point.step(direction);
        while self.in_bounds(cursor) {
            if self.is_occupied(cursor) {
                return false;
            }
            cursor = cursor.step(direction);
        }
        true
    }

    /// Check whether the cell lies on the outer ring of the grid
    pub const fn is_edge(&self, point: Point) -> bool {
        self.in_bounds(point)
            && (point.x == 0
                || point.y == 0
                || point.x as usize == self.width - 1
                || point.y as usize == self.height - 1)
    }
}
