use crate::algorithm::bitset::CellSet;
use crate::spatial::geometry::{Direction, Point, blocks_own_exit};
use crate::spatial::grid::Occupancy;
use std::collections::VecDeque;

/// Counts free cells reachable from the grid border
///
/// A free cell that cannot be reached from the border through other free cells
/// belongs to a sealed pocket: any vine later grown there has no room to leave
/// once its neighbours are placed. Growth steps compare the reachable count
/// before and after claiming a candidate cell to avoid sealing regions.
pub struct ReachabilityLayer<'a> {
    occupancy: &'a Occupancy,
    claimed: CellSet,
}

impl<'a> ReachabilityLayer<'a> {
    /// Create a layer over the current occupancy with no extra claims
    pub fn new(occupancy: &'a Occupancy) -> Self {
        Self {
            occupancy,
            claimed: CellSet::new(occupancy.area()),
        }
    }

    /// Treat the cells as occupied in subsequent counts
    pub fn claim(&mut self, cells: &[Point]) {
        for &cell in cells {
            if let Some(index) = self.occupancy.index(cell) {
                self.claimed.insert(index);
            }
        }
    }

    /// Release a previously claimed cell
    pub fn release(&mut self, cell: Point) {
        if let Some(index) = self.occupancy.index(cell) {
            self.claimed.remove(index);
        }
    }

    /// Check whether a cell is free and not claimed
    pub fn is_open(&self, cell: Point) -> bool {
        self.occupancy.is_free(cell)
            && self
                .occupancy
                .index(cell)
                .is_some_and(|index| !self.claimed.contains(index))
    }

    /// Number of open cells connected to the border
    pub fn reachable_from_edges(&self) -> usize {
        let mut seen = CellSet::new(self.occupancy.area());
        let mut queue = VecDeque::new();

        for index in 0..self.occupancy.area() {
            let point = self.occupancy.point(index);
            if self.occupancy.is_edge(point) && self.is_open(point) && seen.insert_new(index) {
                queue.push_back(point);
            }
        }

        let mut count = 0;
        while let Some(point) = queue.pop_front() {
            count += 1;
            for next in point.neighbors() {
                if !self.is_open(next) {
                    continue;
                }
                if let Some(index) = self.occupancy.index(next) {
                    if seen.insert_new(index) {
                        queue.push_back(next);
                    }
                }
            }
        }
        count
    }

    /// Reachable count if `cell` were claimed as well
    pub fn reachable_with(&mut self, cell: Point) -> usize {
        let Some(index) = self.occupancy.index(cell) else {
            return self.reachable_from_edges();
        };
        if self.claimed.contains(index) {
            return self.reachable_from_edges();
        }
        self.claimed.insert(index);
        let count = self.reachable_from_edges();
        self.claimed.remove(index);
        count
    }
}

/// Check whether the head has an unobstructed straight run to the border and
/// the body does not lie on that run
pub fn has_clear_exit(occupancy: &Occupancy, path: &[Point], direction: Direction) -> bool {
    let Some(&head) = path.first() else {
        return false;
    };
    occupancy.is_exit_path_clear(head, direction)
        && !blocks_own_exit(path, direction, occupancy.width(), occupancy.height())
}

/// Check the head/neck orientation of a freshly grown path
pub fn head_matches_direction(path: &[Point], direction: Direction) -> bool {
    match (path.first(), path.get(1)) {
        (Some(&head), Some(&neck)) => Direction::between(neck, head) == Some(direction),
        _ => false,
    }
}
