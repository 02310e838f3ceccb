use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset over flat cell indices (`y * width + x`)
///
/// Used for mask visibility and flood-fill bookkeeping where a `HashSet` of
/// points would hash on every lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellSet {
    bits: BitVec,
}

impl CellSet {
    /// Create a set with no cells present
    pub fn new(cells: usize) -> Self {
        Self {
            bits: bitvec![0; cells],
        }
    }

    /// Create a set containing every cell
    pub fn all(cells: usize) -> Self {
        Self {
            bits: bitvec![1; cells],
        }
    }

    /// Insert a cell index, ignoring indices past the end
    pub fn insert(&mut self, index: usize) {
        if index < self.bits.len() {
            self.bits.set(index, true);
        }
    }

    /// Remove a cell index
    pub fn remove(&mut self, index: usize) {
        if index < self.bits.len() {
            self.bits.set(index, false);
        }
    }

    /// Test cell membership
    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).as_deref() == Some(&true)
    }

    /// Insert a cell and report whether it was newly added
    pub fn insert_new(&mut self, index: usize) -> bool {
        if index >= self.bits.len() || self.contains(index) {
            return false;
        }
        self.bits.set(index, true);
        true
    }

    /// Test if no cells are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count cells in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Capacity in cells
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Extract all present indices in ascending order
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }
}

impl fmt::Display for CellSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellSet({} of {} cells)", self.count(), self.capacity())
    }
}
