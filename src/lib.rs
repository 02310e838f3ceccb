//! Procedural generation of vine puzzle levels with solvability verification
//!
//! Vines are snakes of grid cells that slide out of the board along their head
//! direction. The generator packs a grid with vines so that every layout it
//! accepts can be cleared, and the solver proves or disproves that for any
//! level file.

#![forbid(unsafe_code)]

/// Core algorithms: selection, feasibility, recovery, solving and orchestration
pub mod algorithm;
/// Blocking relationships and generation statistics
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Vine placement strategies and gap filling
pub mod placement;
/// Grid geometry, vines, masks and occupancy
pub mod spatial;

pub use io::error::{Result, VineError};
