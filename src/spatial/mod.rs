//! Spatial data structures for vine levels
//!
//! This module contains the level data model:
//! - Grid coordinates, directions and snake movement
//! - Visibility masks and vines
//! - Occupancy tracking for cells

/// Points, directions and stepwise movement simulation
pub mod geometry;
/// Cell occupancy model with coverage accounting
pub mod grid;
/// Level description and derived measurements
pub mod level;
/// Visibility masks
pub mod mask;
/// Vine data structure
pub mod vine;

pub use grid::Occupancy;
