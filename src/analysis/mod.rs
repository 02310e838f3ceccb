//! Read-only analyses over vine layouts

/// Blocking graph construction, cycle detection and chain depth
pub mod blocking;
/// Generation counters and level quality metrics
pub mod statistics;
