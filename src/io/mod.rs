//! Boundaries: errors, constants, tier tables, files and the command line

/// Batch validation and generation over worker threads
pub mod batch;
/// Command-line interface
pub mod cli;
/// Generation constants and runtime defaults
pub mod configuration;
/// Difficulty tiers and variety profiles
pub mod difficulty;
/// Failure dumps and ASCII rendering
pub mod dump;
/// Error types
pub mod error;
/// Level file reading and writing
pub mod persistence;
/// Terminal progress display
pub mod progress;
