/// Bitvec-backed cell sets
pub mod bitset;
/// Generation orchestrator and seeded random selection
pub mod executor;
/// Exit-run and connectivity checks used while growing vines
pub mod feasibility;
/// Local backtracking and cycle-breaking repair
pub mod recovery;
/// Seed, length and growth-step selection
pub mod selection;
/// Solvability searches over vine bitmasks
pub mod solver;
/// Structural validation of complete levels
pub mod structural;
