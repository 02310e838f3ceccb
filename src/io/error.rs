//! Error types and context management for generation and verification

use crate::spatial::geometry::Point;
use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all generation and verification operations
#[derive(Debug)]
pub enum VineError {
    /// A vine could not be placed after every recovery step
    ///
    /// Recoverable by the orchestrator through escalation; fatal only at the
    /// outermost retry limit.
    PlacementExhausted {
        /// Identifier of the vine that failed to place
        vine_id: String,
        /// Vines already accepted when placement stopped
        placed: usize,
        /// Failure dump written for offline replay, if any
        dump: Option<PathBuf>,
    },

    /// Final coverage stayed below the required target
    InsufficientCoverage {
        /// Coverage reached
        achieved: f64,
        /// Coverage required
        required: f64,
    },

    /// The blocking graph contains a cycle, a permanent deadlock
    CircularBlocking {
        /// Vine identifiers along the cycle
        chain: Vec<String>,
    },

    /// The search stopped on its state budget without a verdict
    ///
    /// This is "unknown", never "unsolvable".
    SearchBudgetExhausted {
        /// Solver variant that ran
        solver: &'static str,
        /// States expanded before stopping
        states_explored: usize,
        /// Configured budget
        max_states: usize,
    },

    /// The search exhausted every state without clearing the grid
    Unsolvable {
        /// Solver variant that ran
        solver: &'static str,
        /// States expanded
        states_explored: usize,
    },

    /// Vine count or average length outside the difficulty tier's bounds
    TierConstraint {
        /// Constraint that failed
        constraint: &'static str,
        /// Measured value
        actual: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// Bounds, overlap, connectivity or orientation rule broken
    StructuralViolation {
        /// Offending vine (empty for level-wide problems)
        vine_id: String,
        /// Offending cell, when one applies
        cell: Option<Point>,
        /// Description of the violation
        message: String,
    },

    /// Generation gave up at the outermost retry limit
    Abandoned {
        /// Seed of the request
        seed: u64,
        /// Whole-level attempts made
        attempts: usize,
        /// Wall time spent
        elapsed_ms: u64,
        /// Last failure observed
        source: Box<VineError>,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Level JSON could not be read or written
    Serialization {
        /// File involved
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

impl VineError {
    /// Whether the orchestrator may retry the level with a fresh attempt
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PlacementExhausted { .. }
                | Self::InsufficientCoverage { .. }
                | Self::CircularBlocking { .. }
                | Self::SearchBudgetExhausted { .. }
                | Self::Unsolvable { .. }
                | Self::TierConstraint { .. }
                | Self::StructuralViolation { .. }
        )
    }

    /// Short machine-friendly name of the error kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PlacementExhausted { .. } => "placement_exhausted",
            Self::InsufficientCoverage { .. } => "insufficient_coverage",
            Self::CircularBlocking { .. } => "circular_blocking",
            Self::SearchBudgetExhausted { .. } => "search_budget_exhausted",
            Self::Unsolvable { .. } => "unsolvable",
            Self::TierConstraint { .. } => "tier_constraint",
            Self::StructuralViolation { .. } => "structural_violation",
            Self::Abandoned { .. } => "abandoned",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::FileSystem { .. } => "file_system",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl fmt::Display for VineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlacementExhausted {
                vine_id,
                placed,
                dump,
            } => {
                write!(
                    f,
                    "Placement exhausted for vine {vine_id} after {placed} vines placed"
                )?;
                if let Some(path) = dump {
                    write!(f, " (dump: {})", path.display())?;
                }
                Ok(())
            }
            Self::InsufficientCoverage { achieved, required } => {
                write!(
                    f,
                    "Insufficient coverage: {:.1}% < {:.1}%",
                    achieved * 100.0,
                    required * 100.0
                )
            }
            Self::CircularBlocking { chain } => {
                write!(
                    f,
                    "Circular blocking detected (unsolvable deadlock): {}",
                    chain.join(" -> ")
                )
            }
            Self::SearchBudgetExhausted {
                solver,
                states_explored,
                max_states,
            } => {
                write!(
                    f,
                    "Search budget exhausted in {solver} solver after {states_explored} states (max {max_states})"
                )
            }
            Self::Unsolvable {
                solver,
                states_explored,
            } => {
                write!(
                    f,
                    "Level proven unsolvable by {solver} solver after {states_explored} states"
                )
            }
            Self::TierConstraint {
                constraint,
                actual,
                min,
                max,
            } => {
                write!(
                    f,
                    "Tier constraint failed: {constraint} {actual:.2} outside {min:.0}..={max:.0}"
                )
            }
            Self::StructuralViolation {
                vine_id,
                cell: _,
                message,
            } => {
                if vine_id.is_empty() {
                    write!(f, "Structural violation: {message}")
                } else {
                    write!(f, "Structural violation in vine {vine_id}: {message}")
                }
            }
            Self::Abandoned {
                seed,
                attempts,
                elapsed_ms,
                source,
            } => {
                write!(
                    f,
                    "Generation abandoned after {attempts} attempts in {elapsed_ms}ms (seed {seed}): {source}"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { path, source } => {
                write!(f, "Invalid level JSON in '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for VineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystem { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::Abandoned { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Convenience type alias for results carrying a `VineError`
pub type Result<T> = std::result::Result<T, VineError>;

/// Attaches a file path and operation to low-level I/O and JSON failures
pub trait WithPath<T> {
    /// Wrap the error with the path it concerns
    ///
    /// # Errors
    ///
    /// Propagates the original error converted into a `VineError`
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| VineError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

impl<T> WithPath<T> for std::result::Result<T, serde_json::Error> {
    fn with_path(self, path: &Path, _operation: &'static str) -> Result<T> {
        self.map_err(|source| VineError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<std::io::Error> for VineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> VineError {
    VineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a structural violation error
pub fn structural_violation(
    vine_id: &str,
    cell: Option<Point>,
    message: impl Into<String>,
) -> VineError {
    VineError::StructuralViolation {
        vine_id: vine_id.to_string(),
        cell,
        message: message.into(),
    }
}
