//! Generation counters and level quality metrics

use crate::io::error::VineError;
use crate::spatial::level::Level;
use crate::spatial::vine::Vine;
use serde::Serialize;

/// Counters accumulated over one generation call
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Seed placements tried across all vines
    pub placement_attempts: usize,
    /// Local backtrack and cycle-breaker removals tried
    pub backtracks_attempted: usize,
    /// Failure dumps built
    pub dumps_produced: usize,
    /// Greedy or full solvability checks run
    pub solvability_checks: usize,
    /// States expanded by full solvability searches
    pub states_explored: usize,
    /// Whole-level attempts made
    pub generation_attempts: usize,
    /// Escalation steps applied
    pub escalations: usize,
    /// Deepest blocking chain in the accepted level
    pub max_blocking_depth: usize,
    /// Coverage of the accepted level
    pub grid_coverage: f64,
    /// Wall time of the call in milliseconds
    pub elapsed_ms: u64,
    /// Failed attempts by the stage that rejected them
    pub failures: FailureCounts,
}

impl GenerationStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of attempts whose layout passed every check before the solver
    ///
    /// 1.0 before any attempt has been made.
    pub fn structural_success_rate(&self) -> f64 {
        if self.generation_attempts == 0 {
            return 1.0;
        }
        let rejected = self.failures.before_solver().min(self.generation_attempts);
        (self.generation_attempts - rejected) as f64 / self.generation_attempts as f64
    }
}

/// Failed whole-level attempts grouped by rejecting stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FailureCounts {
    /// Placement ran out of recovery options
    pub placement: usize,
    /// Coverage stayed under the target
    pub coverage: usize,
    /// The blocking graph had a cycle
    pub cycle: usize,
    /// Structural validation failed
    pub structural: usize,
    /// Vine count or average length fell outside the tier
    pub constraint: usize,
    /// The solver proved the level unsolvable or gave up
    pub solvability: usize,
}

impl FailureCounts {
    /// Count one failed attempt; errors that are not attempt failures are ignored
    pub fn record(&mut self, err: &VineError) {
        match err {
            VineError::PlacementExhausted { .. } => self.placement += 1,
            VineError::InsufficientCoverage { .. } => self.coverage += 1,
            VineError::CircularBlocking { .. } => self.cycle += 1,
            VineError::StructuralViolation { .. } => self.structural += 1,
            VineError::TierConstraint { .. } => self.constraint += 1,
            VineError::SearchBudgetExhausted { .. } | VineError::Unsolvable { .. } => {
                self.solvability += 1;
            }
            _ => {}
        }
    }

    /// Failures rejected before a solver ran
    pub const fn before_solver(&self) -> usize {
        self.placement + self.coverage + self.cycle + self.structural + self.constraint
    }

    /// All recorded failures
    pub const fn total(&self) -> usize {
        self.before_solver() + self.solvability
    }
}

/// Spread of vine lengths in a level
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LengthSummary {
    /// Shortest vine
    pub min: usize,
    /// Longest vine
    pub max: usize,
    /// Mean length
    pub mean: f64,
}

impl LengthSummary {
    /// Summarise vine lengths, `None` for an empty list
    pub fn of(vines: &[Vine]) -> Option<Self> {
        let min = vines.iter().map(Vine::len).min()?;
        let max = vines.iter().map(Vine::len).max()?;
        let total: usize = vines.iter().map(Vine::len).sum();
        Some(Self {
            min,
            max,
            mean: total as f64 / vines.len() as f64,
        })
    }
}

/// Quality score for a generated level; higher is better
///
/// Starts at 100, loses 0.1 per attempt beyond the hundredth, rewards coverage
/// between 85% and 95%, penalises coverage under 70% and rewards length variety.
pub fn level_score(level: &Level, attempts: usize) -> f64 {
    let mut score = 100.0;

    if attempts > 100 {
        score -= (attempts - 100) as f64 * 0.1;
    }

    let total = level.total_cells();
    let occupancy = if total == 0 {
        0.0
    } else {
        level.occupied_cells() as f64 / total as f64
    };
    if (0.85..=0.95).contains(&occupancy) {
        score += 10.0;
    } else if occupancy < 0.7 {
        score -= 20.0;
    }

    if level.vines.len() > 2 {
        if let Some(summary) = LengthSummary::of(&level.vines) {
            score += (summary.max - summary.min) as f64 * 2.0;
        }
    }

    score
}
