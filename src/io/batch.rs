//! Parallel validation and generation of independent levels
//!
//! Each level owns its occupancy, blocking graph and search state, so levels
//! are spread across the rayon pool (one worker per CPU) and results come back
//! in input order. Generating a single level stays single-threaded.

use crate::algorithm::executor::{GenerationConfig, generate};
use crate::algorithm::solver::{SolverMode, solve};
use crate::algorithm::structural::validate_structural;
use crate::analysis::statistics::GenerationStats;
use crate::io::configuration::OCCUPANCY_TOLERANCE;
use crate::io::error::Result;
use crate::io::persistence::read_level;
use crate::io::progress::ProgressManager;
use crate::spatial::level::Level;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Validation outcome for one level file
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelStat {
    /// File checked
    pub file: PathBuf,
    /// Level id, when the file parsed
    pub level_id: Option<u32>,
    /// Structural problems found
    pub structural_errors: Vec<String>,
    /// Solver verdict
    pub solvable: bool,
    /// Solver variant used
    pub solver: String,
    /// States expanded
    pub states_explored: usize,
    /// Budget given to the solver
    pub max_states: usize,
    /// Wall time for this file
    pub elapsed_ms: u64,
    /// The search ran out of budget; "unproven", not unsolvable
    pub gave_up: bool,
    /// Covered fraction of visible cells
    pub coverage: f64,
    /// Non-fatal observations
    pub warnings: Vec<String>,
    /// Fatal problem outside the structural checks
    pub error: Option<String>,
}

impl LevelStat {
    /// Structurally sound, readable, and proven solvable
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.structural_errors.is_empty() && self.solvable
    }

    /// Sound but the search gave up before a verdict
    pub fn is_unproven(&self) -> bool {
        self.error.is_none() && self.structural_errors.is_empty() && self.gave_up
    }
}

/// Totals over a batch of validation results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files checked
    pub total: usize,
    /// Files that passed
    pub passed: usize,
    /// Files whose search gave up
    pub unproven: usize,
    /// Files that failed for any other reason
    pub failed: usize,
}

impl BatchSummary {
    /// Tally validation results
    pub fn of(stats: &[LevelStat]) -> Self {
        let passed = stats.iter().filter(|s| s.passed()).count();
        let unproven = stats.iter().filter(|s| s.is_unproven()).count();
        Self {
            total: stats.len(),
            passed,
            unproven,
            failed: stats.len() - passed - unproven,
        }
    }
}

/// Check an already loaded level
pub fn validate_level(level: &Level, file: &Path, max_states: usize, mode: SolverMode) -> LevelStat {
    let start = Instant::now();
    let mut stat = LevelStat {
        file: file.to_path_buf(),
        level_id: Some(level.id),
        max_states,
        ..LevelStat::default()
    };

    stat.structural_errors = validate_structural(level)
        .iter()
        .map(ToString::to_string)
        .collect();
    if level.checked_area().is_none() {
        stat.elapsed_ms = start.elapsed().as_millis() as u64;
        return stat;
    }
    stat.coverage = level.coverage();

    if let Some(difficulty) = level.difficulty {
        let required = difficulty.spec().min_coverage;
        let shortfall = required - level.coverage();
        if shortfall > OCCUPANCY_TOLERANCE {
            stat.error = Some(format!(
                "coverage {:.1}% is far below the {difficulty} target {:.1}%",
                level.coverage() * 100.0,
                required * 100.0
            ));
        } else if shortfall > 0.0 {
            stat.warnings.push(format!(
                "coverage {:.1}% below the {difficulty} target {:.1}%",
                level.coverage() * 100.0,
                required * 100.0
            ));
        }
    }
    if level.max_moves < level.min_moves {
        stat.warnings.push(format!(
            "max_moves {} is below min_moves {}",
            level.max_moves, level.min_moves
        ));
    }

    if stat.structural_errors.is_empty() {
        match solve(level, max_states, mode) {
            Ok(report) => {
                stat.solvable = report.solvable;
                stat.solver = report.solver.to_string();
                stat.states_explored = report.states_explored;
                stat.gave_up = report.gave_up;
            }
            Err(err) => stat.error = Some(err.to_string()),
        }
    }

    stat.elapsed_ms = start.elapsed().as_millis() as u64;
    stat
}

/// Read and check one level file
pub fn validate_file(file: &Path, max_states: usize, mode: SolverMode) -> LevelStat {
    match read_level(file) {
        Ok(level) => validate_level(&level, file, max_states, mode),
        Err(err) => LevelStat {
            file: file.to_path_buf(),
            max_states,
            error: Some(err.to_string()),
            ..LevelStat::default()
        },
    }
}

/// Validate many files in parallel; results keep the input order
pub fn validate_batch(
    files: &[PathBuf],
    max_states: usize,
    mode: SolverMode,
    progress: Option<&ProgressManager>,
) -> Vec<LevelStat> {
    files
        .par_iter()
        .enumerate()
        .map(|(index, file)| {
            if let Some(pm) = progress {
                pm.start_item(index, &file.display().to_string());
            }
            let stat = validate_file(file, max_states, mode);
            if stat.passed() {
                debug!("{}: ok ({} states)", file.display(), stat.states_explored);
            } else {
                warn!("{}: failed validation", file.display());
            }
            if let Some(pm) = progress {
                pm.complete_item(index, stat.passed());
            }
            stat
        })
        .collect()
}

/// Generate independent levels in parallel; results keep the input order
pub fn generate_batch(
    configs: &[GenerationConfig],
    progress: Option<&ProgressManager>,
) -> Vec<Result<(Level, GenerationStats)>> {
    configs
        .par_iter()
        .enumerate()
        .map(|(index, config)| {
            if let Some(pm) = progress {
                pm.start_item(index, &format!("level {}", config.level_id));
            }
            let result = generate(config);
            if let Some(pm) = progress {
                pm.complete_item(index, result.is_ok());
            }
            result
        })
        .collect()
}
