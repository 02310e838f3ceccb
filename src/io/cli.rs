//! Command-line interface for generating, solving and validating levels

use crate::algorithm::executor::{AcceptancePolicy, GenerationConfig, Strategy};
use crate::algorithm::solver::{SolveReport, SolverMode, solve};
use crate::io::batch::{BatchSummary, generate_batch, validate_batch};
use crate::io::configuration::{
    DEFAULT_DUMP_DIR, DEFAULT_MAX_GENERATION_ATTEMPTS, DEFAULT_MAX_STATES, DEFAULT_SEED,
};
use crate::io::difficulty::Difficulty;
use crate::io::error::{Result, VineError, WithPath, invalid_parameter};
use crate::io::persistence::{collect_level_files, level_file_name, read_level, write_level};
use crate::io::progress::ProgressManager;
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vinegen")]
#[command(
    author,
    version,
    about = "Generate and verify vine puzzle levels"
)]
/// Command-line arguments for the level builder
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Generate one or more levels
    Generate(GenerateArgs),
    /// Check solvability of a level file and print a JSON report
    Solve(SolveArgs),
    /// Structural and solvability checks over a file or directory
    Validate(ValidateArgs),
}

/// Options for `generate`
#[derive(Args, Clone, Debug)]
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// First level id
    #[arg(short, long, default_value_t = 1)]
    pub level: u32,

    /// Number of consecutive level ids to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,

    /// Difficulty tier (defaults to the tier of each level id)
    #[arg(short, long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Grid width (defaults to the middle of the tier's range)
    #[arg(short = 'W', long)]
    pub width: Option<usize>,

    /// Grid height (defaults to the middle of the tier's range)
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Placement strategy for the first attempt
    #[arg(long, value_enum, default_value_t = Strategy::CenterOut)]
    pub strategy: Strategy,

    /// Required coverage (defaults to the tier's target)
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Minimum vines to plan (defaults to the tier's lower bound)
    #[arg(long)]
    pub vine_count: Option<usize>,

    /// Vines removed per local backtrack
    #[arg(long)]
    pub backtrack_window: Option<usize>,

    /// Local backtrack retries per failing vine
    #[arg(long)]
    pub backtrack_attempts: Option<usize>,

    /// Use the wide recovery settings
    #[arg(long)]
    pub aggressive: bool,

    /// Require a full solver proof instead of the greedy check
    #[arg(long)]
    pub require_proof: bool,

    /// State budget for full searches
    #[arg(long, default_value_t = DEFAULT_MAX_STATES)]
    pub max_states: usize,

    /// Whole-level attempts before abandoning
    #[arg(long, default_value_t = DEFAULT_MAX_GENERATION_ATTEMPTS)]
    pub max_attempts: usize,

    /// Directory for failure dumps; a bare flag uses the default directory
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_DUMP_DIR)]
    pub dump_dir: Option<PathBuf>,

    /// Output directory for level files
    #[arg(short, long, default_value = "levels")]
    pub output: PathBuf,

    /// Replace existing level files
    #[arg(long)]
    pub overwrite: bool,
}

impl GenerateArgs {
    /// Build the configuration for one level id
    pub fn config_for(&self, level_id: u32) -> GenerationConfig {
        let difficulty = self
            .difficulty
            .unwrap_or_else(|| Difficulty::for_level(level_id));
        let seed = self
            .seed
            .wrapping_add(u64::from(level_id.saturating_sub(self.level)));
        let mut config = GenerationConfig::for_level(level_id, difficulty, seed);
        if self.aggressive {
            config = config.with_aggressive();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(min_coverage) = self.min_coverage {
            config.min_coverage = min_coverage;
        }
        if let Some(vine_count) = self.vine_count {
            config.vine_count = vine_count;
        }
        if let Some(window) = self.backtrack_window {
            config.backtrack_window = window;
        }
        if let Some(attempts) = self.backtrack_attempts {
            config.max_backtrack_attempts = attempts;
        }
        config.strategy = self.strategy;
        if self.require_proof {
            config.acceptance = AcceptancePolicy::RequireProof;
        }
        config.max_states = self.max_states;
        config.max_attempts = self.max_attempts;
        config.dump_dir.clone_from(&self.dump_dir);
        config
    }
}

/// Options for `solve`
#[derive(Args, Clone, Debug)]
pub struct SolveArgs {
    /// Level file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// State budget
    #[arg(long, default_value_t = DEFAULT_MAX_STATES)]
    pub max_states: usize,

    /// Solver variant
    #[arg(long, value_enum, default_value_t = SolverMode::Auto)]
    pub solver: SolverMode,
}

/// Options for `validate`
#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Level file or directory of level files
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// State budget per level
    #[arg(long, default_value_t = DEFAULT_MAX_STATES)]
    pub max_states: usize,

    /// Solver variant
    #[arg(long, value_enum, default_value_t = SolverMode::Auto)]
    pub solver: SolverMode,

    /// Write per-level results as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// JSON printed by `solve`
#[derive(Serialize)]
struct SolveOutput {
    file: PathBuf,
    level_id: u32,
    vines: usize,
    max_states: usize,
    #[serde(flatten)]
    report: SolveReport,
}

/// JSON written by `validate --report`
#[derive(Serialize)]
struct ValidationReport<'a> {
    summary: BatchSummary,
    levels: &'a [crate::io::batch::LevelStat],
}

impl Cli {
    /// Log filter implied by the verbosity flags
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Run the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns the first generation failure, any file error, or a summary
    /// error when validation finds failing levels
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Command::Generate(args) => self.run_generate(args),
            Command::Solve(args) => run_solve(args),
            Command::Validate(args) => self.run_validate(args),
        }
    }

    fn progress(&self, total: usize) -> Option<ProgressManager> {
        self.should_show_progress().then(|| {
            let mut pm = ProgressManager::new();
            pm.initialize(total);
            pm
        })
    }

    fn run_generate(&self, args: &GenerateArgs) -> Result<()> {
        if args.count == 0 {
            return Err(invalid_parameter("count", &args.count, &"must be at least 1"));
        }
        let last = args.level.checked_add(args.count - 1).ok_or_else(|| {
            invalid_parameter("count", &args.count, &"level ids overflow")
        })?;
        let configs: Vec<GenerationConfig> =
            (args.level..=last).map(|id| args.config_for(id)).collect();

        let progress = self.progress(configs.len());
        let results = generate_batch(&configs, progress.as_ref());
        if let Some(pm) = &progress {
            pm.finish();
        }

        let mut first_error = None;
        for (config, result) in configs.iter().zip(results) {
            match result {
                Ok((level, stats)) => {
                    let path = args.output.join(level_file_name(level.id));
                    write_level(&path, &level, args.overwrite)?;
                    info!(
                        "wrote {} ({} vines, {} attempts, {} backtracks)",
                        path.display(),
                        level.vines.len(),
                        stats.generation_attempts,
                        stats.backtracks_attempted
                    );
                }
                Err(err) => {
                    error!("level {}: {err}", config.level_id);
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn run_validate(&self, args: &ValidateArgs) -> Result<()> {
        let files = collect_level_files(&args.target)?;
        if files.is_empty() {
            warn!("no level files found in {}", args.target.display());
            return Ok(());
        }

        let progress = self.progress(files.len());
        let stats = validate_batch(&files, args.max_states, args.solver, progress.as_ref());
        if let Some(pm) = &progress {
            pm.finish();
        }

        for stat in stats.iter().filter(|s| !s.passed()) {
            for problem in stat.structural_errors.iter().chain(stat.error.iter()) {
                error!("{}: {problem}", stat.file.display());
            }
            if stat.gave_up {
                warn!(
                    "{}: unproven after {} states (budget {})",
                    stat.file.display(),
                    stat.states_explored,
                    stat.max_states
                );
            }
        }
        for stat in &stats {
            for warning in &stat.warnings {
                warn!("{}: {warning}", stat.file.display());
            }
        }

        let summary = BatchSummary::of(&stats);
        info!(
            "{} levels: {} passed, {} unproven, {} failed",
            summary.total, summary.passed, summary.unproven, summary.failed
        );

        if let Some(report_path) = &args.report {
            let report = ValidationReport {
                summary,
                levels: &stats,
            };
            let json =
                serde_json::to_string_pretty(&report).with_path(report_path, "serialize report")?;
            std::fs::write(report_path, json).with_path(report_path, "write report")?;
        }

        if summary.failed > 0 {
            return Err(VineError::StructuralViolation {
                vine_id: String::new(),
                cell: None,
                message: format!("{} of {} levels failed validation", summary.failed, summary.total),
            });
        }
        Ok(())
    }
}

// Allow print for the JSON report, which is the command's output
#[allow(clippy::print_stdout)]
fn run_solve(args: &SolveArgs) -> Result<()> {
    let level = read_level(&args.file)?;
    let report = solve(&level, args.max_states, args.solver)?;
    let output = SolveOutput {
        file: args.file.clone(),
        level_id: level.id,
        vines: level.vines.len(),
        max_states: args.max_states,
        report,
    };
    let json = serde_json::to_string_pretty(&output).with_path(&args.file, "serialize report")?;
    println!("{json}");
    Ok(())
}
