use crate::algorithm::solver::{SearchSpace, SolverMode, solve};
use crate::algorithm::structural::validate_structural;
use crate::analysis::blocking::BlockingGraph;
use crate::analysis::statistics::{GenerationStats, level_score};
use crate::io::configuration::{
    AGGRESSIVE_BACKTRACK_WINDOW, AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS, COLOR_PALETTE,
    COVERAGE_RELAXATION_STEP, DEFAULT_BACKTRACK_WINDOW, DEFAULT_MAX_BACKTRACK_ATTEMPTS,
    DEFAULT_MAX_GENERATION_ATTEMPTS, DEFAULT_MAX_GENERATION_SECONDS, DEFAULT_MAX_STATES,
    ESCALATION_THRESHOLD, LOW_STRUCTURAL_SUCCESS_RATE, MAX_COVERAGE_RELAXATIONS, MAX_GRID_CELLS,
    MIN_MAX_MOVES, MIN_RELAXED_COVERAGE, PROGRESS_LOG_INTERVAL,
};
use crate::io::difficulty::{Difficulty, DifficultySpec, VarietyProfile};
use crate::io::dump::FailureDump;
use crate::io::error::{Result, VineError, invalid_parameter};
use crate::placement::center_out::CenterOut;
use crate::placement::clearable_first::ClearableFirst;
use crate::placement::direction_first::DirectionFirst;
use crate::placement::{Placement, PlacementContext, PlacementStrategy};
use crate::spatial::grid::grid_area;
use crate::spatial::level::Level;
use crate::spatial::mask::Mask;
use clap::ValueEnum;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Multiplier separating per-attempt seeds
pub const ATTEMPT_SEED_STRIDE: u64 = 7919;

/// Seeded random selector for reproducible stochastic choices
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Selector for one whole-level attempt of a request
    pub fn for_attempt(seed: u64, attempt: usize) -> Self {
        Self::new(attempt_seed(seed, attempt))
    }

    /// Generic weighted random selection
    ///
    /// Returns index into weights array using cumulative distribution
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }

        let mut rand_val = self.rng.random::<f64>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            rand_val -= weight;
            if rand_val <= 0.0 {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }

    /// Uniform value in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index below `len`, zero for an empty range
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    /// Uniform value in `low..=high`; `low` when the range is empty
    pub fn range(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    /// Shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Seed for one attempt of a request
pub const fn attempt_seed(seed: u64, attempt: usize) -> u64 {
    seed.wrapping_add((attempt as u64).wrapping_mul(ATTEMPT_SEED_STRIDE))
}

/// Placement strategy selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Center seeds with clear exits; clears in reverse placement order
    #[default]
    CenterOut,
    /// Border seeds growing toward the nearest edge
    DirectionFirst,
    /// Edge anchors and greedy-checked fill
    ClearableFirst,
}

impl Strategy {
    /// Strategy tried after this one when escalating
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::CenterOut => Self::DirectionFirst,
            Self::DirectionFirst => Self::ClearableFirst,
            Self::ClearableFirst => Self::CenterOut,
        }
    }

    /// Implementation of the strategy
    pub fn placer(self) -> &'static dyn PlacementStrategy {
        match self {
            Self::CenterOut => &CenterOut,
            Self::DirectionFirst => &DirectionFirst,
            Self::ClearableFirst => &ClearableFirst,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.placer().name())
    }
}

/// How much evidence of solvability a generated level needs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptancePolicy {
    /// A single-pass greedy clear is enough
    #[default]
    GreedyOnly,
    /// A full search must prove a clearing order within the state budget
    RequireProof,
}

/// Parameters of one generation request
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Level number written to the output
    pub level_id: u32,
    /// Grid width
    pub width: usize,
    /// Grid height
    pub height: usize,
    /// Request seed; attempt seeds derive from it
    pub seed: u64,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Tier constraints
    pub spec: DifficultySpec,
    /// Length, turn and seed distribution controls
    pub profile: VarietyProfile,
    /// Minimum number of vines the main placement loop plans
    pub vine_count: usize,
    /// Required covered fraction of visible cells
    pub min_coverage: f64,
    /// Vines removed per local backtrack
    pub backtrack_window: usize,
    /// Local backtrack retries per failing vine
    pub max_backtrack_attempts: usize,
    /// Whether the aggressive recovery settings are in force
    pub aggressive: bool,
    /// Placement strategy for the first attempt
    pub strategy: Strategy,
    /// Solvability evidence required for acceptance
    pub acceptance: AcceptancePolicy,
    /// State budget for full searches
    pub max_states: usize,
    /// Whole-level attempt ceiling
    pub max_attempts: usize,
    /// Wall-clock ceiling
    pub max_duration: Duration,
    /// Cells excluded from the puzzle before placement
    pub mask: Option<Mask>,
    /// Where failure dumps are written, if anywhere
    pub dump_dir: Option<PathBuf>,
}

impl GenerationConfig {
    /// Defaults for a level of the given tier
    pub fn for_level(level_id: u32, difficulty: Difficulty, seed: u64) -> Self {
        let (width, height) = difficulty.default_grid_size();
        let spec = difficulty.spec();
        Self {
            level_id,
            width,
            height,
            seed,
            difficulty,
            spec,
            profile: difficulty.profile(),
            vine_count: spec.vine_count_range.0,
            min_coverage: spec.min_coverage,
            backtrack_window: DEFAULT_BACKTRACK_WINDOW,
            max_backtrack_attempts: DEFAULT_MAX_BACKTRACK_ATTEMPTS,
            aggressive: false,
            strategy: Strategy::default(),
            acceptance: AcceptancePolicy::default(),
            max_states: DEFAULT_MAX_STATES,
            max_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
            max_duration: Duration::from_secs(DEFAULT_MAX_GENERATION_SECONDS),
            mask: None,
            dump_dir: None,
        }
    }

    /// Switch to the wider aggressive recovery settings
    #[must_use]
    pub fn with_aggressive(mut self) -> Self {
        self.aggressive = true;
        self.backtrack_window = AGGRESSIVE_BACKTRACK_WINDOW;
        self.max_backtrack_attempts = AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS;
        self
    }

    /// Whether the tier's vine count and length bounds apply to this grid
    ///
    /// The bounds describe levels at the tier's own grid sizes, so a grid
    /// outside the tier's size range is generated without them.
    pub fn tier_bounds_apply(&self) -> bool {
        let range = self.difficulty.grid_size_range();
        (range.min_width..=range.max_width).contains(&self.width)
            && (range.min_height..=range.max_height).contains(&self.height)
    }

    /// Most vines a placement may hold
    pub fn max_vines(&self) -> usize {
        if self.tier_bounds_apply() {
            self.spec.vine_count_range.1.max(self.spec.vine_count_range.0)
        } else {
            usize::MAX
        }
    }

    /// Check the parameters before generation starts
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first unusable field
    pub fn validate(&self) -> Result<()> {
        if self.width < 2 {
            return Err(invalid_parameter("width", &self.width, &"must be at least 2"));
        }
        if self.height < 2 {
            return Err(invalid_parameter("height", &self.height, &"must be at least 2"));
        }
        if grid_area(self.width, self.height).is_none() {
            return Err(invalid_parameter(
                "grid_size",
                &format!("{}x{}", self.width, self.height),
                &format!("must be at most {MAX_GRID_CELLS} cells"),
            ));
        }
        if !(self.min_coverage > 0.0 && self.min_coverage <= 1.0) {
            return Err(invalid_parameter(
                "min_coverage",
                &self.min_coverage,
                &"must be in (0, 1]",
            ));
        }
        if self.vine_count == 0 {
            return Err(invalid_parameter("vine_count", &self.vine_count, &"must be at least 1"));
        }
        if self.backtrack_window == 0 {
            return Err(invalid_parameter(
                "backtrack_window",
                &self.backtrack_window,
                &"must be at least 1",
            ));
        }
        if self.max_states == 0 {
            return Err(invalid_parameter("max_states", &self.max_states, &"must be at least 1"));
        }
        if self.max_attempts == 0 {
            return Err(invalid_parameter(
                "max_attempts",
                &self.max_attempts,
                &"must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Orchestrator state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationPhase {
    /// Running a whole-level attempt
    Placing,
    /// Deciding what to do after a failed attempt
    Recovering,
    /// Applying one escalation step
    Escalating,
    /// A level was accepted
    Success,
    /// A circuit breaker stopped generation
    Abandoned,
}

/// Drives whole-level attempts until one passes the acceptance gate
///
/// Each attempt owns a fresh placement and a selector seeded from the request
/// seed and the attempt number, so identical requests replay identically.
pub struct LevelGenerator {
    base: GenerationConfig,
    active: GenerationConfig,
    stats: GenerationStats,
    phase: GenerationPhase,
    attempts: usize,
    consecutive_failures: usize,
    escalation_step: usize,
    started: Instant,
    last_error: Option<VineError>,
}

impl LevelGenerator {
    /// Create a generator for a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the configuration is unusable
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            active: config.clone(),
            base: config,
            stats: GenerationStats::new(),
            phase: GenerationPhase::Placing,
            attempts: 0,
            consecutive_failures: 0,
            escalation_step: 0,
            started: Instant::now(),
            last_error: None,
        })
    }

    /// Current state
    pub const fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Counters so far
    pub const fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Configuration in force, including escalation adjustments
    pub const fn active_config(&self) -> &GenerationConfig {
        &self.active
    }

    /// Run attempts until success or a circuit breaker trips
    ///
    /// # Errors
    ///
    /// Returns `Abandoned` wrapping the last failure when the attempt or time
    /// ceiling is reached, or any non-recoverable error immediately
    pub fn run(&mut self) -> Result<Level> {
        self.started = Instant::now();
        loop {
            match self.phase {
                GenerationPhase::Placing => match self.run_attempt() {
                    Ok(level) => {
                        self.phase = GenerationPhase::Success;
                        self.finish_stats(&level);
                        info!(
                            "level {}: {} vines, coverage {:.1}% after {} attempts ({})",
                            level.id,
                            level.vines.len(),
                            self.stats.grid_coverage * 100.0,
                            self.attempts,
                            self.active.strategy
                        );
                        return Ok(level);
                    }
                    Err(err) if err.is_recoverable() => {
                        debug!("attempt {} failed: {err}", self.attempts);
                        self.stats.failures.record(&err);
                        self.consecutive_failures += 1;
                        self.last_error = Some(err);
                        self.phase = GenerationPhase::Recovering;
                    }
                    Err(err) => return Err(err),
                },
                GenerationPhase::Recovering => {
                    if self.attempts % PROGRESS_LOG_INTERVAL == 0 {
                        let failures = self.stats.failures;
                        info!(
                            "level {}: {} attempts, {} escalations, structural success {:.1}% (placement={}, coverage={}, cycle={}, structural={}, constraint={}, solvability={})",
                            self.base.level_id,
                            self.attempts,
                            self.stats.escalations,
                            self.stats.structural_success_rate() * 100.0,
                            failures.placement,
                            failures.coverage,
                            failures.cycle,
                            failures.structural,
                            failures.constraint,
                            failures.solvability
                        );
                    }
                    self.phase = if self.attempts >= self.active.max_attempts
                        || self.started.elapsed() >= self.active.max_duration
                    {
                        GenerationPhase::Abandoned
                    } else if self.escalation_due() {
                        GenerationPhase::Escalating
                    } else {
                        GenerationPhase::Placing
                    };
                }
                GenerationPhase::Escalating => {
                    self.escalate();
                    self.phase = GenerationPhase::Placing;
                }
                // A finished generator starts over with a further attempt
                GenerationPhase::Success => self.phase = GenerationPhase::Placing,
                GenerationPhase::Abandoned => return Err(self.abandon()),
            }
        }
    }

    fn abandon(&mut self) -> VineError {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        self.phase = GenerationPhase::Abandoned;
        self.stats.generation_attempts = self.attempts;
        self.stats.elapsed_ms = elapsed_ms;
        warn!(
            "level {}: abandoned after {} attempts",
            self.base.level_id, self.attempts
        );
        let source = self.last_error.take().unwrap_or_else(|| {
            invalid_parameter("max_attempts", &self.active.max_attempts, &"no attempt was made")
        });
        VineError::Abandoned {
            seed: self.base.seed,
            attempts: self.attempts,
            elapsed_ms,
            source: Box::new(source),
        }
    }

    /// Escalate after a full run of failures, or after half a run once enough
    /// attempts show layouts rarely getting past the structural checks
    fn escalation_due(&self) -> bool {
        if self.consecutive_failures >= ESCALATION_THRESHOLD {
            return true;
        }
        self.attempts >= ESCALATION_THRESHOLD
            && self.consecutive_failures >= ESCALATION_THRESHOLD / 2
            && self.stats.structural_success_rate() < LOW_STRUCTURAL_SUCCESS_RATE
    }

    /// Lowest coverage target escalation may relax to
    fn coverage_floor(&self) -> f64 {
        let base = self.base.min_coverage;
        let capped = base - MAX_COVERAGE_RELAXATIONS as f64 * COVERAGE_RELAXATION_STEP;
        capped.max(MIN_RELAXED_COVERAGE.min(base))
    }

    /// Apply the next escalation step in rotation
    fn escalate(&mut self) {
        self.consecutive_failures = 0;
        self.stats.escalations += 1;
        match self.escalation_step % 3 {
            0 => {
                self.active.backtrack_window =
                    (self.active.backtrack_window + 1).min(AGGRESSIVE_BACKTRACK_WINDOW);
                info!("escalation: backtrack window {}", self.active.backtrack_window);
            }
            1 => {
                let floor = self.coverage_floor();
                self.active.min_coverage =
                    (self.active.min_coverage - COVERAGE_RELAXATION_STEP).max(floor);
                info!("escalation: min coverage {:.2}", self.active.min_coverage);
            }
            _ => {
                self.active.strategy = self.active.strategy.next();
                info!("escalation: strategy {}", self.active.strategy);
            }
        }
        self.escalation_step += 1;
    }

    /// One whole-level attempt: placement then the acceptance gate
    fn run_attempt(&mut self) -> Result<Level> {
        let attempt = self.attempts;
        self.attempts += 1;
        self.stats.generation_attempts = self.attempts;
        let mut rng = RandomSelector::for_attempt(self.base.seed, attempt);

        let mut ctx = PlacementContext {
            config: &self.active,
            rng: &mut rng,
            stats: &mut self.stats,
            attempt,
            dump: None,
        };
        let placed = self.active.strategy.placer().place(&mut ctx);
        let dump = ctx.dump.take();
        let placement = match placed {
            Ok(placement) => placement,
            Err(err) => return Err(self.attach_dump(err, dump)),
        };

        let coverage = placement.coverage();
        if coverage < self.active.min_coverage || placement.len() < 2 {
            return Err(VineError::InsufficientCoverage {
                achieved: coverage,
                required: self.active.min_coverage,
            });
        }

        let level = self.assemble_level(placement, &mut rng);

        let graph = BlockingGraph::build(&level.vines);
        if let Some(chain) = graph.cycles().into_iter().next() {
            return Err(VineError::CircularBlocking { chain });
        }
        if let Some(first) = validate_structural(&level).into_iter().next() {
            return Err(first);
        }
        self.check_tier_bounds(&level)?;
        self.check_solvable(&level)?;

        self.stats.max_blocking_depth = graph.max_depth();
        self.stats.grid_coverage = coverage;
        if self.stats.max_blocking_depth > self.active.spec.max_blocking_depth {
            debug!(
                "level {}: blocking depth {} exceeds tier target {}",
                level.id, self.stats.max_blocking_depth, self.active.spec.max_blocking_depth
            );
        }
        Ok(level)
    }

    /// Reject levels whose vine count or average length leaves the tier
    ///
    /// The average is held to the tier's ceiling only; fillers are short by
    /// construction and coverage takes precedence over the lower bound.
    fn check_tier_bounds(&self, level: &Level) -> Result<()> {
        if !self.active.tier_bounds_apply() {
            return Ok(());
        }
        let (min_count, max_count) = self.active.spec.vine_count_range;
        let count = level.vines.len();
        if !(min_count..=max_count).contains(&count) {
            return Err(VineError::TierConstraint {
                constraint: "vine count",
                actual: count as f64,
                min: min_count as f64,
                max: max_count as f64,
            });
        }
        let (min_length, max_length) = self.active.spec.avg_length_range;
        let average = level.occupied_cells() as f64 / count.max(1) as f64;
        if average > max_length as f64 {
            return Err(VineError::TierConstraint {
                constraint: "average length",
                actual: average,
                min: min_length as f64,
                max: max_length as f64,
            });
        }
        Ok(())
    }

    /// Apply the acceptance policy
    fn check_solvable(&mut self, level: &Level) -> Result<()> {
        self.stats.solvability_checks += 1;
        let report = match self.active.acceptance {
            AcceptancePolicy::GreedyOnly => SearchSpace::from_level(level).greedy(),
            AcceptancePolicy::RequireProof => solve(level, self.active.max_states, SolverMode::Auto)?,
        };
        self.stats.states_explored += report.states_explored;
        let report = report.require_verdict(self.active.max_states)?;
        if !report.solvable {
            return Err(VineError::Unsolvable {
                solver: report.solver.as_str(),
                states_explored: report.states_explored,
            });
        }
        Ok(())
    }

    /// Write the recovery dump when a directory is configured
    fn attach_dump(&mut self, err: VineError, dump: Option<FailureDump>) -> VineError {
        let (Some(dump), Some(dir)) = (dump, self.active.dump_dir.as_ref()) else {
            return err;
        };
        let path = match dump.write(dir) {
            Ok(path) => path,
            Err(write_err) => {
                warn!("failed to write failure dump: {write_err}");
                return err;
            }
        };
        self.stats.dumps_produced += 1;
        match err {
            VineError::PlacementExhausted {
                vine_id, placed, ..
            } => VineError::PlacementExhausted {
                vine_id,
                placed,
                dump: Some(path),
            },
            other => other,
        }
    }

    /// Turn an accepted placement into a level value
    ///
    /// Vines are renumbered in placement order, colored from the palette, and
    /// every uncovered cell is hidden.
    fn assemble_level(&self, placement: Placement, rng: &mut RandomSelector) -> Level {
        let config = &self.active;
        let Placement {
            vines, occupancy, ..
        } = placement;

        let vines = vines
            .into_iter()
            .enumerate()
            .map(|(index, mut vine)| {
                vine.id = format!("vine_{}", index + 1);
                vine.color_index = rng.index(COLOR_PALETTE.len());
                vine
            })
            .collect::<Vec<_>>();
        let hidden: Vec<_> = (0..occupancy.area())
            .map(|index| occupancy.point(index))
            .filter(|&p| !occupancy.is_occupied(p))
            .collect();

        let count = vines.len() as u32;
        let mut level = Level::new(config.level_id, config.width, config.height, vines);
        level.name = Some(format!("Level {}", config.level_id));
        level.difficulty = Some(config.difficulty);
        level.mask = (!hidden.is_empty()).then(|| Mask::hiding(hidden));
        level.min_moves = count;
        level.max_moves = (count * 3 / 2).max(MIN_MAX_MOVES);
        level.grace = config.spec.grace;
        level.complexity = Some(config.difficulty.complexity().to_string());
        level.color_scheme = COLOR_PALETTE.iter().map(ToString::to_string).collect();
        level.generation_seed = Some(config.seed);
        level.generation_attempts = Some(self.attempts);
        level.generation_elapsed_ms = Some(self.started.elapsed().as_millis() as u64);
        level.generation_score = Some(level_score(&level, self.attempts));
        level
    }

    fn finish_stats(&mut self, level: &Level) {
        self.stats.generation_attempts = self.attempts;
        self.stats.elapsed_ms = level.generation_elapsed_ms.unwrap_or(0);
    }
}

/// Generate one level
///
/// # Errors
///
/// Returns `InvalidParameter` for an unusable configuration and `Abandoned`
/// when every attempt within the circuit breakers failed
pub fn generate(config: &GenerationConfig) -> Result<(Level, GenerationStats)> {
    let mut generator = LevelGenerator::new(config.clone())?;
    let level = generator.run()?;
    Ok((level, generator.stats().clone()))
}
