//! Generation constants and runtime configuration defaults

// Defaults for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default state budget for exhaustive searches
pub const DEFAULT_MAX_STATES: usize = 100_000;

/// Weight applied to the blocked-vine count in the A* priority
pub const DEFAULT_ASTAR_WEIGHT: usize = 10;

// Solver selection thresholds; the bitmask solvers address vines through a u64
/// Largest vine count handled by exact BFS or A*
pub const EXACT_SOLVER_MAX_VINES: usize = 24;
/// Largest vine count handled by the heuristic best-first search
pub const HEURISTIC_SOLVER_MAX_VINES: usize = 63;

/// Shortest legal vine
pub const MIN_VINE_LENGTH: usize = 2;
/// Largest grid area accepted from level files or generation requests
pub const MAX_GRID_CELLS: usize = 65_536;

// Recovery defaults
/// Vines removed per local backtrack
pub const DEFAULT_BACKTRACK_WINDOW: usize = 3;
/// Local backtrack retries per failing vine
pub const DEFAULT_MAX_BACKTRACK_ATTEMPTS: usize = 2;
/// Backtrack window used in aggressive mode, also the escalation ceiling
pub const AGGRESSIVE_BACKTRACK_WINDOW: usize = 6;
/// Backtrack retries used in aggressive mode
pub const AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS: usize = 6;
/// Multi-vine removal combinations tried per cycle
pub const CYCLE_BREAKER_MAX_COMBOS: usize = 12;

// Placement limits
/// Seed attempts per vine before recovery starts
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;
/// Passes made by the gap filler over leftover cells
pub const GAP_FILL_PASSES: usize = 3;
/// Consecutive failures after which clearable-first fill gives up
pub const MAX_CONSECUTIVE_FILL_FAILURES: usize = 50;
/// Tail extension passes made by clearable-first placement
pub const EXTENSION_PASSES: usize = 3;

// Orchestrator circuit breakers
/// Whole-level attempts before abandoning
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 10_000;
/// Wall-clock limit per level in seconds
pub const DEFAULT_MAX_GENERATION_SECONDS: u64 = 60;
/// Consecutive failed attempts that trigger one escalation step
pub const ESCALATION_THRESHOLD: usize = 25;
/// Coverage target reduction applied per escalation
pub const COVERAGE_RELAXATION_STEP: f64 = 0.05;
/// Lowest coverage target escalation may reach
pub const MIN_RELAXED_COVERAGE: f64 = 0.5;
/// Coverage relaxations allowed over one request
pub const MAX_COVERAGE_RELAXATIONS: usize = 3;
/// Structural success rate below which escalation starts at half the threshold
pub const LOW_STRUCTURAL_SUCCESS_RATE: f64 = 0.1;
/// Attempts between progress log lines
pub const PROGRESS_LOG_INTERVAL: usize = 100;

// Validation
/// Coverage shortfall reported as a warning rather than an error
pub const OCCUPANCY_TOLERANCE: f64 = 0.401;

// Level assembly
/// Palette assigned to generated levels
pub const COLOR_PALETTE: [&str; 8] = [
    "#888888", "#7CB342", "#FF9800", "#FFC107", "#7C4DFF", "#29B6F6", "#FF6E40", "#CDDC39",
];
/// Smallest move allowance written to a level
pub const MIN_MAX_MOVES: u32 = 5;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Output settings
/// Directory name used for failure dumps when none is given
pub const DEFAULT_DUMP_DIR: &str = "failing_dumps";
/// Level file name prefix
pub const LEVEL_FILE_PREFIX: &str = "level_";
