//! Difficulty tiers and the tables that parameterise generation for each tier

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty tier of a level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Difficulty {
    /// Introductory levels with few long vines
    Tutorial,
    /// First real levels
    Seedling,
    /// Mixed lengths, light blocking
    Sprout,
    /// Moderate blocking chains
    Nurturing,
    /// Dense grids with short vines
    Flourishing,
    /// Largest grids and deepest chains
    Transcendent,
}

/// Generation constraints for one tier
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySpec {
    /// Inclusive range of vine counts
    pub vine_count_range: (usize, usize),
    /// Inclusive range of average vine length
    pub avg_length_range: (usize, usize),
    /// Deepest blocking chain tolerated
    pub max_blocking_depth: usize,
    /// Minimum covered fraction of the visible grid
    pub min_coverage: f64,
    /// Mistakes allowed before failing
    pub grace: u32,
}

/// Inclusive grid size bounds for one tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSizeRange {
    /// Smallest width
    pub min_width: usize,
    /// Smallest height
    pub min_height: usize,
    /// Largest width
    pub max_width: usize,
    /// Largest height
    pub max_height: usize,
}

impl Difficulty {
    /// Every tier from easiest to hardest
    pub const ALL: [Self; 6] = [
        Self::Tutorial,
        Self::Seedling,
        Self::Sprout,
        Self::Nurturing,
        Self::Flourishing,
        Self::Transcendent,
    ];

    /// Generation constraints for the tier
    pub const fn spec(self) -> DifficultySpec {
        match self {
            Self::Tutorial => DifficultySpec {
                vine_count_range: (3, 8),
                avg_length_range: (6, 8),
                max_blocking_depth: 0,
                min_coverage: 0.30,
                grace: 3,
            },
            Self::Seedling => DifficultySpec {
                vine_count_range: (4, 60),
                avg_length_range: (6, 8),
                max_blocking_depth: 1,
                min_coverage: 0.93,
                grace: 3,
            },
            Self::Sprout => DifficultySpec {
                vine_count_range: (8, 80),
                avg_length_range: (3, 8),
                max_blocking_depth: 2,
                min_coverage: 0.93,
                grace: 3,
            },
            Self::Nurturing => DifficultySpec {
                vine_count_range: (12, 100),
                avg_length_range: (3, 8),
                max_blocking_depth: 3,
                min_coverage: 0.93,
                grace: 3,
            },
            Self::Flourishing => DifficultySpec {
                vine_count_range: (15, 150),
                avg_length_range: (2, 6),
                max_blocking_depth: 4,
                min_coverage: 0.93,
                grace: 3,
            },
            Self::Transcendent => DifficultySpec {
                vine_count_range: (15, 200),
                avg_length_range: (2, 6),
                max_blocking_depth: 4,
                min_coverage: 0.93,
                grace: 4,
            },
        }
    }

    /// Grid size bounds for the tier
    pub const fn grid_size_range(self) -> GridSizeRange {
        let (min_width, min_height, max_width, max_height) = match self {
            Self::Tutorial => (5, 8, 9, 12),
            Self::Seedling => (6, 8, 9, 12),
            Self::Sprout => (9, 12, 12, 16),
            Self::Nurturing => (9, 16, 12, 20),
            Self::Flourishing => (12, 20, 16, 24),
            Self::Transcendent => (16, 28, 24, 40),
        };
        GridSizeRange {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    /// Default grid `(width, height)`, the middle of the tier's range
    pub const fn default_grid_size(self) -> (usize, usize) {
        let range = self.grid_size_range();
        (
            (range.min_width + range.max_width) / 2,
            (range.min_height + range.max_height) / 2,
        )
    }

    /// Tier assigned to a level number
    pub const fn for_level(level_id: u32) -> Self {
        match level_id {
            0..=5 => Self::Tutorial,
            6..=15 => Self::Seedling,
            16..=30 => Self::Sprout,
            31..=44 => Self::Nurturing,
            45..=50 => Self::Flourishing,
            _ => Self::Transcendent,
        }
    }

    /// Complexity label written to level files
    pub const fn complexity(self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::Seedling | Self::Sprout => "low",
            Self::Nurturing => "medium",
            Self::Flourishing => "high",
            Self::Transcendent => "extreme",
        }
    }

    /// Variety profile preset for the tier
    pub const fn profile(self) -> VarietyProfile {
        let spec = self.spec();
        VarietyProfile::for_median_length((spec.avg_length_range.0 + spec.avg_length_range.1) / 2)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tutorial => "Tutorial",
            Self::Seedling => "Seedling",
            Self::Sprout => "Sprout",
            Self::Nurturing => "Nurturing",
            Self::Flourishing => "Flourishing",
            Self::Transcendent => "Transcendent",
        };
        f.write_str(name)
    }
}

/// Where seeds are preferred on the grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionBias {
    /// Prefer cells near the outer ring
    Edge,
    /// Prefer cells near the middle
    Center,
    /// No preference
    Balanced,
}

/// Shape and distribution controls for placement strategies
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VarietyProfile {
    /// Relative weights of short (2-3), medium (4-6) and long (7+) vines
    pub length_mix: [f64; 3],
    /// Probability of turning at each growth step
    pub turn_mix: f64,
    /// Seed placement preference
    pub region_bias: RegionBias,
    /// Desired share of head directions, in `Direction::ALL` order
    pub dir_balance: [f64; 4],
}

impl VarietyProfile {
    /// Preset keyed on the tier's median vine length
    pub const fn for_median_length(median: usize) -> Self {
        if median >= 6 {
            Self {
                length_mix: [0.15, 0.35, 0.5],
                turn_mix: 0.3,
                region_bias: RegionBias::Edge,
                dir_balance: [0.25; 4],
            }
        } else if median <= 4 {
            Self {
                length_mix: [0.6, 0.3, 0.1],
                turn_mix: 0.4,
                region_bias: RegionBias::Center,
                dir_balance: [0.25; 4],
            }
        } else {
            Self {
                length_mix: [0.3, 0.5, 0.2],
                turn_mix: 0.35,
                region_bias: RegionBias::Balanced,
                dir_balance: [0.25; 4],
            }
        }
    }
}

impl Default for VarietyProfile {
    fn default() -> Self {
        Self::for_median_length(5)
    }
}
