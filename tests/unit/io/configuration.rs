//! Tests for generation, solver and output constants

#[cfg(test)]
mod tests {
    use vinegen::io::configuration::{
        AGGRESSIVE_BACKTRACK_WINDOW, AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS, COLOR_PALETTE,
        COVERAGE_RELAXATION_STEP, DEFAULT_BACKTRACK_WINDOW, DEFAULT_MAX_BACKTRACK_ATTEMPTS,
        DEFAULT_MAX_STATES, EXACT_SOLVER_MAX_VINES, HEURISTIC_SOLVER_MAX_VINES,
        LEVEL_FILE_PREFIX, MIN_RELAXED_COVERAGE, MIN_VINE_LENGTH, OCCUPANCY_TOLERANCE,
    };

    // Tests solver thresholds fit the state encodings
    // Verified by raising the heuristic limit past a u64 mask
    #[test]
    fn test_solver_thresholds() {
        assert_eq!(EXACT_SOLVER_MAX_VINES, 24);
        assert_eq!(HEURISTIC_SOLVER_MAX_VINES, 63);
        assert!(EXACT_SOLVER_MAX_VINES < HEURISTIC_SOLVER_MAX_VINES);
        assert!(HEURISTIC_SOLVER_MAX_VINES < 64);
        assert!(DEFAULT_MAX_STATES > 0);
    }

    // Tests aggressive recovery is at least as wide as the default
    // Verified by shrinking the aggressive window
    #[test]
    fn test_recovery_presets() {
        assert_eq!(DEFAULT_BACKTRACK_WINDOW, 3);
        assert_eq!(DEFAULT_MAX_BACKTRACK_ATTEMPTS, 2);
        assert_eq!(AGGRESSIVE_BACKTRACK_WINDOW, 6);
        assert_eq!(AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS, 6);
    }

    // Tests coverage relaxation steps down to a positive floor
    // Verified by setting the floor to zero
    #[test]
    fn test_coverage_relaxation() {
        assert!(COVERAGE_RELAXATION_STEP > 0.0);
        assert!(MIN_RELAXED_COVERAGE > 0.0 && MIN_RELAXED_COVERAGE < 1.0);
        assert!(OCCUPANCY_TOLERANCE > 0.0 && OCCUPANCY_TOLERANCE < 1.0);
    }

    // Tests palette entries are hex colors and vines need two cells
    // Verified by dropping the leading hash from one color
    #[test]
    fn test_output_constants() {
        assert_eq!(MIN_VINE_LENGTH, 2);
        assert_eq!(LEVEL_FILE_PREFIX, "level_");
        for color in COLOR_PALETTE {
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
