//! Tests for error kinds, recoverability, messages and source chaining

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::{Path, PathBuf};
    use vinegen::VineError;
    use vinegen::io::error::{WithPath, invalid_parameter, structural_violation};
    use vinegen::spatial::geometry::Point;

    // Tests only orchestration failures are retried
    // Verified by marking InvalidParameter recoverable
    #[test]
    fn test_recoverability() {
        let coverage = VineError::InsufficientCoverage {
            achieved: 0.5,
            required: 0.9,
        };
        let budget = VineError::SearchBudgetExhausted {
            solver: "exact",
            states_explored: 10,
            max_states: 10,
        };
        assert!(coverage.is_recoverable());
        assert!(budget.is_recoverable());
        assert!(!invalid_parameter("width", &0, &"too small").is_recoverable());

        let abandoned = VineError::Abandoned {
            seed: 1,
            attempts: 3,
            elapsed_ms: 5,
            source: Box::new(coverage),
        };
        assert!(!abandoned.is_recoverable());
        assert_eq!(abandoned.kind(), "abandoned");
    }

    // Tests abandoned generation exposes its last failure
    // Verified by returning None from source for Abandoned
    #[test]
    fn test_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = VineError::FileSystem {
            path: "levels/level_1.json".into(),
            operation: "read",
            source: io_error,
        };
        assert!(error.source().is_some());

        let abandoned = VineError::Abandoned {
            seed: 9,
            attempts: 2,
            elapsed_ms: 0,
            source: Box::new(VineError::CircularBlocking {
                chain: vec!["a".into(), "b".into()],
            }),
        };
        let inner = abandoned.source().expect("source");
        assert!(inner.to_string().contains("a -> b"));
        assert!(abandoned.to_string().contains("seed 9"));
        assert!(structural_violation("v", None, "x").source().is_none());
    }

    // Tests messages name what failed
    // Verified by formatting coverage as a raw fraction
    #[test]
    fn test_messages() {
        let coverage = VineError::InsufficientCoverage {
            achieved: 0.5,
            required: 0.93,
        };
        assert_eq!(coverage.to_string(), "Insufficient coverage: 50.0% < 93.0%");

        let placement = VineError::PlacementExhausted {
            vine_id: "vine_4".into(),
            placed: 3,
            dump: Some(PathBuf::from("dumps/x.json")),
        };
        let text = placement.to_string();
        assert!(text.contains("vine_4"));
        assert!(text.contains("dumps/x.json"));

        let unsolvable = VineError::Unsolvable {
            solver: "exact",
            states_explored: 12,
        };
        assert!(unsolvable.to_string().contains("proven unsolvable"));
        assert_eq!(unsolvable.kind(), "unsolvable");
    }

    // Tests structural violations carry the vine and the cell
    // Verified by dropping the vine id from the message
    #[test]
    fn test_structural_violation() {
        let err = structural_violation("vine_2", Some(Point::new(1, 3)), "masked out");
        assert!(matches!(
            err,
            VineError::StructuralViolation { ref vine_id, cell: Some(cell), .. }
                if vine_id == "vine_2" && cell == Point::new(1, 3)
        ));
        assert_eq!(err.to_string(), "Structural violation in vine vine_2: masked out");
        assert_eq!(
            structural_violation("", None, "2 of 5 levels failed").to_string(),
            "Structural violation: 2 of 5 levels failed"
        );
    }

    // Tests JSON failures are tagged with their file
    // Verified by mapping JSON errors to FileSystem
    #[test]
    fn test_with_path_wraps_json_error() {
        let parsed: Result<u32, serde_json::Error> = serde_json::from_str("not json");
        let err = parsed
            .with_path(Path::new("level_3.json"), "parse level")
            .expect_err("invalid json");
        assert_eq!(err.kind(), "serialization");
        assert!(err.to_string().contains("level_3.json"));
    }

    // Tests invalid parameters report the value and the reason
    // Verified by omitting the value from the message
    #[test]
    fn test_invalid_parameter_message() {
        let err = invalid_parameter("min_coverage", &1.5, &"must be in (0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'min_coverage' = '1.5': must be in (0, 1]"
        );
    }

    // Tests tier constraint failures are retried and name the bound
    // Verified by treating them as fatal
    #[test]
    fn test_tier_constraint() {
        let err = VineError::TierConstraint {
            constraint: "average length",
            actual: 10.94,
            min: 2.0,
            max: 6.0,
        };
        assert!(err.is_recoverable());
        assert_eq!(err.kind(), "tier_constraint");
        assert_eq!(
            err.to_string(),
            "Tier constraint failed: average length 10.94 outside 2..=6"
        );
    }
}
