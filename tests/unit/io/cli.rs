//! Tests for argument parsing and the generate, solve and validate commands

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use vinegen::algorithm::executor::{AcceptancePolicy, Strategy};
    use vinegen::algorithm::solver::SolverMode;
    use vinegen::io::cli::{Cli, Command};
    use vinegen::io::configuration::{DEFAULT_DUMP_DIR, DEFAULT_MAX_STATES, DEFAULT_SEED};
    use vinegen::io::difficulty::Difficulty;
    use vinegen::io::persistence::{read_level, write_level};
    use vinegen::spatial::geometry::{Direction, Point};
    use vinegen::spatial::level::Level;
    use vinegen::spatial::vine::Vine;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse")
    }

    // Tests generate defaults come from the configuration constants
    // Verified by changing the default seed
    #[test]
    fn test_generate_defaults() {
        let cli = parse(&["vinegen", "generate"]);
        let Command::Generate(args) = &cli.command else {
            unreachable!("expected generate");
        };
        assert_eq!(args.level, 1);
        assert_eq!(args.count, 1);
        assert_eq!(args.seed, DEFAULT_SEED);
        assert_eq!(args.max_states, DEFAULT_MAX_STATES);
        assert_eq!(args.strategy, Strategy::CenterOut);
        assert_eq!(args.output, PathBuf::from("levels"));
        assert!(args.dump_dir.is_none());
        assert_eq!(cli.log_level(), "info");
        assert!(cli.should_show_progress());
    }

    // Tests flags flow into the per-level configuration
    // Verified by ignoring the width override
    #[test]
    fn test_generate_overrides() {
        let cli = parse(&[
            "vinegen",
            "generate",
            "--level",
            "10",
            "-n",
            "3",
            "-W",
            "7",
            "-H",
            "9",
            "--difficulty",
            "sprout",
            "--strategy",
            "clearable-first",
            "--min-coverage",
            "0.7",
            "--aggressive",
            "--require-proof",
            "--dump-dir",
            "--quiet",
        ]);
        let Command::Generate(args) = &cli.command else {
            unreachable!("expected generate");
        };
        assert_eq!(args.dump_dir, Some(PathBuf::from(DEFAULT_DUMP_DIR)));

        let config = args.config_for(12);
        assert_eq!(config.level_id, 12);
        assert_eq!(config.seed, DEFAULT_SEED + 2);
        assert_eq!((config.width, config.height), (7, 9));
        assert_eq!(config.difficulty, Difficulty::Sprout);
        assert_eq!(config.strategy, Strategy::ClearableFirst);
        assert_eq!(config.acceptance, AcceptancePolicy::RequireProof);
        assert!(config.aggressive);
        assert!((config.min_coverage - 0.7).abs() < 1e-9);
        assert_eq!(cli.log_level(), "warn");
        assert!(!cli.should_show_progress());
    }

    // Tests the tier follows the level id when no difficulty is given
    // Verified by always using the first level's tier
    #[test]
    fn test_difficulty_follows_level() {
        let cli = parse(&["vinegen", "generate", "--level", "5", "-n", "3"]);
        let Command::Generate(args) = &cli.command else {
            unreachable!("expected generate");
        };
        assert_eq!(args.config_for(5).difficulty, Difficulty::Tutorial);
        assert_eq!(args.config_for(7).difficulty, Difficulty::Seedling);
    }

    // Tests solve and validate parse their targets and solver choice
    // Verified by defaulting the solver to greedy
    #[test]
    fn test_solve_and_validate_parse() {
        let cli = parse(&["vinegen", "solve", "level_1.json", "--solver", "astar"]);
        let Command::Solve(args) = &cli.command else {
            unreachable!("expected solve");
        };
        assert_eq!(args.file, PathBuf::from("level_1.json"));
        assert_eq!(args.solver, SolverMode::AStar);

        let cli = parse(&["vinegen", "-v", "validate", "levels", "--max-states", "50"]);
        let Command::Validate(args) = &cli.command else {
            unreachable!("expected validate");
        };
        assert_eq!(args.max_states, 50);
        assert_eq!(args.solver, SolverMode::Auto);
        assert_eq!(cli.log_level(), "debug");
    }

    // Tests unknown subcommands and bad values are rejected
    // Verified by accepting any strategy string
    #[test]
    fn test_parse_errors() {
        assert!(Cli::try_parse_from(["vinegen"]).is_err());
        assert!(Cli::try_parse_from(["vinegen", "generate", "--strategy", "spiral"]).is_err());
        assert!(Cli::try_parse_from(["vinegen", "solve"]).is_err());
    }

    // Tests generate writes one file per level id and rejects a zero count
    // Verified by naming every file after the first id
    #[test]
    fn test_run_generate_writes_levels() {
        let temp = TempDir::new().expect("temp dir");
        let out = temp.path().join("out");
        let out_arg = out.to_string_lossy().to_string();
        let cli = parse(&[
            "vinegen", "-q", "generate", "-n", "2", "-W", "5", "-H", "6", "--vine-count", "3",
            "--min-coverage", "0.6", "--output", &out_arg,
        ]);
        cli.run().expect("generate");
        assert_eq!(read_level(&out.join("level_1.json")).expect("level 1").id, 1);
        assert_eq!(read_level(&out.join("level_2.json")).expect("level 2").id, 2);

        // Existing files are kept without --overwrite
        assert!(cli.run().is_err());

        let zero = parse(&["vinegen", "-q", "generate", "-n", "0", "--output", &out_arg]);
        assert!(zero.run().is_err());
    }

    // Tests validate passes sound levels and fails a deadlocked one
    // Verified by returning Ok when some levels failed
    #[test]
    fn test_run_validate() {
        let temp = TempDir::new().expect("temp dir");
        let good = Level::new(1, 5, 5, vec![Vine::new("vine_1", Direction::Up, vec![
            Point::new(1, 1),
            Point::new(1, 0),
        ])]);
        write_level(&temp.path().join("level_1.json"), &good, false).expect("write");

        let report = temp.path().join("report.json");
        let dir_arg = temp.path().to_string_lossy().to_string();
        let report_arg = report.to_string_lossy().to_string();
        let cli = parse(&["vinegen", "-q", "validate", &dir_arg, "--report", &report_arg]);
        cli.run().expect("validate");
        let json = std::fs::read_to_string(&report).expect("report");
        assert!(json.contains("\"passed\": 1"));

        let stuck = Level::new(2, 4, 1, vec![
            Vine::new("a", Direction::Right, vec![Point::new(1, 0), Point::new(0, 0)]),
            Vine::new("b", Direction::Left, vec![Point::new(2, 0), Point::new(3, 0)]),
        ]);
        let stuck_path = temp.path().join("level_2.json");
        write_level(&stuck_path, &stuck, false).expect("write");
        let stuck_arg = stuck_path.to_string_lossy().to_string();
        assert!(parse(&["vinegen", "-q", "validate", &stuck_arg]).run().is_err());
    }

    // Tests solve reports on a readable level and fails on a missing one
    // Verified by swallowing read errors
    #[test]
    fn test_run_solve() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("level_1.json");
        let level = Level::new(1, 3, 3, vec![Vine::new("vine_1", Direction::Left, vec![
            Point::new(0, 1),
            Point::new(1, 1),
        ])]);
        write_level(&path, &level, false).expect("write");
        let path_arg = path.to_string_lossy().to_string();
        assert!(parse(&["vinegen", "solve", &path_arg]).run().is_ok());

        let missing = temp.path().join("missing.json").to_string_lossy().to_string();
        assert!(parse(&["vinegen", "solve", &missing]).run().is_err());
    }
}
