//! CLI entry point for vine level generation and verification

use clap::Parser;
use vinegen::io::cli::Cli;

fn main() -> vinegen::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();
    cli.run()
}
