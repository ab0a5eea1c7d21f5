//! Hoist CLI binary.
//!
//! Initializes logging via `tracing`, parses arguments with `clap`, and
//! dispatches to the command handlers.

mod cli;
mod commands;

use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::dispatch(args)
}
