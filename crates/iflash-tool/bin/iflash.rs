//! InsydeFlash container tool binary entry point.
//!
//! This is a thin wrapper around the iflash-tool library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Runs the requested subcommand
//!
//! For library usage, see the iflash-tool crate documentation.

use anyhow::Result;
use iflash_tool::{Cli, commands};

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // RUST_LOG takes precedence over --log-level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.as_str())),
        )
        .with_target(false)
        .init();

    tracing::debug!("Configuration loaded: {:?}", cli.command);

    commands::run(&cli.command)?;

    Ok(())
}
