//! Binary crate for the `skycast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and search
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

/// Logs go to stderr so they never mix with the rendered weather.
fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Filter used when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> &'static str {
    if verbose { "skycast_core=debug,info" } else { "warn" }
}
