//! Cedula CLI - Expense audit work papers
//!
//! Usage:
//!   cedula audit --file ledger.csv      Evaluate a ledger and print the work paper
//!   cedula summary --file ledger.csv    Category risk rollup
//!   cedula config --check               Validate the effective thresholds

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so CSV/JSON on stdout stays clean
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Audit {
            file,
            format,
            output,
            flagged_only,
        } => commands::cmd_audit(
            cli.config.as_deref(),
            &file,
            &format,
            output.as_deref(),
            flagged_only,
        ),
        Commands::Summary {
            file,
            format,
            output,
        } => commands::cmd_summary(cli.config.as_deref(), &file, &format, output.as_deref()),
        Commands::Config { check } => commands::cmd_config(cli.config.as_deref(), check),
    }
}
