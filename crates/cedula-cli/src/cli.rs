//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cedula - Expense audit work papers for branch ledgers
#[derive(Parser)]
#[command(name = "cedula")]
#[command(about = "Flags branch expenses for audit review", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Threshold config file (defaults to the user override, then built-in thresholds)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a ledger and produce the audit work paper
    Audit {
        /// Ledger CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Output format: table, csv, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only include records flagged for review
        #[arg(long)]
        flagged_only: bool,
    },

    /// Category risk rollup with monthly totals
    Summary {
        /// Ledger CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective thresholds
    Config {
        /// Only validate the configuration
        #[arg(long)]
        check: bool,
    },
}
