//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `audit` - Work paper generation (table, CSV, JSON)
//! - `summary` - Category risk rollup
//! - `config` - Threshold inspection and validation

pub mod audit;
pub mod config;
pub mod summary;

// Re-export command functions for main.rs
pub use audit::*;
pub use config::*;
pub use summary::*;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use cedula_core::{read_csv, AuditEngine, Ledger, RowError};
use tracing::debug;

/// Rendering requested with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown output format: {} (use table, csv or json)", s),
        }
    }
}

/// Build an engine from the layered threshold config
pub fn load_engine(config: Option<&Path>) -> Result<AuditEngine> {
    AuditEngine::from_config_path(config).context("Failed to load threshold configuration")
}

/// Read and normalize a ledger CSV
pub fn read_ledger(file: &Path) -> Result<Ledger> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let ledger = read_csv(csv_file)
        .with_context(|| format!("Failed to read ledger: {}", file.display()))?;
    debug!(
        "Loaded {} records from {} ({} rejected)",
        ledger.records.len(),
        file.display(),
        ledger.errors.len()
    );
    Ok(ledger)
}

/// Rejected rows go to stderr so they never mix with the rendered output
pub fn report_row_errors(errors: &[RowError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("⚠️  {} rows could not be normalized:", errors.len());
    for error in errors {
        eprintln!("   {}", error);
    }
}

/// Write rendered output to a file, or to stdout when no path is given
pub fn write_output(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(rendered.as_bytes())?;
            eprintln!("✅ Wrote {}", path.display());
        }
        None => {
            print!("{}", rendered);
        }
    }
    Ok(())
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
