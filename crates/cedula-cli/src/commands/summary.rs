//! Summary command: category risk rollup

use std::path::Path;

use anyhow::{Context, Result};
use cedula_core::CategorySummary;

use super::{load_engine, read_ledger, report_row_errors, truncate, write_output, OutputFormat};

pub fn cmd_summary(
    config: Option<&Path>,
    file: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let engine = load_engine(config)?;
    let ledger = read_ledger(file)?;
    report_row_errors(&ledger.errors);

    let summary = engine
        .summarize_by_category(&ledger.records)
        .context("Failed to summarize ledger")?;

    let rendered = match format {
        OutputFormat::Table => render_summary_table(&summary),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize summary to JSON")?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => anyhow::bail!("Summary supports --format table or json"),
    };

    write_output(&rendered, output)
}

pub fn render_summary_table(summary: &[CategorySummary]) -> String {
    let mut out = String::new();

    if summary.is_empty() {
        out.push_str("No expense records found.\n");
        return out;
    }

    out.push('\n');
    out.push_str("📊 Spending by Category\n");
    out.push_str("   ─────────────────────────────────────────────────────────────\n");

    for category in summary {
        out.push_str(&format!(
            "   {:<24} {:>16.2}  {:<8}  ({} records)\n",
            truncate(&category.category, 24),
            category.total,
            category.risk_tier.label(),
            category.record_count
        ));
        for period in &category.period_totals {
            out.push_str(&format!(
                "     {:<22} {:>16.2}\n",
                period.period.to_string(),
                period.total
            ));
        }
    }

    let grand_total: f64 = summary.iter().map(|c| c.total).sum();
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    out.push_str(&format!("   {:<24} {:>16.2}\n", "Total", grand_total));

    out
}
