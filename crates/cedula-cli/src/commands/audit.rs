//! Audit command: ledger in, work paper out

use std::path::Path;

use anyhow::{Context, Result};
use cedula_core::{EvaluatedRecord, WorkPaper};

use super::{load_engine, read_ledger, report_row_errors, truncate, write_output, OutputFormat};

pub fn cmd_audit(
    config: Option<&Path>,
    file: &Path,
    format: &str,
    output: Option<&Path>,
    flagged_only: bool,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let engine = load_engine(config)?;
    let ledger = read_ledger(file)?;

    let paper = engine
        .work_paper(&ledger)
        .context("Failed to evaluate ledger")?;

    let rendered = match format {
        OutputFormat::Table => render_audit_table(&paper, flagged_only),
        OutputFormat::Csv => paper.to_csv(flagged_only)?,
        OutputFormat::Json => paper.to_json(flagged_only)?,
    };

    // JSON carries rejected rows itself
    if format != OutputFormat::Json {
        report_row_errors(paper.errors());
    }

    write_output(&rendered, output)
}

/// Human-readable work paper
pub fn render_audit_table(paper: &WorkPaper, flagged_only: bool) -> String {
    let mut out = String::new();

    if paper.is_empty() {
        out.push_str("No expense records found. Check the ledger columns:\n");
        out.push_str("  Sucursal, Categoría, Descripción, Fecha, Monto\n");
        return out;
    }

    let stats = paper.stats();

    out.push('\n');
    out.push_str("📋 Audit Work Paper\n");
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    if let Some(coverage) = paper.coverage() {
        out.push_str(&format!(
            "   Coverage: {} → {}\n",
            coverage.from.format("%d/%m/%Y"),
            coverage.to.format("%d/%m/%Y")
        ));
    }
    out.push_str(&format!(
        "   Records: {}   Flagged: {}   Rejected rows: {}\n",
        stats.records, stats.flagged, stats.rejected_rows
    ));
    out.push_str(&format!("   Ledger digest: {}\n", &paper.digest()[..16]));
    out.push('\n');

    out.push_str(&format!(
        "   {:<12} │ {:<16} │ {:<10} │ {:>14} │ {:>7} │ {:<8} │ {:<6} │ {}\n",
        "Branch", "Category", "Date", "Amount", "Part %", "Tier", "Review", "Description"
    ));
    out.push_str("   ─────────────────────────────────────────────────────────────\n");

    for row in paper.rows().filter(|r| !flagged_only || r.review_flag()) {
        out.push_str(&render_row(row));
    }

    out
}

fn render_row(row: &EvaluatedRecord) -> String {
    let review = if row.review_flag() { "⚠️ yes" } else { "no" };
    let mut line = format!(
        "   {:<12} │ {:<16} │ {} │ {:>14.2} │ {:>7.2} │ {:<8} │ {:<6} │ {}\n",
        truncate(&row.record.branch, 12),
        truncate(&row.record.category, 16),
        row.record.date.format("%d/%m/%Y"),
        row.record.amount,
        row.participation_pct,
        row.risk_tier.label(),
        review,
        truncate(&row.record.description, 40),
    );

    if row.review_flag() {
        let reasons: Vec<&str> = row.review.reasons().iter().map(|r| r.description()).collect();
        line.push_str(&format!("     └─ {}\n", reasons.join("; ")));
    }
    if !row.matched_terms.is_empty() {
        line.push_str(&format!("     └─ terms: {}\n", row.matched_terms.join(", ")));
    }

    line
}
