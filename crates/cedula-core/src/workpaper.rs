//! Work-paper assembler and plain renderings
//!
//! Orders evaluated records for review (highest participation first, flagged
//! records first among equals, input order otherwise) and exposes them as a
//! restartable sequence. Supports:
//! - CSV rendering with empty auditor columns for sign-off
//! - JSON rendering with run statistics and rejected rows
//!
//! Currency formatting, colors and spreadsheet output belong to the
//! presentation layer.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::models::{EvaluatedRecord, ExpenseRecord, RowError};

/// Sort for review: participation descending, then flagged first.
/// The sort is stable, so remaining ties keep input order.
pub fn order_for_review(rows: &mut [EvaluatedRecord]) {
    rows.sort_by(|a, b| {
        b.participation_pct
            .total_cmp(&a.participation_pct)
            .then_with(|| b.review_flag().cmp(&a.review_flag()))
    });
}

/// SHA-256 over the normalized ledger (in id order), hex encoded
pub fn ledger_digest<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut sorted: Vec<&ExpenseRecord> = records.into_iter().collect();
    sorted.sort_by_key(|r| r.id);

    let mut hasher = Sha256::new();
    for record in sorted {
        hasher.update(record.id.to_be_bytes());
        hasher.update(record.branch.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.category.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.description.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.date.to_string().as_bytes());
        hasher.update(record.amount.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Headline counts for a work paper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkPaperStats {
    pub records: usize,
    pub flagged: usize,
    pub rejected_rows: usize,
}

/// First and last expense date covered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// The ordered audit listing handed to the auditor
#[derive(Debug, Clone)]
pub struct WorkPaper {
    rows: Vec<EvaluatedRecord>,
    errors: Vec<RowError>,
    digest: String,
}

impl WorkPaper {
    pub fn assemble(mut rows: Vec<EvaluatedRecord>, errors: Vec<RowError>) -> Self {
        order_for_review(&mut rows);
        let digest = ledger_digest(rows.iter().map(|r| &r.record));
        Self {
            rows,
            errors,
            digest,
        }
    }

    /// Rows in review order. Each call starts over from the top.
    pub fn rows(&self) -> std::slice::Iter<'_, EvaluatedRecord> {
        self.rows.iter()
    }

    pub fn flagged(&self) -> impl Iterator<Item = &EvaluatedRecord> + '_ {
        self.rows.iter().filter(|r| r.review_flag())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Source rows that could not be normalized
    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn coverage(&self) -> Option<Coverage> {
        let from = self.rows.iter().map(|r| r.record.date).min()?;
        let to = self.rows.iter().map(|r| r.record.date).max()?;
        Some(Coverage { from, to })
    }

    pub fn stats(&self) -> WorkPaperStats {
        WorkPaperStats {
            records: self.rows.len(),
            flagged: self.flagged().count(),
            rejected_rows: self.errors.len(),
        }
    }

    /// Write the listing as CSV. The header is always written, so an empty
    /// listing still carries the auditor sign-off columns.
    pub fn write_csv<W: Write>(&self, writer: W, flagged_only: bool) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(CSV_HEADER)?;
        for row in self.rows().filter(|r| !flagged_only || r.review_flag()) {
            wtr.serialize(CsvRow::from(row))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv(&self, flagged_only: bool) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf, flagged_only)?;
        String::from_utf8(buf).map_err(|e| Error::InvalidData(e.to_string()))
    }

    pub fn to_json(&self, flagged_only: bool) -> Result<String> {
        let view = JsonView {
            digest: &self.digest,
            coverage: self.coverage(),
            stats: self.stats(),
            rows: self
                .rows()
                .filter(|r| !flagged_only || r.review_flag())
                .collect(),
            rejected_rows: &self.errors,
        };
        let mut json = serde_json::to_string_pretty(&view)?;
        json.push('\n');
        Ok(json)
    }
}

impl<'a> IntoIterator for &'a WorkPaper {
    type Item = &'a EvaluatedRecord;
    type IntoIter = std::slice::Iter<'a, EvaluatedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

#[derive(Serialize)]
struct JsonView<'a> {
    digest: &'a str,
    coverage: Option<Coverage>,
    stats: WorkPaperStats,
    rows: Vec<&'a EvaluatedRecord>,
    rejected_rows: &'a [RowError],
}

/// Work paper CSV columns, in `CsvRow` field order
const CSV_HEADER: [&str; 16] = [
    "id",
    "branch",
    "category",
    "description",
    "date",
    "amount",
    "branch_period_total",
    "participation_pct",
    "risk_tier",
    "repetition_count",
    "matched_vocabulary",
    "review",
    "review_reasons",
    "verified",
    "not_verified",
    "auditor_comment",
];

/// One CSV line of the work paper
#[derive(Serialize)]
struct CsvRow<'a> {
    id: usize,
    branch: &'a str,
    category: &'a str,
    description: &'a str,
    date: String,
    amount: f64,
    branch_period_total: f64,
    participation_pct: f64,
    risk_tier: &'static str,
    repetition_count: usize,
    matched_vocabulary: String,
    review: &'static str,
    review_reasons: String,
    verified: &'static str,
    not_verified: &'static str,
    auditor_comment: &'static str,
}

impl<'a> From<&'a EvaluatedRecord> for CsvRow<'a> {
    fn from(row: &'a EvaluatedRecord) -> Self {
        Self {
            id: row.record.id,
            branch: &row.record.branch,
            category: &row.record.category,
            description: &row.record.description,
            date: row.record.date.format("%d/%m/%Y").to_string(),
            amount: row.record.amount,
            branch_period_total: row.branch_period_total,
            participation_pct: row.participation_pct,
            risk_tier: row.risk_tier.as_str(),
            repetition_count: row.repetition_count,
            matched_vocabulary: row
                .matched_vocabulary
                .iter()
                .map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            review: if row.review_flag() { "yes" } else { "no" },
            review_reasons: row
                .review
                .reasons()
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            verified: "",
            not_verified: "",
            auditor_comment: "",
        }
    }
}
