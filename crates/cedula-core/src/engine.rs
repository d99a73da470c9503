//! Audit evaluation engine
//!
//! Runs the participation, category risk and pattern evaluators over one
//! ledger snapshot, combines their evidence into review verdicts and orders
//! the result for the work paper.
//!
//! The three evaluators only read the records and return maps keyed by
//! record id, so they run side by side on the rayon pool and are joined
//! before any verdict is taken.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::ThresholdConfig;
use crate::error::{Error, Result};
use crate::models::{CategorySummary, EvaluatedRecord, ExpenseRecord, Ledger, PeriodKey};
use crate::participation::compute_participation;
use crate::patterns::scan_patterns;
use crate::risk::{self, classify_records};
use crate::verdict::decide;
use crate::workpaper::{order_for_review, WorkPaper};

/// Evaluate a ledger snapshot under `config`.
///
/// The config is validated before any record is looked at. Output is in
/// review order.
pub fn evaluate(
    records: &[ExpenseRecord],
    config: &ThresholdConfig,
) -> Result<Vec<EvaluatedRecord>> {
    config.validate()?;
    check_records(records)?;

    if records.is_empty() {
        return Ok(Vec::new());
    }

    let (participation, (category_risk, evidence)) = rayon::join(
        || compute_participation(records),
        || {
            rayon::join(
                || classify_records(records, config),
                || scan_patterns(records, config),
            )
        },
    );

    let mut evaluated = Vec::with_capacity(records.len());
    for record in records {
        let missing = |stage: &str| {
            Error::InvalidData(format!("record {} missing from {} results", record.id, stage))
        };
        let p = participation
            .get(&record.id)
            .ok_or_else(|| missing("participation"))?;
        let r = category_risk
            .get(&record.id)
            .ok_or_else(|| missing("category risk"))?;
        let e = evidence.get(&record.id).ok_or_else(|| missing("pattern"))?;

        let review = decide(record, p, r, e, config);

        evaluated.push(EvaluatedRecord {
            record: record.clone(),
            period: record.period_key(),
            branch_period_total: p.branch_period_total,
            participation_pct: p.participation_pct,
            participation_note: p.note,
            category_total: r.category_total,
            risk_tier: r.tier,
            repetition_count: e.repetition_count,
            matched_vocabulary: e.matched_vocabulary.clone(),
            matched_terms: e.matched_terms.clone(),
            review,
        });
    }

    order_for_review(&mut evaluated);

    let flagged = evaluated.iter().filter(|r| r.review_flag()).count();
    info!(
        "Evaluation complete: {} records, {} flagged for review",
        evaluated.len(),
        flagged
    );

    Ok(evaluated)
}

/// Records must be unique by id and carry finite, non-negative amounts.
/// Branch-month and category totals must stay finite as well.
fn check_records(records: &[ExpenseRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut branch_totals: HashMap<(&str, PeriodKey), f64> = HashMap::new();
    let mut category_totals: HashMap<&str, f64> = HashMap::new();

    for record in records {
        if !seen.insert(record.id) {
            return Err(Error::InvalidData(format!(
                "duplicate record id {}",
                record.id
            )));
        }
        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "record {} has invalid amount {}",
                record.id, record.amount
            )));
        }

        let branch_total = branch_totals
            .entry((record.branch.as_str(), record.period_key()))
            .or_insert(0.0);
        *branch_total += record.amount;
        if !branch_total.is_finite() {
            return Err(Error::InvalidData(format!(
                "spend for branch {} in {} overflows",
                record.branch,
                record.period_key()
            )));
        }

        let category_total = category_totals
            .entry(record.category.as_str())
            .or_insert(0.0);
        *category_total += record.amount;
        if !category_total.is_finite() {
            return Err(Error::InvalidData(format!(
                "spend for category {} overflows",
                record.category
            )));
        }
    }
    Ok(())
}

/// Engine bound to one validated configuration
#[derive(Debug, Clone, Default)]
pub struct AuditEngine {
    config: ThresholdConfig,
}

impl AuditEngine {
    /// Create an engine, rejecting an invalid configuration up front
    pub fn new(config: ThresholdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create an engine with the layered config (explicit path, user override, default)
    pub fn from_config_path(path: Option<&std::path::Path>) -> Result<Self> {
        Self::new(ThresholdConfig::load(path)?)
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn evaluate(&self, records: &[ExpenseRecord]) -> Result<Vec<EvaluatedRecord>> {
        evaluate(records, &self.config)
    }

    pub fn summarize_by_category(&self, records: &[ExpenseRecord]) -> Result<Vec<CategorySummary>> {
        risk::summarize_by_category(records, &self.config)
    }

    /// Run the full pipeline for a normalized ledger
    pub fn work_paper(&self, ledger: &Ledger) -> Result<WorkPaper> {
        debug!(
            "Building work paper from {} records ({} rejected rows)",
            ledger.records.len(),
            ledger.errors.len()
        );
        let evaluated = self.evaluate(&ledger.records)?;
        Ok(WorkPaper::assemble(evaluated, ledger.errors.clone()))
    }
}
