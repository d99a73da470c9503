//! Category risk classifier
//!
//! Tiers are a category-level decision: spend is summed per category over the
//! whole ledger and the resulting tier is broadcast to every member record.
//! A single large record therefore pulls its whole category up.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::ThresholdConfig;
use crate::error::{Error, Result};
use crate::models::{CategorySummary, ExpenseRecord, PeriodKey, PeriodTotal, RiskTier};

/// Aggregate spend and tier of one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryRisk {
    pub category_total: f64,
    pub tier: RiskTier,
}

/// Map a category total to its tier. Lower bounds are inclusive.
pub fn classify_tier(category_total: f64, config: &ThresholdConfig) -> RiskTier {
    if category_total >= config.critical_amount {
        RiskTier::Critical
    } else if category_total >= config.moderate_amount {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

/// Total spend per category
pub fn category_totals(records: &[ExpenseRecord]) -> HashMap<&str, f64> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for record in records {
        *totals.entry(record.category.as_str()).or_insert(0.0) += record.amount;
    }
    totals
}

/// Category risk for every record, keyed by record id
pub fn classify_records(
    records: &[ExpenseRecord],
    config: &ThresholdConfig,
) -> HashMap<usize, CategoryRisk> {
    let by_category: HashMap<&str, CategoryRisk> = category_totals(records)
        .into_iter()
        .map(|(category, total)| {
            (
                category,
                CategoryRisk {
                    category_total: total,
                    tier: classify_tier(total, config),
                },
            )
        })
        .collect();

    debug!("Classified {} categories", by_category.len());

    records
        .iter()
        .filter_map(|record| {
            by_category
                .get(record.category.as_str())
                .map(|risk| (record.id, *risk))
        })
        .collect()
}

/// Category rollup: tier, per-period totals and grand total.
///
/// Ordered by total spend (highest first), then by category name.
pub fn summarize_by_category(
    records: &[ExpenseRecord],
    config: &ThresholdConfig,
) -> Result<Vec<CategorySummary>> {
    config.validate()?;

    let mut grouped: BTreeMap<&str, (usize, f64, BTreeMap<PeriodKey, f64>)> = BTreeMap::new();
    for record in records {
        let (count, total, periods) = grouped.entry(record.category.as_str()).or_default();
        *count += 1;
        *total += record.amount;
        *periods.entry(record.period_key()).or_insert(0.0) += record.amount;
    }

    if let Some((category, _)) = grouped.iter().find(|(_, (_, total, _))| !total.is_finite()) {
        return Err(Error::InvalidData(format!(
            "spend for category {} overflows",
            category
        )));
    }

    let mut summaries: Vec<CategorySummary> = grouped
        .into_iter()
        .map(|(category, (record_count, total, periods))| {
            CategorySummary {
                category: category.to_string(),
                risk_tier: classify_tier(total, config),
                record_count,
                period_totals: periods
                    .into_iter()
                    .map(|(period, total)| PeriodTotal { period, total })
                    .collect(),
                total,
            }
        })
        .collect();

    // BTreeMap iteration already ordered names; a stable sort keeps that for ties
    summaries.sort_by(|a, b| b.total.total_cmp(&a.total));
    Ok(summaries)
}
