//! Participation calculator
//!
//! A record's participation is its amount as a percentage of everything its
//! branch spent in the same month. Percentages are rounded half away from
//! zero to two decimals.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{ExpenseRecord, ParticipationNote, PeriodKey};

/// Participation measured for one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Participation {
    pub branch_period_total: f64,
    pub participation_pct: f64,
    pub note: Option<ParticipationNote>,
}

/// Round to two decimals, half away from zero
pub fn round_pct(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute participation for every record, keyed by record id
pub fn compute_participation(records: &[ExpenseRecord]) -> HashMap<usize, Participation> {
    let mut totals: HashMap<(&str, PeriodKey), f64> = HashMap::new();
    for record in records {
        *totals
            .entry((record.branch.as_str(), record.period_key()))
            .or_insert(0.0) += record.amount;
    }

    debug!("Computed {} branch-period totals", totals.len());

    records
        .iter()
        .map(|record| {
            let total = totals
                .get(&(record.branch.as_str(), record.period_key()))
                .copied()
                .unwrap_or(0.0);

            let participation = if total > 0.0 {
                Participation {
                    branch_period_total: total,
                    participation_pct: round_pct(record.amount / total * 100.0),
                    note: None,
                }
            } else {
                Participation {
                    branch_period_total: total,
                    participation_pct: 0.0,
                    note: Some(ParticipationNote::ZeroBranchTotal),
                }
            };

            (record.id, participation)
        })
        .collect()
}
