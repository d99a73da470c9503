use std::collections::{BTreeSet, HashMap};

use cedula_core::{evaluate, ExpenseRecord, PeriodKey, ThresholdConfig};
use chrono::NaiveDate;
use proptest::prelude::*;

const BRANCHES: [&str; 3] = ["Centro", "Norte", "Este"];
const CATEGORIES: [&str; 4] = ["Mantenimiento", "Limpieza", "Cafeteria", "Seguros"];
const DESCRIPTIONS: [&str; 5] = [
    "Pintura local",
    "Merienda personal",
    "Seguro ARS ajuste",
    "Detergente",
    "Gastos varios",
];

fn ledger_strategy() -> impl Strategy<Value = Vec<ExpenseRecord>> {
    prop::collection::vec(
        (0..3usize, 0..4usize, 0..5usize, 1..=3u32, 1..=28u32, 0..5_000_000u64),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(id, (b, c, d, month, day, cents))| {
                ExpenseRecord::new(
                    id,
                    BRANCHES[b],
                    CATEGORIES[c],
                    DESCRIPTIONS[d],
                    NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
                    cents as f64 / 100.0,
                )
            })
            .collect()
    })
}

fn small_config() -> ThresholdConfig {
    ThresholdConfig {
        critical_amount: 20_000.0,
        moderate_amount: 5_000.0,
        amount_cutoff: 10_000.0,
        participation_cutoff_pct: 40.0,
        repetition_cutoff: 3,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn output_is_a_permutation_of_input(records in ledger_strategy()) {
        let out = evaluate(&records, &small_config()).unwrap();
        let input: BTreeSet<usize> = records.iter().map(|r| r.id).collect();
        let output: BTreeSet<usize> = out.iter().map(|r| r.record.id).collect();
        prop_assert_eq!(out.len(), records.len());
        prop_assert_eq!(input, output);
    }

    #[test]
    fn participation_sums_to_hundred_per_branch_month(records in ledger_strategy()) {
        let out = evaluate(&records, &small_config()).unwrap();

        let mut groups: HashMap<(String, PeriodKey), (f64, usize, f64)> = HashMap::new();
        for row in &out {
            let entry = groups
                .entry((row.record.branch.clone(), row.period))
                .or_insert((0.0, 0, row.branch_period_total));
            entry.0 += row.participation_pct;
            entry.1 += 1;
        }

        for ((branch, period), (sum, count, total)) in groups {
            if total > 0.0 {
                // each share is rounded to two decimals
                let slack = 0.005 * count as f64 + 1e-6;
                prop_assert!(
                    (sum - 100.0).abs() <= slack,
                    "{} {}: shares sum to {}", branch, period, sum
                );
            } else {
                prop_assert_eq!(sum, 0.0);
            }
        }
    }

    #[test]
    fn category_tier_is_shared_by_every_record(records in ledger_strategy()) {
        let out = evaluate(&records, &small_config()).unwrap();

        let mut seen = HashMap::new();
        for row in &out {
            let entry = seen
                .entry(row.record.category.clone())
                .or_insert((row.risk_tier, row.category_total));
            prop_assert_eq!(entry.0, row.risk_tier);
            prop_assert_eq!(entry.1, row.category_total);
        }
    }

    #[test]
    fn review_order_is_non_increasing_participation(records in ledger_strategy()) {
        let out = evaluate(&records, &small_config()).unwrap();
        for pair in out.windows(2) {
            prop_assert!(pair[0].participation_pct >= pair[1].participation_pct);
            if pair[0].participation_pct == pair[1].participation_pct {
                prop_assert!(pair[0].review_flag() || !pair[1].review_flag());
            }
        }
    }

    #[test]
    fn flag_matches_reasons(records in ledger_strategy()) {
        let out = evaluate(&records, &small_config()).unwrap();
        for row in &out {
            prop_assert_eq!(row.review_flag(), !row.review.reasons().is_empty());
        }
    }

    #[test]
    fn raising_amount_cutoff_never_adds_flags(
        records in ledger_strategy(),
        bump in 0.0..50_000.0f64,
    ) {
        let base = small_config();
        let raised = ThresholdConfig {
            amount_cutoff: base.amount_cutoff + bump,
            ..base.clone()
        };

        let flagged = |config: &ThresholdConfig| -> BTreeSet<usize> {
            evaluate(&records, config)
                .unwrap()
                .into_iter()
                .filter(|r| r.review_flag())
                .map(|r| r.record.id)
                .collect()
        };

        let before = flagged(&base);
        let after = flagged(&raised);
        prop_assert!(after.is_subset(&before));
    }

    #[test]
    fn evaluation_is_idempotent(records in ledger_strategy()) {
        let config = small_config();
        let first = evaluate(&records, &config).unwrap();
        let second = evaluate(&records, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}
