//! Audit decision combinator
//!
//! A record goes to review when any single condition holds. Conditions are
//! checked in a fixed order and every one that holds is kept as a reason.

use crate::config::ThresholdConfig;
use crate::models::{ExpenseRecord, FlagReason, ReviewVerdict, RiskTier};
use crate::participation::Participation;
use crate::patterns::PatternEvidence;
use crate::risk::CategoryRisk;

/// Combine the evidence for one record into a review verdict
pub fn decide(
    record: &ExpenseRecord,
    participation: &Participation,
    risk: &CategoryRisk,
    evidence: &PatternEvidence,
    config: &ThresholdConfig,
) -> ReviewVerdict {
    let checks = [
        (
            record.amount >= config.amount_cutoff,
            FlagReason::AmountAtOrAboveCutoff,
        ),
        (
            participation.participation_pct > config.participation_cutoff_pct,
            FlagReason::ParticipationAboveCutoff,
        ),
        (
            !evidence.matched_vocabulary.is_empty(),
            FlagReason::SuspiciousVocabulary,
        ),
        (
            evidence.repetition_count >= config.repetition_cutoff,
            FlagReason::RepeatedDescription,
        ),
        (risk.tier == RiskTier::Critical, FlagReason::CriticalCategory),
    ];

    ReviewVerdict::from_reasons(
        checks
            .into_iter()
            .filter(|(holds, _)| *holds)
            .map(|(_, reason)| reason)
            .collect(),
    )
}
