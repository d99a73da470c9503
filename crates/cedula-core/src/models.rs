//! Domain models for Cedula

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar-month bucket used for aggregation and repetition detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One ledger line, as observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Zero-based index of the source row
    pub id: usize,
    pub branch: String,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub amount: f64,
}

impl ExpenseRecord {
    pub fn new(
        id: usize,
        branch: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        amount: f64,
    ) -> Self {
        Self {
            id,
            branch: branch.into(),
            category: category.into(),
            description: description.into(),
            date,
            amount,
        }
    }

    pub fn period_key(&self) -> PeriodKey {
        PeriodKey::from_date(self.date)
    }
}

/// Risk tier of a category, derived from its aggregate spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Suspicious-term vocabularies a description is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vocabulary {
    /// Spend with little or no supporting documentation ("miscellaneous", "no receipt")
    LowDocumentation,
    /// Insurer names and reclassification language used to hide spend
    InsuranceObfuscation,
}

impl Vocabulary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowDocumentation => "low_documentation",
            Self::InsuranceObfuscation => "insurance_obfuscation",
        }
    }
}

impl std::fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A condition that sent a record to review.
///
/// Variants are declared in evaluation order; a verdict lists its reasons
/// in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    AmountAtOrAboveCutoff,
    ParticipationAboveCutoff,
    SuspiciousVocabulary,
    RepeatedDescription,
    CriticalCategory,
}

impl FlagReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmountAtOrAboveCutoff => "amount_at_or_above_cutoff",
            Self::ParticipationAboveCutoff => "participation_above_cutoff",
            Self::SuspiciousVocabulary => "suspicious_vocabulary",
            Self::RepeatedDescription => "repeated_description",
            Self::CriticalCategory => "critical_category",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AmountAtOrAboveCutoff => "Amount is at or above the review cutoff",
            Self::ParticipationAboveCutoff => {
                "Record takes an outsized share of its branch's monthly spend"
            }
            Self::SuspiciousVocabulary => "Description matches a suspicious-term vocabulary",
            Self::RepeatedDescription => "Same description repeats within the month",
            Self::CriticalCategory => "Category is in the critical risk tier",
        }
    }
}

impl std::fmt::Display for FlagReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review decision for one record, with the conditions that triggered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewVerdict {
    flagged: bool,
    reasons: Vec<FlagReason>,
}

impl ReviewVerdict {
    /// Build a verdict from triggered conditions. Reasons are kept in
    /// evaluation order without duplicates.
    pub fn from_reasons(mut reasons: Vec<FlagReason>) -> Self {
        reasons.sort();
        reasons.dedup();
        Self {
            flagged: !reasons.is_empty(),
            reasons,
        }
    }

    pub fn clear() -> Self {
        Self::from_reasons(Vec::new())
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn reasons(&self) -> &[FlagReason] {
        &self.reasons
    }

    pub fn has(&self, reason: FlagReason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Why a participation figure could not be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationNote {
    /// The branch spent nothing in the period, so every share is reported as 0
    ZeroBranchTotal,
}

/// An expense record plus everything the engine measured about it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedRecord {
    #[serde(flatten)]
    pub record: ExpenseRecord,
    pub period: PeriodKey,
    pub branch_period_total: f64,
    pub participation_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_note: Option<ParticipationNote>,
    pub category_total: f64,
    pub risk_tier: RiskTier,
    pub repetition_count: usize,
    pub matched_vocabulary: BTreeSet<Vocabulary>,
    pub matched_terms: Vec<String>,
    pub review: ReviewVerdict,
}

impl EvaluatedRecord {
    pub fn review_flag(&self) -> bool {
        self.review.is_flagged()
    }
}

/// Spend of one category within one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub period: PeriodKey,
    pub total: f64,
}

/// Category rollup used for the categorical summary sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub risk_tier: RiskTier,
    pub record_count: usize,
    /// Ascending by period
    pub period_totals: Vec<PeriodTotal>,
    pub total: f64,
}

/// Kind of a row-level normalization failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowErrorKind {
    /// Required field missing after alias resolution, or blank
    #[serde(rename = "SchemaError")]
    Schema,
    /// Field present but its value is malformed
    #[serde(rename = "ValueError")]
    Value,
}

impl RowErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "SchemaError",
            Self::Value => "ValueError",
        }
    }
}

impl std::fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source row that could not be normalized
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
    pub reason: String,
}

impl RowError {
    pub fn schema(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            kind: RowErrorKind::Schema,
            reason: reason.into(),
        }
    }

    pub fn value(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            kind: RowErrorKind::Value,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}: {}", self.row, self.kind, self.reason)
    }
}

/// Result of normalizing a batch of raw rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub records: Vec<ExpenseRecord>,
    pub errors: Vec<RowError>,
}
