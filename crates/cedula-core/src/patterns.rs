//! Suspicious pattern matcher
//!
//! Gathers evidence only, never decides:
//! - Vocabulary hits: case-insensitive substring containment of configured
//!   terms in the description (no tokenization or stemming)
//! - Repetition: how many records in the same month share the exact
//!   normalized description ("gasto hormiga" / ant spending)

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::ThresholdConfig;
use crate::models::{ExpenseRecord, PeriodKey, Vocabulary};

/// Evidence gathered for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternEvidence {
    pub matched_vocabulary: BTreeSet<Vocabulary>,
    /// Configured terms found in the description, in vocabulary order
    pub matched_terms: Vec<String>,
    /// Records in the same period with the same normalized description,
    /// including this one
    pub repetition_count: usize,
}

/// Lower-case and trim a description (or a term) for comparison
pub fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Case-insensitive substring matcher over both vocabularies
#[derive(Debug, Clone)]
pub struct VocabularyMatcher {
    vocabularies: Vec<(Vocabulary, Vec<String>)>,
}

impl VocabularyMatcher {
    pub fn new(low_doc_terms: &BTreeSet<String>, insurance_terms: &BTreeSet<String>) -> Self {
        let normalize = |terms: &BTreeSet<String>| -> Vec<String> {
            let set: BTreeSet<String> = terms
                .iter()
                .map(|t| normalize_description(t))
                .filter(|t| !t.is_empty())
                .collect();
            set.into_iter().collect()
        };

        Self {
            vocabularies: vec![
                (Vocabulary::LowDocumentation, normalize(low_doc_terms)),
                (Vocabulary::InsuranceObfuscation, normalize(insurance_terms)),
            ],
        }
    }

    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self::new(&config.low_doc_terms, &config.insurance_terms)
    }

    /// Every (vocabulary, term) pair whose term occurs in the normalized description
    pub fn find_matches(&self, normalized: &str) -> Vec<(Vocabulary, &str)> {
        let mut matches = Vec::new();
        for (vocabulary, terms) in &self.vocabularies {
            for term in terms {
                if normalized.contains(term.as_str()) {
                    matches.push((*vocabulary, term.as_str()));
                }
            }
        }
        matches
    }
}

/// Repetition count for every record, keyed by record id
pub fn repetition_counts(records: &[ExpenseRecord]) -> HashMap<usize, usize> {
    let normalized: Vec<(PeriodKey, String)> = records
        .iter()
        .map(|r| (r.period_key(), normalize_description(&r.description)))
        .collect();

    let mut counts: HashMap<(PeriodKey, &str), usize> = HashMap::new();
    for (period, description) in &normalized {
        *counts.entry((*period, description.as_str())).or_insert(0) += 1;
    }

    records
        .iter()
        .zip(&normalized)
        .map(|(record, (period, description))| {
            let count = counts
                .get(&(*period, description.as_str()))
                .copied()
                .unwrap_or(1);
            (record.id, count)
        })
        .collect()
}

/// Scan every record for vocabulary hits and repetition, keyed by record id
pub fn scan_patterns(
    records: &[ExpenseRecord],
    config: &ThresholdConfig,
) -> HashMap<usize, PatternEvidence> {
    let matcher = VocabularyMatcher::from_config(config);
    let repetitions = repetition_counts(records);

    let evidence: HashMap<usize, PatternEvidence> = records
        .iter()
        .map(|record| {
            let normalized = normalize_description(&record.description);
            let matches = matcher.find_matches(&normalized);

            let evidence = PatternEvidence {
                matched_vocabulary: matches.iter().map(|(v, _)| *v).collect(),
                matched_terms: matches.iter().map(|(_, t)| t.to_string()).collect(),
                repetition_count: repetitions.get(&record.id).copied().unwrap_or(1),
            };
            (record.id, evidence)
        })
        .collect();

    debug!(
        "Pattern scan: {} records with vocabulary hits",
        evidence
            .values()
            .filter(|e| !e.matched_vocabulary.is_empty())
            .count()
    );

    evidence
}
