//! Threshold configuration for the audit engine
//!
//! A `ThresholdConfig` is an immutable value handed to every evaluation.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a layered resolution:
//! 1. An explicit path (`--config`), which must exist
//! 2. The user override in the data dir (~/.local/share/cedula/thresholds.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from a file keep their default value.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/thresholds.toml");

/// Thresholds and vocabularies for one evaluation run
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Category total at or above which a category is Critical
    pub critical_amount: f64,
    /// Category total at or above which a category is Moderate
    pub moderate_amount: f64,
    /// Record amount at or above which a record is flagged
    pub amount_cutoff: f64,
    /// Participation (percent) above which a record is flagged
    pub participation_cutoff_pct: f64,
    /// Repetitions within a period at or above which a record is flagged
    pub repetition_cutoff: usize,
    pub low_doc_terms: BTreeSet<String>,
    pub insurance_terms: BTreeSet<String>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            critical_amount: 6_000_000.0,
            moderate_amount: 1_000_000.0,
            amount_cutoff: 100_000.0,
            participation_cutoff_pct: 20.0,
            repetition_cutoff: 3,
            low_doc_terms: terms(&[
                "miscelaneo",
                "misceláneo",
                "miscellaneous",
                "varios",
                "sin factura",
                "sin recibo",
                "no receipt",
                "snack",
                "merienda",
                "propina",
            ]),
            insurance_terms: terms(&[
                "seguro",
                "aseguradora",
                "ars humano",
                "senasa",
                "mapfre",
                "ajuste",
                "adjustment",
                "reclasificacion",
                "reclasificación",
                "reclassification",
                "no cobrado",
                "uncollected",
            ]),
        }
    }
}

impl ThresholdConfig {
    /// Load configuration (explicit path, then user override, then embedded default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                debug!("Loading thresholds from {}", path.display());
                fs::read_to_string(path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(user_path) => {
                    debug!("Loading thresholds from {}", user_path.display());
                    fs::read_to_string(user_path)?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from TOML content. Does not validate.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(tiers) = raw.tiers {
            if let Some(v) = tiers.critical_amount {
                config.critical_amount = v;
            }
            if let Some(v) = tiers.moderate_amount {
                config.moderate_amount = v;
            }
        }

        if let Some(flags) = raw.flags {
            if let Some(v) = flags.amount_cutoff {
                config.amount_cutoff = v;
            }
            if let Some(v) = flags.participation_cutoff_pct {
                config.participation_cutoff_pct = v;
            }
            if let Some(v) = flags.repetition_cutoff {
                config.repetition_cutoff = v;
            }
        }

        if let Some(vocabulary) = raw.vocabulary {
            if let Some(v) = vocabulary.low_doc_terms {
                config.low_doc_terms = v.into_iter().collect();
            }
            if let Some(v) = vocabulary.insurance_terms {
                config.insurance_terms = v.into_iter().collect();
            }
        }

        Ok(config)
    }

    /// Render the effective configuration in the same layout it is read from
    pub fn to_toml_string(&self) -> Result<String> {
        let raw = RawConfig {
            tiers: Some(RawTiers {
                critical_amount: Some(self.critical_amount),
                moderate_amount: Some(self.moderate_amount),
            }),
            flags: Some(RawFlags {
                amount_cutoff: Some(self.amount_cutoff),
                participation_cutoff_pct: Some(self.participation_cutoff_pct),
                repetition_cutoff: Some(self.repetition_cutoff),
            }),
            vocabulary: Some(RawVocabulary {
                low_doc_terms: Some(self.low_doc_terms.iter().cloned().collect()),
                insurance_terms: Some(self.insurance_terms.iter().cloned().collect()),
            }),
        };
        toml::to_string_pretty(&raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject configurations that would make an audit run misleading
    pub fn validate(&self) -> Result<()> {
        let amounts = [
            ("critical_amount", self.critical_amount),
            ("moderate_amount", self.moderate_amount),
            ("amount_cutoff", self.amount_cutoff),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.moderate_amount >= self.critical_amount {
            return Err(Error::Config(format!(
                "moderate_amount ({}) must be below critical_amount ({})",
                self.moderate_amount, self.critical_amount
            )));
        }

        if !(0.0..=100.0).contains(&self.participation_cutoff_pct) {
            return Err(Error::Config(format!(
                "participation_cutoff_pct must be within 0..=100, got {}",
                self.participation_cutoff_pct
            )));
        }

        if self.repetition_cutoff == 0 {
            return Err(Error::Config(
                "repetition_cutoff must be at least 1".to_string(),
            ));
        }

        for (name, list) in [
            ("low_doc_terms", &self.low_doc_terms),
            ("insurance_terms", &self.insurance_terms),
        ] {
            if list.iter().any(|t| t.trim().is_empty()) {
                return Err(Error::Config(format!("{} contains a blank term", name)));
            }
        }

        Ok(())
    }
}

/// Default user override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cedula").join("thresholds.toml"))
}

fn terms(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    tiers: Option<RawTiers>,
    flags: Option<RawFlags>,
    vocabulary: Option<RawVocabulary>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawTiers {
    critical_amount: Option<f64>,
    moderate_amount: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawFlags {
    amount_cutoff: Option<f64>,
    participation_cutoff_pct: Option<f64>,
    repetition_cutoff: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawVocabulary {
    low_doc_terms: Option<Vec<String>>,
    insurance_terms: Option<Vec<String>>,
}
