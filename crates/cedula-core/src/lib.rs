//! Cedula Core Library
//!
//! Expense audit work-paper engine for pharmacy retail ledgers:
//! - Record normalization with column alias resolution
//! - Participation of each expense in its branch's monthly spend
//! - Category risk tiers from aggregate spend
//! - Suspicious vocabulary and repeated-description ("ant spending") detection
//! - Review verdicts that keep the conditions which triggered them
//! - Ordered work paper with plain CSV/JSON renderings

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod participation;
pub mod patterns;
pub mod risk;
pub mod verdict;
pub mod workpaper;

pub use config::ThresholdConfig;
pub use engine::{evaluate, AuditEngine};
pub use error::{Error, Result};
pub use models::{
    CategorySummary, EvaluatedRecord, ExpenseRecord, FlagReason, Ledger, ParticipationNote,
    PeriodKey, PeriodTotal, ReviewVerdict, RiskTier, RowError, RowErrorKind, Vocabulary,
};
pub use normalize::{normalize_rows, read_csv, RawRow};
pub use risk::summarize_by_category;
pub use workpaper::{WorkPaper, WorkPaperStats};
