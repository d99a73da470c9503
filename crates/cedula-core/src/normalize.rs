//! Record normalizer: raw ledger rows to typed expense records
//!
//! Source workbooks name their columns inconsistently (`Categoria` /
//! `Categoría`, `Sucursal` / `Sucursales`, `Monto` / `Monto del Gasto`).
//! Columns are resolved through a fixed alias table, then each row is
//! validated on its own. Bad rows are reported, never fatal to the batch.

use std::io::Read;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{ExpenseRecord, Ledger, RowError};

/// Canonical expense fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Branch,
    Category,
    Description,
    Date,
    Amount,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Category => "category",
            Self::Description => "description",
            Self::Date => "date",
            Self::Amount => "amount",
        }
    }

    /// Resolve a column header to a canonical field
    pub fn resolve(column: &str) -> Option<Field> {
        let key = column.trim().to_lowercase();
        COLUMN_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, field)| *field)
    }
}

/// Column aliases seen across source workbooks (lower-cased)
const COLUMN_ALIASES: &[(&str, Field)] = &[
    ("branch", Field::Branch),
    ("sucursal", Field::Branch),
    ("sucursales", Field::Branch),
    ("category", Field::Category),
    ("categoria", Field::Category),
    ("categoría", Field::Category),
    ("description", Field::Description),
    ("descripcion", Field::Description),
    ("descripción", Field::Description),
    ("concepto", Field::Description),
    ("date", Field::Date),
    ("fecha", Field::Date),
    ("amount", Field::Amount),
    ("monto", Field::Amount),
    ("monto del gasto", Field::Amount),
];

/// A raw ledger row as supplied by ingestion: ordered (column, value) pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of the first column that resolves to `field`
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| Field::resolve(column) == Some(field))
            .map(|(_, value)| value.as_str())
    }
}

/// Normalize a batch of raw rows. Row `i` of the input becomes record id `i`.
pub fn normalize_rows(rows: &[RawRow]) -> Ledger {
    let mut ledger = Ledger::default();

    for (index, row) in rows.iter().enumerate() {
        match normalize_row(index, row) {
            Ok(record) => ledger.records.push(record),
            Err(e) => {
                warn!("Rejected {}", e);
                ledger.errors.push(e);
            }
        }
    }

    debug!(
        "Normalized {} records ({} rejected)",
        ledger.records.len(),
        ledger.errors.len()
    );
    ledger
}

/// Normalize one raw row
pub fn normalize_row(index: usize, row: &RawRow) -> std::result::Result<ExpenseRecord, RowError> {
    let required = |field: Field| {
        row.get(field).ok_or_else(|| {
            RowError::schema(index, format!("missing required field '{}'", field.as_str()))
        })
    };

    let branch = required(Field::Branch)?.trim();
    let category = required(Field::Category)?.trim();
    let description = required(Field::Description)?.trim();
    let date_str = required(Field::Date)?;
    let amount_str = required(Field::Amount)?;

    if branch.is_empty() {
        return Err(RowError::schema(index, "branch is blank"));
    }
    if category.is_empty() {
        return Err(RowError::schema(index, "category is blank"));
    }

    let date = parse_date(date_str)
        .ok_or_else(|| RowError::value(index, format!("unable to parse date: {}", date_str)))?;
    let amount = parse_amount(amount_str).ok_or_else(|| {
        RowError::value(index, format!("unable to parse amount: {}", amount_str))
    })?;
    if amount < 0.0 {
        return Err(RowError::value(
            index,
            format!("amount must not be negative: {}", amount_str),
        ));
    }

    Ok(ExpenseRecord::new(
        index,
        branch,
        category,
        description,
        date,
        amount,
    ))
}

/// Read a headered CSV ledger and normalize it.
///
/// An unreadable header fails the whole read; a malformed data line is
/// reported as a row error like any other bad row.
pub fn read_csv<R: Read>(reader: R) -> Result<Ledger> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut ledger = Ledger::default();

    for (index, result) in rdr.records().enumerate() {
        let outcome = match result {
            Ok(record) => normalize_row(index, &record_to_row(&headers, &record)),
            Err(e) => Err(RowError::value(index, format!("malformed CSV line: {}", e))),
        };
        match outcome {
            Ok(record) => ledger.records.push(record),
            Err(e) => {
                warn!("Rejected {}", e);
                ledger.errors.push(e);
            }
        }
    }

    debug!(
        "Read {} records from CSV ({} rejected)",
        ledger.records.len(),
        ledger.errors.len()
    );
    Ok(ledger)
}

fn record_to_row(headers: &StringRecord, record: &StringRecord) -> RawRow {
    RawRow::from_pairs(
        headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string())),
    )
}

/// Parse a date string. Day-first forms are tried before ISO forms.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    // `%Y` takes any number of digits, so "15/01/25" would read as year 25.
    // Four-digit-year forms must yield a year of at least 100 to count.
    let full_year = [
        "%d/%m/%Y", // 15/01/2025
        "%d-%m-%Y", // 15-01-2025
        "%Y-%m-%d", // 2025-01-15
        "%Y/%m/%d", // 2025/01/15
    ];
    for fmt in full_year {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if date.year() >= 100 {
                return Some(date);
            }
        }
    }

    let short_year = [
        "%d/%m/%y", // 15/01/25
        "%d-%m-%y", // 15-01-25
    ];
    for fmt in short_year {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Spreadsheet exports often carry a midnight time component
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Parse an amount string, handling currency markers and thousands separators.
/// Parenthesized values are negative.
pub fn parse_amount(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let upper = trimmed.to_uppercase();
    let without_currency = upper
        .strip_prefix("RD$")
        .or_else(|| upper.strip_prefix("US$"))
        .unwrap_or(&upper);

    let cleaned: String = without_currency
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
