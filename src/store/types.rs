//! Column type inference for flat files.
//!
//! Files carry no schema, so each column's DuckDB type is picked from
//! the values it holds: the narrowest of BIGINT, DOUBLE and DATE that
//! accepts every non-empty cell, falling back to VARCHAR.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Plain decimal or scientific notation; excludes `NaN`/`inf` spellings
/// that `f64::from_str` would otherwise accept.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// DuckDB column types the loader can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Date,
    Varchar,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Double => write!(f, "DOUBLE"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Varchar => write!(f, "VARCHAR"),
        }
    }
}

/// Running inference state for one column
#[derive(Debug, Clone, Copy)]
pub struct TypeInference {
    int: bool,
    double: bool,
    date: bool,
    seen: bool,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self {
            int: true,
            double: true,
            date: true,
            seen: false,
        }
    }
}

impl TypeInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow the candidate types by one cell. Empty cells are NULL and
    /// don't constrain the type.
    pub fn observe(&mut self, cell: &str) {
        let cell = cell.trim();
        if cell.is_empty() {
            return;
        }
        self.seen = true;
        if self.int && cell.parse::<i64>().is_err() {
            self.int = false;
        }
        if self.double && !is_number(cell) {
            self.double = false;
        }
        if self.date && !is_iso_date(cell) {
            self.date = false;
        }
    }

    pub fn resolve(&self) -> ColumnType {
        if !self.seen {
            ColumnType::Varchar
        } else if self.int {
            ColumnType::BigInt
        } else if self.double {
            ColumnType::Double
        } else if self.date {
            ColumnType::Date
        } else {
            ColumnType::Varchar
        }
    }
}

/// Infer a column type from all of its cells
pub fn infer_column<'a, I>(cells: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut inference = TypeInference::new();
    for cell in cells {
        inference.observe(cell);
    }
    inference.resolve()
}

fn is_number(s: &str) -> bool {
    NUMBER_RE.is_match(s) && s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn is_iso_date(s: &str) -> bool {
    DATE_RE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
