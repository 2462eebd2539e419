//! Wide tables produced by the aligner and the summarizer.
//!
//! All tables are column-major: a date axis (where one exists) plus named
//! numeric columns, one per ticker. NaN marks a missing value.

use crate::domain::{PriceField, Ticker};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Errors raised when building a table from externally supplied data.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("missing '{0}' column")]
    MissingDateColumn(&'static str),

    #[error("invalid value in column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("polars error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

/// Name of the leading date column in every exported wide table.
pub const DATE_COLUMN: &str = "date";

/// A named numeric column belonging to one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColumn {
    pub name: String,
    pub ticker: Ticker,
    pub values: Vec<f64>,
}

impl NamedColumn {
    /// Price column named `{ticker}_{field}`.
    pub fn price(ticker: &str, field: PriceField, values: Vec<f64>) -> Self {
        Self {
            name: format!("{ticker}_{field}"),
            ticker: ticker.to_string(),
            values,
        }
    }

    /// Column from an external header such as `AMZN_adjclose`.
    ///
    /// The ticker is everything before the last underscore; a header without
    /// an underscore is taken as the ticker itself.
    pub fn from_header(header: &str, values: Vec<f64>) -> Self {
        Self {
            name: header.to_string(),
            ticker: ticker_from_header(header).to_string(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ticker part of a `{ticker}_{field}` header.
pub fn ticker_from_header(header: &str) -> &str {
    match header.rsplit_once('_') {
        Some((ticker, _)) if !ticker.is_empty() => ticker,
        _ => header,
    }
}

// ─── AlignedTable ───────────────────────────────────────────────────

/// Prices for several tickers on a shared date axis.
///
/// Every column has exactly one value per date. Produced by the aligner, or
/// built from an externally supplied wide price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAlignedTable")]
pub struct AlignedTable {
    dates: Vec<NaiveDate>,
    columns: Vec<NamedColumn>,
    /// Tickers whose column went through the merge repair path.
    repaired: Vec<Ticker>,
}

/// Unchecked wire form of [`AlignedTable`]; deserialization goes through `new`.
#[derive(Deserialize)]
struct RawAlignedTable {
    dates: Vec<NaiveDate>,
    columns: Vec<NamedColumn>,
    #[serde(default)]
    repaired: Vec<Ticker>,
}

impl TryFrom<RawAlignedTable> for AlignedTable {
    type Error = TableError;

    fn try_from(raw: RawAlignedTable) -> Result<Self, Self::Error> {
        let mut table = AlignedTable::new(raw.dates, raw.columns)?;
        table.repaired = raw.repaired;
        Ok(table)
    }
}

impl AlignedTable {
    /// Build a table, checking that every column matches the date axis.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<NamedColumn>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != dates.len() {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: dates.len(),
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            dates,
            columns,
            repaired: Vec::new(),
        })
    }

    /// Assemble a table whose shape the caller has already checked.
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        columns: Vec<NamedColumn>,
        repaired: Vec<Ticker>,
    ) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == dates.len()));
        Self {
            dates,
            columns,
            repaired,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&NamedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.ticker.as_str()).collect()
    }

    /// Number of rows (dates).
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Number of value columns (excluding the date column).
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Value of column `name` on `date`.
    pub fn value(&self, name: &str, date: NaiveDate) -> Option<f64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        self.column(name).map(|c| c.values[row])
    }

    /// Tickers whose column had to be rebuilt by the merge repair path.
    pub fn repaired(&self) -> &[Ticker] {
        &self.repaired
    }
}

// ─── ReturnsTable ───────────────────────────────────────────────────

/// Period-over-period simple returns, one column per ticker.
///
/// Has one row fewer than the price table it came from; `dates()[i]` is the
/// end date of period `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<NamedColumn>,
}

impl ReturnsTable {
    pub fn column(&self, name: &str) -> Option<&NamedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn height(&self) -> usize {
        self.dates.len()
    }
}

// ─── DeviationTable ─────────────────────────────────────────────────

/// `r - E(r)` or `(r - E(r))^2` per defined return.
///
/// Undefined returns are skipped, so columns may differ in length. Entries
/// are aligned positionally within a column only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationTable {
    pub columns: Vec<NamedColumn>,
}

impl DeviationTable {
    pub fn column(&self, name: &str) -> Option<&NamedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Length of the longest column.
    pub fn max_len(&self) -> usize {
        self.columns.iter().map(NamedColumn::len).max().unwrap_or(0)
    }
}

// ─── SummaryTable ───────────────────────────────────────────────────

/// Summary statistic rows, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    MeanReturns,
    AnnualReturns,
    StandardDeviation,
    Variance,
    AnnualStd,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::MeanReturns,
        Statistic::AnnualReturns,
        Statistic::StandardDeviation,
        Statistic::Variance,
        Statistic::AnnualStd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::MeanReturns => "mean_returns",
            Statistic::AnnualReturns => "annual_returns",
            Statistic::StandardDeviation => "standard_deviation",
            Statistic::Variance => "variance",
            Statistic::AnnualStd => "annual_std",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per statistic, one column per ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub tickers: Vec<Ticker>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub statistic: Statistic,
    pub values: Vec<f64>,
}

impl SummaryTable {
    pub fn row(&self, statistic: Statistic) -> Option<&[f64]> {
        self.rows
            .iter()
            .find(|r| r.statistic == statistic)
            .map(|r| r.values.as_slice())
    }

    /// Value of `statistic` for `ticker`.
    pub fn get(&self, statistic: Statistic, ticker: &str) -> Option<f64> {
        let idx = self.tickers.iter().position(|t| t == ticker)?;
        self.row(statistic)
            .and_then(|values| values.get(idx).copied())
    }
}
