//! PricePoint — one row of a ticker's price history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily (or weekly/monthly) OHLCV row as delivered by a price source.
///
/// Missing prices are NaN. Rows are immutable once fetched; the aligner
/// only ever filters them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// Row with every price set to `close` (handy for fixtures and synthetic data).
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: 0,
        }
    }

    /// True if the close can be used as a price (finite).
    pub fn has_close(&self) -> bool {
        self.close.is_finite()
    }

    /// True if the requested field can be used as a price (finite).
    pub fn has_value(&self, field: PriceField) -> bool {
        self.value(field).is_finite()
    }

    /// Value of the requested price field.
    pub fn value(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close,
        }
    }
}

/// Which price column feeds the aligned table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    #[default]
    Close,
    AdjClose,
}

impl PriceField {
    /// Suffix used in column names: `{ticker}_{field}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Close => "close",
            PriceField::AdjClose => "adjclose",
        }
    }

    /// Parse a column suffix back into a field.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "close" => Some(PriceField::Close),
            "adjclose" => Some(PriceField::AdjClose),
            _ => None,
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
