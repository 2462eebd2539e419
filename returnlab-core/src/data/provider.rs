//! Price source trait, sampling interval and structured data errors.
//!
//! The PriceSource trait abstracts over market-data providers so the aligner
//! never knows where rows came from. Retry and timeout policy belong to the
//! implementation, not to this crate.

use crate::domain::PricePoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to fetch price history for '{ticker}': {reason}")]
    SourceFetch { ticker: String, reason: String },

    #[error("invalid interval '{interval}' (expected one of 1d, 1wk, 1mo, 1m)")]
    InvalidInterval { interval: String },
}

/// Sampling interval understood by price sources.
///
/// Minute data is usually limited to short ranges by the upstream source;
/// that limit is not enforced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Minute,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::Daily,
        Interval::Weekly,
        Interval::Monthly,
        Interval::Minute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
            Interval::Minute => "1m",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| DataError::InvalidInterval {
                interval: s.to_string(),
            })
    }
}

impl TryFrom<String> for Interval {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.as_str().to_string()
    }
}

/// Trait for market-data sources.
///
/// Implementations must be safe to call from several threads at once: the
/// runner fans fetches out across tickers.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch rows for a ticker over a date range. Bounds are passed through as given.
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, DataError>;
}
