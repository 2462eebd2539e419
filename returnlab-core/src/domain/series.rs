//! TickerSeries — one ticker's canonicalized price history.

use super::price::{PriceField, PricePoint};
use super::Ticker;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Set of dates present in a series. Only used for intersection.
pub type DateSet = BTreeSet<NaiveDate>;

/// Price history for one ticker, sorted by date ascending.
///
/// Rows without a usable close are dropped on construction. Sorting is
/// stable and duplicate dates are kept: the aligner is responsible for
/// detecting and repairing them.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSeries {
    ticker: Ticker,
    points: Vec<PricePoint>,
}

impl TickerSeries {
    /// Canonicalize raw rows: drop missing closes, then stable-sort by date.
    pub fn new(ticker: impl Into<Ticker>, points: Vec<PricePoint>) -> Self {
        let ticker = ticker.into();
        let raw_len = points.len();
        let mut points: Vec<PricePoint> = points.into_iter().filter(|p| p.has_close()).collect();
        if points.len() < raw_len {
            tracing::warn!(
                ticker = %ticker,
                dropped = raw_len - points.len(),
                "dropped rows with missing close"
            );
        }
        points.sort_by_key(|p| p.date);
        Self { ticker, points }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dates present in this series.
    pub fn dates(&self) -> DateSet {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Dates on which `field` holds a usable price.
    pub fn dates_for(&self, field: PriceField) -> DateSet {
        self.points
            .iter()
            .filter(|p| p.has_value(field))
            .map(|p| p.date)
            .collect()
    }

    /// Rows on which `field` holds a usable price.
    pub fn usable_for(&self, field: PriceField) -> TickerSeries {
        let points = self
            .points
            .iter()
            .filter(|p| p.has_value(field))
            .cloned()
            .collect();
        Self::from_canonical(self.ticker.clone(), points)
    }

    /// Values of one price field, in row order.
    pub fn values(&self, field: PriceField) -> Vec<f64> {
        self.points.iter().map(|p| p.value(field)).collect()
    }

    /// First row on `date`, if any.
    pub fn value_on(&self, date: NaiveDate, field: PriceField) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.date == date)
            .map(|p| p.value(field))
    }

    /// True if two or more rows share a date.
    pub fn has_duplicate_dates(&self) -> bool {
        self.points.windows(2).any(|w| w[0].date == w[1].date)
    }

    /// Build a series from rows that are already canonical (used by the aligner).
    pub(crate) fn from_canonical(ticker: Ticker, points: Vec<PricePoint>) -> Self {
        Self { ticker, points }
    }
}
