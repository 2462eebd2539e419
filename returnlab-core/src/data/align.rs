//! Multi-ticker date alignment.
//!
//! Given price series for several tickers, keep only the dates every ticker
//! traded on and merge one price field per ticker into a wide table.
//! Alignment is an exact-date intersection: no forward-fill, no void rows.
//!
//! Columns are concatenated by row position, which is only sound when each
//! restricted series lines up one-to-one with the date axis. Every column is
//! checked against the axis before concatenation; a column that does not line
//! up goes through [`repair_column`] and is checked again. A column that still
//! does not line up is an [`AlignError::Alignment`].

use crate::domain::{DateSet, PriceField, Ticker, TickerSeries};
use crate::table::{AlignedTable, NamedColumn};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from date alignment. None of these are retried.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("no common trading day across the requested tickers")]
    EmptyIntersection,

    #[error(
        "ticker '{ticker}' does not line up with the common dates after repair: \
         expected {expected} rows, got {actual}"
    )]
    Alignment {
        ticker: String,
        expected: usize,
        actual: usize,
    },
}

/// Dates present in every input set, sorted ascending.
///
/// An empty input list has no common dates.
pub fn intersect_dates(date_sets: &[DateSet]) -> Result<Vec<NaiveDate>, AlignError> {
    let (first, rest) = date_sets
        .split_first()
        .ok_or(AlignError::EmptyIntersection)?;

    // BTreeSet iterates in ascending order, so the result is already sorted.
    let common: Vec<NaiveDate> = first
        .iter()
        .filter(|date| rest.iter().all(|set| set.contains(date)))
        .copied()
        .collect();

    if common.is_empty() {
        return Err(AlignError::EmptyIntersection);
    }
    Ok(common)
}

/// Keep only rows whose date is in `dates`. Row order is preserved.
pub fn restrict_to_dates(series: &TickerSeries, dates: &DateSet) -> TickerSeries {
    let points = series
        .points()
        .iter()
        .filter(|p| dates.contains(&p.date))
        .cloned()
        .collect();
    TickerSeries::from_canonical(series.ticker().to_string(), points)
}

/// Merge per-ticker series onto `dates` (ascending, no duplicates).
///
/// Each ticker contributes one column named `{ticker}_{field}`, in map order.
/// Rows where `field` is missing never contribute a value, so a date on which
/// a ticker has no usable price fails that ticker's line-up check. The output
/// always has exactly `dates.len()` rows.
pub fn merge_on_common_dates(
    series: &BTreeMap<Ticker, TickerSeries>,
    dates: &[NaiveDate],
    field: PriceField,
) -> Result<AlignedTable, AlignError> {
    let date_set: DateSet = dates.iter().copied().collect();
    let expected = dates.len();

    let mut columns = Vec::with_capacity(series.len());
    let mut repaired = Vec::new();

    for (ticker, ticker_series) in series {
        let restricted = restrict_to_dates(&ticker_series.usable_for(field), &date_set);

        let values = if lines_up(&restricted, dates) {
            restricted.values(field)
        } else {
            tracing::warn!(
                ticker = %ticker,
                expected,
                actual = restricted.len(),
                "restricted series does not line up with common dates, repairing"
            );
            let (repaired_dates, values) = repair_column(&restricted, field);
            if repaired_dates != dates {
                return Err(AlignError::Alignment {
                    ticker: ticker.clone(),
                    expected,
                    actual: values.len(),
                });
            }
            repaired.push(ticker.clone());
            values
        };

        columns.push(NamedColumn::price(ticker, field, values));
    }

    tracing::debug!(
        rows = expected,
        tickers = columns.len(),
        repaired = repaired.len(),
        "merged series on common dates"
    );

    Ok(AlignedTable::from_parts(dates.to_vec(), columns, repaired))
}

/// Intersect the dates on which every series has a usable `field` and merge
/// them in one step.
pub fn align_series(
    series: &BTreeMap<Ticker, TickerSeries>,
    field: PriceField,
) -> Result<AlignedTable, AlignError> {
    let date_sets: Vec<DateSet> = series.values().map(|s| s.dates_for(field)).collect();
    let dates = intersect_dates(&date_sets)?;
    merge_on_common_dates(series, &dates, field)
}

/// True if the series has exactly one row per date, in axis order.
fn lines_up(restricted: &TickerSeries, dates: &[NaiveDate]) -> bool {
    restricted.len() == dates.len()
        && restricted
            .points()
            .iter()
            .zip(dates)
            .all(|(p, d)| p.date == *d)
}

/// Rebuild a column as a raw value array, one entry per distinct date.
///
/// Walks the (date-sorted) restricted rows in order and keeps the first row
/// of each run of identical dates. Returns the dates kept alongside the
/// values so the caller can re-validate against the axis.
pub fn repair_column(restricted: &TickerSeries, field: PriceField) -> (Vec<NaiveDate>, Vec<f64>) {
    let mut dates = Vec::with_capacity(restricted.len());
    let mut values = Vec::with_capacity(restricted.len());
    for point in restricted.points() {
        if dates.last() == Some(&point.date) {
            continue;
        }
        dates.push(point.date);
        values.push(point.value(field));
    }
    (dates, values)
}
