//! returnlab core — price series, date alignment and return statistics.
//!
//! This crate contains the algorithmic part of the pipeline:
//! - Domain types (price points, per-ticker series, price fields)
//! - The `PriceSource` trait and sampling-interval validation
//! - The aligner: exact-date intersection and positional merge with a
//!   checked repair path for series that do not line up
//! - The returns summarizer: simple returns, deviations and annualized
//!   summary statistics, each cached on first use
//! - Polars interop for wide price tables
//!
//! The crate performs no network or file I/O.

pub mod data;
pub mod domain;
pub mod frame;
pub mod stats;
pub mod table;

pub use data::{AlignError, DataError, Interval, PriceSource};
pub use domain::{DateSet, PriceField, PricePoint, Ticker, TickerSeries};
pub use stats::ReturnsSummarizer;
pub use table::{
    AlignedTable, DeviationTable, NamedColumn, ReturnsTable, Statistic, SummaryTable, TableError,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PricePoint>();
        require_sync::<PricePoint>();
        require_send::<TickerSeries>();
        require_sync::<TickerSeries>();
        require_send::<AlignedTable>();
        require_sync::<AlignedTable>();
        require_send::<ReturnsSummarizer>();
        require_sync::<ReturnsSummarizer>();
        require_send::<SummaryTable>();
        require_sync::<SummaryTable>();
        require_send::<data::SyntheticSource>();
        require_sync::<data::SyntheticSource>();
        require_send::<DataError>();
        require_sync::<DataError>();
        require_send::<AlignError>();
        require_sync::<AlignError>();
    }
}
