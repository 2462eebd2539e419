//! Parallel price fetching for the runner.
//!
//! Every ticker is fetched as an isolated unit on the rayon pool. Results are
//! only looked at once all fetches have returned; a single failure fails the
//! whole batch and no partial map is handed out.

use chrono::NaiveDate;
use rayon::prelude::*;
use returnlab_core::{AlignedTable, DataError, Interval, PriceSource, Ticker, TickerSeries};
use std::collections::BTreeMap;

use crate::progress::FetchProgress;

/// What to fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
}

/// Fetch every ticker in parallel and canonicalize the rows.
///
/// On failure the error names the ticker; when several fail, the first in
/// input order is reported.
pub fn fetch_all(
    source: &dyn PriceSource,
    tickers: &[String],
    request: FetchRequest,
    progress: &dyn FetchProgress,
) -> Result<BTreeMap<Ticker, TickerSeries>, DataError> {
    let total = tickers.len();
    tracing::debug!(
        "fetching {total} tickers from {} ({} to {}, {})",
        source.name(),
        request.start,
        request.end,
        request.interval
    );

    let results: Vec<Result<TickerSeries, DataError>> = tickers
        .par_iter()
        .enumerate()
        .map(|(index, ticker)| {
            progress.on_start(ticker, index, total);
            let result = fetch_one(source, ticker, request);
            progress.on_complete(ticker, index, total, result.as_ref().map(TickerSeries::len));
            result
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    progress.on_batch_complete(total - failed, failed, total);

    let mut series = BTreeMap::new();
    for result in results {
        let s = result?;
        series.insert(s.ticker().to_string(), s);
    }
    Ok(series)
}

fn fetch_one(
    source: &dyn PriceSource,
    ticker: &str,
    request: FetchRequest,
) -> Result<TickerSeries, DataError> {
    let rows = source
        .fetch(ticker, request.start, request.end, request.interval)
        .map_err(|e| match e {
            DataError::SourceFetch { .. } => e,
            other => DataError::SourceFetch {
                ticker: ticker.to_string(),
                reason: other.to_string(),
            },
        })?;

    let series = TickerSeries::new(ticker, rows);
    if series.is_empty() {
        return Err(DataError::SourceFetch {
            ticker: ticker.to_string(),
            reason: "no usable rows in range".into(),
        });
    }
    Ok(series)
}

/// Deterministic BLAKE3 hash over an aligned table.
///
/// Covers column names, dates and the raw bits of every value, so two runs
/// that produced the same table produce the same hash.
pub fn compute_dataset_hash(table: &AlignedTable) -> String {
    let mut hasher = blake3::Hasher::new();

    for column in table.columns() {
        hasher.update(column.name.as_bytes());
        hasher.update(&[0]);
    }
    for (row, date) in table.dates().iter().enumerate() {
        hasher.update(date.to_string().as_bytes());
        for column in table.columns() {
            hasher.update(&column.values[row].to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use returnlab_core::data::{align_series, SyntheticSource};
    use returnlab_core::PriceField;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn request() -> FetchRequest {
        FetchRequest {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            interval: Interval::Daily,
        }
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|t| t.to_string()).collect()
    }

    #[derive(Default)]
    struct Recorder {
        started: AtomicUsize,
        completed: AtomicUsize,
        batch: Mutex<Option<(usize, usize, usize)>>,
    }

    impl FetchProgress for Recorder {
        fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(
            &self,
            _ticker: &str,
            _index: usize,
            _total: usize,
            _result: Result<usize, &DataError>,
        ) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
            *self.batch.lock().unwrap() = Some((succeeded, failed, total));
        }
    }

    #[test]
    fn fetches_every_ticker() {
        let source = SyntheticSource::new();
        let series = fetch_all(&source, &tickers(&["SPY", "QQQ", "EWJ"]), request(), &NoProgress)
            .unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.values().all(|s| !s.is_empty()));
    }

    #[test]
    fn failure_names_the_ticker_and_reports_batch() {
        let source = SyntheticSource::new().with_failure("BAD");
        let recorder = Recorder::default();
        let err = fetch_all(&source, &tickers(&["SPY", "BAD", "QQQ"]), request(), &recorder)
            .unwrap_err();

        match err {
            DataError::SourceFetch { ticker, .. } => assert_eq!(ticker, "BAD"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(recorder.started.load(Ordering::SeqCst), 3);
        assert_eq!(recorder.completed.load(Ordering::SeqCst), 3);
        assert_eq!(*recorder.batch.lock().unwrap(), Some((2, 1, 3)));
    }

    #[test]
    fn empty_range_is_a_fetch_error() {
        // Saturday and Sunday only.
        let weekend = FetchRequest {
            start: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            interval: Interval::Daily,
        };
        let err = fetch_all(&SyntheticSource::new(), &tickers(&["SPY"]), weekend, &NoProgress)
            .unwrap_err();
        assert!(err.to_string().contains("'SPY'"));
    }

    #[test]
    fn unsupported_interval_is_wrapped_with_ticker() {
        let minute = FetchRequest {
            interval: Interval::Minute,
            ..request()
        };
        let err = fetch_all(&SyntheticSource::new(), &tickers(&["SPY"]), minute, &NoProgress)
            .unwrap_err();
        assert!(matches!(err, DataError::SourceFetch { ref ticker, .. } if ticker == "SPY"));
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let source = SyntheticSource::new();
        let names = tickers(&["SPY", "QQQ"]);
        let a = align_series(
            &fetch_all(&source, &names, request(), &NoProgress).unwrap(),
            PriceField::Close,
        )
        .unwrap();
        let b = align_series(
            &fetch_all(&source, &names, request(), &NoProgress).unwrap(),
            PriceField::Close,
        )
        .unwrap();

        let hash = compute_dataset_hash(&a);
        assert_eq!(hash, compute_dataset_hash(&b));
        assert_eq!(hash.len(), 64);

        let other = align_series(
            &fetch_all(&source, &tickers(&["SPY", "EWJ"]), request(), &NoProgress).unwrap(),
            PriceField::Close,
        )
        .unwrap();
        assert_ne!(hash, compute_dataset_hash(&other));
    }
}
