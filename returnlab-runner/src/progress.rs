//! Fetch progress callbacks.
//!
//! Fetches run on the rayon pool, so callbacks may arrive from several
//! threads and out of index order.

use returnlab_core::DataError;

/// Observer for a multi-ticker fetch.
pub trait FetchProgress: Send + Sync {
    /// Called when a ticker fetch starts.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker fetch finishes, with the number of usable rows on success.
    fn on_complete(
        &self,
        ticker: &str,
        index: usize,
        total: usize,
        result: Result<usize, &DataError>,
    );

    /// Called once after every fetch has finished.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that logs through `tracing`.
pub struct TracingProgress;

impl FetchProgress for TracingProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] fetching {ticker}", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        index: usize,
        total: usize,
        result: Result<usize, &DataError>,
    ) {
        match result {
            Ok(rows) => tracing::info!("[{}/{}] {ticker}: {rows} rows", index + 1, total),
            Err(e) => tracing::warn!("[{}/{}] {ticker} failed: {e}", index + 1, total),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        if failed == 0 {
            tracing::info!("fetched {succeeded}/{total} tickers");
        } else {
            tracing::warn!("fetched {succeeded}/{total} tickers, {failed} failed");
        }
    }
}

/// Progress reporter that ignores every event.
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _ticker: &str,
        _index: usize,
        _total: usize,
        _result: Result<usize, &DataError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
