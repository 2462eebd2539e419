//! End-to-end pipeline: fetch → align → summarize.
//!
//! Entry points:
//! - `run_pipeline`: fetch from a price source using a config
//! - `summarize_table`: summarize an externally supplied wide price table

use returnlab_core::data::align_series;
use returnlab_core::{
    AlignError, AlignedTable, DataError, PriceSource, ReturnsSummarizer, Ticker, TickerSeries,
};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::{ConfigError, PipelineConfig};
use crate::data_loader::{compute_dataset_hash, fetch_all, FetchRequest};
use crate::progress::FetchProgress;

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("alignment error: {0}")]
    Align(#[from] AlignError),
}

/// Output of one pipeline run.
#[derive(Debug)]
pub struct PipelineRun {
    /// Canonicalized per-ticker series as fetched.
    pub series: BTreeMap<Ticker, TickerSeries>,
    /// BLAKE3 hash of the aligned table.
    pub dataset_hash: String,
    pub summarizer: ReturnsSummarizer,
}

impl PipelineRun {
    pub fn aligned(&self) -> &AlignedTable {
        self.summarizer.prices()
    }
}

/// Run the full pipeline for a config.
pub fn run_pipeline(
    source: &dyn PriceSource,
    config: &PipelineConfig,
    progress: &dyn FetchProgress,
) -> Result<PipelineRun, PipelineError> {
    config.validate()?;

    let request = FetchRequest {
        start: config.start_date,
        end: config.end_date,
        interval: config.interval,
    };
    let series = fetch_all(source, &config.tickers, request, progress)?;

    let aligned = align_series(&series, config.field)?;
    tracing::info!(
        "aligned {} tickers on {} common dates",
        aligned.width(),
        aligned.height()
    );

    let dataset_hash = compute_dataset_hash(&aligned);
    let summarizer = summarize_table(aligned, config.periods_per_year);

    Ok(PipelineRun {
        series,
        dataset_hash,
        summarizer,
    })
}

/// Wrap an already-aligned table for summarizing.
pub fn summarize_table(table: AlignedTable, periods_per_year: u32) -> ReturnsSummarizer {
    ReturnsSummarizer::new(table).with_periods_per_year(periods_per_year)
}
