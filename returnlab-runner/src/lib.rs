//! returnlab runner — configuration, parallel fetching, pipeline and export.
//!
//! This crate builds on `returnlab-core` to provide:
//! - TOML pipeline configuration with validation
//! - Fan-out/fan-in fetching across tickers on the rayon pool
//! - The fetch → align → summarize pipeline with a dataset hash
//! - CSV/JSON export and CSV import of wide price tables
//! - Tracing subscriber setup

pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod progress;
pub mod runner;

pub use config::{ConfigError, PipelineConfig};
pub use data_loader::{compute_dataset_hash, fetch_all, FetchRequest};
pub use export::{
    aligned_csv, deviations_csv, import_price_table_csv, import_price_table_path, returns_csv,
    save_report, summary_csv, summary_json,
};
pub use progress::{FetchProgress, NoProgress, TracingProgress};
pub use runner::{run_pipeline, summarize_table, PipelineError, PipelineRun};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn pipeline_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<PipelineRun>();
        assert_sync::<PipelineRun>();
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
        assert_send::<TracingProgress>();
        assert_sync::<TracingProgress>();
    }
}
