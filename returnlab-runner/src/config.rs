//! Serializable pipeline configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! tickers = ["^N225", "M44U.SI", "^STI"]
//! start_date = "2012-12-04"
//! end_date = "2019-12-04"
//! interval = "1d"
//! field = "close"
//! periods_per_year = 250
//! ```

use chrono::NaiveDate;
use returnlab_core::stats::PERIODS_PER_YEAR;
use returnlab_core::{Interval, PriceField};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce one align + summarize run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Tickers to cross-reference. Output columns are sorted by ticker.
    pub tickers: Vec<String>,

    /// Start of the requested range, passed to the source as given.
    pub start_date: NaiveDate,

    /// End of the requested range, passed to the source as given.
    pub end_date: NaiveDate,

    #[serde(default)]
    pub interval: Interval,

    /// Price column used for every ticker.
    #[serde(default)]
    pub field: PriceField,

    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
}

fn default_periods_per_year() -> u32 {
    PERIODS_PER_YEAR
}

impl PipelineConfig {
    /// Daily close prices, 250 periods per year.
    pub fn new(tickers: &[&str], start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start_date,
            end_date,
            interval: Interval::default(),
            field: PriceField::default(),
            periods_per_year: PERIODS_PER_YEAR,
        }
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::Invalid("at least one ticker is required".into()));
        }
        let mut seen = HashSet::new();
        for ticker in &self.tickers {
            if ticker.trim().is_empty() {
                return Err(ConfigError::Invalid("ticker must not be blank".into()));
            }
            if !seen.insert(ticker.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate ticker '{ticker}'")));
            }
        }
        if self.start_date > self.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.periods_per_year == 0 {
            return Err(ConfigError::Invalid("periods_per_year must be positive".into()));
        }
        Ok(())
    }
}
