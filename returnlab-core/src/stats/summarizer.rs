//! ReturnsSummarizer — lazily derived return tables and summary statistics.
//!
//! Every derived table lives in its own `OnceLock` slot. Accessors fill the
//! slot on first use, pulling in whatever they depend on
//! (returns → mean → deviations → summary), and return the cached value on
//! every later call.

use super::returns::{self, PERIODS_PER_YEAR};
use crate::table::{
    AlignedTable, DeviationTable, NamedColumn, ReturnsTable, Statistic, SummaryRow, SummaryTable,
};
use std::sync::OnceLock;

/// Return statistics over one wide price table.
#[derive(Debug)]
pub struct ReturnsSummarizer {
    prices: AlignedTable,
    periods_per_year: u32,
    returns: OnceLock<ReturnsTable>,
    mean_returns: OnceLock<Vec<f64>>,
    annual_returns: OnceLock<Vec<f64>>,
    standard_deviation: OnceLock<Vec<f64>>,
    variance: OnceLock<Vec<f64>>,
    annual_std: OnceLock<Vec<f64>>,
    deviations: OnceLock<DeviationTable>,
    squared_deviations: OnceLock<DeviationTable>,
    summary: OnceLock<SummaryTable>,
}

impl ReturnsSummarizer {
    /// Summarize `prices`, annualizing over 250 periods per year.
    pub fn new(prices: AlignedTable) -> Self {
        Self {
            prices,
            periods_per_year: PERIODS_PER_YEAR,
            returns: OnceLock::new(),
            mean_returns: OnceLock::new(),
            annual_returns: OnceLock::new(),
            standard_deviation: OnceLock::new(),
            variance: OnceLock::new(),
            annual_std: OnceLock::new(),
            deviations: OnceLock::new(),
            squared_deviations: OnceLock::new(),
            summary: OnceLock::new(),
        }
    }

    /// Override the annualization factor (e.g. 52 for weekly data).
    ///
    /// Only meaningful before any annualized statistic has been computed.
    pub fn with_periods_per_year(mut self, periods_per_year: u32) -> Self {
        self.periods_per_year = periods_per_year;
        self.annual_returns = OnceLock::new();
        self.annual_std = OnceLock::new();
        self.summary = OnceLock::new();
        self
    }

    pub fn prices(&self) -> &AlignedTable {
        &self.prices
    }

    pub fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    pub fn tickers(&self) -> Vec<&str> {
        self.prices.tickers()
    }

    /// Simple returns per column, named `r_{column}`.
    pub fn returns(&self) -> &ReturnsTable {
        self.returns.get_or_init(|| {
            let dates = self.prices.dates().iter().skip(1).copied().collect();
            let columns = self
                .prices
                .columns()
                .iter()
                .map(|c| NamedColumn {
                    name: format!("r_{}", c.name),
                    ticker: c.ticker.clone(),
                    values: returns::simple_returns(&c.values),
                })
                .collect();
            ReturnsTable { dates, columns }
        })
    }

    /// Mean of the defined returns per ticker.
    pub fn mean_returns(&self) -> &[f64] {
        self.mean_returns
            .get_or_init(|| self.per_column(returns::mean_defined))
    }

    /// `(1 + mean)^periods_per_year - 1` per ticker.
    pub fn annual_returns(&self) -> &[f64] {
        self.annual_returns.get_or_init(|| {
            self.mean_returns()
                .iter()
                .map(|&mean| returns::annualize_return(mean, self.periods_per_year))
                .collect()
        })
    }

    /// Unbiased sample standard deviation of the defined returns per ticker.
    pub fn standard_deviation(&self) -> &[f64] {
        self.standard_deviation
            .get_or_init(|| self.per_column(returns::sample_std))
    }

    /// Square of [`standard_deviation`](Self::standard_deviation).
    pub fn variance(&self) -> &[f64] {
        self.variance
            .get_or_init(|| self.standard_deviation().iter().map(|s| s * s).collect())
    }

    /// `std * sqrt(periods_per_year)` per ticker.
    pub fn annual_std(&self) -> &[f64] {
        self.annual_std.get_or_init(|| {
            self.standard_deviation()
                .iter()
                .map(|&std| returns::annualize_std(std, self.periods_per_year))
                .collect()
        })
    }

    /// `r - E(r)` per defined return, columns named `r_minus_er_{ticker}`.
    pub fn deviations(&self) -> &DeviationTable {
        self.deviations
            .get_or_init(|| self.deviation_table("r_minus_er", returns::deviations))
    }

    /// `(r - E(r))^2` per defined return, columns named `r_minus_er2_{ticker}`.
    pub fn squared_deviations(&self) -> &DeviationTable {
        self.squared_deviations
            .get_or_init(|| self.deviation_table("r_minus_er2", returns::squared_deviations))
    }

    /// All five statistics, one row each.
    pub fn summary(&self) -> &SummaryTable {
        self.summary.get_or_init(|| {
            let rows = Statistic::ALL
                .into_iter()
                .map(|statistic| SummaryRow {
                    statistic,
                    values: self.statistic(statistic).to_vec(),
                })
                .collect();
            SummaryTable {
                tickers: self.tickers().into_iter().map(String::from).collect(),
                rows,
            }
        })
    }

    /// One summary row, computed on demand.
    pub fn statistic(&self, statistic: Statistic) -> &[f64] {
        match statistic {
            Statistic::MeanReturns => self.mean_returns(),
            Statistic::AnnualReturns => self.annual_returns(),
            Statistic::StandardDeviation => self.standard_deviation(),
            Statistic::Variance => self.variance(),
            Statistic::AnnualStd => self.annual_std(),
        }
    }

    fn per_column(&self, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
        self.returns()
            .columns
            .iter()
            .map(|c| f(&c.values))
            .collect()
    }

    fn deviation_table(&self, prefix: &str, f: fn(&[f64], f64) -> Vec<f64>) -> DeviationTable {
        let columns = self
            .returns()
            .columns
            .iter()
            .zip(self.mean_returns())
            .map(|(c, &mean)| NamedColumn {
                name: format!("{prefix}_{}", c.ticker),
                ticker: c.ticker.clone(),
                values: f(&c.values, mean),
            })
            .collect();
        DeviationTable { columns }
    }
}
