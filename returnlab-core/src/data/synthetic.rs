//! Deterministic synthetic price source for development and tests.
//!
//! Produces a random walk from a starting price of 100.0, seeded from the
//! ticker name, so the same ticker always yields the same history.

use super::provider::{DataError, Interval, PriceSource};
use crate::domain::PricePoint;
use chrono::{Datelike, Months, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

/// Random-walk price source with optional per-ticker holidays and failures.
#[derive(Debug, Default, Clone)]
pub struct SyntheticSource {
    holidays: HashMap<String, HashSet<NaiveDate>>,
    failing: HashSet<String>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip `dates` for `ticker`, giving it its own trading calendar.
    pub fn with_holidays(
        mut self,
        ticker: &str,
        dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        self.holidays
            .entry(ticker.to_string())
            .or_default()
            .extend(dates);
        self
    }

    /// Make every fetch for `ticker` fail.
    pub fn with_failure(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_string());
        self
    }

    fn calendar(start: NaiveDate, end: NaiveDate, interval: Interval) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = start;
        while current <= end {
            let weekday = current.weekday();
            if weekday == Weekday::Sat || weekday == Weekday::Sun {
                current += chrono::Duration::days(1);
                continue;
            }
            dates.push(current);
            current = match interval {
                Interval::Weekly => current + chrono::Duration::days(7),
                Interval::Monthly => match current.checked_add_months(Months::new(1)) {
                    Some(next) => next,
                    None => break,
                },
                Interval::Daily | Interval::Minute => current + chrono::Duration::days(1),
            };
        }
        dates
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, DataError> {
        if self.failing.contains(ticker) {
            return Err(DataError::SourceFetch {
                ticker: ticker.to_string(),
                reason: "synthetic failure".into(),
            });
        }
        if interval == Interval::Minute {
            return Err(DataError::SourceFetch {
                ticker: ticker.to_string(),
                reason: "synthetic source has no intraday data".into(),
            });
        }

        // Deterministic seed from ticker name
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);
        let holidays = self.holidays.get(ticker);

        let mut points = Vec::new();
        let mut price = 100.0_f64;

        for date in Self::calendar(start, end, interval) {
            // Advance the walk on holidays too, so a holiday does not shift
            // the prices of later dates.
            let period_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + period_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);
            price = close;

            if holidays.is_some_and(|h| h.contains(&date)) {
                continue;
            }

            points.push(PricePoint {
                date,
                open,
                high,
                low,
                close,
                adj_close: close,
                volume,
            });
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn same_ticker_same_history() {
        let src = SyntheticSource::new();
        let a = src.fetch("SPY", d(1, 1), d(1, 31), Interval::Daily).unwrap();
        let b = src.fetch("SPY", d(1, 1), d(1, 31), Interval::Daily).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_tickers_differ() {
        let src = SyntheticSource::new();
        let spy = src.fetch("SPY", d(1, 1), d(1, 31), Interval::Daily).unwrap();
        let qqq = src.fetch("QQQ", d(1, 1), d(1, 31), Interval::Daily).unwrap();
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }

    #[test]
    fn skips_weekends() {
        let src = SyntheticSource::new();
        let bars = src.fetch("SPY", d(1, 1), d(1, 31), Interval::Daily).unwrap();
        assert_eq!(bars.len(), 23);
        assert!(bars
            .iter()
            .all(|b| b.date.weekday() != Weekday::Sat && b.date.weekday() != Weekday::Sun));
    }

    #[test]
    fn holidays_are_skipped_without_shifting_prices() {
        let plain = SyntheticSource::new()
            .fetch("SPY", d(1, 1), d(1, 10), Interval::Daily)
            .unwrap();
        let with_holiday = SyntheticSource::new()
            .with_holidays("SPY", [d(1, 3)])
            .fetch("SPY", d(1, 1), d(1, 10), Interval::Daily)
            .unwrap();
        assert_eq!(with_holiday.len(), plain.len() - 1);
        let jan4 = |rows: &[PricePoint]| rows.iter().find(|p| p.date == d(1, 4)).unwrap().close;
        assert_eq!(jan4(&plain), jan4(&with_holiday));
    }

    #[test]
    fn weekly_interval_steps_seven_days() {
        let bars = SyntheticSource::new()
            .fetch("SPY", d(1, 1), d(1, 31), Interval::Weekly)
            .unwrap();
        assert_eq!(bars.len(), 5);
        assert!(bars.windows(2).all(|w| (w[1].date - w[0].date).num_days() == 7));
    }

    #[test]
    fn failure_names_ticker() {
        let err = SyntheticSource::new()
            .with_failure("BAD")
            .fetch("BAD", d(1, 1), d(1, 31), Interval::Daily)
            .unwrap_err();
        assert!(matches!(err, DataError::SourceFetch { ref ticker, .. } if ticker == "BAD"));
    }
}
