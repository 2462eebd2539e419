//! Polars interop for wide price tables.
//!
//! Frame layout: a `date` column of dtype `Date` followed by one `Float64`
//! column per ticker. Missing values are NaN in an `AlignedTable` and null in
//! a frame.

use crate::table::{AlignedTable, NamedColumn, TableError, DATE_COLUMN};
use chrono::{DateTime, Duration, NaiveDate};
use polars::prelude::*;

fn epoch() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

impl AlignedTable {
    /// Convert to a Polars frame (`date` + one Float64 column per ticker).
    pub fn to_dataframe(&self) -> Result<DataFrame, TableError> {
        let epoch = epoch();
        let days: Vec<i32> = self
            .dates()
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();
        let dates = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;

        let mut columns = Vec::with_capacity(self.width() + 1);
        columns.push(Column::from(dates));
        for column in self.columns() {
            let values: Vec<Option<f64>> = column
                .values
                .iter()
                .map(|v| v.is_finite().then_some(*v))
                .collect();
            columns.push(Column::new(column.name.as_str().into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Build a table from a wide price frame.
    ///
    /// Every column other than `date` is cast to Float64; nulls become NaN.
    /// Tickers are parsed from `{ticker}_{field}` headers.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, TableError> {
        let date_column = df
            .column(DATE_COLUMN)
            .map_err(|_| TableError::MissingDateColumn(DATE_COLUMN))?;
        let days = date_column.cast(&DataType::Int32)?;
        let epoch = epoch();
        let dates = days
            .i32()?
            .iter()
            .enumerate()
            .map(|(row, day)| {
                day.map(|day| epoch + Duration::days(i64::from(day)))
                    .ok_or_else(|| TableError::InvalidValue {
                        column: DATE_COLUMN.to_string(),
                        reason: format!("null date at row {row}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut columns = Vec::with_capacity(df.width().saturating_sub(1));
        for column in df.get_columns() {
            if column.name().as_str() == DATE_COLUMN {
                continue;
            }
            let floats = column.cast(&DataType::Float64)?;
            let values = floats
                .f64()?
                .iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            columns.push(NamedColumn::from_header(column.name().as_str(), values));
        }

        AlignedTable::new(dates, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceField;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample() -> AlignedTable {
        AlignedTable::new(
            vec![d(2), d(3), d(4)],
            vec![
                NamedColumn::price("SPY", PriceField::Close, vec![470.0, f64::NAN, 472.5]),
                NamedColumn::price("QQQ", PriceField::Close, vec![400.0, 401.0, 402.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn frame_has_date_and_value_columns() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        let spy = df.column("SPY_close").unwrap().f64().unwrap();
        assert_eq!(spy.get(0), Some(470.0));
        assert_eq!(spy.get(1), None);
    }

    #[test]
    fn frame_round_trip_restores_dates_and_values() {
        let original = sample();
        let back = AlignedTable::from_dataframe(&original.to_dataframe().unwrap()).unwrap();
        assert_eq!(back.dates(), original.dates());
        assert_eq!(back.tickers(), vec!["SPY", "QQQ"]);
        assert_eq!(back.value("QQQ_close", d(3)), Some(401.0));
        assert!(back.value("SPY_close", d(3)).unwrap().is_nan());
    }

    #[test]
    fn missing_date_column_is_rejected() {
        let df = DataFrame::new(vec![Column::new("SPY_close".into(), &[1.0, 2.0])]).unwrap();
        assert!(matches!(
            AlignedTable::from_dataframe(&df),
            Err(TableError::MissingDateColumn(_))
        ));
    }
}
