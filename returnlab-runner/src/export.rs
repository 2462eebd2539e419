//! CSV and JSON export of pipeline tables, plus CSV import of a wide price table.
//!
//! Every wide table is written date-first, one column per ticker. Missing
//! values (NaN) are written as empty cells and read back as NaN. Nothing here
//! looks at the working directory: callers pass writers, readers or explicit
//! paths.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use returnlab_core::table::{TableError, DATE_COLUMN};
use returnlab_core::{
    AlignedTable, DeviationTable, NamedColumn, ReturnsSummarizer, ReturnsTable, SummaryTable,
};
use serde_json::{json, Map, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn write_dated(dates: &[NaiveDate], columns: &[NamedColumn]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(columns.iter().map(|c| c.name.clone()));
    wtr.write_record(&header)?;

    for (row, date) in dates.iter().enumerate() {
        let mut record = vec![date.format(DATE_FORMAT).to_string()];
        record.extend(columns.iter().map(|c| cell(c.values[row])));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Aligned price table as CSV: `date,<ticker>_<field>,...`.
pub fn aligned_csv(table: &AlignedTable) -> Result<String> {
    write_dated(table.dates(), table.columns())
}

/// Returns table as CSV: `date,r_<ticker>_<field>,...`.
pub fn returns_csv(table: &ReturnsTable) -> Result<String> {
    write_dated(&table.dates, &table.columns)
}

/// Summary as CSV: one row per statistic, one column per ticker.
pub fn summary_csv(summary: &SummaryTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["statistic".to_string()];
    header.extend(summary.tickers.iter().cloned());
    wtr.write_record(&header)?;

    for row in &summary.rows {
        let mut record = vec![row.statistic.to_string()];
        record.extend(row.values.iter().map(|&v| cell(v)));
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

/// Deviation table as CSV. Shorter columns are padded with empty cells.
pub fn deviations_csv(table: &DeviationTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(table.columns.iter().map(|c| c.name.as_str()))?;

    for row in 0..table.max_len() {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|c| c.values.get(row).map_or_else(String::new, |&v| cell(v)))
            .collect();
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

// ─── JSON export ────────────────────────────────────────────────────

/// Summary as pretty JSON keyed by statistic, then ticker. NaN becomes `null`.
pub fn summary_json(summarizer: &ReturnsSummarizer) -> Result<String> {
    let summary = summarizer.summary();

    let mut statistics = Map::new();
    for row in &summary.rows {
        let per_ticker: Map<String, Value> = summary
            .tickers
            .iter()
            .zip(&row.values)
            .map(|(ticker, &v)| (ticker.clone(), json!(v.is_finite().then_some(v))))
            .collect();
        statistics.insert(row.statistic.to_string(), Value::Object(per_ticker));
    }

    let prices = summarizer.prices();
    let doc = json!({
        "tickers": summary.tickers,
        "periods_per_year": summarizer.periods_per_year(),
        "rows": prices.height(),
        "first_date": prices.dates().first().map(|d| d.format(DATE_FORMAT).to_string()),
        "last_date": prices.dates().last().map(|d| d.format(DATE_FORMAT).to_string()),
        "repaired": prices.repaired(),
        "statistics": statistics,
    });

    serde_json::to_string_pretty(&doc).context("failed to serialize summary to JSON")
}

// ─── Report directory ───────────────────────────────────────────────

/// Write every table of a run into `output_dir`, creating it if needed.
///
/// Files: `prices.csv`, `returns.csv`, `summary.csv`, `deviations.csv`,
/// `squared_deviations.csv`, `summary.json`. Returns the written paths.
pub fn save_report(summarizer: &ReturnsSummarizer, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let artifacts = [
        ("prices.csv", aligned_csv(summarizer.prices())?),
        ("returns.csv", returns_csv(summarizer.returns())?),
        ("summary.csv", summary_csv(summarizer.summary())?),
        ("deviations.csv", deviations_csv(summarizer.deviations())?),
        (
            "squared_deviations.csv",
            deviations_csv(summarizer.squared_deviations())?,
        ),
        ("summary.json", summary_json(summarizer)?),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = output_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    tracing::info!("wrote {} report files to {}", written.len(), output_dir.display());
    Ok(written)
}

// ─── CSV import ─────────────────────────────────────────────────────

fn parse_value(column: &str, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|e| {
        TableError::InvalidValue {
            column: column.to_string(),
            reason: format!("'{raw}': {e}"),
        }
        .into()
    })
}

/// Read a wide price table (`date,<ticker>_<field>,...`) from CSV.
///
/// The first column must be `date` (`YYYY-MM-DD`). Empty cells become NaN.
pub fn import_price_table_csv<R: Read>(reader: R) -> Result<AlignedTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().context("failed to read CSV header")?.clone();

    match headers.get(0) {
        Some(first) if first.trim().eq_ignore_ascii_case(DATE_COLUMN) => {}
        _ => return Err(TableError::MissingDateColumn(DATE_COLUMN).into()),
    }
    let names: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    if names.is_empty() {
        bail!("price table has no value columns");
    }

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV row {}", line + 1))?;
        let raw_date = record.get(0).unwrap_or_default().trim();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .with_context(|| format!("invalid date '{raw_date}' on row {}", line + 1))?;
        dates.push(date);

        for (i, name) in names.iter().enumerate() {
            values[i].push(parse_value(name, record.get(i + 1).unwrap_or_default())?);
        }
    }

    let columns = names
        .iter()
        .zip(values)
        .map(|(name, v)| NamedColumn::from_header(name, v))
        .collect();

    let table = AlignedTable::new(dates, columns)?;
    tracing::debug!(
        "imported price table: {} rows x {} columns",
        table.height(),
        table.width()
    );
    Ok(table)
}

/// Read a wide price table from a CSV file.
pub fn import_price_table_path(path: &Path) -> Result<AlignedTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    import_price_table_csv(file).with_context(|| format!("failed to import {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use returnlab_core::{PriceField, Statistic};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_table() -> AlignedTable {
        AlignedTable::new(
            vec![d(2), d(3), d(4)],
            vec![
                NamedColumn::price("A", PriceField::Close, vec![100.0, 110.0, 121.0]),
                NamedColumn::price("B", PriceField::Close, vec![50.0, f64::NAN, 55.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn aligned_csv_writes_header_and_empty_cells() {
        let csv = aligned_csv(&sample_table()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,A_close,B_close");
        assert_eq!(lines[1], "2024-01-02,100,50");
        assert_eq!(lines[2], "2024-01-03,110,");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn aligned_csv_reimports_identically() {
        let table = sample_table();
        let csv = aligned_csv(&table).unwrap();
        let back = import_price_table_csv(csv.as_bytes()).unwrap();

        assert_eq!(back.dates(), table.dates());
        assert_eq!(back.column_names(), table.column_names());
        assert_eq!(back.tickers(), vec!["A", "B"]);
        assert!(back.column("B_close").unwrap().values[1].is_nan());
        assert_eq!(back.value("A_close", d(4)), Some(121.0));
    }

    #[test]
    fn summary_csv_has_row_per_statistic() {
        let summarizer = ReturnsSummarizer::new(sample_table());
        let csv = summary_csv(summarizer.summary()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "statistic,A,B");
        assert_eq!(lines.len(), 1 + Statistic::ALL.len());
        assert!(lines[1].starts_with("mean_returns,"));
    }

    #[test]
    fn deviations_csv_pads_short_columns() {
        let summarizer = ReturnsSummarizer::new(sample_table());
        let csv = deviations_csv(summarizer.deviations()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "r_minus_er_A,r_minus_er_B");
        // A has two defined returns; B has none (both touch the NaN).
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(','));
    }

    #[test]
    fn summary_json_maps_nan_to_null() {
        let summarizer = ReturnsSummarizer::new(sample_table());
        let json: Value = serde_json::from_str(&summary_json(&summarizer).unwrap()).unwrap();

        assert_eq!(json["periods_per_year"], 250);
        assert_eq!(json["rows"], 3);
        assert_eq!(json["first_date"], "2024-01-02");
        let mean_a = json["statistics"]["mean_returns"]["A"].as_f64().unwrap();
        assert!((mean_a - 0.10).abs() < 1e-12);
        assert!(json["statistics"]["mean_returns"]["B"].is_null());
    }

    #[test]
    fn import_rejects_missing_date_column() {
        let err = import_price_table_csv("ticker,A_close\nx,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing 'date' column"));
    }

    #[test]
    fn import_rejects_bad_number() {
        let err = import_price_table_csv("date,A_close\n2024-01-02,abc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("A_close"));
    }

    #[test]
    fn import_rejects_bad_date() {
        let err = import_price_table_csv("date,A_close\n01/02/2024,1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("01/02/2024"));
    }
}
