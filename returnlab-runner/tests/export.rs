//! Report writing and CSV import through the filesystem.

use chrono::NaiveDate;
use returnlab_core::data::SyntheticSource;
use returnlab_core::Statistic;
use returnlab_runner::{
    aligned_csv, import_price_table_path, run_pipeline, save_report, summarize_table, NoProgress,
    PipelineConfig,
};

fn config() -> PipelineConfig {
    PipelineConfig::new(
        &["SPY", "QQQ"],
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    )
}

#[test]
fn save_report_writes_every_artifact() {
    let run = run_pipeline(&SyntheticSource::new(), &config(), &NoProgress).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report");

    let written = save_report(&run.summarizer, &out).unwrap();
    assert_eq!(written.len(), 6);
    for path in &written {
        assert!(path.exists(), "missing {}", path.display());
    }

    let summary = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("statistic,QQQ,SPY"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(json["tickers"], serde_json::json!(["QQQ", "SPY"]));
    assert!(json["statistics"]["annual_std"]["SPY"].is_f64());
}

#[test]
fn exported_prices_summarize_identically_after_import() {
    let run = run_pipeline(&SyntheticSource::new(), &config(), &NoProgress).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    std::fs::write(&path, aligned_csv(run.aligned()).unwrap()).unwrap();

    let imported = import_price_table_path(&path).unwrap();
    assert_eq!(imported.dates(), run.aligned().dates());
    assert_eq!(imported.tickers(), run.aligned().tickers());

    // Shortest round-trip float formatting keeps values bit-identical.
    let reimported = summarize_table(imported, 250);
    for stat in Statistic::ALL {
        assert_eq!(
            reimported.statistic(stat),
            run.summarizer.statistic(stat),
            "{stat} differs"
        );
    }
}

#[test]
fn import_of_missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = import_price_table_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}
