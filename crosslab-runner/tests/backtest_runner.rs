//! Integration tests for the runner: TOML config + CSV fixture end to end.

use chrono::{Duration, NaiveDate};
use std::io::Write;
use std::path::Path;

use crosslab_core::signal::PositionChange;
use crosslab_runner::{
    export_json, format_summary, run_from_config, series_csv, sweep, BacktestConfig,
    ConfigError, LoadError, ParamGrid, RunError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2025, 1, 1)
}

/// 40 rising closes, then 30 falling, one per calendar day from 2024-01-01.
fn rise_fall_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    closes.extend((0..30).map(|i| 138.0 - 2.0 * i as f64));
    closes
}

fn write_csv(closes: &[f64]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,Close,Volume").unwrap();
    let start = d(2024, 1, 1);
    for (i, c) in closes.iter().enumerate() {
        let date = start + Duration::days(i as i64);
        writeln!(file, "{date},0,{c},1000").unwrap();
    }
    file.flush().unwrap();
    file
}

fn config_toml(csv: &Path, short: usize, long: usize) -> String {
    format!(
        r#"[backtest]
symbol = "TEST"
start_date = "2024-01-01"
end_date = "2024-12-31"
initial_investment = 10000.0

[strategy]
short_window = {short}
long_window = {long}

[data]
source = "csv"
path = "{}"
"#,
        csv.display()
    )
}

fn write_config(toml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn config_file_to_result() {
    let csv = write_csv(&rise_fall_closes());
    let cfg_file = write_config(&config_toml(csv.path(), 3, 8));
    let config = BacktestConfig::from_file(cfg_file.path()).unwrap();

    let result = run_from_config(&config, today()).unwrap();

    assert_eq!(result.symbol, "TEST");
    assert_eq!(result.bar_count, 70);
    assert_eq!(result.start_date, d(2024, 1, 1));
    assert_eq!(result.trade_count, 1);
    let changes: Vec<PositionChange> = result.markers.iter().map(|m| m.change).collect();
    assert_eq!(changes, vec![PositionChange::Entry, PositionChange::Exit]);
    assert_eq!(result.markers[0].index, 7);

    let m = &result.backtest.metrics;
    assert_eq!(m.final_value, *result.backtest.portfolio.portfolio_value.last().unwrap());
    assert!((m.total_return - (m.final_value / 10_000.0 - 1.0)).abs() < 1e-12);
    assert!(m.max_drawdown < 0.0);
    // The crossover exits during the fall, so it beats holding.
    assert!(m.total_return > result.benchmark_return);
}

#[test]
fn end_date_is_exclusive() {
    let csv = write_csv(&rise_fall_closes());
    let mut config = BacktestConfig::from_toml(&config_toml(csv.path(), 3, 8)).unwrap();
    config.backtest.end_date = Some(d(2024, 2, 1));

    let result = run_from_config(&config, today()).unwrap();
    assert_eq!(result.bar_count, 31);
    assert_eq!(result.end_date, d(2024, 1, 31));
}

#[test]
fn gaps_and_duplicates_in_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "date,close").unwrap();
    let start = d(2024, 1, 1);
    for i in 0..20 {
        let date = start + Duration::days(i);
        match i {
            5 => writeln!(file, "{date},").unwrap(),
            9 => {
                writeln!(file, "{date},1.0").unwrap();
                writeln!(file, "{date},{}", 100 + i).unwrap();
            }
            _ => writeln!(file, "{date},{}", 100 + i).unwrap(),
        }
    }
    file.flush().unwrap();

    let config = BacktestConfig::from_toml(&config_toml(file.path(), 2, 3)).unwrap();
    let result = run_from_config(&config, today()).unwrap();

    assert_eq!(result.bar_count, 20);
    assert!(result.bars[5].close.is_nan());
    assert_eq!(result.bars[9].close, 109.0);
    assert!(result.backtest.portfolio.portfolio_value.iter().all(|v| v.is_finite()));
    assert!(!result.data_quality_warnings.is_empty());
}

#[test]
fn invalid_window_fails_before_loading() {
    // The CSV path does not exist; validation must fail first.
    let config = BacktestConfig::from_toml(&config_toml(Path::new("/nonexistent.csv"), 0, 8))
        .unwrap();
    let err = run_from_config(&config, today()).unwrap_err();
    assert!(matches!(err, RunError::Config(ConfigError::Invalid(_))));
}

#[test]
fn missing_csv_is_data_error() {
    let config =
        BacktestConfig::from_toml(&config_toml(Path::new("/nonexistent.csv"), 3, 8)).unwrap();
    let err = run_from_config(&config, today()).unwrap_err();
    assert!(matches!(err, RunError::Data(LoadError::Fetch { .. })));
}

#[test]
fn too_few_bars_is_insufficient_data() {
    let csv = write_csv(&rise_fall_closes()[..8]);
    let config = BacktestConfig::from_toml(&config_toml(csv.path(), 3, 8)).unwrap();
    let err = run_from_config(&config, today()).unwrap_err();
    assert!(err.to_string().contains("insufficient data"));
}

#[test]
fn reports_render() {
    let csv = write_csv(&rise_fall_closes());
    let config = BacktestConfig::from_toml(&config_toml(csv.path(), 3, 8)).unwrap();
    let result = run_from_config(&config, today()).unwrap();

    let json = export_json(&result).unwrap();
    assert!(json.contains("\"schema_version\": 1"));
    let table = series_csv(&result).unwrap();
    assert_eq!(table.lines().count(), 71);
    let text = format_summary(&result);
    assert!(text.contains("TEST"));
    assert!(text.contains("exit"));
}

#[test]
fn sweep_over_csv_data() {
    let csv = write_csv(&rise_fall_closes());
    let config = BacktestConfig::from_toml(&config_toml(csv.path(), 3, 8)).unwrap();
    let loaded = crosslab_runner::load_series(&config, today()).unwrap();

    let grid = ParamGrid {
        short_windows: vec![2, 3, 5],
        long_windows: vec![8, 13, 100],
    };
    let results = sweep(&loaded, &grid, 10_000.0);
    assert_eq!(results.entries.len() + results.failures.len(), grid.size());
    assert_eq!(results.failures.len(), 3);
    for pair in results.entries.windows(2) {
        assert!(pair[0].metrics.total_return >= pair[1].metrics.total_return);
    }
}
