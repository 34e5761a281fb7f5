//! Backtest runner: wires together loading, the core pipeline and reporting.
//!
//! Two entry points:
//! - `run_from_config()`: loads data from the configured source, then runs. Used by the CLI.
//! - `run_on_series()`: takes an already-loaded series. Used by sweeps and tests.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crosslab_core::data::DataSource;
use crosslab_core::fingerprint::result_hash;
use crosslab_core::metrics::buy_and_hold_return;
use crosslab_core::signal::CrossoverMarker;
use crosslab_core::{
    run_backtest, Backtest, BacktestError, BacktestParams, Bar, PositionChange,
};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_series, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Current schema version for serialized results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
///
/// Serialized for reports only: undefined series cells are written as `null`,
/// so the JSON is not read back.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub bar_count: usize,
    /// Return of holding the asset over the same span, for comparison.
    pub benchmark_return: f64,
    /// Entry and exit crossovers in date order.
    pub markers: Vec<CrossoverMarker>,
    /// Completed entry/exit pairs.
    pub trade_count: usize,
    pub dataset_hash: String,
    pub result_hash: String,
    pub data_quality_warnings: Vec<String>,
    /// Input bars, aligned with every series in `backtest`.
    pub bars: Vec<Bar>,
    pub backtest: Backtest,
}

impl BacktestResult {
    pub fn params(&self) -> &BacktestParams {
        &self.backtest.params
    }
}

/// Load the configured data and run one backtest.
pub fn run_from_config(
    config: &BacktestConfig,
    today: NaiveDate,
) -> Result<BacktestResult, RunError> {
    config.validate(today)?;
    let loaded = load_series(config, today)?;
    run_on_series(&loaded, &config.params())
}

/// Run one backtest on pre-loaded data.
pub fn run_on_series(
    loaded: &LoadedData,
    params: &BacktestParams,
) -> Result<BacktestResult, RunError> {
    let series = &loaded.series;
    let backtest = run_backtest(series, params)?;

    let markers = backtest.signals.markers(series);
    let trade_count = count_trades(&markers);
    let benchmark_return = buy_and_hold_return(&series.closes());

    let mut warnings = Vec::new();
    let gaps = series.gap_count();
    if gaps > 0 {
        warnings.push(format!("{gaps} bars have no close"));
    }
    let flat = backtest.portfolio.held_flat_bars();
    if flat > 0 {
        warnings.push(format!(
            "portfolio value held flat on {flat} bars with undefined returns"
        ));
    }
    if loaded.has_synthetic {
        warnings.push("results computed on synthetic data".to_string());
    }

    let (start_date, end_date) = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(BacktestError::InsufficientData {
                bars: 0,
                required: params.min_bars(),
            }
            .into())
        }
    };

    info!(
        symbol = %loaded.symbol,
        short = params.short_window,
        long = params.long_window,
        bars = series.len(),
        total_return = backtest.metrics.total_return,
        trades = trade_count,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: loaded.symbol.clone(),
        start_date,
        end_date,
        source: loaded.source,
        has_synthetic: loaded.has_synthetic,
        bar_count: series.len(),
        benchmark_return,
        markers,
        trade_count,
        dataset_hash: loaded.dataset_hash.clone(),
        result_hash: result_hash(&backtest),
        data_quality_warnings: warnings,
        bars: series.bars().to_vec(),
        backtest,
    })
}

/// Number of exits that close an earlier entry.
pub fn count_trades(markers: &[CrossoverMarker]) -> usize {
    let mut open = false;
    let mut trades = 0;
    for m in markers {
        match m.change {
            PositionChange::Entry => open = true,
            PositionChange::Exit if open => {
                open = false;
                trades += 1;
            }
            _ => {}
        }
    }
    trades
}
