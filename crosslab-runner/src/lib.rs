//! CrossLab Runner — backtest orchestration on top of `crosslab-core`.
//!
//! - TOML configuration with defaults and validation
//! - Data loading from Yahoo, CSV or the synthetic generator
//! - Single-run results with crossover markers and a buy-and-hold benchmark
//! - Parallel `(short, long)` parameter sweeps
//! - JSON, CSV and text report rendering

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, DataSourceKind};
pub use data_loader::{load_series, load_with_provider, LoadError, LoadedData};
pub use export::{export_json, format_summary, format_sweep, series_csv};
pub use runner::{run_from_config, run_on_series, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{sweep, ParamGrid, SweepEntry, SweepResults};
