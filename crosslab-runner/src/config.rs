//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! symbol = "AAPL"
//! start_date = "2023-01-01"   # optional, defaults to one year before end
//! end_date = "2024-01-01"     # optional, defaults to today (exclusive)
//! initial_investment = 100000.0
//!
//! [strategy]
//! short_window = 20
//! long_window = 50
//!
//! [data]
//! source = "yahoo"            # yahoo | csv | synthetic
//! path = "prices.csv"         # required for csv
//! seed = 42                   # optional, synthetic only
//! adjusted = true
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crosslab_core::{BacktestError, BacktestParams};

/// Days covered when no start date is given.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] BacktestError),

    #[error("start date {start} must be before end date {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("data source 'csv' requires data.path")]
    MissingCsvPath,

    #[error("symbol must not be empty")]
    EmptySymbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub data: DataSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategySection {
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    #[serde(default = "default_long_window")]
    pub long_window: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    #[serde(default = "default_source")]
    pub source: DataSourceKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_adjusted")]
    pub adjusted: bool,
}

fn default_symbol() -> String {
    "AAPL".into()
}
fn default_initial_investment() -> f64 {
    100_000.0
}
fn default_short_window() -> usize {
    20
}
fn default_long_window() -> usize {
    50
}
fn default_source() -> DataSourceKind {
    DataSourceKind::Yahoo
}
fn default_adjusted() -> bool {
    true
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            start_date: None,
            end_date: None,
            initial_investment: default_initial_investment(),
        }
    }
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
        }
    }
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            path: None,
            seed: None,
            adjusted: default_adjusted(),
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            backtest: BacktestSection::default(),
            strategy: StrategySection::default(),
            data: DataSection::default(),
        }
    }
}

impl BacktestConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn params(&self) -> BacktestParams {
        BacktestParams::new(
            self.strategy.short_window,
            self.strategy.long_window,
            self.backtest.initial_investment,
        )
    }

    /// Resolve the `[start, end)` range. `end` defaults to `today`, `start` to
    /// [`DEFAULT_LOOKBACK_DAYS`] before `end`.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = self.backtest.end_date.unwrap_or(today);
        let start = self
            .backtest
            .start_date
            .unwrap_or(end - Duration::days(DEFAULT_LOOKBACK_DAYS));
        (start, end)
    }

    /// Check everything that can be checked without touching data.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        self.params().validate()?;
        let (start, end) = self.date_range(today);
        if start >= end {
            return Err(ConfigError::EmptyRange { start, end });
        }
        if self.data.source == DataSourceKind::Csv && self.data.path.is_none() {
            return Err(ConfigError::MissingCsvPath);
        }
        Ok(())
    }

    /// Deterministic hash of the serialized config.
    ///
    /// Two configs that serialize identically share a run ID.
    pub fn run_id(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
