//! Price loading for the runner.
//!
//! Resolves the configured data source to a provider, fetches the requested
//! `[start, end)` range and turns the raw bars into a validated
//! [`PriceSeries`]. Results produced on synthetic data are tagged so they can
//! be told apart from real runs.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crosslab_core::data::{
    CsvProvider, DataError, DataProvider, DataSource, SyntheticProvider, YahooProvider,
};
use crosslab_core::fingerprint::dataset_hash;
use crosslab_core::PriceSeries;

use crate::config::{BacktestConfig, DataSourceKind};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch '{symbol}' from {provider}: {source}")]
    Fetch {
        symbol: String,
        provider: String,
        source: DataError,
    },

    #[error("no price data for '{symbol}' between {start} and {end}")]
    Empty {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("data source 'csv' requires a path")]
    MissingCsvPath,

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// A validated series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub symbol: String,
    pub series: PriceSeries,
    pub source: DataSource,
    /// BLAKE3 over every bar.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Build the provider named by the `[data]` section.
pub fn provider_for(config: &BacktestConfig) -> Result<Box<dyn DataProvider>, LoadError> {
    let data = &config.data;
    let provider: Box<dyn DataProvider> = match data.source {
        DataSourceKind::Yahoo => Box::new(YahooProvider::new()?.with_adjusted(data.adjusted)),
        DataSourceKind::Csv => {
            let path = data.path.as_ref().ok_or(LoadError::MissingCsvPath)?;
            Box::new(CsvProvider::new(path).with_prefer_adjusted(data.adjusted))
        }
        DataSourceKind::Synthetic => Box::new(SyntheticProvider::new(data.seed)),
    };
    Ok(provider)
}

/// Load the configured symbol over the configured range.
pub fn load_series(config: &BacktestConfig, today: NaiveDate) -> Result<LoadedData, LoadError> {
    let provider = provider_for(config)?;
    let (start, end) = config.date_range(today);
    load_with_provider(provider.as_ref(), &config.backtest.symbol, start, end)
}

/// Fetch `symbol` over `[start, end)` from an explicit provider.
pub fn load_with_provider(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<LoadedData, LoadError> {
    debug!(symbol, provider = provider.name(), %start, %end, "fetching prices");
    let fetched = provider
        .fetch(symbol, start, end)
        .map_err(|source| LoadError::Fetch {
            symbol: symbol.to_string(),
            provider: provider.name().to_string(),
            source,
        })?;
    let source = fetched.source;
    let series = fetched.into_series(Some(start), Some(end))?;

    if series.is_empty() {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }
    let gaps = series.gap_count();
    if gaps > 0 {
        warn!(symbol, gaps, "price series contains missing closes");
    }

    Ok(LoadedData {
        symbol: symbol.to_string(),
        dataset_hash: dataset_hash(&series),
        has_synthetic: source == DataSource::Synthetic,
        series,
        source,
    })
}
