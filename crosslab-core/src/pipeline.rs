//! The linear pipeline: PriceSeries → signal → portfolio → metrics.
//!
//! Parameters are validated before any series is touched, then the series is
//! checked for length. Either failure returns an error and no partial output.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::PriceSeries;
use crate::error::BacktestError;
use crate::metrics::RiskMetrics;
use crate::params::BacktestParams;
use crate::portfolio::{PortfolioFrame, PortfolioSimulator};
use crate::signal::{SignalEngine, SignalFrame};

/// Every derived series plus the summary metrics of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backtest {
    pub params: BacktestParams,
    pub signals: SignalFrame,
    pub portfolio: PortfolioFrame,
    pub metrics: RiskMetrics,
}

/// Run the full pipeline on one series.
pub fn run_backtest(
    series: &PriceSeries,
    params: &BacktestParams,
) -> Result<Backtest, BacktestError> {
    params.validate()?;

    let required = params.min_bars();
    if series.len() < required {
        return Err(BacktestError::InsufficientData {
            bars: series.len(),
            required,
        });
    }

    let signals = SignalEngine::new(params.short_window, params.long_window)?.run(series);
    let portfolio = PortfolioSimulator::new(params.initial_investment)?.simulate(series, &signals)?;

    let (first_date, last_date) = match (series.first_date(), series.last_date()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(BacktestError::InsufficientData {
                bars: 0,
                required,
            })
        }
    };
    let metrics = RiskMetrics::compute(
        &portfolio.portfolio_value,
        first_date,
        last_date,
        params.initial_investment,
    )?;
    debug!(
        total_return = metrics.total_return,
        cagr = metrics.cagr,
        max_drawdown = metrics.max_drawdown,
        "metrics computed"
    );

    Ok(Backtest {
        params: *params,
        signals,
        portfolio,
        metrics,
    })
}
