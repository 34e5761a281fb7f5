//! Portfolio simulation — daily returns, lagged strategy returns, compounding.
//!
//! The signal is shifted one bar before it touches any return: a crossover
//! detected from bar i-1's close only earns the return from i-1 to i. This is
//! the look-ahead-bias guard and lives in [`lag_signal`] so it can be tested on
//! its own.
//!
//! Undefined returns (NaN from price gaps) are treated as 0: the portfolio
//! value is held flat on that bar. `portfolio_value[0]` is the initial
//! investment, so the value series is defined on every bar.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::PriceSeries;
use crate::error::BacktestError;
use crate::params::validate_investment;
use crate::signal::SignalFrame;

/// Output of the simulation stage, aligned 1:1 with the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioFrame {
    pub initial_investment: f64,
    /// `close[i] / close[i-1] - 1`, NaN at index 0 and around gaps.
    pub daily_return: Vec<f64>,
    /// `signal[i-1]`, `None` at index 0.
    pub lagged_signal: Vec<Option<u8>>,
    /// `daily_return[i] * signal[i-1]`, NaN where either side is undefined.
    pub strategy_return: Vec<f64>,
    pub portfolio_value: Vec<f64>,
}

impl PortfolioFrame {
    pub fn len(&self) -> usize {
        self.portfolio_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio_value.is_empty()
    }

    pub fn final_value(&self) -> Option<f64> {
        self.portfolio_value.last().copied()
    }

    /// Bars after the first whose strategy return was undefined and held flat.
    pub fn held_flat_bars(&self) -> usize {
        self.strategy_return
            .iter()
            .skip(1)
            .filter(|r| r.is_nan())
            .count()
    }
}

/// Compounds lagged strategy returns from a fixed starting capital.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioSimulator {
    initial_investment: f64,
}

impl PortfolioSimulator {
    pub fn new(initial_investment: f64) -> Result<Self, BacktestError> {
        validate_investment(initial_investment)?;
        Ok(Self { initial_investment })
    }

    pub fn initial_investment(&self) -> f64 {
        self.initial_investment
    }

    pub fn simulate(
        &self,
        series: &PriceSeries,
        signals: &SignalFrame,
    ) -> Result<PortfolioFrame, BacktestError> {
        self.simulate_signal(series, &signals.signal)
    }

    /// Same as [`simulate`](Self::simulate) but takes a raw 0/1 signal.
    pub fn simulate_signal(
        &self,
        series: &PriceSeries,
        signal: &[u8],
    ) -> Result<PortfolioFrame, BacktestError> {
        if signal.len() != series.len() {
            return Err(BacktestError::invalid(
                "signal",
                format!(
                    "length {} does not match series length {}",
                    signal.len(),
                    series.len()
                ),
            ));
        }

        let daily_return = daily_returns(&series.closes());
        let lagged_signal = lag_signal(signal);
        let strategy_return = strategy_returns(&daily_return, &lagged_signal);
        let portfolio_value = compound(self.initial_investment, &strategy_return);

        let frame = PortfolioFrame {
            initial_investment: self.initial_investment,
            daily_return,
            lagged_signal,
            strategy_return,
            portfolio_value,
        };
        debug!(
            bars = frame.len(),
            held_flat = frame.held_flat_bars(),
            final_value = frame.final_value().unwrap_or(self.initial_investment),
            "portfolio stage complete"
        );
        Ok(frame)
    }
}

/// Percent change between consecutive closes. NaN at index 0.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    for pair in closes.windows(2) {
        out.push(pair[1] / pair[0] - 1.0);
    }
    out
}

/// Shift the signal forward by one bar. The first bar has no prior signal.
pub fn lag_signal(signal: &[u8]) -> Vec<Option<u8>> {
    let mut out = Vec::with_capacity(signal.len());
    if signal.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(signal[..signal.len() - 1].iter().copied().map(Some));
    out
}

/// Element-wise `daily_return * lagged_signal`.
pub fn strategy_returns(daily_return: &[f64], lagged_signal: &[Option<u8>]) -> Vec<f64> {
    daily_return
        .iter()
        .zip(lagged_signal)
        .map(|(&r, s)| match s {
            Some(s) => r * f64::from(*s),
            None => f64::NAN,
        })
        .collect()
}

/// Running product of `1 + r` starting at `initial`. NaN returns hold the
/// value flat; index 0 is always `initial`.
pub fn compound(initial: f64, strategy_return: &[f64]) -> Vec<f64> {
    let mut value = initial;
    strategy_return
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            if i > 0 && !r.is_nan() {
                value *= 1.0 + r;
            }
            value
        })
        .collect()
}
