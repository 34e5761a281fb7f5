//! Validated backtest parameters.

use serde::{Deserialize, Serialize};

use crate::error::BacktestError;

/// Window sizes and starting capital for one backtest.
///
/// No ordering is enforced between the windows: `short_window >= long_window`
/// is accepted and simply yields a degenerate signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestParams {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_investment: f64,
}

impl BacktestParams {
    pub fn new(short_window: usize, long_window: usize, initial_investment: f64) -> Self {
        Self {
            short_window,
            long_window,
            initial_investment,
        }
    }

    /// Fail fast on non-positive windows or a non-positive/non-finite investment.
    pub fn validate(&self) -> Result<(), BacktestError> {
        validate_window("short_window", self.short_window)?;
        validate_window("long_window", self.long_window)?;
        validate_investment(self.initial_investment)
    }

    /// Index of the first bar where both averages can be defined.
    pub fn first_signal_index(&self) -> usize {
        self.short_window.max(self.long_window).saturating_sub(1)
    }

    /// Minimum bar count for at least one return to be driven by a defined signal:
    /// the signal forms on `first_signal_index()` and is applied one bar later.
    pub fn min_bars(&self) -> usize {
        self.first_signal_index() + 2
    }
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self::new(20, 50, 100_000.0)
    }
}

pub(crate) fn validate_window(name: &'static str, window: usize) -> Result<(), BacktestError> {
    if window == 0 {
        return Err(BacktestError::invalid(name, "must be a positive integer"));
    }
    Ok(())
}

pub(crate) fn validate_investment(initial_investment: f64) -> Result<(), BacktestError> {
    if !initial_investment.is_finite() || initial_investment <= 0.0 {
        return Err(BacktestError::invalid(
            "initial_investment",
            format!("must be a positive finite number, got {initial_investment}"),
        ));
    }
    Ok(())
}
