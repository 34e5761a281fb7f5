//! Risk metrics — pure functions that summarize a portfolio value series.
//!
//! All values are plain fractions (0.12 = 12%). Converting to percentages is
//! left to the presentation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BacktestError;
use crate::params::validate_investment;

/// Calendar days per year used for annualization.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// The four summary scalars of a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub cagr: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
    pub final_value: f64,
}

impl RiskMetrics {
    /// Compute all metrics from a portfolio value series and its date span.
    ///
    /// Fails with `InsufficientData` on an empty series.
    pub fn compute(
        portfolio_value: &[f64],
        first_date: NaiveDate,
        last_date: NaiveDate,
        initial_investment: f64,
    ) -> Result<Self, BacktestError> {
        validate_investment(initial_investment)?;
        let final_value = *portfolio_value
            .last()
            .ok_or(BacktestError::InsufficientData {
                bars: 0,
                required: 1,
            })?;

        let total_return = total_return(final_value, initial_investment);
        let years = num_years(first_date, last_date);

        Ok(Self {
            cagr: cagr(total_return, years),
            max_drawdown: max_drawdown(portfolio_value),
            total_return,
            final_value,
        })
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: final / initial - 1.
pub fn total_return(final_value: f64, initial_investment: f64) -> f64 {
    final_value / initial_investment - 1.0
}

/// Elapsed calendar time in years (days / 365.25). Negative spans are allowed
/// and handled by [`cagr`].
pub fn num_years(first_date: NaiveDate, last_date: NaiveDate) -> f64 {
    (last_date - first_date).num_days() as f64 / DAYS_PER_YEAR
}

/// Compound annual growth rate. Returns exactly 0.0 when `years <= 0`.
pub fn cagr(total_return: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(1.0 / years) - 1.0
}

/// Drawdown at every bar relative to the running peak, as a non-positive fraction.
pub fn drawdown_series(portfolio_value: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    portfolio_value
        .iter()
        .map(|&v| {
            if v.is_nan() {
                return 0.0;
            }
            if v > peak {
                peak = v;
            }
            if peak > 0.0 {
                (v - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if the series is constant or non-decreasing.
pub fn max_drawdown(portfolio_value: &[f64]) -> f64 {
    drawdown_series(portfolio_value)
        .into_iter()
        .fold(0.0_f64, f64::min)
}

/// Buy-and-hold return between the first and last defined closes.
///
/// Returns 0.0 when fewer than two closes are defined.
pub fn buy_and_hold_return(closes: &[f64]) -> f64 {
    let first = closes.iter().copied().find(|c| !c.is_nan());
    let last = closes.iter().copied().rev().find(|c| !c.is_nan());
    match (first, last) {
        (Some(f), Some(l)) if f > 0.0 => l / f - 1.0,
        _ => 0.0,
    }
}
