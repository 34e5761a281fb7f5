//! Indicator trait and concrete implementations.
//!
//! Indicators are pure functions: price series in, numeric series out, same
//! length. Warmup positions are `f64::NAN`.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod sma;

pub use sma::Sma;

use crate::domain::PriceSeries;

pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of leading bars that are always NaN.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole series.
    fn compute(&self, series: &PriceSeries) -> Vec<f64>;
}

/// Consecutive-day series from close prices, for tests.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    PriceSeries::from_daily_closes(start, closes).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
