//! Dual moving-average crossover — golden cross and death cross detection.
//!
//! The signal is long (1) while the short SMA is strictly above the long SMA
//! and flat (0) otherwise. A bar where either average is undefined is flat.
//! The window sizes are not required to be ordered; with `short >= long` the
//! signal degenerates but still follows the same comparison rule.

use tracing::debug;

use super::{PositionChange, SignalFrame};
use crate::domain::PriceSeries;
use crate::error::BacktestError;
use crate::indicators::{Indicator, Sma};
use crate::params::validate_window;

/// Moving-average crossover signal generator.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    short: Sma,
    long: Sma,
}

impl SignalEngine {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, BacktestError> {
        validate_window("short_window", short_window)?;
        validate_window("long_window", long_window)?;
        Ok(Self {
            short: Sma::new(short_window)?,
            long: Sma::new(long_window)?,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short.period()
    }

    pub fn long_window(&self) -> usize {
        self.long.period()
    }

    /// First index at which both averages can be defined.
    pub fn warmup_bars(&self) -> usize {
        self.short.lookback().max(self.long.lookback())
    }

    /// Compute averages, signal and position changes. Never fails; a series
    /// shorter than a window just yields an all-flat signal.
    pub fn run(&self, series: &PriceSeries) -> SignalFrame {
        let short_ma = self.short.compute(series);
        let long_ma = self.long.compute(series);
        let signal = signal_from_averages(&short_ma, &long_ma);
        let position = position_changes(&signal);

        debug!(
            short = self.short_window(),
            long = self.long_window(),
            bars = series.len(),
            long_bars = signal.iter().filter(|&&s| s == 1).count(),
            "signal stage complete"
        );

        SignalFrame {
            short_window: self.short_window(),
            long_window: self.long_window(),
            short_ma,
            long_ma,
            signal,
            position,
        }
    }
}

/// Convenience wrapper: build a `SignalEngine` and run it once.
pub fn generate_signals(
    series: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<SignalFrame, BacktestError> {
    Ok(SignalEngine::new(short_window, long_window)?.run(series))
}

/// 1 iff both averages are defined and short > long. Definedness is checked
/// explicitly rather than relying on NaN comparisons being false.
pub fn signal_from_averages(short_ma: &[f64], long_ma: &[f64]) -> Vec<u8> {
    short_ma
        .iter()
        .zip(long_ma)
        .map(|(&s, &l)| {
            let defined = !s.is_nan() && !l.is_nan();
            u8::from(defined && s > l)
        })
        .collect()
}

/// `signal[i] - signal[i-1]`, undefined at index 0.
pub fn position_changes(signal: &[u8]) -> Vec<Option<PositionChange>> {
    let mut out = Vec::with_capacity(signal.len());
    if signal.is_empty() {
        return out;
    }
    out.push(None);
    for pair in signal.windows(2) {
        let diff = pair[1] as i8 - pair[0] as i8;
        out.push(Some(PositionChange::from_diff(diff)));
    }
    out
}
