//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::PriceSeries;
use crate::error::BacktestError;
use crate::params::validate_window;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, BacktestError> {
        validate_window("period", period)?;
        Ok(Self {
            period,
            name: format!("sma_{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        rolling_mean(&series.closes(), self.period)
    }
}

/// Trailing mean over exactly `period` values, NaN where the window is
/// incomplete or contains a NaN.
///
/// Runs in O(n). The running sum is Neumaier-compensated so values that have
/// left the window leave no rounding residue, and a window holding one
/// repeated close returns that close exactly.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut sum = CompensatedSum::default();
    let mut nan_count = 0usize;
    // Length of the run of identical closes ending at `i`.
    let mut run_len = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_count += 1;
            run_len = 0;
        } else {
            sum.add(entering);
            run_len = if i > 0 && values[i - 1] == entering {
                run_len + 1
            } else {
                1
            };
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum.add(-leaving);
            }
        }

        if i + 1 >= period && nan_count == 0 {
            result[i] = if run_len >= period {
                entering
            } else {
                sum.value() / period as f64
            };
        }
    }

    result
}

/// Neumaier summation: `sum` plus a running correction for lost low bits.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5).unwrap().compute(&series);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let series = make_series(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1).unwrap().compute(&series);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_nan_propagation() {
        let closes = [10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0, 16.0];
        let result = rolling_mean(&closes, 3);
        // Every window touching index 2 is undefined.
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // Index 5 window [13,14,15] is clean again.
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
        assert_approx(result[6], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_at_start_recovers() {
        let result = rolling_mean(&[f64::NAN, 2.0, 4.0, 6.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).unwrap().lookback(), 19);
        assert_eq!(Sma::new(1).unwrap().lookback(), 0);
        assert_eq!(Sma::new(20).unwrap().name(), "sma_20");
    }

    #[test]
    fn sma_zero_period_rejected() {
        assert!(matches!(
            Sma::new(0),
            Err(BacktestError::InvalidParameter { name: "period", .. })
        ));
    }

    #[test]
    fn sma_too_few_bars() {
        let series = make_series(&[10.0, 11.0]);
        let result = Sma::new(5).unwrap().compute(&series);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_constant_series_is_exact() {
        let result = rolling_mean(&[100.0; 60], 20);
        assert!(result[19..].iter().all(|&v| v == 100.0));
    }

    #[test]
    fn sma_constant_unrepresentable_price_is_exact() {
        for period in [5, 20, 50] {
            let result = rolling_mean(&[3.3; 200], period);
            assert!(result[period - 1..].iter().all(|&v| v == 3.3), "period {period}");
        }
    }

    #[test]
    fn sma_large_value_leaving_window_does_not_cancel_sum() {
        let result = rolling_mean(&[1e17, 1.0, 1.0, 1.0, 1.0, 1.0], 2);
        assert!(result[0].is_nan());
        assert_eq!(result[1], 5e16);
        assert!(result[2..].iter().all(|&v| v == 1.0), "{result:?}");
    }

    #[test]
    fn sma_compensated_sum_survives_mixed_magnitudes() {
        // 1e16 leaves before the window [1, 2, 3] is read.
        let result = rolling_mean(&[1e16, 1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(result[3], 2.0);
        assert_eq!(result[4], 3.0);
    }

    #[test]
    fn sma_flat_tail_after_varied_history_is_exact() {
        let mut closes: Vec<f64> = (0..300)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 7.3 + (i as f64 * 0.011))
            .collect();
        closes.extend(std::iter::repeat(99.329_484_613_932).take(60));
        let short = rolling_mean(&closes, 5);
        let long = rolling_mean(&closes, 20);
        for i in 319..360 {
            assert_eq!(short[i], long[i], "index {i}");
            assert_eq!(long[i], 99.329_484_613_932);
        }
    }
}
