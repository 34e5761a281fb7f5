//! Look-ahead contamination tests.
//!
//! Invariant: no derived value at bar t may depend on price data from bar t+1
//! or later.
//!
//! Method: run the pipeline on a truncated series (bars 0..N) and on the full
//! series (bars 0..2N). Every per-bar series must agree bit-for-bit on 0..N.

use chrono::NaiveDate;
use crosslab_core::indicators::{Indicator, Sma};
use crosslab_core::{run_backtest, BacktestParams, PriceSeries};

/// Deterministic pseudo-random walk using a simple LCG.
fn make_test_series(n: usize) -> PriceSeries {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut price = 100.0;
    let closes: Vec<f64> = (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);
            price
        })
        .collect();
    PriceSeries::from_daily_closes(base_date, &closes).unwrap()
}

fn assert_prefix_identical(name: &str, truncated: &[f64], full: &[f64]) {
    for (i, (a, b)) in truncated.iter().zip(full).enumerate() {
        assert_eq!(
            a.to_bits(),
            b.to_bits(),
            "{name}[{i}] differs: truncated={a}, full={b}"
        );
    }
}

#[test]
fn sma_has_no_lookahead() {
    let full = make_test_series(200);
    let truncated = full.truncated(100);
    for period in [1, 5, 20, 50] {
        let sma = Sma::new(period).unwrap();
        let a = sma.compute(&truncated);
        let b = sma.compute(&full);
        assert_eq!(a.len(), 100);
        assert_prefix_identical(sma.name(), &a, &b);
    }
}

#[test]
fn pipeline_has_no_lookahead() {
    let full = make_test_series(200);
    let truncated = full.truncated(100);
    let params = BacktestParams::new(5, 20, 10_000.0);

    let a = run_backtest(&truncated, &params).unwrap();
    let b = run_backtest(&full, &params).unwrap();

    assert_prefix_identical("short_ma", &a.signals.short_ma, &b.signals.short_ma);
    assert_prefix_identical("long_ma", &a.signals.long_ma, &b.signals.long_ma);
    assert_eq!(a.signals.signal[..], b.signals.signal[..100]);
    assert_eq!(a.signals.position[..], b.signals.position[..100]);
    assert_prefix_identical(
        "strategy_return",
        &a.portfolio.strategy_return,
        &b.portfolio.strategy_return,
    );
    assert_prefix_identical(
        "portfolio_value",
        &a.portfolio.portfolio_value,
        &b.portfolio.portfolio_value,
    );
}

#[test]
fn changing_the_last_close_only_moves_the_last_return() {
    let base = make_test_series(80);
    let mut closes = base.closes();
    let last = closes.len() - 1;
    closes[last] *= 1.5;
    let bumped = PriceSeries::from_daily_closes(base.first_date().unwrap(), &closes).unwrap();

    let params = BacktestParams::new(3, 12, 1_000.0);
    let a = run_backtest(&base, &params).unwrap();
    let b = run_backtest(&bumped, &params).unwrap();

    // The signal decided on the last bar is never applied to any return.
    assert_prefix_identical(
        "portfolio_value",
        &a.portfolio.portfolio_value[..last],
        &b.portfolio.portfolio_value[..last],
    );
    assert_eq!(a.signals.signal[..last], b.signals.signal[..last]);
}
