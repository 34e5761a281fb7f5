//! End-to-end scenarios for the crossover pipeline.
//!
//! Each scenario runs the full pipeline on a hand-built series and checks the
//! derived series and metrics against values worked out by hand.

use chrono::NaiveDate;
use crosslab_core::metrics::RiskMetrics;
use crosslab_core::{run_backtest, BacktestError, BacktestParams, PositionChange, PriceSeries};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_daily_closes(start(), closes).unwrap()
}

// ── Scenario A: constant price ───────────────────────────────────────

#[test]
fn constant_price_never_goes_long() {
    let s = series(&[100.0; 60]);
    let bt = run_backtest(&s, &BacktestParams::new(5, 20, 1000.0)).unwrap();

    assert!(bt.signals.signal.iter().all(|&x| x == 0));
    assert!(bt.portfolio.strategy_return[1..].iter().all(|&r| r == 0.0));
    assert!(bt.portfolio.portfolio_value.iter().all(|&v| v == 1000.0));
    assert_eq!(bt.metrics.total_return, 0.0);
    assert_eq!(bt.metrics.max_drawdown, 0.0);
    assert_eq!(bt.metrics.cagr, 0.0);
    assert_eq!(bt.metrics.final_value, 1000.0);
    assert!(bt.signals.markers(&s).is_empty());
}

#[test]
fn constant_unrepresentable_price_never_goes_long() {
    let s = series(&[3.3; 200]);
    let bt = run_backtest(&s, &BacktestParams::new(5, 20, 1000.0)).unwrap();

    assert!(bt.signals.signal.iter().all(|&x| x == 0));
    assert_eq!(bt.signals.long_bars(), 0);
    assert_eq!(bt.metrics.final_value, 1000.0);
}

#[test]
fn flat_stretch_after_varied_history_stays_flat() {
    let mut closes: Vec<f64> = (0..300)
        .map(|i| 100.0 + (i as f64 * 0.21).sin() * 4.0 + (i as f64 * 0.05).cos())
        .collect();
    closes.extend(std::iter::repeat(99.329_484_613_932_19).take(60));
    let s = series(&closes);
    let bt = run_backtest(&s, &BacktestParams::new(5, 20, 1000.0)).unwrap();

    // From index 319 both windows lie inside the flat stretch.
    for i in 319..360 {
        assert_eq!(bt.signals.short_ma[i], bt.signals.long_ma[i], "index {i}");
        assert_eq!(bt.signals.signal[i], 0, "index {i}");
    }
    let value_at_flat = bt.portfolio.portfolio_value[320];
    assert!(bt.portfolio.portfolio_value[320..]
        .iter()
        .all(|&v| v == value_at_flat));
}

// ── Scenario B: strictly increasing price ────────────────────────────

#[test]
fn rising_price_enters_once_and_stays_long() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let s = series(&closes);
    let bt = run_backtest(&s, &BacktestParams::new(5, 20, 1000.0)).unwrap();

    // Both averages are defined from index 19 on.
    assert!(bt.signals.signal[..19].iter().all(|&x| x == 0));
    assert!(bt.signals.signal[19..].iter().all(|&x| x == 1));

    let entries: Vec<usize> = bt
        .signals
        .position
        .iter()
        .enumerate()
        .filter(|(_, p)| **p == Some(PositionChange::Entry))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(entries, vec![19]);
    assert!(!bt
        .signals
        .position
        .iter()
        .any(|p| *p == Some(PositionChange::Exit)));

    // Entry bar earns nothing; the bar after does.
    assert_eq!(bt.portfolio.strategy_return[19], 0.0);
    assert!(bt.portfolio.strategy_return[20] > 0.0);
    assert_eq!(bt.portfolio.portfolio_value[19], 1000.0);

    // Long from close 119 to close 159.
    let expected_final = 1000.0 * 159.0 / 119.0;
    assert!((bt.metrics.final_value - expected_final).abs() < 1e-8);
    assert_eq!(bt.metrics.max_drawdown, 0.0);
    assert!(bt.metrics.cagr > 0.0);
}

// ── Scenario C: zero time span ───────────────────────────────────────

#[test]
fn zero_span_cagr_is_exactly_zero() {
    let m = RiskMetrics::compute(&[1500.0], start(), start(), 1000.0).unwrap();
    assert_eq!(m.cagr, 0.0);
    assert!((m.total_return - 0.5).abs() < 1e-12);
    assert!(m.cagr.is_finite());
}

// ── Scenario D: empty series ─────────────────────────────────────────

#[test]
fn empty_series_is_insufficient_data() {
    let s = PriceSeries::new(vec![]).unwrap();
    let err = run_backtest(&s, &BacktestParams::new(5, 20, 1000.0)).unwrap_err();
    assert!(matches!(err, BacktestError::InsufficientData { bars: 0, .. }));

    let err = RiskMetrics::compute(&[], start(), start(), 1000.0).unwrap_err();
    assert!(matches!(err, BacktestError::InsufficientData { .. }));
}

// ── Crossovers in both directions ────────────────────────────────────

#[test]
fn rise_then_fall_produces_golden_and_death_cross() {
    let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    closes.extend((1..=30).map(|i| 129.0 - 2.0 * i as f64));
    let s = series(&closes);
    let bt = run_backtest(&s, &BacktestParams::new(3, 10, 1000.0)).unwrap();

    let markers = bt.signals.markers(&s);
    assert_eq!(markers.len(), 2, "markers: {markers:?}");
    assert_eq!(markers[0].change, PositionChange::Entry);
    assert_eq!(markers[0].index, 9);
    assert_eq!(markers[1].change, PositionChange::Exit);
    assert!(markers[1].index > 30);
    assert!(bt.metrics.max_drawdown < 0.0);
}

#[test]
fn invalid_parameters_fail_before_computation() {
    let s = series(&[100.0; 60]);
    for params in [
        BacktestParams::new(0, 20, 1000.0),
        BacktestParams::new(5, 0, 1000.0),
        BacktestParams::new(5, 20, 0.0),
        BacktestParams::new(5, 20, -10.0),
    ] {
        let err = run_backtest(&s, &params).unwrap_err();
        assert!(
            matches!(err, BacktestError::InvalidParameter { .. }),
            "{params:?} gave {err}"
        );
    }
}

#[test]
fn gap_in_feed_propagates_without_corrupting_value() {
    let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    closes[40] = f64::NAN;
    let s = series(&closes);
    let bt = run_backtest(&s, &BacktestParams::new(5, 20, 1000.0)).unwrap();

    assert!(bt.signals.short_ma[40].is_nan());
    assert_eq!(bt.signals.signal[40], 0);
    assert!(bt.portfolio.daily_return[40].is_nan());
    assert!(bt.portfolio.daily_return[41].is_nan());
    assert!(bt.portfolio.portfolio_value.iter().all(|v| v.is_finite()));
    assert_eq!(
        bt.portfolio.portfolio_value[40],
        bt.portfolio.portfolio_value[39]
    );
    assert!(bt.metrics.final_value.is_finite());
}
