//! Report rendering: JSON, CSV and plain text.
//!
//! - **JSON**: the full `BacktestResult`; undefined values are written as `null`
//! - **CSV**: one row per bar with every derived series aligned to its date
//! - **Text**: a short summary with metrics as percentages and the crossovers

use std::fmt::Write as _;

use anyhow::{Context, Result};

use crate::runner::BacktestResult;
use crate::sweep::SweepResults;

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Per-bar table.
///
/// Columns: date, close, short_ma, long_ma, signal, position, daily_return,
/// strategy_return, portfolio_value, drawdown. Undefined values are empty.
pub fn series_csv(result: &BacktestResult) -> Result<String> {
    let bt = &result.backtest;
    let drawdown = crosslab_core::metrics::drawdown_series(&bt.portfolio.portfolio_value);
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "close",
        "short_ma",
        "long_ma",
        "signal",
        "position",
        "daily_return",
        "strategy_return",
        "portfolio_value",
        "drawdown",
    ])?;

    for (i, bar) in result.bars.iter().enumerate() {
        wtr.write_record([
            bar.date.to_string(),
            num(bar.close),
            num(bt.signals.short_ma[i]),
            num(bt.signals.long_ma[i]),
            bt.signals.signal[i].to_string(),
            bt.signals.position[i]
                .map(|p| p.value().to_string())
                .unwrap_or_default(),
            num(bt.portfolio.daily_return[i]),
            num(bt.portfolio.strategy_return[i]),
            num(bt.portfolio.portfolio_value[i]),
            num(drawdown[i]),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn num(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else {
        format!("{x:.6}")
    }
}

// ─── Text ───────────────────────────────────────────────────────────

fn pct(x: f64) -> String {
    format!("{:.2}%", x * 100.0)
}

/// Human-readable run summary.
pub fn format_summary(result: &BacktestResult) -> String {
    let m = &result.backtest.metrics;
    let p = result.params();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}..{} ({} bars, {:?})",
        result.symbol, result.start_date, result.end_date, result.bar_count, result.source
    );
    let _ = writeln!(
        out,
        "SMA {}/{}  initial {:.2}",
        p.short_window, p.long_window, p.initial_investment
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  Total return:   {:>10}", pct(m.total_return));
    let _ = writeln!(out, "  CAGR:           {:>10}", pct(m.cagr));
    let _ = writeln!(out, "  Max drawdown:   {:>10}", pct(m.max_drawdown));
    let _ = writeln!(out, "  Final value:    {:>10.2}", m.final_value);
    let _ = writeln!(out, "  Buy and hold:   {:>10}", pct(result.benchmark_return));
    let _ = writeln!(out, "  Trades:         {:>10}", result.trade_count);

    if !result.markers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Crossovers:");
        for marker in &result.markers {
            let _ = writeln!(
                out,
                "  {}  {:<5}  {:.2}",
                marker.date,
                format!("{:?}", marker.change).to_lowercase(),
                result.bars[marker.index].close
            );
        }
    }

    for w in &result.data_quality_warnings {
        let _ = writeln!(out, "warning: {w}");
    }
    out
}

/// Sweep leaderboard, best first.
pub fn format_sweep(results: &SweepResults) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} {:>6} {:>6} {:>10} {:>10} {:>10} {:>7}",
        "#", "short", "long", "return", "cagr", "max_dd", "trades"
    );
    for (rank, e) in results.entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4} {:>6} {:>6} {:>10} {:>10} {:>10} {:>7}",
            rank + 1,
            e.params.short_window,
            e.params.long_window,
            pct(e.metrics.total_return),
            pct(e.metrics.cagr),
            pct(e.metrics.max_drawdown),
            e.trade_count
        );
    }
    for f in &results.failures {
        let _ = writeln!(
            out,
            "skipped {}/{}: {}",
            f.short_window, f.long_window, f.error
        );
    }
    out
}
