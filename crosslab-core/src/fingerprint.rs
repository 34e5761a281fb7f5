//! Content hashes for determinism checks.
//!
//! - `dataset_hash`: BLAKE3 over every bar's date and close bit pattern.
//! - `result_hash`: BLAKE3 over the bit patterns of every derived series.
//!
//! Hashing raw `f64::to_bits` means two results compare equal only if they are
//! bit-identical, NaN payloads included.

use crate::domain::PriceSeries;
use crate::pipeline::Backtest;

/// Hex-encoded BLAKE3 digest of a price series.
pub fn dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.close.to_bits().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Hex-encoded BLAKE3 digest of all derived series of a backtest.
pub fn result_hash(backtest: &Backtest) -> String {
    let mut hasher = blake3::Hasher::new();
    let signals = &backtest.signals;
    let portfolio = &backtest.portfolio;

    update_f64s(&mut hasher, &signals.short_ma);
    update_f64s(&mut hasher, &signals.long_ma);
    hasher.update(&signals.signal);
    for p in &signals.position {
        // -1/0/+1 → 0/1/2, undefined → 3
        let byte = p.map_or(3, |c| (c.value() + 1) as u8);
        hasher.update(&[byte]);
    }
    update_f64s(&mut hasher, &portfolio.daily_return);
    update_f64s(&mut hasher, &portfolio.strategy_return);
    update_f64s(&mut hasher, &portfolio.portfolio_value);

    let m = &backtest.metrics;
    update_f64s(
        &mut hasher,
        &[m.cagr, m.max_drawdown, m.total_return, m.final_value],
    );
    hasher.finalize().to_hex().to_string()
}

fn update_f64s(hasher: &mut blake3::Hasher, values: &[f64]) {
    for v in values {
        hasher.update(&v.to_bits().to_le_bytes());
    }
}
