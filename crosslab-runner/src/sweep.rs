//! Parameter sweep over `(short, long)` window pairs.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crosslab_core::{BacktestParams, RiskMetrics};

use crate::data_loader::LoadedData;
use crate::runner::{run_on_series, RunError};

/// Window grid to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
}

impl ParamGrid {
    /// Short: 10, 20, 30. Long: 50, 100, 200.
    pub fn ma_crossover_default() -> Self {
        Self {
            short_windows: vec![10, 20, 30],
            long_windows: vec![50, 100, 200],
        }
    }

    /// Every pair with `short < long`, short-major.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &short in &self.short_windows {
            for &long in &self.long_windows {
                if short >= long {
                    continue;
                }
                pairs.push((short, long));
            }
        }
        pairs
    }

    pub fn size(&self) -> usize {
        self.pairs().len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub params: BacktestParams,
    pub metrics: RiskMetrics,
    pub trade_count: usize,
    pub result_hash: String,
}

/// A pair that could not be run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub short_window: usize,
    pub long_window: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepResults {
    /// Sorted by total return, best first.
    pub entries: Vec<SweepEntry>,
    pub failures: Vec<SweepFailure>,
}

impl SweepResults {
    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }
}

/// Run every grid pair against one series in parallel.
pub fn sweep(loaded: &LoadedData, grid: &ParamGrid, initial_investment: f64) -> SweepResults {
    let pairs = grid.pairs();
    debug!(symbol = %loaded.symbol, pairs = pairs.len(), "starting sweep");

    let outcomes: Vec<((usize, usize), Result<SweepEntry, RunError>)> = pairs
        .par_iter()
        .map(|&(short, long)| {
            let params = BacktestParams::new(short, long, initial_investment);
            let outcome = run_on_series(loaded, &params).map(|r| SweepEntry {
                params,
                metrics: r.backtest.metrics,
                trade_count: r.trade_count,
                result_hash: r.result_hash,
            });
            ((short, long), outcome)
        })
        .collect();

    let mut results = SweepResults::default();
    for ((short_window, long_window), outcome) in outcomes {
        match outcome {
            Ok(entry) => results.entries.push(entry),
            Err(e) => results.failures.push(SweepFailure {
                short_window,
                long_window,
                error: e.to_string(),
            }),
        }
    }
    results
        .entries
        .sort_by(|a, b| b.metrics.total_return.total_cmp(&a.metrics.total_return));

    info!(
        symbol = %loaded.symbol,
        ran = results.entries.len(),
        failed = results.failures.len(),
        "sweep complete"
    );
    results
}
