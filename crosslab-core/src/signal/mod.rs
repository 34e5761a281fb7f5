//! Signal layer — moving averages, long/flat signal, and position changes.
//!
//! Everything here is a pure function of the price series and the two window
//! sizes. Recomputing from the same inputs is bit-identical.

pub mod crossover;

pub use crossover::{generate_signals, position_changes, signal_from_averages, SignalEngine};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;

/// Difference between consecutive signal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionChange {
    /// Signal went 0 → 1 (golden cross).
    Entry,
    /// Signal went 1 → 0 (death cross).
    Exit,
    /// Signal unchanged.
    Hold,
}

impl PositionChange {
    pub fn from_diff(diff: i8) -> Self {
        match diff {
            d if d > 0 => PositionChange::Entry,
            d if d < 0 => PositionChange::Exit,
            _ => PositionChange::Hold,
        }
    }

    /// Numeric form: +1, -1 or 0.
    pub fn value(self) -> i8 {
        match self {
            PositionChange::Entry => 1,
            PositionChange::Exit => -1,
            PositionChange::Hold => 0,
        }
    }
}

/// A golden or death cross located on a specific bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverMarker {
    pub index: usize,
    pub date: NaiveDate,
    pub change: PositionChange,
}

/// Output of the signal stage, aligned 1:1 with the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub short_window: usize,
    pub long_window: usize,
    pub short_ma: Vec<f64>,
    pub long_ma: Vec<f64>,
    /// 1 = long, 0 = flat.
    pub signal: Vec<u8>,
    /// `None` at index 0, where there is no prior signal to diff against.
    pub position: Vec<Option<PositionChange>>,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }

    /// Entry and exit events in bar order. Hold bars are skipped.
    pub fn markers(&self, series: &PriceSeries) -> Vec<CrossoverMarker> {
        self.position
            .iter()
            .zip(series.bars())
            .enumerate()
            .filter_map(|(index, (change, bar))| match change {
                Some(c @ (PositionChange::Entry | PositionChange::Exit)) => Some(CrossoverMarker {
                    index,
                    date: bar.date,
                    change: *c,
                }),
                _ => None,
            })
            .collect()
    }

    /// Number of bars on which the signal was long.
    pub fn long_bars(&self) -> usize {
        self.signal.iter().filter(|&&s| s == 1).count()
    }
}
