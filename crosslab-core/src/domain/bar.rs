//! Bar — one daily close observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily close for a single symbol on a single day.
///
/// A `close` of `f64::NAN` marks a gap in the source feed. Gaps are carried
/// through every derived series rather than dropped or interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// Returns true if the close is missing (NaN).
    pub fn is_gap(&self) -> bool {
        self.close.is_nan()
    }
}
