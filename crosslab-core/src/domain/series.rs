//! PriceSeries — the validated, date-ordered input to every stage.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bar;

/// Structural problems that make a bar sequence unusable as a series.
///
/// NaN closes are not listed here: gaps are legal and propagate downstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bars out of order: {prev} is followed by {next}")]
    Unsorted { prev: NaiveDate, next: NaiveDate },

    #[error("duplicate bar date: {0}")]
    DuplicateDate(NaiveDate),

    #[error("non-gap close must be finite, got {close} on {date}")]
    NonFiniteClose { date: NaiveDate, close: f64 },

    #[error("close must be positive, got {close} on {date}")]
    NonPositiveClose { date: NaiveDate, close: f64 },
}

/// Ordered bars, strictly increasing by date.
///
/// Built once per backtest and only read afterwards; there is no mutating API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validate ordering and build a series. An empty vector is a valid (empty) series;
    /// the pipeline rejects it later with `InsufficientData`.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for pair in bars.windows(2) {
            let (prev, next) = (pair[0].date, pair[1].date);
            if next == prev {
                return Err(SeriesError::DuplicateDate(next));
            }
            if next < prev {
                return Err(SeriesError::Unsorted { prev, next });
            }
        }
        for bar in &bars {
            if bar.close.is_infinite() {
                return Err(SeriesError::NonFiniteClose {
                    date: bar.date,
                    close: bar.close,
                });
            }
            // Percent returns divide by the previous close.
            if bar.close <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    date: bar.date,
                    close: bar.close,
                });
            }
        }
        Ok(Self { bars })
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_daily_closes(start: NaiveDate, closes: &[f64]) -> Result<Self, SeriesError> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::new(start + Duration::days(i as i64), close))
            .collect();
        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in bar order, NaN for gaps.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Number of gap (NaN close) bars.
    pub fn gap_count(&self) -> usize {
        self.bars.iter().filter(|b| b.is_gap()).count()
    }

    /// Bars from index 0 up to (excluding) `len`. Used for look-ahead checks.
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            bars: self.bars[..len.min(self.bars.len())].to_vec(),
        }
    }
}

impl TryFrom<Vec<Bar>> for PriceSeries {
    type Error = SeriesError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<Bar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}
