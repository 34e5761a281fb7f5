//! Error taxonomy for the numeric pipeline.
//!
//! NaN gaps are not errors. They flow through the derived series as
//! undefined values and are handled by each stage's documented policy.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    /// The series is empty, or too short for any return to be driven by a
    /// defined signal.
    #[error("insufficient data: {bars} bar(s) available, at least {required} required")]
    InsufficientData { bars: usize, required: usize },

    /// A window or the initial investment failed the positivity check.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl BacktestError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
