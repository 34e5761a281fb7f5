//! CrossLab Core — price series, MA crossover signal, portfolio simulation, risk metrics.
//!
//! The numeric pipeline is strictly linear and pure:
//! - `domain`: bars and the validated `PriceSeries`
//! - `signal`: short/long SMA, long/flat signal, position changes
//! - `portfolio`: daily and lagged strategy returns, compounded portfolio value
//! - `metrics`: CAGR, max drawdown, total return, final value
//! - `pipeline`: the four stages wired together with validation
//!
//! Around it sit `data` (price providers), `fingerprint` (BLAKE3 hashes for
//! determinism checks) and `sentiment` (headline keyword tagging).

pub mod data;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod metrics;
pub mod params;
pub mod pipeline;
pub mod portfolio;
pub mod sentiment;
pub mod signal;

pub use domain::{Bar, PriceSeries, SeriesError};
pub use error::BacktestError;
pub use metrics::RiskMetrics;
pub use params::BacktestParams;
pub use pipeline::{run_backtest, Backtest};
pub use portfolio::{PortfolioFrame, PortfolioSimulator};
pub use signal::{PositionChange, SignalEngine, SignalFrame};
