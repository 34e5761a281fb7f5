//! Price acquisition: providers that turn a symbol and date range into bars.
//!
//! Providers sit outside the numeric pipeline. Their output goes through
//! [`FetchResult::into_series`] before anything downstream sees it.

pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
