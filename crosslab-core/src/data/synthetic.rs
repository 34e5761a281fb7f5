//! Synthetic price generator for offline runs and demos.
//!
//! Produces a seeded random walk starting at 100.0 on weekdays. Results built
//! on this data are tagged `DataSource::Synthetic` and should never be read as
//! market evidence.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    /// Fixed seed. `None` derives the seed from the symbol name.
    seed: Option<u64>,
}

impl SyntheticProvider {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_seed(*blake3::hash(symbol.as_bytes()).as_bytes()),
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let mut rng = self.rng_for(symbol);
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: random_walk(&mut rng, start, end),
            source: DataSource::Synthetic,
        })
    }
}

/// Weekday random walk over `[start, end)` with daily moves in ±3%.
pub fn random_walk<R: Rng>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current < end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            bars.push(Bar::new(current, price));
        }
        current += Duration::days(1);
    }

    bars
}
