//! CSV import — `date,close` files exported from spreadsheets or brokers.
//!
//! Header names are matched case-insensitively. The date column is `date`
//! (or `datetime`/`timestamp`); only the leading `YYYY-MM-DD` is read. The
//! close column is `adj close`/`adj_close` when adjusted closes are preferred
//! and present, otherwise `close`. Empty, `null`, `NaN` and `NA` closes become
//! gaps. Extra columns are ignored.

use chrono::NaiveDate;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

const DATE_COLUMNS: &[&str] = &["date", "datetime", "timestamp"];
const ADJ_CLOSE_COLUMNS: &[&str] = &["adj close", "adj_close", "adjclose"];
const CLOSE_COLUMNS: &[&str] = &["close"];
const GAP_TOKENS: &[&str] = &["", "null", "nan", "na", "n/a", "-"];

/// Reads one symbol's closes from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
    prefer_adjusted: bool,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            prefer_adjusted: true,
        }
    }

    pub fn with_prefer_adjusted(mut self, prefer_adjusted: bool) -> Self {
        self.prefer_adjusted = prefer_adjusted;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let file = std::fs::File::open(&self.path)?;
        let bars = read_bars(file, self.prefer_adjusted)?
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}

/// Parse bars from any CSV reader. Rows are returned in file order.
pub fn read_bars<R: Read>(reader: R, prefer_adjusted: bool) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let date_idx = find(DATE_COLUMNS).ok_or(DataError::MissingColumn("date"))?;
    let adj_idx = find(ADJ_CLOSE_COLUMNS);
    let close_idx = match (prefer_adjusted, adj_idx, find(CLOSE_COLUMNS)) {
        (true, Some(adj), _) => adj,
        (_, _, Some(close)) => close,
        (false, Some(adj), None) => adj,
        _ => return Err(DataError::MissingColumn("close")),
    };

    let mut bars = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        let raw_date = record.get(date_idx).unwrap_or("");
        if raw_date.is_empty() {
            continue;
        }
        let date = parse_date(raw_date).ok_or_else(|| DataError::Parse {
            line,
            field: "date",
            value: raw_date.to_string(),
        })?;

        let raw_close = record.get(close_idx).unwrap_or("");
        let close = parse_close(raw_close).ok_or_else(|| DataError::Parse {
            line,
            field: "close",
            value: raw_close.to_string(),
        })?;

        bars.push(Bar::new(date, close));
    }

    Ok(bars)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_close(raw: &str) -> Option<f64> {
    if GAP_TOKENS.contains(&raw.to_ascii_lowercase().as_str()) {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
