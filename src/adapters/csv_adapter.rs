//! CSV file data adapter.
//!
//! One file per ticker, `<base_path>/<TICKER>.csv`, with a header row.
//! File stems match tickers case-insensitively, and `list_tickers` reports
//! them upper-cased so every listed ticker loads.
//! Columns are located by (case-insensitive) header name, so both
//! `date,open,high,low,close,volume` and Yahoo-style exports with an extra
//! `Adj Close` column load.

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        let exact = self.base_path.join(format!("{}.csv", ticker));
        if exact.is_file() {
            return exact;
        }
        self.csv_files()
            .into_iter()
            .find(|(stem, _)| stem.eq_ignore_ascii_case(ticker))
            .map(|(_, path)| path)
            .unwrap_or(exact)
    }

    /// `(stem, path)` for every `.csv` file in the base directory.
    fn csv_files(&self) -> Vec<(String, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.base_path) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_csv(path))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_string_lossy().into_owned();
                Some((stem, path))
            })
            .collect()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn malformed(ticker: &str, reason: String) -> StockcastError {
    StockcastError::MalformedSeries {
        ticker: ticker.to_string(),
        reason,
    }
}

fn column_positions(ticker: &str, headers: &csv::StringRecord) -> Result<[usize; 6], StockcastError> {
    let mut positions = [0usize; 6];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| malformed(ticker, format!("missing {} column", name)))?;
    }
    Ok(positions)
}

fn parse_number(
    ticker: &str,
    record: &csv::StringRecord,
    position: usize,
    name: &str,
) -> Result<f64, StockcastError> {
    record
        .get(position)
        .ok_or_else(|| malformed(ticker, format!("missing {} value", name)))?
        .trim()
        .parse()
        .map_err(|e| malformed(ticker, format!("invalid {} value: {}", name, e)))
}

/// Whole-share volume. Accepts `1200` and `1200.0`; fractional, negative or
/// out-of-range values are rejected rather than truncated.
fn parse_volume(
    ticker: &str,
    record: &csv::StringRecord,
    position: usize,
) -> Result<i64, StockcastError> {
    let raw = record
        .get(position)
        .ok_or_else(|| malformed(ticker, "missing volume value".into()))?
        .trim();
    if let Ok(volume) = raw.parse::<i64>() {
        if volume < 0 {
            return Err(malformed(ticker, format!("negative volume: {}", raw)));
        }
        return Ok(volume);
    }
    let value = parse_number(ticker, record, position, "volume")?;
    if value.fract() != 0.0 || value < 0.0 || value >= i64::MAX as f64 {
        return Err(malformed(ticker, format!("invalid volume value: {}", raw)));
    }
    Ok(value as i64)
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StockcastError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| StockcastError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| malformed(ticker, format!("CSV header error: {}", e)))?
            .clone();
        let [date_col, open_col, high_col, low_col, close_col, volume_col] =
            column_positions(ticker, &headers)?;

        let mut points = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| malformed(ticker, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(date_col)
                .ok_or_else(|| malformed(ticker, "missing date value".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| malformed(ticker, format!("invalid date format: {}", e)))?;

            if date < start_date || date > end_date {
                continue;
            }

            points.push(PricePoint {
                date,
                open: parse_number(ticker, &record, open_col, "open")?,
                high: parse_number(ticker, &record, high_col, "high")?,
                low: parse_number(ticker, &record, low_col, "low")?,
                close: parse_number(ticker, &record, close_col, "close")?,
                volume: parse_volume(ticker, &record, volume_col)?,
            });
        }

        points.sort_by_key(|p| p.date);
        tracing::debug!(ticker, path = %path.display(), points = points.len(), "loaded CSV series");
        Ok(points)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut tickers = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if is_csv(&path) {
                if let Some(stem) = path.file_stem() {
                    tickers.push(stem.to_string_lossy().to_uppercase());
                }
            }
        }

        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}
