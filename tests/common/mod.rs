#![allow(dead_code)]

use chrono::NaiveDate;
use stockcast::domain::error::StockcastError;
pub use stockcast::domain::ohlcv::PricePoint;
use stockcast::ports::data_port::DataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StockcastError> {
        self.requests.borrow_mut().push(ticker.to_string());
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StockcastError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(date_str: &str, close: f64) -> PricePoint {
    PricePoint {
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One point per calendar day starting at `start_date`, closes taken in order.
pub fn points_from_closes(start_date: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + (i as i64 % 7) * 100,
        })
        .collect()
}

/// Linear uptrend: close = start_price + i.
pub fn generate_points(start_date: &str, count: usize, start_price: f64) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    points_from_closes(start_date, &closes)
}

/// Oscillating series that crosses its long average repeatedly.
pub fn generate_wave(start_date: &str, count: usize) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + 10.0 * (i as f64 / 4.0).sin() + i as f64 * 0.05)
        .collect();
    points_from_closes(start_date, &closes)
}

pub fn write_csv(dir: &std::path::Path, ticker: &str, points: &[PricePoint]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for p in points {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.date, p.open, p.high, p.low, p.close, p.volume
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", ticker)), content).unwrap();
}
