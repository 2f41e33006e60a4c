//! Daily OHLCV price point.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::error::StockcastError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Checks that a fetched series is usable: non-empty, finite prices and
/// strictly increasing dates (one point per trading day).
pub fn validate_series(ticker: &str, points: &[PricePoint]) -> Result<(), StockcastError> {
    if points.is_empty() {
        return Err(StockcastError::NoData {
            ticker: ticker.to_string(),
        });
    }

    for (i, point) in points.iter().enumerate() {
        let prices = [
            ("open", point.open),
            ("high", point.high),
            ("low", point.low),
            ("close", point.close),
        ];
        if let Some((field, _)) = prices.iter().find(|(_, v)| !v.is_finite()) {
            return Err(StockcastError::MalformedSeries {
                ticker: ticker.to_string(),
                reason: format!("non-finite {} on {}", field, point.date),
            });
        }
        if i > 0 && point.date <= points[i - 1].date {
            return Err(StockcastError::MalformedSeries {
                ticker: ticker.to_string(),
                reason: format!(
                    "dates not strictly increasing at {} (previous {})",
                    point.date,
                    points[i - 1].date
                ),
            });
        }
    }

    Ok(())
}
