//! Yahoo Finance data adapter (`yahoo` feature).
//!
//! Fetches daily bars from the v8 chart API. Network, HTTP and parse
//! failures all surface as `StockcastError::Fetch`; an unknown symbol is
//! reported the same way. Retry policy is left to the caller.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::error::StockcastError;
use crate::domain::ohlcv::PricePoint;
use crate::ports::data_port::DataPort;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, StockcastError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, StockcastError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) stockcast")
            .build()
            .map_err(|e| StockcastError::Fetch {
                ticker: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }
}

fn fetch_error(ticker: &str, reason: String) -> StockcastError {
    StockcastError::Fetch {
        ticker: ticker.to_string(),
        reason,
    }
}

/// Converts a chart response to price points, skipping days with no close.
pub(crate) fn parse_response(
    ticker: &str,
    resp: ChartResponse,
) -> Result<Vec<PricePoint>, StockcastError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => {
            return Err(fetch_error(ticker, format!("{}: {}", err.code, err.description)));
        }
        (Some(result), None) => result,
        (None, None) => return Err(fetch_error(ticker, "empty chart result".into())),
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| fetch_error(ticker, "chart result array is empty".into()))?;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| fetch_error(ticker, "no quote data".into()))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| fetch_error(ticker, format!("invalid timestamp: {ts}")))?;

        points.push(PricePoint {
            date,
            open: quote.open.get(i).copied().flatten().unwrap_or(close),
            high: quote.high.get(i).copied().flatten().unwrap_or(close),
            low: quote.low.get(i).copied().flatten().unwrap_or(close),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    Ok(points)
}

impl DataPort for YahooAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, StockcastError> {
        let url = Self::chart_url(ticker, start_date, end_date);
        tracing::info!(ticker, %url, "requesting Yahoo chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| fetch_error(ticker, format!("request failed: {e}")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(fetch_error(ticker, "unknown ticker".into()));
        }
        if !status.is_success() {
            return Err(fetch_error(ticker, format!("HTTP {status}")));
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| fetch_error(ticker, format!("unexpected response format: {e}")))?;
        parse_response(ticker, body)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StockcastError> {
        Ok(Vec::new())
    }
}
