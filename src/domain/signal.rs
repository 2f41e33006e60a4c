//! Per-row BUY/SELL classification from close vs. the long SMA.

use serde::Serialize;
use std::fmt;

use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::PricePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Signal {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
        }
    }
}

/// BUY iff `close > sma_long`; equality is SELL.
pub fn classify(close: f64, sma_long: f64) -> Signal {
    if close > sma_long {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

/// A price point with fully resolved indicators and its signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub point: PricePoint,
    pub sma_short: f64,
    pub sma_long: f64,
    pub ema_short: f64,
    pub signal: Signal,
    pub buy_marker: Option<f64>,
    pub sell_marker: Option<f64>,
}

impl SignalRow {
    pub fn new(point: PricePoint, sma_short: f64, sma_long: f64, ema_short: f64) -> Self {
        let signal = classify(point.close, sma_long);
        let (buy_marker, sell_marker) = match signal {
            Signal::Buy => (Some(point.close), None),
            Signal::Sell => (None, Some(point.close)),
        };
        Self {
            point,
            sma_short,
            sma_long,
            ema_short,
            signal,
            buy_marker,
            sell_marker,
        }
    }

    pub fn close(&self) -> f64 {
        self.point.close
    }
}

/// Zips points with their indicator sets and drops rows still in warmup.
///
/// `points` and `indicators` must be index-aligned; extra entries on either
/// side are ignored.
pub fn generate_signals(points: &[PricePoint], indicators: &[IndicatorSet]) -> Vec<SignalRow> {
    points
        .iter()
        .zip(indicators)
        .filter_map(|(point, set)| {
            let (sma_short, sma_long, ema_short) = set.resolved()?;
            Some(SignalRow::new(point.clone(), sma_short, sma_long, ema_short))
        })
        .collect()
}
