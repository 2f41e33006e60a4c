//! Moving-average indicators over closing price.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + window length
//! - `IndicatorSeries`: a time series of indicator values aligned with the input
//! - `IndicatorSet`: the three trend features attached to each price point

pub mod ema;
pub mod sma;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::domain::ohlcv::PricePoint;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, or `None` during warmup or past the end.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
        }
    }
}

/// Window lengths, in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_short: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 10,
            sma_long: 20,
            ema_short: 10,
        }
    }
}

impl IndicatorConfig {
    /// Number of leading points with at least one undefined indicator.
    pub fn warmup(&self) -> usize {
        self.sma_short
            .max(self.sma_long)
            .max(self.ema_short)
            .saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IndicatorSet {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub ema_short: Option<f64>,
}

impl IndicatorSet {
    /// All three indicators, or `None` if any is still in warmup.
    pub fn resolved(&self) -> Option<(f64, f64, f64)> {
        Some((self.sma_short?, self.sma_long?, self.ema_short?))
    }
}

/// Computes an `IndicatorSet` per point, aligned by index with `points`.
pub fn compute_indicator_sets(points: &[PricePoint], config: &IndicatorConfig) -> Vec<IndicatorSet> {
    let sma_short = sma::calculate_sma(points, config.sma_short);
    let sma_long = sma::calculate_sma(points, config.sma_long);
    let ema_short = ema::calculate_ema(points, config.ema_short);

    (0..points.len())
        .map(|i| IndicatorSet {
            sma_short: sma_short.value_at(i),
            sma_long: sma_long.value_at(i),
            ema_short: ema_short.value_at(i),
        })
        .collect()
}
