//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_ema(points: &[PricePoint], period: usize) -> IndicatorSeries {
    if period == 0 || points.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(points.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i < period - 1 {
            sum += point.close;
            values.push(IndicatorPoint {
                date: point.date,
                valid: false,
                value: 0.0,
            });
            continue;
        }

        if i == period - 1 {
            sum += point.close;
            ema = sum / period as f64;
        } else {
            ema = point.close * k + ema * (1.0 - k);
        }
        values.push(IndicatorPoint {
            date: point.date,
            valid: true,
            value: ema,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}
