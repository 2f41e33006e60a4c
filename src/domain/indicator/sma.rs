//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), kept as a running window sum.
//! Warmup: first (n-1) points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> IndicatorSeries {
    if period == 0 || points.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(points.len());
    let mut window_sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        window_sum += point.close;
        if i >= period {
            window_sum -= points[i - period].close;
        }

        let valid = i >= period - 1;
        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value: if valid { window_sum / period as f64 } else { 0.0 },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
