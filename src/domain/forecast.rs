//! Fixed-horizon forward rollout.
//!
//! Each step predicts from the current feature row, then feeds the
//! prediction back as the next row's close and as every moving average.
//! The indicators are not recomputed from a rolling window; they collapse
//! to the predicted price.

use serde::Serialize;

use crate::domain::estimator::{FeatureRow, Predictor};
use crate::domain::signal::{classify, Signal, SignalRow};

pub const FORECAST_HORIZON: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub horizon_label: String,
    pub predicted_close: f64,
    pub signal: Signal,
}

pub fn horizon_label(step: usize) -> String {
    format!("Day {}", step)
}

/// Rolls `model` forward [`FORECAST_HORIZON`] steps from `last`.
pub fn rollout<P: Predictor>(model: &P, last: &SignalRow) -> Vec<ForecastRow> {
    rollout_from(model, FeatureRow::from(last))
}

pub fn rollout_from<P: Predictor>(model: &P, start: FeatureRow) -> Vec<ForecastRow> {
    let mut current = start;
    let mut rows = Vec::with_capacity(FORECAST_HORIZON);

    for step in 1..=FORECAST_HORIZON {
        let predicted = model.predict(&current);
        rows.push(ForecastRow {
            horizon_label: horizon_label(step),
            predicted_close: predicted,
            signal: classify(predicted, current.sma_long),
        });

        // open/high/low/volume carry over unchanged
        current = FeatureRow {
            sma_short: predicted,
            sma_long: predicted,
            ema_short: predicted,
            ..current
        };
    }

    rows
}

pub fn buy_count(forecast: &[ForecastRow]) -> usize {
    forecast.iter().filter(|r| r.signal == Signal::Buy).count()
}
