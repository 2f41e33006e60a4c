//! Held-out evaluation of a fitted model.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::estimator::{FeatureRow, Predictor};
use crate::domain::signal::SignalRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestPrediction {
    pub date: NaiveDate,
    pub actual_close: f64,
    pub predicted_close: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// Coefficient of determination; 0 when the actuals have no variance.
    pub r2: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self::default();
        }

        let pairs = || actual.iter().zip(predicted).take(n);
        let n_f = n as f64;

        let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / n_f;
        let ss_res: f64 = pairs().map(|(a, p)| (a - p).powi(2)).sum();
        let rmse = (ss_res / n_f).sqrt();

        let mean = actual[..n].iter().sum::<f64>() / n_f;
        let ss_tot: f64 = actual[..n].iter().map(|a| (a - mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            mae,
            rmse,
            r2,
            n_samples: n,
        }
    }
}

/// Predicts every test row's close and scores the predictions.
pub fn evaluate<P: Predictor>(model: &P, test: &[SignalRow]) -> (Vec<TestPrediction>, RegressionMetrics) {
    let predictions: Vec<TestPrediction> = test
        .iter()
        .map(|row| TestPrediction {
            date: row.point.date,
            actual_close: row.point.close,
            predicted_close: model.predict(&FeatureRow::from(row)),
        })
        .collect();

    let actual: Vec<f64> = predictions.iter().map(|p| p.actual_close).collect();
    let predicted: Vec<f64> = predictions.iter().map(|p| p.predicted_close).collect();
    let metrics = RegressionMetrics::calculate(&actual, &predicted);

    (predictions, metrics)
}
