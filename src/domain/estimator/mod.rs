//! Regression estimator seam.
//!
//! The pipeline only needs `fit` and `predict`; [`forest::RandomForestRegressor`]
//! is the bundled implementation, but any [`Estimator`] can be swapped in.

pub mod forest;
pub mod tree;

use serde::Serialize;

use crate::domain::error::StockcastError;
use crate::domain::signal::SignalRow;

pub const N_FEATURES: usize = 7;

pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "open",
    "high",
    "low",
    "volume",
    "sma_short",
    "sma_long",
    "ema_short",
];

/// Estimator input; the target is always the same row's close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub ema_short: f64,
}

impl FeatureRow {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.open,
            self.high,
            self.low,
            self.volume,
            self.sma_short,
            self.sma_long,
            self.ema_short,
        ]
    }
}

impl From<&SignalRow> for FeatureRow {
    fn from(row: &SignalRow) -> Self {
        Self {
            open: row.point.open,
            high: row.point.high,
            low: row.point.low,
            volume: row.point.volume as f64,
            sma_short: row.sma_short,
            sma_long: row.sma_long,
            ema_short: row.ema_short,
        }
    }
}

pub trait Predictor {
    fn predict(&self, row: &FeatureRow) -> f64;

    /// Relative weight of each feature in [`FEATURE_NAMES`] order, for models
    /// that track one.
    fn feature_importances(&self) -> Option<[f64; N_FEATURES]> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

/// Names the importances and orders them most important first; ties keep
/// feature order.
pub fn rank_importances(importances: &[f64; N_FEATURES]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = FEATURE_NAMES
        .iter()
        .zip(importances)
        .map(|(&feature, &importance)| FeatureImportance {
            feature,
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

pub trait Estimator {
    type Model: Predictor;

    fn fit(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<Self::Model, StockcastError>;
}

/// Builds feature rows and close targets from signal rows.
pub fn training_set(rows: &[SignalRow]) -> (Vec<FeatureRow>, Vec<f64>) {
    rows.iter()
        .map(|row| (FeatureRow::from(row), row.point.close))
        .unzip()
}

pub(crate) fn check_training_input(
    rows: &[FeatureRow],
    targets: &[f64],
) -> Result<(), StockcastError> {
    if rows.is_empty() {
        return Err(StockcastError::Estimator {
            reason: "no training rows".into(),
        });
    }
    if rows.len() != targets.len() {
        return Err(StockcastError::Estimator {
            reason: format!(
                "{} feature rows but {} targets",
                rows.len(),
                targets.len()
            ),
        });
    }
    if targets.iter().any(|t| !t.is_finite()) {
        return Err(StockcastError::Estimator {
            reason: "non-finite target".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_points;

    #[test]
    fn feature_order_matches_names() {
        let row = FeatureRow {
            open: 1.0,
            high: 2.0,
            low: 3.0,
            volume: 4.0,
            sma_short: 5.0,
            sma_long: 6.0,
            ema_short: 7.0,
        };
        assert_eq!(row.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(FEATURE_NAMES[3], "volume");
    }

    #[test]
    fn training_set_targets_close() {
        let points = make_points(&[10.0, 11.0]);
        let rows: Vec<SignalRow> = points
            .into_iter()
            .map(|p| SignalRow::new(p, 9.0, 9.5, 9.2))
            .collect();
        let (features, targets) = training_set(&rows);

        assert_eq!(targets, vec![10.0, 11.0]);
        assert_eq!(features[0].sma_long, 9.5);
        assert_eq!(features[1].volume, 1000.0);
    }

    #[test]
    fn importances_ranked_descending() {
        let ranked = rank_importances(&[0.1, 0.0, 0.0, 0.0, 0.2, 0.6, 0.1]);

        let names: Vec<&str> = ranked.iter().map(|f| f.feature).collect();
        assert_eq!(
            names,
            vec!["sma_long", "sma_short", "open", "ema_short", "high", "low", "volume"]
        );
        assert_eq!(ranked[0].importance, 0.6);
    }

    #[test]
    fn rejects_mismatched_input() {
        let row = FeatureRow {
            open: 1.0,
            high: 1.0,
            low: 1.0,
            volume: 1.0,
            sma_short: 1.0,
            sma_long: 1.0,
            ema_short: 1.0,
        };
        assert!(check_training_input(&[], &[]).is_err());
        assert!(check_training_input(&[row], &[1.0, 2.0]).is_err());
        assert!(check_training_input(&[row], &[f64::NAN]).is_err());
        assert!(check_training_input(&[row], &[1.0]).is_ok());
    }
}
