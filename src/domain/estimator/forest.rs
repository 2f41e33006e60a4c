//! Bagged ensemble of regression trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::{RegressionTree, Sample, TreeConfig};
use super::{check_training_input, Estimator, FeatureRow, Predictor, N_FEATURES};
use crate::domain::error::StockcastError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub tree: TreeConfig,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeConfig::default(),
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RandomForestRegressor {
    pub config: ForestConfig,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Clone)]
pub struct ForestModel {
    trees: Vec<RegressionTree>,
    feature_importances: [f64; N_FEATURES],
}

impl Predictor for ForestModel {
    fn predict(&self, row: &FeatureRow) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sample = row.to_array();
        let total: f64 = self.trees.iter().map(|t| t.predict_one(&sample)).sum();
        total / self.trees.len() as f64
    }

    /// Mean impurity decrease per feature, summing to 1 when any split exists.
    fn feature_importances(&self) -> Option<[f64; N_FEATURES]> {
        Some(self.feature_importances)
    }
}

impl Estimator for RandomForestRegressor {
    type Model = ForestModel;

    fn fit(&self, rows: &[FeatureRow], targets: &[f64]) -> Result<ForestModel, StockcastError> {
        check_training_input(rows, targets)?;
        if self.config.n_trees == 0 {
            return Err(StockcastError::Estimator {
                reason: "n_trees must be at least 1".into(),
            });
        }

        let samples: Vec<Sample> = rows.iter().map(FeatureRow::to_array).collect();
        let n = samples.len();
        let config = self.config;

        // each tree owns its seed, so parallel and sequential builds agree
        let trees: Vec<RegressionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(&samples, targets, &indices, &config.tree, &mut rng)
            })
            .collect();

        let mut feature_importances = [0.0; N_FEATURES];
        for tree in &trees {
            for (acc, imp) in feature_importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        let total: f64 = feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut feature_importances {
                *imp /= total;
            }
        }

        tracing::debug!(
            trees = trees.len(),
            deepest = trees.iter().map(RegressionTree::depth).max().unwrap_or(0),
            samples = n,
            seed = config.seed,
            "random forest fitted"
        );

        Ok(ForestModel {
            trees,
            feature_importances,
        })
    }
}
