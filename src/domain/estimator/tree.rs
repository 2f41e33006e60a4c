//! CART regression tree with variance-reduction splits.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::N_FEATURES;

pub type Sample = [f64; N_FEATURES];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Sum of squared errors of both children.
    sse: f64,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
    feature_importances: [f64; N_FEATURES],
}

impl RegressionTree {
    /// Grows a tree over `samples[indices]`. Indices may repeat (bootstrap).
    pub fn fit(
        samples: &[Sample],
        targets: &[f64],
        indices: &[usize],
        config: &TreeConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut builder = Builder {
            samples,
            targets,
            config,
            importances: [0.0; N_FEATURES],
        };
        let mut working = indices.to_vec();
        let root = builder.grow(&mut working, 0, rng);

        let mut feature_importances = builder.importances;
        let total: f64 = feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut feature_importances {
                *imp /= total;
            }
        }

        Self {
            root,
            feature_importances,
        }
    }

    pub fn predict_one(&self, sample: &Sample) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn feature_importances(&self) -> &[f64; N_FEATURES] {
        &self.feature_importances
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }
}

struct Builder<'a> {
    samples: &'a [Sample],
    targets: &'a [f64],
    config: &'a TreeConfig,
    importances: [f64; N_FEATURES],
}

impl Builder<'_> {
    fn grow(&mut self, indices: &mut [usize], depth: usize, rng: &mut ChaCha8Rng) -> Node {
        let n = indices.len();
        let (mean, sse) = self.mean_sse(indices);

        if depth >= self.config.max_depth || n < self.config.min_samples_split || sse < 1e-10 {
            return Node::Leaf { value: mean };
        }

        let Some(best) = self.find_best_split(indices, sse, rng) else {
            return Node::Leaf { value: mean };
        };

        self.importances[best.feature] += sse - best.sse;

        let (feature, threshold) = (best.feature, best.threshold);
        let samples = self.samples;
        let mid = partition_in_place(indices, |&i| samples[i][feature] <= threshold);
        let (left_idx, right_idx) = indices.split_at_mut(mid);

        let left = self.grow(left_idx, depth + 1, rng);
        let right = self.grow(right_idx, depth + 1, rng);

        Node::Split {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn mean_sse(&self, indices: &[usize]) -> (f64, f64) {
        if indices.is_empty() {
            return (0.0, 0.0);
        }
        let n = indices.len() as f64;
        let mean = indices.iter().map(|&i| self.targets[i]).sum::<f64>() / n;
        let sse = indices
            .iter()
            .map(|&i| (self.targets[i] - mean).powi(2))
            .sum();
        (mean, sse)
    }

    /// Sweeps each candidate feature in sorted order with running sums so a
    /// node costs O(features · n log n).
    fn find_best_split(
        &self,
        indices: &[usize],
        parent_sse: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..N_FEATURES).collect();
        if let Some(max) = self.config.max_features {
            features.shuffle(rng);
            features.truncate(max.clamp(1, N_FEATURES));
        }

        let min_leaf = self.config.min_samples_leaf.max(1);
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.targets[i].powi(2)).sum();

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();

        for &feature in &features {
            sorted.sort_by(|&a, &b| self.samples[a][feature].total_cmp(&self.samples[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let y = self.targets[sorted[k]];
                left_sum += y;
                left_sq += y * y;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let here = self.samples[sorted[k]][feature];
                let next = self.samples[sorted[k + 1]][feature];
                if here >= next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                let improves = sse < parent_sse - 1e-12;
                let beats_best = best.is_none_or(|b| sse < b.sse);
                if improves && beats_best {
                    best = Some(BestSplit {
                        feature,
                        threshold: (here + next) / 2.0,
                        sse,
                    });
                }
            }
        }

        best
    }
}

/// Moves elements matching `pred` to the front; returns how many matched.
fn partition_in_place<F>(items: &mut [usize], pred: F) -> usize
where
    F: Fn(&usize) -> bool,
{
    let mut next = 0;
    for i in 0..items.len() {
        if pred(&items[i]) {
            items.swap(next, i);
            next += 1;
        }
    }
    next
}
