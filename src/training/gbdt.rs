//! Gradient-boosted tree training.
//!
//! Squared-loss boosting: each round fits a tree to the current residual
//! gradients and adds its shrunken output to the running predictions. The
//! base score is the target mean.

use rand::seq::SliceRandom;

use crate::dataset::Dataset;
use crate::trees::{Aggregation, Forest};

use super::forest_trainer::tree_rng;
use super::grower::{GrowthParams, TreeGrower};

// =============================================================================
// GbdtParams
// =============================================================================

/// Parameters for gradient boosting.
#[derive(Clone, Debug)]
pub struct GbdtParams {
    /// Number of boosting rounds (trees).
    pub n_rounds: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,
    /// Per-tree growth parameters. The learning rate is applied on top of
    /// whatever shrinkage these carry.
    pub growth: GrowthParams,
    /// Fraction of rows sampled per round without replacement (1.0 = all).
    pub subsample: f32,
    /// Fraction of features considered at each split (1.0 = all).
    pub colsample: f32,
    /// Random seed.
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
            growth: GrowthParams {
                max_depth: 3,
                ..Default::default()
            },
            subsample: 1.0,
            colsample: 1.0,
            seed: 42,
        }
    }
}

// =============================================================================
// GbdtTrainer
// =============================================================================

/// Gradient boosting trainer.
pub struct GbdtTrainer {
    params: GbdtParams,
}

impl GbdtTrainer {
    /// Create a new trainer.
    pub fn new(params: GbdtParams) -> Self {
        Self { params }
    }

    /// Get reference to parameters.
    pub fn params(&self) -> &GbdtParams {
        &self.params
    }

    /// Train a boosted forest.
    ///
    /// Returns `None` for an empty dataset or a zero-round configuration.
    pub fn train(&self, data: &Dataset) -> Option<Forest> {
        let n_rows = data.n_samples();
        if n_rows == 0 || self.params.n_rounds == 0 {
            return None;
        }

        let targets = data.targets();
        let base_score = targets.iter().map(|&y| y as f64).sum::<f64>() / n_rows as f64;
        let base_score = base_score as f32;

        let mut growth = self.params.growth.clone();
        growth.learning_rate *= self.params.learning_rate;
        let grower = TreeGrower::new(data, growth).with_colsample(self.params.colsample);

        let mut predictions = vec![base_score; n_rows];
        let mut grads = vec![0.0f32; n_rows];
        let hess = vec![1.0f32; n_rows];

        let mut forest = Forest::new(Aggregation::Sum).with_base_score(base_score);

        let all_rows: Vec<u32> = (0..n_rows as u32).collect();
        let subsample_len = if self.params.subsample < 1.0 {
            (((n_rows as f32) * self.params.subsample).round() as usize).clamp(1, n_rows)
        } else {
            n_rows
        };

        for round in 0..self.params.n_rounds {
            // Squared loss: grad = pred - target, hess = 1.
            for (g, (&pred, &target)) in grads.iter_mut().zip(predictions.iter().zip(targets)) {
                *g = pred - target;
            }

            let mut rng = tree_rng(self.params.seed, round);
            let rows: Vec<u32> = if subsample_len < n_rows {
                let mut shuffled = all_rows.clone();
                shuffled.shuffle(&mut rng);
                shuffled.truncate(subsample_len);
                shuffled
            } else {
                all_rows.clone()
            };

            let tree = grower.grow(&rows, &grads, &hess, &mut rng);

            // A subsampled round still updates every row's prediction.
            for (i, pred) in predictions.iter_mut().enumerate() {
                *pred += tree.predict_row(&data.row(i));
            }

            forest.push_tree(tree);
        }

        Some(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::housing::{synthesize, SynthConfig};
    use crate::training::metrics::{Metric, Rmse};

    fn small_data() -> Dataset {
        synthesize(&SynthConfig {
            n_samples: 300,
            seed: 42,
        })
    }

    #[test]
    fn trains_requested_rounds() {
        let data = small_data();
        let params = GbdtParams {
            n_rounds: 15,
            ..Default::default()
        };

        let forest = GbdtTrainer::new(params).train(&data).unwrap();
        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.aggregation(), Aggregation::Sum);
        forest.validate().unwrap();
    }

    #[test]
    fn base_score_is_target_mean() {
        let data = small_data();
        let forest = GbdtTrainer::new(GbdtParams {
            n_rounds: 1,
            ..Default::default()
        })
        .train(&data)
        .unwrap();

        let mean = data.targets().iter().map(|&y| y as f64).sum::<f64>()
            / data.n_samples() as f64;
        assert!((forest.base_score() as f64 - mean).abs() < 1.0);
    }

    #[test]
    fn more_rounds_fit_better_in_sample() {
        let data = small_data();

        let rmse_of = |rounds: u32| {
            let forest = GbdtTrainer::new(GbdtParams {
                n_rounds: rounds,
                ..Default::default()
            })
            .train(&data)
            .unwrap();
            let preds: Vec<f32> = (0..data.n_samples())
                .map(|i| forest.predict_row(&data.row(i)))
                .collect();
            Rmse.compute(&preds, data.targets())
        };

        let short = rmse_of(5);
        let long = rmse_of(60);
        assert!(
            long < short,
            "60 rounds ({long}) should fit closer than 5 ({short})"
        );
    }

    #[test]
    fn subsampled_training_stays_valid() {
        let data = small_data();
        let params = GbdtParams {
            n_rounds: 10,
            subsample: 0.5,
            colsample: 0.75,
            ..Default::default()
        };

        let forest = GbdtTrainer::new(params).train(&data).unwrap();
        forest.validate().unwrap();

        let pred = forest.predict_row(&data.row(0));
        assert!(pred.is_finite());
    }

    #[test]
    fn same_seed_is_deterministic() {
        let data = small_data();
        let params = GbdtParams {
            n_rounds: 8,
            subsample: 0.8,
            ..Default::default()
        };

        let a = GbdtTrainer::new(params.clone()).train(&data).unwrap();
        let b = GbdtTrainer::new(params).train(&data).unwrap();

        let probe = data.row(3);
        assert_eq!(a.predict_row(&probe), b.predict_row(&probe));
    }
}
