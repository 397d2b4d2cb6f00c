//! Bagged random forest training.
//!
//! Each tree is grown on a bootstrap sample of the rows and averages into
//! the final prediction. Trees are independent, so they grow in parallel
//! when a parallel [`Parallelism`] is passed in.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::dataset::Dataset;
use crate::trees::{Aggregation, Forest};
use crate::utils::Parallelism;

use super::grower::{GrowthParams, TreeGrower};

// =============================================================================
// ForestParams
// =============================================================================

/// Parameters for random forest training.
#[derive(Clone, Debug)]
pub struct ForestParams {
    /// Number of trees in the forest.
    pub n_trees: u32,
    /// Per-tree growth parameters.
    pub growth: GrowthParams,
    /// Fraction of features considered at each split (1.0 = all).
    pub colsample: f32,
    /// Draw a bootstrap sample per tree. With `false` every tree sees all
    /// rows and only column sampling decorrelates members.
    pub bootstrap: bool,
    /// Random seed.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            growth: GrowthParams {
                max_depth: 10,
                // Unregularized leaves are plain target means.
                reg_lambda: 0.0,
                ..Default::default()
            },
            colsample: 1.0,
            bootstrap: true,
            seed: 42,
        }
    }
}

// =============================================================================
// ForestTrainer
// =============================================================================

/// Random forest trainer.
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    /// Create a new trainer.
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    /// Get reference to parameters.
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Train a forest.
    ///
    /// Returns `None` for an empty dataset or a zero-tree configuration.
    pub fn train(&self, data: &Dataset, parallelism: Parallelism) -> Option<Forest> {
        let n_rows = data.n_samples();
        if n_rows == 0 || self.params.n_trees == 0 {
            return None;
        }

        // Fitting raw targets: grad = -y, hess = 1 makes each leaf the mean
        // target of its rows (reg_lambda 0).
        let grads: Vec<f32> = data.targets().iter().map(|&y| -y).collect();
        let hess = vec![1.0f32; n_rows];

        let grower =
            TreeGrower::new(data, self.params.growth.clone()).with_colsample(self.params.colsample);

        let trees = parallelism.maybe_par_map(0..self.params.n_trees, |tree_idx| {
            let mut rng = tree_rng(self.params.seed, tree_idx);

            let rows: Vec<u32> = if self.params.bootstrap {
                (0..n_rows)
                    .map(|_| rng.gen_range(0..n_rows) as u32)
                    .collect()
            } else {
                (0..n_rows as u32).collect()
            };

            grower.grow(&rows, &grads, &hess, &mut rng)
        });

        let mut forest = Forest::new(Aggregation::Average);
        for tree in trees {
            forest.push_tree(tree);
        }
        Some(forest)
    }
}

/// Derive a per-tree RNG so trees stay independent of iteration order.
pub(crate) fn tree_rng(seed: u64, tree_idx: u32) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed ^ (0x9E37_79B9_7F4A_7C15u64.wrapping_mul(tree_idx as u64 + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::housing::{synthesize, SynthConfig};
    use crate::training::metrics::{Metric, Rmse};

    fn small_data() -> crate::dataset::Dataset {
        synthesize(&SynthConfig {
            n_samples: 300,
            seed: 42,
        })
    }

    #[test]
    fn trains_requested_number_of_trees() {
        let data = small_data();
        let params = ForestParams {
            n_trees: 10,
            ..Default::default()
        };

        let forest = ForestTrainer::new(params)
            .train(&data, Parallelism::Sequential)
            .unwrap();

        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.aggregation(), Aggregation::Average);
        forest.validate().unwrap();
    }

    #[test]
    fn rejects_empty_dataset() {
        let schema = data_schema();
        let data = crate::dataset::Dataset::new(
            schema,
            vec![Vec::new(), Vec::new()],
            Vec::new(),
        )
        .unwrap();

        let result = ForestTrainer::new(ForestParams::default())
            .train(&data, Parallelism::Sequential);
        assert!(result.is_none());
    }

    fn data_schema() -> crate::dataset::FeatureSchema {
        crate::dataset::FeatureSchema::new(
            vec![
                crate::dataset::FieldSpec::numeric("a"),
                crate::dataset::FieldSpec::numeric("b"),
            ],
            "y",
        )
    }

    #[test]
    fn forest_beats_mean_predictor() {
        let data = small_data();
        let params = ForestParams {
            n_trees: 30,
            ..Default::default()
        };
        let forest = ForestTrainer::new(params)
            .train(&data, Parallelism::Sequential)
            .unwrap();

        let mean =
            data.targets().iter().sum::<f32>() / data.n_samples() as f32;
        let preds: Vec<f32> = (0..data.n_samples())
            .map(|i| forest.predict_row(&data.row(i)))
            .collect();
        let mean_preds = vec![mean; data.n_samples()];

        let model_rmse = Rmse.compute(&preds, data.targets());
        let mean_rmse = Rmse.compute(&mean_preds, data.targets());
        assert!(
            model_rmse < mean_rmse,
            "forest rmse {model_rmse} should beat mean rmse {mean_rmse}"
        );
    }

    #[test]
    fn same_seed_same_forest() {
        let data = small_data();
        let params = ForestParams {
            n_trees: 5,
            ..Default::default()
        };

        let a = ForestTrainer::new(params.clone())
            .train(&data, Parallelism::Sequential)
            .unwrap();
        let b = ForestTrainer::new(params)
            .train(&data, Parallelism::Parallel)
            .unwrap();

        // Per-tree RNG derivation makes results independent of scheduling.
        let probe = data.row(0);
        assert_eq!(a.predict_row(&probe), b.predict_row(&probe));
        assert_eq!(a.tree_predictions(&probe), b.tree_predictions(&probe));
    }
}
