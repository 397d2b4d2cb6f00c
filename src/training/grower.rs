//! Exact greedy regression tree grower.
//!
//! Grows one tree over gradient/hessian statistics. Both ensemble trainers
//! share this grower: bagged forests fit raw targets (grad = -target,
//! hess = 1, lambda = 0 makes leaves plain means), boosting fits residual
//! gradients of the squared loss.
//!
//! Split search sorts the candidate rows per feature and scans prefix sums,
//! evaluating the Newton gain
//! `0.5 * (GL²/(HL+λ) + GR²/(HR+λ) - G²/(H+λ))`
//! with missing values tried on both sides; the better side becomes the
//! node's default direction.

use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::dataset::Dataset;
use crate::trees::{NodeId, Tree, TreeBuilder};

// =============================================================================
// GrowthParams
// =============================================================================

/// Parameters controlling individual tree growth.
#[derive(Clone, Debug)]
pub struct GrowthParams {
    /// Maximum tree depth (root = depth 0).
    pub max_depth: u32,
    /// Minimum number of sampled rows on each side of a split.
    pub min_samples_leaf: usize,
    /// Minimum gain required to keep a split.
    pub min_gain: f32,
    /// L2 regularization on leaf values.
    pub reg_lambda: f32,
    /// Shrinkage applied to leaf values (1.0 = none).
    pub learning_rate: f32,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_leaf: 1,
            min_gain: 0.0,
            reg_lambda: 1.0,
            learning_rate: 1.0,
        }
    }
}

// =============================================================================
// TreeGrower
// =============================================================================

/// Grows a single tree over a dataset's feature columns.
pub struct TreeGrower<'a> {
    data: &'a Dataset,
    params: GrowthParams,
    /// Fraction of features considered at each split (1.0 = all).
    colsample: f32,
}

struct SplitCandidate {
    feature: u32,
    threshold: f32,
    default_left: bool,
    gain: f32,
}

impl<'a> TreeGrower<'a> {
    pub fn new(data: &'a Dataset, params: GrowthParams) -> Self {
        Self {
            data,
            params,
            colsample: 1.0,
        }
    }

    /// Set the per-split feature sampling fraction (builder pattern).
    pub fn with_colsample(mut self, colsample: f32) -> Self {
        debug_assert!((0.0..=1.0).contains(&colsample));
        self.colsample = colsample;
        self
    }

    /// Grow one tree.
    ///
    /// # Arguments
    ///
    /// * `rows` - Sampled row indices (may repeat for bootstrap samples)
    /// * `grads` / `hess` - Per-row gradient statistics, indexed by dataset row
    /// * `rng` - Feature sampling RNG
    pub fn grow(
        &self,
        rows: &[u32],
        grads: &[f32],
        hess: &[f32],
        rng: &mut Xoshiro256PlusPlus,
    ) -> Tree {
        debug_assert_eq!(grads.len(), self.data.n_samples());
        debug_assert_eq!(hess.len(), self.data.n_samples());

        let mut builder = TreeBuilder::new();
        let root = builder.reserve_node();
        self.grow_node(&mut builder, root, rows.to_vec(), 0, grads, hess, rng);
        builder.freeze()
    }

    #[allow(clippy::too_many_arguments)]
    fn grow_node(
        &self,
        builder: &mut TreeBuilder,
        node: NodeId,
        rows: Vec<u32>,
        depth: u32,
        grads: &[f32],
        hess: &[f32],
        rng: &mut Xoshiro256PlusPlus,
    ) {
        let (sum_grad, sum_hess) = rows.iter().fold((0.0f64, 0.0f64), |(g, h), &r| {
            (g + grads[r as usize] as f64, h + hess[r as usize] as f64)
        });

        let leaf_value = self.leaf_value(sum_grad, sum_hess);

        if depth >= self.params.max_depth
            || rows.len() < 2 * self.params.min_samples_leaf.max(1)
            || sum_hess <= 0.0
        {
            builder.make_leaf(node, leaf_value);
            return;
        }

        let candidate = self.find_best_split(&rows, sum_grad, sum_hess, grads, hess, rng);
        let Some(split) = candidate else {
            builder.make_leaf(node, leaf_value);
            return;
        };

        let (left_rows, right_rows) = self.partition(&rows, &split);
        // The split search enforces min_samples_leaf, so both sides are
        // non-empty; guard anyway against degenerate thresholds.
        if left_rows.is_empty() || right_rows.is_empty() {
            builder.make_leaf(node, leaf_value);
            return;
        }

        let left = builder.reserve_node();
        let right = builder.reserve_node();
        builder.make_split(
            node,
            split.feature,
            split.threshold,
            split.default_left,
            split.gain,
            left,
            right,
        );

        self.grow_node(builder, left, left_rows, depth + 1, grads, hess, rng);
        self.grow_node(builder, right, right_rows, depth + 1, grads, hess, rng);
    }

    #[inline]
    fn leaf_value(&self, sum_grad: f64, sum_hess: f64) -> f32 {
        let denom = sum_hess + self.params.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        (-(sum_grad / denom) * self.params.learning_rate as f64) as f32
    }

    /// Half the improvement in regularized loss from splitting.
    #[inline]
    fn gain(&self, gl: f64, hl: f64, gr: f64, hr: f64, g: f64, h: f64) -> f64 {
        let lambda = self.params.reg_lambda as f64;
        let score = |g: f64, h: f64| g * g / (h + lambda);
        0.5 * (score(gl, hl) + score(gr, hr) - score(g, h))
    }

    fn find_best_split(
        &self,
        rows: &[u32],
        sum_grad: f64,
        sum_hess: f64,
        grads: &[f32],
        hess: &[f32],
        rng: &mut Xoshiro256PlusPlus,
    ) -> Option<SplitCandidate> {
        let n_features = self.data.n_features();
        let features = self.sample_features(n_features, rng);

        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;

        // Reused per feature: (value, grad, hess) triples for finite rows.
        let mut sorted: Vec<(f32, f32, f32)> = Vec::with_capacity(rows.len());

        for feature in features {
            let column = self.data.column(feature as usize);

            sorted.clear();
            let mut missing_grad = 0.0f64;
            let mut missing_hess = 0.0f64;
            let mut n_missing = 0usize;

            for &r in rows {
                let r = r as usize;
                let value = column[r];
                if value.is_nan() {
                    missing_grad += grads[r] as f64;
                    missing_hess += hess[r] as f64;
                    n_missing += 1;
                } else {
                    sorted.push((value, grads[r], hess[r]));
                }
            }

            if sorted.len() < 2 {
                continue;
            }
            sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_grad = 0.0f64;
            let mut left_hess = 0.0f64;
            let mut n_left = 0usize;

            for i in 0..sorted.len() - 1 {
                let (value, g, h) = sorted[i];
                left_grad += g as f64;
                left_hess += h as f64;
                n_left += 1;

                let next_value = sorted[i + 1].0;
                if value == next_value {
                    continue;
                }

                let threshold = value + (next_value - value) * 0.5;
                if !(threshold > value) {
                    // Adjacent floats can collapse the midpoint onto the
                    // left value, which would route both sides identically.
                    continue;
                }

                let right_grad = sum_grad - missing_grad - left_grad;
                let right_hess = sum_hess - missing_hess - left_hess;
                let n_right = sorted.len() - n_left;

                // Try missing values on each side; pick the better default.
                for &missing_left in &[true, false] {
                    let (gl, hl, nl, gr, hr, nr) = if missing_left {
                        (
                            left_grad + missing_grad,
                            left_hess + missing_hess,
                            n_left + n_missing,
                            right_grad,
                            right_hess,
                            n_right,
                        )
                    } else {
                        (
                            left_grad,
                            left_hess,
                            n_left,
                            right_grad + missing_grad,
                            right_hess + missing_hess,
                            n_right + n_missing,
                        )
                    };

                    if nl < min_leaf || nr < min_leaf {
                        continue;
                    }

                    let gain = self.gain(gl, hl, gr, hr, sum_grad, sum_hess) as f32;
                    if gain <= self.params.min_gain {
                        continue;
                    }
                    if best.as_ref().map_or(true, |b| gain > b.gain) {
                        best = Some(SplitCandidate {
                            feature,
                            threshold,
                            default_left: missing_left,
                            gain,
                        });
                    }
                }
            }
        }

        best
    }

    fn partition(&self, rows: &[u32], split: &SplitCandidate) -> (Vec<u32>, Vec<u32>) {
        let column = self.data.column(split.feature as usize);
        let mut left = Vec::new();
        let mut right = Vec::new();

        for &r in rows {
            let value = column[r as usize];
            let goes_left = if value.is_nan() {
                split.default_left
            } else {
                value < split.threshold
            };
            if goes_left {
                left.push(r);
            } else {
                right.push(r);
            }
        }

        (left, right)
    }

    fn sample_features(&self, n_features: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<u32> {
        let mut features: Vec<u32> = (0..n_features as u32).collect();
        if self.colsample >= 1.0 {
            return features;
        }

        let k = ((n_features as f32 * self.colsample).round() as usize).clamp(1, n_features);
        features.shuffle(rng);
        features.truncate(k);
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, FeatureSchema, FieldSpec};
    use rand::SeedableRng;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    fn two_cluster_dataset() -> Dataset {
        // Feature 0 separates targets perfectly; feature 1 is constant noise.
        let schema = FeatureSchema::new(
            vec![FieldSpec::numeric("x0"), FieldSpec::numeric("x1")],
            "y",
        );
        Dataset::new(
            schema,
            vec![
                vec![0.0, 0.1, 0.2, 1.0, 1.1, 1.2],
                vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0],
            ],
            vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0],
        )
        .unwrap()
    }

    /// Fit raw targets: grad = -y, hess = 1, lambda = 0 makes leaves means.
    fn target_grads(data: &Dataset) -> (Vec<f32>, Vec<f32>) {
        let grads = data.targets().iter().map(|&y| -y).collect();
        let hess = vec![1.0; data.n_samples()];
        (grads, hess)
    }

    #[test]
    fn splits_on_the_informative_feature() {
        let data = two_cluster_dataset();
        let (grads, hess) = target_grads(&data);
        let rows: Vec<u32> = (0..data.n_samples() as u32).collect();

        let params = GrowthParams {
            reg_lambda: 0.0,
            ..Default::default()
        };
        let tree = TreeGrower::new(&data, params).grow(&rows, &grads, &hess, &mut rng());

        tree.validate().unwrap();
        assert!(!tree.is_leaf(0));
        assert_eq!(tree.split_index(0), 0);

        // Leaf values are cluster means.
        assert_eq!(tree.predict_row(&[0.1, 5.0]), 1.0);
        assert_eq!(tree.predict_row(&[1.1, 5.0]), 3.0);
    }

    #[test]
    fn constant_target_yields_single_leaf() {
        let schema = FeatureSchema::new(vec![FieldSpec::numeric("x")], "y");
        let data = Dataset::new(
            schema,
            vec![vec![1.0, 2.0, 3.0, 4.0]],
            vec![7.0, 7.0, 7.0, 7.0],
        )
        .unwrap();
        let (grads, hess) = target_grads(&data);
        let rows: Vec<u32> = (0..4).collect();

        let params = GrowthParams {
            reg_lambda: 0.0,
            ..Default::default()
        };
        let tree = TreeGrower::new(&data, params).grow(&rows, &grads, &hess, &mut rng());

        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(&[2.5]), 7.0);
    }

    #[test]
    fn max_depth_zero_is_a_stump_mean() {
        let data = two_cluster_dataset();
        let (grads, hess) = target_grads(&data);
        let rows: Vec<u32> = (0..data.n_samples() as u32).collect();

        let params = GrowthParams {
            max_depth: 0,
            reg_lambda: 0.0,
            ..Default::default()
        };
        let tree = TreeGrower::new(&data, params).grow(&rows, &grads, &hess, &mut rng());

        assert_eq!(tree.n_nodes(), 1);
        assert!((tree.predict_row(&[0.0, 0.0]) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn min_samples_leaf_limits_splits() {
        let data = two_cluster_dataset();
        let (grads, hess) = target_grads(&data);
        let rows: Vec<u32> = (0..data.n_samples() as u32).collect();

        let params = GrowthParams {
            min_samples_leaf: 4,
            reg_lambda: 0.0,
            ..Default::default()
        };
        let tree = TreeGrower::new(&data, params).grow(&rows, &grads, &hess, &mut rng());

        // 6 rows cannot produce two sides of >= 4.
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn missing_values_choose_a_default_side() {
        let schema = FeatureSchema::new(vec![FieldSpec::numeric("x")], "y");
        let data = Dataset::new(
            schema,
            vec![vec![0.0, 0.1, f32::NAN, 1.0, 1.1, f32::NAN]],
            vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0],
        )
        .unwrap();
        let (grads, hess) = target_grads(&data);
        let rows: Vec<u32> = (0..data.n_samples() as u32).collect();

        let params = GrowthParams {
            reg_lambda: 0.0,
            ..Default::default()
        };
        let tree = TreeGrower::new(&data, params).grow(&rows, &grads, &hess, &mut rng());

        tree.validate().unwrap();
        assert!(!tree.is_leaf(0));
        // A NaN probe routes to a leaf, not a panic, and lands on one of the
        // cluster means.
        let pred = tree.predict_row(&[f32::NAN]);
        assert!(pred.is_finite());
    }

    #[test]
    fn bootstrap_rows_may_repeat() {
        let data = two_cluster_dataset();
        let (grads, hess) = target_grads(&data);
        // Row 0 three times, row 5 three times.
        let rows = vec![0, 0, 0, 5, 5, 5];

        let params = GrowthParams {
            reg_lambda: 0.0,
            ..Default::default()
        };
        let tree = TreeGrower::new(&data, params).grow(&rows, &grads, &hess, &mut rng());

        tree.validate().unwrap();
        assert_eq!(tree.predict_row(&[0.0, 5.0]), 1.0);
        assert_eq!(tree.predict_row(&[1.2, 5.0]), 3.0);
    }

    #[test]
    fn colsample_restricts_candidate_features() {
        let data = two_cluster_dataset();
        let (grads, hess) = target_grads(&data);
        let rows: Vec<u32> = (0..data.n_samples() as u32).collect();

        let params = GrowthParams {
            reg_lambda: 0.0,
            ..Default::default()
        };
        // With half the features sampled, some seeds only see the constant
        // feature and produce a single-leaf tree; the informative seeds
        // still split on feature 0. Either way the tree stays valid.
        let grower = TreeGrower::new(&data, params).with_colsample(0.5);
        for seed in 0..8 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let tree = grower.grow(&rows, &grads, &hess, &mut rng);
            tree.validate().unwrap();
            if !tree.is_leaf(0) {
                assert_eq!(tree.split_index(0), 0);
            }
        }
    }
}
