//! Ridge-regularized linear model via cyclic coordinate descent.
//!
//! Features are standardized internally; the fitted weights are folded back
//! to the original scale so prediction is a plain dot product. The
//! per-feature standard deviations are kept on the model because
//! `|standardized weight|` is its importance score.

use crate::dataset::Dataset;

// =============================================================================
// LinearParams
// =============================================================================

/// Parameters for linear model training.
#[derive(Clone, Debug)]
pub struct LinearParams {
    /// Number of full coordinate descent sweeps.
    pub n_sweeps: u32,
    /// L2 regularization strength (in standardized space).
    pub reg_lambda: f32,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            n_sweeps: 50,
            reg_lambda: 1.0,
        }
    }
}

// =============================================================================
// LinearModel
// =============================================================================

/// A fitted linear model on original feature scale.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    /// Per-feature weights (original scale).
    weights: Vec<f32>,
    /// Intercept.
    bias: f32,
    /// Per-feature standard deviations observed at fit time.
    feature_std: Vec<f32>,
}

impl LinearModel {
    /// Reassemble a model from its parts (artifact loading).
    pub fn from_parts(weights: Vec<f32>, bias: f32, feature_std: Vec<f32>) -> Self {
        debug_assert_eq!(weights.len(), feature_std.len());
        Self {
            weights,
            bias,
            feature_std,
        }
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Per-feature weights (original scale).
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Intercept.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Per-feature standard deviations observed at fit time.
    pub fn feature_std(&self) -> &[f32] {
        &self.feature_std
    }

    /// Predict a single row.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        debug_assert_eq!(features.len(), self.weights.len());
        let dot: f32 = self
            .weights
            .iter()
            .zip(features)
            .map(|(&w, &x)| w * x)
            .sum();
        self.bias + dot
    }

    /// Scale-free importance per feature: `|weight| * std`.
    pub fn importance(&self) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.feature_std)
            .map(|(&w, &s)| (w * s).abs())
            .collect()
    }
}

// =============================================================================
// LinearTrainer
// =============================================================================

/// Linear model trainer.
pub struct LinearTrainer {
    params: LinearParams,
}

impl LinearTrainer {
    /// Create a new trainer.
    pub fn new(params: LinearParams) -> Self {
        Self { params }
    }

    /// Get reference to parameters.
    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    /// Train a linear model.
    ///
    /// Returns `None` for an empty dataset.
    pub fn train(&self, data: &Dataset) -> Option<LinearModel> {
        let n_rows = data.n_samples();
        let n_features = data.n_features();
        if n_rows == 0 {
            return None;
        }

        // Standardize columns; constant columns keep weight 0.
        let mut means = vec![0.0f64; n_features];
        let mut stds = vec![0.0f64; n_features];
        let mut standardized: Vec<Vec<f32>> = Vec::with_capacity(n_features);

        for j in 0..n_features {
            let col = data.column(j);
            let mean = col.iter().map(|&x| x as f64).sum::<f64>() / n_rows as f64;
            let var = col
                .iter()
                .map(|&x| {
                    let d = x as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n_rows as f64;
            let std = var.sqrt();

            means[j] = mean;
            stds[j] = std;
            if std > 0.0 {
                standardized.push(col.iter().map(|&x| ((x as f64 - mean) / std) as f32).collect());
            } else {
                standardized.push(vec![0.0; n_rows]);
            }
        }

        let bias0 = data.targets().iter().map(|&y| y as f64).sum::<f64>() / n_rows as f64;
        let mut residuals: Vec<f64> = data
            .targets()
            .iter()
            .map(|&y| y as f64 - bias0)
            .collect();
        let mut weights = vec![0.0f64; n_features];
        let lambda = self.params.reg_lambda as f64;

        for _ in 0..self.params.n_sweeps {
            for j in 0..n_features {
                if stds[j] == 0.0 {
                    continue;
                }
                let col = &standardized[j];

                let (dot, sq) = col.iter().zip(residuals.iter()).fold(
                    (0.0f64, 0.0f64),
                    |(dot, sq), (&x, &r)| {
                        let x = x as f64;
                        (dot + x * (r + weights[j] * x), sq + x * x)
                    },
                );

                let new_weight = dot / (sq + lambda);
                let delta = new_weight - weights[j];
                if delta != 0.0 {
                    for (r, &x) in residuals.iter_mut().zip(col.iter()) {
                        *r -= delta * x as f64;
                    }
                    weights[j] = new_weight;
                }
            }
        }

        // Fold standardization back into original-scale weights.
        let mut orig_weights = vec![0.0f32; n_features];
        let mut bias = bias0;
        for j in 0..n_features {
            if stds[j] > 0.0 {
                let w = weights[j] / stds[j];
                orig_weights[j] = w as f32;
                bias -= w * means[j];
            }
        }

        Some(LinearModel {
            weights: orig_weights,
            bias: bias as f32,
            feature_std: stds.iter().map(|&s| s as f32).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, FeatureSchema, FieldSpec};
    use approx::assert_abs_diff_eq;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(
            names.iter().map(|&n| FieldSpec::numeric(n)).collect(),
            "y",
        )
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        // y = 2x0 - 3x1 + 5, no noise
        let x0: Vec<f32> = (0..50).map(|i| i as f32 / 5.0).collect();
        let x1: Vec<f32> = (0..50).map(|i| ((i * 7) % 13) as f32).collect();
        let y: Vec<f32> = x0
            .iter()
            .zip(&x1)
            .map(|(&a, &b)| 2.0 * a - 3.0 * b + 5.0)
            .collect();
        let data = Dataset::new(schema(&["x0", "x1"]), vec![x0, x1], y).unwrap();

        let model = LinearTrainer::new(LinearParams {
            n_sweeps: 200,
            reg_lambda: 1e-6,
        })
        .train(&data)
        .unwrap();

        assert_abs_diff_eq!(model.weights()[0], 2.0, epsilon = 1e-2);
        assert_abs_diff_eq!(model.weights()[1], -3.0, epsilon = 1e-2);
        assert_abs_diff_eq!(model.bias(), 5.0, epsilon = 0.1);

        let pred = model.predict_row(&[1.0, 2.0]);
        assert_abs_diff_eq!(pred, 1.0, epsilon = 0.1);
    }

    #[test]
    fn constant_column_gets_zero_weight() {
        let x0: Vec<f32> = (0..20).map(|i| i as f32).collect();
        let x1 = vec![3.0f32; 20];
        let y: Vec<f32> = x0.iter().map(|&a| 4.0 * a).collect();
        let data = Dataset::new(schema(&["x0", "x1"]), vec![x0, x1], y).unwrap();

        let model = LinearTrainer::new(LinearParams::default())
            .train(&data)
            .unwrap();

        assert_eq!(model.weights()[1], 0.0);
        assert!(model.weights()[0] > 3.0);
    }

    #[test]
    fn regularization_shrinks_weights() {
        let x0: Vec<f32> = (0..30).map(|i| i as f32).collect();
        let y: Vec<f32> = x0.iter().map(|&a| 2.0 * a).collect();
        let data = Dataset::new(schema(&["x0"]), vec![x0], y).unwrap();

        let free = LinearTrainer::new(LinearParams {
            n_sweeps: 100,
            reg_lambda: 1e-6,
        })
        .train(&data)
        .unwrap();
        let ridged = LinearTrainer::new(LinearParams {
            n_sweeps: 100,
            reg_lambda: 100.0,
        })
        .train(&data)
        .unwrap();

        assert!(ridged.weights()[0].abs() < free.weights()[0].abs());
    }

    #[test]
    fn importance_is_scale_free() {
        // x1 numerically dwarfs x0 but explains nothing extra; equal true
        // standardized effects must give comparable importance.
        let x0: Vec<f32> = (0..40).map(|i| (i % 10) as f32).collect();
        let x1: Vec<f32> = (0..40).map(|i| ((i * 3) % 7) as f32 * 1000.0).collect();
        let y: Vec<f32> = x0
            .iter()
            .zip(&x1)
            .map(|(&a, &b)| a * 2.0 + b * 0.002)
            .collect();
        let data = Dataset::new(schema(&["x0", "x1"]), vec![x0, x1], y).unwrap();

        let model = LinearTrainer::new(LinearParams {
            n_sweeps: 200,
            reg_lambda: 1e-6,
        })
        .train(&data)
        .unwrap();
        let importance = model.importance();

        let ratio = importance[0] / importance[1];
        assert!(
            (0.5..2.0).contains(&ratio),
            "importances should be same order of magnitude, got {importance:?}"
        );
    }

    #[test]
    fn rejects_empty_dataset() {
        let data = Dataset::new(schema(&["x0"]), vec![Vec::new()], Vec::new()).unwrap();
        assert!(LinearTrainer::new(LinearParams::default())
            .train(&data)
            .is_none());
    }
}
