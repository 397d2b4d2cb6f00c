//! High-level price model.
//!
//! [`PriceModel`] binds a fitted estimator to the feature schema it was
//! trained with and to its metadata, and is the unit of persistence: the
//! artifact on disk is a serialized `PriceModel`, and the prediction
//! service loads one at startup.

mod meta;

pub use meta::ModelMeta;

use std::path::Path;

use thiserror::Error;

use crate::dataset::FeatureSchema;
use crate::io::{self, DeserializeError, SerializeError};
use crate::training::LinearModel;
use crate::trees::{Aggregation, Forest};

// =============================================================================
// Estimator
// =============================================================================

/// A fitted regression estimator.
#[derive(Clone, Debug, PartialEq)]
pub enum Estimator {
    /// Tree ensemble (bagged or boosted, per its aggregation mode).
    Forest(Forest),
    /// Linear model.
    Linear(LinearModel),
}

impl Estimator {
    /// Predict a single schema-ordered row.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        match self {
            Estimator::Forest(forest) => forest.predict_row(features),
            Estimator::Linear(linear) => linear.predict_row(features),
        }
    }

    /// Stable name of the estimator kind, echoed by the prediction API.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Estimator::Forest(forest) => match forest.aggregation() {
                Aggregation::Average => "random_forest",
                Aggregation::Sum => "gradient_boosting",
            },
            Estimator::Linear(_) => "linear_regression",
        }
    }
}

// =============================================================================
// PredictError
// =============================================================================

/// Errors surfaced by prediction calls.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Input vector length does not match the model schema.
    #[error("expected {expected} features, got {got}")]
    WrongLength { expected: usize, got: usize },

    /// The estimator produced a non-finite value.
    #[error("inference produced a non-finite value: {value}")]
    NonFinite { value: f32 },
}

// =============================================================================
// PriceModel
// =============================================================================

/// A fitted estimator plus the schema and metadata it was trained with.
///
/// # Example
///
/// ```ignore
/// use priceforest::{ForestParams, ForestTrainer, Parallelism, PriceModel};
///
/// let forest = ForestTrainer::new(ForestParams::default())
///     .train(&data, Parallelism::Parallel)
///     .unwrap();
/// let model = PriceModel::from_forest(forest, &data);
///
/// let price = model.predict(&features)?;
/// model.save("house_price_model.pfor")?;
/// let loaded = PriceModel::load("house_price_model.pfor")?;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PriceModel {
    estimator: Estimator,
    schema: FeatureSchema,
    meta: ModelMeta,
}

impl PriceModel {
    /// Bind an estimator to its schema and metadata.
    pub fn new(estimator: Estimator, schema: FeatureSchema, meta: ModelMeta) -> Self {
        debug_assert_eq!(schema.n_features(), meta.n_features);
        Self {
            estimator,
            schema,
            meta,
        }
    }

    /// Wrap a trained forest, deriving schema and metadata from `data`.
    pub fn from_forest(forest: Forest, data: &crate::dataset::Dataset) -> Self {
        let mut meta = ModelMeta::new(data.n_features(), data.n_samples());
        if let Some(range) = data.target_range() {
            meta = meta.with_target_range(range);
        }
        Self::new(Estimator::Forest(forest), data.schema().clone(), meta)
    }

    /// Wrap a trained linear model, deriving schema and metadata from `data`.
    pub fn from_linear(linear: LinearModel, data: &crate::dataset::Dataset) -> Self {
        let mut meta = ModelMeta::new(data.n_features(), data.n_samples());
        if let Some(range) = data.target_range() {
            meta = meta.with_target_range(range);
        }
        Self::new(Estimator::Linear(linear), data.schema().clone(), meta)
    }

    /// The underlying estimator.
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// The feature schema the model was trained with.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.meta.n_features
    }

    /// Stable name of the estimator kind.
    pub fn model_type(&self) -> &'static str {
        self.estimator.kind_name()
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict a single schema-ordered row.
    pub fn predict(&self, features: &[f32]) -> Result<f32, PredictError> {
        if features.len() != self.n_features() {
            return Err(PredictError::WrongLength {
                expected: self.n_features(),
                got: features.len(),
            });
        }

        let value = self.estimator.predict_row(features);
        if !value.is_finite() {
            return Err(PredictError::NonFinite { value });
        }
        Ok(value)
    }

    /// Predict with a dispersion estimate.
    ///
    /// For averaged tree ensembles the spread is the standard deviation of
    /// per-tree predictions; other estimators have no meaningful member
    /// disagreement and report `None`.
    pub fn predict_with_spread(&self, features: &[f32]) -> Result<(f32, Option<f32>), PredictError> {
        let value = self.predict(features)?;

        let spread = match &self.estimator {
            Estimator::Forest(forest)
                if forest.aggregation() == Aggregation::Average && forest.n_trees() > 1 =>
            {
                let member = forest.tree_predictions(features);
                let n = member.len() as f64;
                let mean = member.iter().map(|&p| p as f64).sum::<f64>() / n;
                let var = member
                    .iter()
                    .map(|&p| {
                        let d = p as f64 - mean;
                        d * d
                    })
                    .sum::<f64>()
                    / n;
                Some(var.sqrt() as f32)
            }
            _ => None,
        };

        Ok((value, spread))
    }

    /// Predict multiple rows given row-major features.
    pub fn predict_batch(&self, features: &[f32], n_rows: usize) -> Result<Vec<f32>, PredictError> {
        let n_features = self.n_features();
        if features.len() != n_rows * n_features {
            return Err(PredictError::WrongLength {
                expected: n_rows * n_features,
                got: features.len(),
            });
        }

        features
            .chunks(n_features)
            .map(|row| self.predict(row))
            .collect()
    }

    // =========================================================================
    // Feature Importance
    // =========================================================================

    /// Normalized per-feature importance scores (sum to 1.0 when any
    /// feature has signal).
    pub fn feature_importance(&self) -> Vec<f32> {
        let raw = match &self.estimator {
            Estimator::Forest(forest) => forest.gain_importance(self.n_features()),
            Estimator::Linear(linear) => linear.importance(),
        };

        let total: f32 = raw.iter().sum();
        if total <= 0.0 {
            vec![0.0; raw.len()]
        } else {
            raw.iter().map(|&v| v / total).collect()
        }
    }

    /// Importance ranking as `(field name, score)`, best first.
    pub fn importance_ranking(&self) -> Vec<(String, f32)> {
        let mut ranking: Vec<(String, f32)> = self
            .schema
            .names()
            .map(str::to_string)
            .zip(self.feature_importance())
            .collect();
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranking
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Save the model artifact to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        io::save(path, self)
    }

    /// Load a model artifact from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeserializeError> {
        io::load(path)
    }

    /// Load a model artifact and require its schema to match `expected`.
    pub fn load_validated(
        path: impl AsRef<Path>,
        expected: &FeatureSchema,
    ) -> Result<Self, DeserializeError> {
        io::load_validated(path, expected)
    }

    /// Serialize the model artifact to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializeError> {
        io::to_bytes(self)
    }

    /// Deserialize a model artifact from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        io::from_bytes(bytes)
    }
}
