//! priceforest: a house-price regression pipeline for Rust.
//!
//! Native implementations of bagged random forests, gradient-boosted trees,
//! and a coordinate-descent linear model for tabular housing data, together
//! with a versioned binary model artifact and an HTTP prediction service.
//!
//! # Key Types
//!
//! - [`PriceModel`] - High-level model with predict/save/load
//! - [`ForestTrainer`] / [`GbdtTrainer`] / [`LinearTrainer`] - Estimator training
//! - [`Dataset`] / [`FeatureSchema`] - Data handling and the shared feature contract
//! - [`Metric`] - Evaluation metrics (MAE, RMSE, R², MAPE)
//!
//! # Training
//!
//! Build a [`Dataset`] (or generate one with [`housing::synthesize`]), pick a
//! trainer, then wrap the result in a [`PriceModel`] for persistence and
//! serving. See the [`model`] module for details.
//!
//! # Serving
//!
//! Use [`serve::router`] with a [`serve::ModelState`] to expose the
//! prediction API over HTTP.

pub mod dataset;
pub mod housing;
pub mod io;
pub mod model;
pub mod serve;
pub mod training;
pub mod trees;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{Estimator, ModelMeta, PredictError, PriceModel};

// Training types (trainers, metrics)
pub use training::{
    ForestParams, ForestTrainer, GbdtParams, GbdtTrainer, GrowthParams, LinearParams,
    LinearTrainer, Mae, Mape, Metric, RSquared, Rmse,
};

// Data types (for preparing training data)
pub use dataset::{Dataset, DatasetError, FeatureSchema, FieldKind, FieldSpec};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
