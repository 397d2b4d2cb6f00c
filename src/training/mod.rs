//! Training infrastructure for price models.
//!
//! ## Estimator Trainers
//!
//! - [`ForestTrainer`]: bagged random forest (bootstrap rows, parallel trees)
//! - [`GbdtTrainer`]: squared-loss gradient boosting
//! - [`LinearTrainer`]: ridge regression via cyclic coordinate descent
//!
//! All tree training goes through the shared exact-split [`TreeGrower`].
//!
//! ## Metrics
//!
//! - [`Mae`], [`Rmse`], [`RSquared`], [`Mape`] behind the [`Metric`] trait
//! - [`evaluate`] produces an [`EvalReport`] over a train/valid pair

mod eval;
mod forest_trainer;
mod gbdt;
mod grower;
mod linear;
mod metrics;

pub use eval::{evaluate, EvalReport};
pub use forest_trainer::{ForestParams, ForestTrainer};
pub use gbdt::{GbdtParams, GbdtTrainer};
pub use grower::{GrowthParams, TreeGrower};
pub use linear::{LinearModel, LinearParams, LinearTrainer};
pub use metrics::{Mae, Mape, Metric, RSquared, Rmse};
