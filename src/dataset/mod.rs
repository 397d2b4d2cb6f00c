//! Dataset handling: schema, storage, and CSV I/O.
//!
//! # Key Types
//!
//! - [`FeatureSchema`]: ordered, typed field descriptors shared by training
//!   and serving
//! - [`Dataset`]: feature-major container with a target column
//! - [`load_csv`] / [`save_csv`]: header-resolved CSV I/O
//!
//! # Storage Layout
//!
//! Features are stored in **feature-major** layout: each field's values
//! across all samples are contiguous in memory. This is what the split
//! finder and the linear coordinate updater iterate over; row access
//! gathers across columns.

mod csv;
#[allow(clippy::module_inception)]
mod dataset;
mod error;
mod schema;

pub use csv::{load_csv, save_csv};
pub use dataset::Dataset;
pub use error::DatasetError;
pub use schema::{FeatureSchema, FieldKind, FieldSpec};
