//! Tree ensemble representation.
//!
//! - [`Tree`]: immutable SoA storage for one regression tree
//! - [`TreeBuilder`]: mutable construction used by the grower
//! - [`Forest`]: ordered tree collection with an [`Aggregation`] mode

mod forest;
mod tree;

/// Node index within a single tree (0 = root).
pub type NodeId = u32;

pub use forest::{Aggregation, Forest};
pub use tree::{Tree, TreeBuilder, TreeValidationError};
