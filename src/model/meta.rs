//! Model metadata.
//!
//! Introspection data about a fitted model's structure and training context.

use serde::{Deserialize, Serialize};

/// Shared metadata for all estimator kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Number of input features.
    pub n_features: usize,
    /// Number of samples the model was fitted on.
    pub n_samples: usize,
    /// Observed target range at training time, used for sanity checks on
    /// served predictions.
    pub target_range: Option<(f32, f32)>,
}

impl ModelMeta {
    /// Create metadata for a model fitted on `data`-shaped input.
    pub fn new(n_features: usize, n_samples: usize) -> Self {
        Self {
            n_features,
            n_samples,
            target_range: None,
        }
    }

    /// Set the observed target range.
    pub fn with_target_range(mut self, range: (f32, f32)) -> Self {
        self.target_range = Some(range);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_setters() {
        let meta = ModelMeta::new(8, 1000).with_target_range((500_000.0, 5_000_000.0));
        assert_eq!(meta.n_features, 8);
        assert_eq!(meta.n_samples, 1000);
        assert_eq!(meta.target_range, Some((500_000.0, 5_000_000.0)));
    }

    #[test]
    fn serde_roundtrip() {
        let meta = ModelMeta::new(3, 42).with_target_range((1.0, 2.0));
        let json = serde_json::to_string(&meta).unwrap();
        let restored: ModelMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, meta);
    }
}
