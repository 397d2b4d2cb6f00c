//! Payload structures for the native artifact format.
//!
//! These structs are designed for serialization with Postcard. They mirror
//! the runtime types but are optimized for compact binary storage.

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Payload
// ============================================================================

/// Version-tagged payload enum for forward compatibility.
///
/// New format versions add new variants rather than modifying existing ones.
/// Older readers can detect unsupported versions by the enum discriminant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    /// Version 1 payload format.
    V1(PayloadV1),
}

/// Version 1 payload structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadV1 {
    /// The feature schema the model was trained with.
    pub schema: SchemaPayload,
    /// Model metadata.
    pub meta: MetaPayload,
    /// Model-specific payload.
    pub model: ModelPayload,
}

// ============================================================================
// Schema & Metadata
// ============================================================================

/// Field kind encoding: 0 = numeric, 1 = integer, 2 = binary.
pub type FieldKindCode = u8;

/// One schema field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPayload {
    /// Field name.
    pub name: String,
    /// Field kind code.
    pub kind: FieldKindCode,
}

/// The ordered feature schema plus target name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaPayload {
    /// Ordered fields.
    pub fields: Vec<FieldPayload>,
    /// Target column name.
    pub target: String,
}

/// Metadata common to all model types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaPayload {
    /// Number of input features.
    pub n_features: u32,
    /// Number of samples the model was fitted on.
    pub n_samples: u64,
    /// Observed target range at training time.
    pub target_range: Option<(f32, f32)>,
}

// ============================================================================
// Model Payloads
// ============================================================================

/// Model-specific payload variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelPayload {
    /// Tree ensemble payload.
    Forest(ForestPayload),
    /// Linear model payload.
    Linear(LinearPayload),
}

/// Aggregation encoding: 0 = average, 1 = sum.
pub type AggregationCode = u8;

/// Tree ensemble payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestPayload {
    /// Aggregation mode code.
    pub aggregation: AggregationCode,
    /// Base score added to every prediction.
    pub base_score: f32,
    /// Individual tree payloads.
    pub trees: Vec<TreePayload>,
}

/// Single decision tree payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreePayload {
    /// Number of nodes.
    pub num_nodes: u32,
    /// Split feature indices (one per node).
    pub split_features: Vec<u32>,
    /// Split thresholds (one per node, 0.0 for leaves).
    pub thresholds: Vec<f32>,
    /// Left child indices (one per node, 0 for leaves).
    pub left_children: Vec<u32>,
    /// Right child indices (one per node, 0 for leaves).
    pub right_children: Vec<u32>,
    /// Default direction for missing values (one per node).
    pub default_left: Vec<bool>,
    /// Whether each node is a leaf.
    pub is_leaf: Vec<bool>,
    /// Leaf values (one per node, 0.0 for internal nodes).
    pub leaf_values: Vec<f32>,
    /// Split gains (one per node, 0.0 for leaves).
    pub gains: Vec<f32>,
}

/// Linear model payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPayload {
    /// Per-feature weights on original scale.
    pub weights: Vec<f32>,
    /// Intercept.
    pub bias: f32,
    /// Per-feature standard deviations observed at fit time.
    pub feature_std: Vec<f32>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes() {
        let payload = Payload::V1(PayloadV1 {
            schema: SchemaPayload {
                fields: vec![
                    FieldPayload {
                        name: "area".into(),
                        kind: 0,
                    },
                    FieldPayload {
                        name: "has_parking".into(),
                        kind: 2,
                    },
                ],
                target: "price".into(),
            },
            meta: MetaPayload {
                n_features: 2,
                n_samples: 100,
                target_range: Some((1.0, 2.0)),
            },
            model: ModelPayload::Linear(LinearPayload {
                weights: vec![0.1, 0.2],
                bias: 0.5,
                feature_std: vec![1.0, 1.0],
            }),
        });

        // Should serialize without panic
        let bytes = postcard::to_allocvec(&payload).unwrap();
        assert!(!bytes.is_empty());

        // Should deserialize back
        let decoded: Payload = postcard::from_bytes(&bytes).unwrap();
        match decoded {
            Payload::V1(v1) => {
                assert_eq!(v1.meta.n_features, 2);
                assert_eq!(v1.schema.target, "price");
                match v1.model {
                    ModelPayload::Linear(linear) => {
                        assert_eq!(linear.weights, vec![0.1, 0.2]);
                    }
                    _ => panic!("wrong model type"),
                }
            }
        }
    }

    #[test]
    fn tree_payload_roundtrip() {
        let tree = TreePayload {
            num_nodes: 3,
            split_features: vec![0, 0, 0],
            thresholds: vec![0.5, 0.0, 0.0],
            left_children: vec![1, 0, 0],
            right_children: vec![2, 0, 0],
            default_left: vec![true, false, false],
            is_leaf: vec![false, true, true],
            leaf_values: vec![0.0, 1.0, 2.0],
            gains: vec![4.0, 0.0, 0.0],
        };

        let bytes = postcard::to_allocvec(&tree).unwrap();
        let decoded: TreePayload = postcard::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.num_nodes, 3);
        assert_eq!(decoded.leaf_values, vec![0.0, 1.0, 2.0]);
        assert_eq!(decoded.gains, vec![4.0, 0.0, 0.0]);
    }
}
