//! Conversions between runtime model types and storage payloads.
//!
//! Loading is defensive: every structural invariant the runtime types rely
//! on (array lengths, child indices, feature indices in schema range) is
//! checked here and reported as a [`DeserializeError`] instead of trusted.

use crate::dataset::{FeatureSchema, FieldKind, FieldSpec};
use crate::model::{Estimator, ModelMeta, PriceModel};
use crate::training::LinearModel;
use crate::trees::{Aggregation, Forest, Tree};

use super::native::{DeserializeError, ModelType};
use super::payload::{
    FieldPayload, ForestPayload, LinearPayload, MetaPayload, ModelPayload, PayloadV1,
    SchemaPayload, TreePayload,
};

// ============================================================================
// Model → Payload
// ============================================================================

/// The header model type for an estimator.
pub fn model_type_of(model: &PriceModel) -> ModelType {
    match model.estimator() {
        Estimator::Forest(forest) => match forest.aggregation() {
            Aggregation::Average => ModelType::RandomForest,
            Aggregation::Sum => ModelType::GradientBoosting,
        },
        Estimator::Linear(_) => ModelType::Linear,
    }
}

/// Build the storage payload for a model.
pub fn to_payload(model: &PriceModel) -> PayloadV1 {
    PayloadV1 {
        schema: schema_to_payload(model.schema()),
        meta: MetaPayload {
            n_features: model.meta().n_features as u32,
            n_samples: model.meta().n_samples as u64,
            target_range: model.meta().target_range,
        },
        model: match model.estimator() {
            Estimator::Forest(forest) => ModelPayload::Forest(forest_to_payload(forest)),
            Estimator::Linear(linear) => ModelPayload::Linear(LinearPayload {
                weights: linear.weights().to_vec(),
                bias: linear.bias(),
                feature_std: linear.feature_std().to_vec(),
            }),
        },
    }
}

fn schema_to_payload(schema: &FeatureSchema) -> SchemaPayload {
    SchemaPayload {
        fields: schema
            .fields()
            .iter()
            .map(|f| FieldPayload {
                name: f.name.clone(),
                kind: match f.kind {
                    FieldKind::Numeric => 0,
                    FieldKind::Integer => 1,
                    FieldKind::Binary => 2,
                },
            })
            .collect(),
        target: schema.target().to_string(),
    }
}

fn forest_to_payload(forest: &Forest) -> ForestPayload {
    ForestPayload {
        aggregation: match forest.aggregation() {
            Aggregation::Average => 0,
            Aggregation::Sum => 1,
        },
        base_score: forest.base_score(),
        trees: forest.trees().iter().map(tree_to_payload).collect(),
    }
}

fn tree_to_payload(tree: &Tree) -> TreePayload {
    let n = tree.n_nodes();
    let mut payload = TreePayload {
        num_nodes: n as u32,
        split_features: Vec::with_capacity(n),
        thresholds: Vec::with_capacity(n),
        left_children: Vec::with_capacity(n),
        right_children: Vec::with_capacity(n),
        default_left: Vec::with_capacity(n),
        is_leaf: Vec::with_capacity(n),
        leaf_values: Vec::with_capacity(n),
        gains: Vec::with_capacity(n),
    };

    for node in 0..n as u32 {
        let leaf = tree.is_leaf(node);
        payload.is_leaf.push(leaf);
        payload.split_features.push(if leaf { 0 } else { tree.split_index(node) });
        payload.thresholds.push(if leaf { 0.0 } else { tree.split_threshold(node) });
        payload.left_children.push(if leaf { 0 } else { tree.left_child(node) });
        payload.right_children.push(if leaf { 0 } else { tree.right_child(node) });
        payload.default_left.push(tree.default_left(node));
        payload.leaf_values.push(if leaf { tree.leaf_value(node) } else { 0.0 });
        payload.gains.push(tree.gain(node));
    }

    payload
}

// ============================================================================
// Payload → Model
// ============================================================================

/// Rebuild a model from its payload, validating against the header.
pub fn from_payload(
    header_type: ModelType,
    header_features: u32,
    payload: PayloadV1,
) -> Result<PriceModel, DeserializeError> {
    let schema = schema_from_payload(payload.schema)?;

    if payload.meta.n_features as usize != schema.n_features()
        || header_features as usize != schema.n_features()
    {
        return Err(DeserializeError::CorruptPayload(format!(
            "feature counts disagree: header {}, metadata {}, schema {}",
            header_features,
            payload.meta.n_features,
            schema.n_features()
        )));
    }

    let mut meta = ModelMeta::new(schema.n_features(), payload.meta.n_samples as usize);
    if let Some(range) = payload.meta.target_range {
        meta = meta.with_target_range(range);
    }

    let estimator = match payload.model {
        ModelPayload::Forest(forest) => {
            let forest = forest_from_payload(forest, schema.n_features())?;
            let actual = match forest.aggregation() {
                Aggregation::Average => ModelType::RandomForest,
                Aggregation::Sum => ModelType::GradientBoosting,
            };
            if actual != header_type {
                return Err(DeserializeError::TypeMismatch {
                    expected: header_type,
                    actual,
                });
            }
            Estimator::Forest(forest)
        }
        ModelPayload::Linear(linear) => {
            if header_type != ModelType::Linear {
                return Err(DeserializeError::TypeMismatch {
                    expected: header_type,
                    actual: ModelType::Linear,
                });
            }
            if linear.weights.len() != schema.n_features()
                || linear.feature_std.len() != schema.n_features()
            {
                return Err(DeserializeError::CorruptPayload(format!(
                    "linear model has {} weights for {} features",
                    linear.weights.len(),
                    schema.n_features()
                )));
            }
            Estimator::Linear(LinearModel::from_parts(
                linear.weights,
                linear.bias,
                linear.feature_std,
            ))
        }
    };

    Ok(PriceModel::new(estimator, schema, meta))
}

fn schema_from_payload(payload: SchemaPayload) -> Result<FeatureSchema, DeserializeError> {
    let mut fields = Vec::with_capacity(payload.fields.len());
    for field in payload.fields {
        let kind = match field.kind {
            0 => FieldKind::Numeric,
            1 => FieldKind::Integer,
            2 => FieldKind::Binary,
            other => {
                return Err(DeserializeError::CorruptPayload(format!(
                    "unknown field kind {other} for '{}'",
                    field.name
                )))
            }
        };
        fields.push(FieldSpec {
            name: field.name,
            kind,
        });
    }
    Ok(FeatureSchema::new(fields, payload.target))
}

fn forest_from_payload(
    payload: ForestPayload,
    n_features: usize,
) -> Result<Forest, DeserializeError> {
    let aggregation = match payload.aggregation {
        0 => Aggregation::Average,
        1 => Aggregation::Sum,
        other => {
            return Err(DeserializeError::CorruptPayload(format!(
                "unknown aggregation code {other}"
            )))
        }
    };

    let mut forest = Forest::new(aggregation).with_base_score(payload.base_score);
    for (idx, tree) in payload.trees.into_iter().enumerate() {
        let tree = tree_from_payload(tree, idx)?;
        forest.push_tree(tree);
    }

    forest.validate().map_err(|e| {
        DeserializeError::CorruptPayload(format!("invalid tree structure: {e:?}"))
    })?;

    if let Some(max_index) = forest.max_split_index() {
        if max_index as usize >= n_features {
            return Err(DeserializeError::CorruptPayload(format!(
                "tree references feature {max_index} but schema has {n_features} fields"
            )));
        }
    }

    Ok(forest)
}

fn tree_from_payload(payload: TreePayload, idx: usize) -> Result<Tree, DeserializeError> {
    let n = payload.num_nodes as usize;
    let lengths = [
        payload.split_features.len(),
        payload.thresholds.len(),
        payload.left_children.len(),
        payload.right_children.len(),
        payload.default_left.len(),
        payload.is_leaf.len(),
        payload.leaf_values.len(),
        payload.gains.len(),
    ];
    if lengths.iter().any(|&len| len != n) {
        return Err(DeserializeError::CorruptPayload(format!(
            "tree {idx} arrays do not match node count {n}"
        )));
    }

    Ok(Tree::new(
        payload.split_features,
        payload.thresholds,
        payload.left_children,
        payload.right_children,
        payload.default_left,
        payload.is_leaf,
        payload.leaf_values,
        payload.gains,
    ))
}
