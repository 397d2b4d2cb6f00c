//! Feature schema: the explicit contract between training and serving.
//!
//! A [`FeatureSchema`] is an ordered list of typed field descriptors plus the
//! target column name. Both the trainer and the prediction service build
//! their feature vectors from the same schema, and the schema travels inside
//! the model artifact so a mismatch is caught at load time instead of
//! producing silently wrong predictions.

use std::fmt;

use crate::dataset::DatasetError;

/// Logical field types.
///
/// Values are stored as `f32` regardless of kind. The kind constrains the
/// domain a value may take and how it is validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Continuous numeric field.
    #[default]
    Numeric,

    /// Integer-valued field stored as float (room count, floor number).
    Integer,

    /// Binary flag stored as float. Valid values: `0.0` and `1.0`.
    Binary,
}

impl FieldKind {
    /// Returns true if this is a binary flag field.
    #[inline]
    pub fn is_binary(&self) -> bool {
        matches!(self, FieldKind::Binary)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Numeric => write!(f, "numeric"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Binary => write!(f, "binary"),
        }
    }
}

/// A single named, typed field descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,

    /// Field kind.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Create a continuous numeric field.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Numeric,
        }
    }

    /// Create an integer-valued field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Integer,
        }
    }

    /// Create a binary flag field.
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Binary,
        }
    }
}

/// Ordered, typed description of the model input plus the target name.
///
/// Field order is significant: feature vectors are always assembled in
/// schema order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureSchema {
    fields: Vec<FieldSpec>,
    target: String,
}

impl FeatureSchema {
    /// Create a schema from field descriptors and a target column name.
    pub fn new(fields: Vec<FieldSpec>, target: impl Into<String>) -> Self {
        Self {
            fields,
            target: target.into(),
        }
    }

    /// Number of feature fields.
    pub fn n_features(&self) -> usize {
        self.fields.len()
    }

    /// Field descriptors in vector order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Get a field descriptor by index.
    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    /// Target column name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Field names in vector order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Find the index of a field by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Validate a feature vector against the schema.
    ///
    /// Checks length and per-field domains (binary fields must be 0 or 1,
    /// every value must be finite).
    pub fn validate_row(&self, row: &[f32]) -> Result<(), DatasetError> {
        if row.len() != self.fields.len() {
            return Err(DatasetError::ShapeMismatch(format!(
                "expected {} features, got {}",
                self.fields.len(),
                row.len()
            )));
        }

        for (spec, &value) in self.fields.iter().zip(row) {
            if !value.is_finite() {
                return Err(DatasetError::FieldDomain {
                    field: spec.name.clone(),
                    value,
                    reason: "value must be finite",
                });
            }
            if spec.kind.is_binary() && value != 0.0 && value != 1.0 {
                return Err(DatasetError::FieldDomain {
                    field: spec.name.clone(),
                    value,
                    reason: "binary field must be 0 or 1",
                });
            }
        }

        Ok(())
    }

    /// Render the schema as `name:kind` pairs for error messages.
    pub fn describe(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{}:{}", f.name, f.kind))
            .collect();
        format!("[{}] -> {}", fields.join(", "), self.target)
    }
}
