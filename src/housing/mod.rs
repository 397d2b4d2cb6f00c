//! Housing domain: the canonical feature schema and synthetic data.
//!
//! The schema defined here is the single source of truth for the field
//! names, kinds, and order used by data generation, training, the model
//! artifact, and the prediction API.

mod synth;

pub use synth::{synthesize, SynthConfig};

use crate::dataset::{FeatureSchema, FieldSpec};

/// Target column name.
pub const TARGET: &str = "price";

/// The canonical housing feature schema.
///
/// Order is significant and shared by every pipeline stage:
/// `area, rooms, age, floor, has_parking, location_score,
/// is_school_district, metro_distance`.
pub fn schema() -> FeatureSchema {
    FeatureSchema::new(
        vec![
            FieldSpec::numeric("area"),
            FieldSpec::integer("rooms"),
            FieldSpec::integer("age"),
            FieldSpec::integer("floor"),
            FieldSpec::binary("has_parking"),
            FieldSpec::numeric("location_score"),
            FieldSpec::binary("is_school_district"),
            FieldSpec::numeric("metro_distance"),
        ],
        TARGET,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_order_is_stable() {
        let schema = schema();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(
            names,
            vec![
                "area",
                "rooms",
                "age",
                "floor",
                "has_parking",
                "location_score",
                "is_school_district",
                "metro_distance",
            ]
        );
        assert_eq!(schema.target(), "price");
    }

    #[test]
    fn flags_are_binary_fields() {
        let schema = schema();
        let parking = schema.index_of("has_parking").unwrap();
        assert!(schema.field(parking).unwrap().kind.is_binary());
        let school = schema.index_of("is_school_district").unwrap();
        assert!(schema.field(school).unwrap().kind.is_binary());
    }
}
