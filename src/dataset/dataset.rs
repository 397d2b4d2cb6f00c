//! Tabular dataset container.
//!
//! Features are stored in feature-major layout: an `[n_features, n_samples]`
//! matrix where each feature's values are contiguous in memory. This is what
//! the split finder and the linear updater iterate over; row access gathers
//! across features.

use ndarray::{Array2, ArrayView2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::schema::FeatureSchema;
use super::DatasetError;

/// A dataset with a feature schema, a feature matrix, and a target column.
#[derive(Clone, Debug)]
pub struct Dataset {
    schema: FeatureSchema,
    /// Feature-major storage: `features[[j, i]]` is feature `j` of sample `i`.
    features: Array2<f32>,
    targets: Vec<f32>,
}

impl Dataset {
    /// Create a dataset from feature columns and targets.
    ///
    /// Column count must match the schema and every column must have the
    /// same length as the target vector.
    pub fn new(
        schema: FeatureSchema,
        columns: Vec<Vec<f32>>,
        targets: Vec<f32>,
    ) -> Result<Self, DatasetError> {
        if columns.len() != schema.n_features() {
            return Err(DatasetError::ShapeMismatch(format!(
                "{} columns for {} schema fields",
                columns.len(),
                schema.n_features()
            )));
        }
        for (j, col) in columns.iter().enumerate() {
            if col.len() != targets.len() {
                return Err(DatasetError::ShapeMismatch(format!(
                    "column {} has {} values, target has {}",
                    j,
                    col.len(),
                    targets.len()
                )));
            }
        }

        let n_features = columns.len();
        let n_samples = targets.len();
        let flat: Vec<f32> = columns.into_iter().flatten().collect();
        let features = Array2::from_shape_vec((n_features, n_samples), flat)
            .map_err(|e| DatasetError::ShapeMismatch(e.to_string()))?;

        Ok(Self {
            schema,
            features,
            targets,
        })
    }

    /// Create a dataset from sample-major rows.
    ///
    /// Each row must match the schema length; rows are transposed into
    /// feature-major storage.
    pub fn from_rows(
        schema: FeatureSchema,
        rows: &[Vec<f32>],
        targets: Vec<f32>,
    ) -> Result<Self, DatasetError> {
        let n_features = schema.n_features();
        let mut columns = vec![Vec::with_capacity(rows.len()); n_features];

        for row in rows {
            if row.len() != n_features {
                return Err(DatasetError::ShapeMismatch(format!(
                    "row has {} values, schema has {} fields",
                    row.len(),
                    n_features
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                columns[j].push(value);
            }
        }

        Self::new(schema, columns, targets)
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    /// The feature schema.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// The `[n_features, n_samples]` feature matrix.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// A single feature column as a contiguous slice.
    pub fn column(&self, index: usize) -> &[f32] {
        self.features
            .row(index)
            .to_slice()
            .expect("feature rows are contiguous in standard layout")
    }

    /// The target column.
    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    /// Gather one sample into a schema-ordered vector.
    pub fn row(&self, index: usize) -> Vec<f32> {
        self.features.column(index).to_vec()
    }

    /// Observed target range, `None` for an empty dataset.
    pub fn target_range(&self) -> Option<(f32, f32)> {
        let mut iter = self.targets.iter().copied();
        let first = iter.next()?;
        let (mut lo, mut hi) = (first, first);
        for y in iter {
            lo = lo.min(y);
            hi = hi.max(y);
        }
        Some((lo, hi))
    }

    /// Deterministic shuffled train/valid split.
    ///
    /// `valid_fraction` of the samples (rounded) go to the second dataset.
    pub fn split(&self, valid_fraction: f32, seed: u64) -> (Dataset, Dataset) {
        debug_assert!((0.0..1.0).contains(&valid_fraction));

        let mut idx: Vec<usize> = (0..self.n_samples()).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        idx.shuffle(&mut rng);

        let valid_len = ((self.n_samples() as f32) * valid_fraction).round() as usize;
        let valid_len = valid_len.min(self.n_samples());
        let (valid_idx, train_idx) = idx.split_at(valid_len);

        (self.subset(train_idx), self.subset(valid_idx))
    }

    /// Build a dataset from a subset of sample indices.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        let n_features = self.n_features();
        let mut features = Array2::zeros((n_features, indices.len()));
        for (new_i, &old_i) in indices.iter().enumerate() {
            for j in 0..n_features {
                features[[j, new_i]] = self.features[[j, old_i]];
            }
        }
        let targets = indices.iter().map(|&i| self.targets[i]).collect();

        Dataset {
            schema: self.schema.clone(),
            features,
            targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldSpec;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            vec![FieldSpec::numeric("a"), FieldSpec::numeric("b")],
            "y",
        )
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(
            schema(),
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 20.0, 30.0, 40.0]],
            vec![0.1, 0.2, 0.3, 0.4],
        )
        .unwrap()
    }

    #[test]
    fn shapes() {
        let ds = sample_dataset();
        assert_eq!(ds.n_samples(), 4);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.features().dim(), (2, 4));
        assert_eq!(ds.row(2), vec![3.0, 30.0]);
        assert_eq!(ds.column(1), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn rejects_column_count_mismatch() {
        let result = Dataset::new(schema(), vec![vec![1.0]], vec![0.1]);
        assert!(matches!(result, Err(DatasetError::ShapeMismatch(_))));
    }

    #[test]
    fn rejects_ragged_columns() {
        let result = Dataset::new(schema(), vec![vec![1.0, 2.0], vec![1.0]], vec![0.1, 0.2]);
        assert!(matches!(result, Err(DatasetError::ShapeMismatch(_))));
    }

    #[test]
    fn from_rows_transposes() {
        let ds = Dataset::from_rows(
            schema(),
            &[vec![1.0, 10.0], vec![2.0, 20.0]],
            vec![0.1, 0.2],
        )
        .unwrap();
        assert_eq!(ds.column(0), &[1.0, 2.0]);
        assert_eq!(ds.column(1), &[10.0, 20.0]);
    }

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let ds = sample_dataset();
        let (train_a, valid_a) = ds.split(0.25, 7);
        let (train_b, valid_b) = ds.split(0.25, 7);

        assert_eq!(train_a.n_samples(), 3);
        assert_eq!(valid_a.n_samples(), 1);
        assert_eq!(train_a.targets(), train_b.targets());
        assert_eq!(valid_a.targets(), valid_b.targets());

        // Every original target appears exactly once across the two halves.
        let mut all: Vec<f32> = train_a
            .targets()
            .iter()
            .chain(valid_a.targets())
            .copied()
            .collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(all, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn subset_gathers_rows() {
        let ds = sample_dataset();
        let sub = ds.subset(&[3, 0]);
        assert_eq!(sub.targets(), &[0.4, 0.1]);
        assert_eq!(sub.row(0), vec![4.0, 40.0]);
        assert_eq!(sub.row(1), vec![1.0, 10.0]);
    }

    #[test]
    fn target_range() {
        let ds = sample_dataset();
        assert_eq!(ds.target_range(), Some((0.1, 0.4)));
    }
}
