//! Forest: an ordered collection of regression trees with an aggregation mode.

use super::tree::{Tree, TreeValidationError};

/// How member tree outputs combine into one prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregation {
    /// Mean of member predictions (bagged ensembles). Member disagreement
    /// is meaningful, so per-tree spread can be reported.
    Average,
    /// Sum of member predictions on top of the base score (boosted
    /// ensembles, shrinkage already folded into leaf values).
    Sum,
}

/// An ensemble of regression trees.
#[derive(Clone, Debug, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
    aggregation: Aggregation,
}

impl Forest {
    /// Create an empty forest.
    pub fn new(aggregation: Aggregation) -> Self {
        Self {
            trees: Vec::new(),
            base_score: 0.0,
            aggregation,
        }
    }

    /// Set the base score (builder pattern).
    pub fn with_base_score(mut self, base_score: f32) -> Self {
        self.base_score = base_score;
        self
    }

    /// Append a tree.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Member trees in boosting/bagging order.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Base score added to every prediction.
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Aggregation mode.
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Predict a single row.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        let sum: f32 = self.trees.iter().map(|t| t.predict_row(features)).sum();

        match self.aggregation {
            Aggregation::Average if !self.trees.is_empty() => {
                self.base_score + sum / self.trees.len() as f32
            }
            _ => self.base_score + sum,
        }
    }

    /// Raw per-tree predictions for a single row.
    ///
    /// For [`Aggregation::Average`] forests the spread of these values is
    /// the dispersion estimate reported alongside predictions.
    pub fn tree_predictions(&self, features: &[f32]) -> Vec<f32> {
        self.trees.iter().map(|t| t.predict_row(features)).collect()
    }

    /// Largest feature index referenced by any split in any tree.
    pub fn max_split_index(&self) -> Option<u32> {
        self.trees.iter().filter_map(|t| t.max_split_index()).max()
    }

    /// Per-feature split-gain totals.
    pub fn gain_importance(&self, n_features: usize) -> Vec<f32> {
        let mut acc = vec![0.0f32; n_features];
        for tree in &self.trees {
            tree.accumulate_gain_importance(&mut acc);
        }
        acc
    }

    /// Validate every member tree.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        if self.trees.is_empty() {
            return Err(TreeValidationError::EmptyTree);
        }
        for tree in &self.trees {
            tree.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::TreeBuilder;

    /// Single split on feature 0 at `threshold`, returning `left`/`right`.
    fn stump(threshold: f32, left: f32, right: f32, gain: f32) -> Tree {
        let mut b = TreeBuilder::new();
        let root = b.reserve_node();
        let l = b.reserve_node();
        let r = b.reserve_node();
        b.make_split(root, 0, threshold, true, gain, l, r);
        b.make_leaf(l, left);
        b.make_leaf(r, right);
        b.freeze()
    }

    #[test]
    fn average_forest_means_members() {
        let mut forest = Forest::new(Aggregation::Average);
        forest.push_tree(stump(0.5, 1.0, 3.0, 1.0));
        forest.push_tree(stump(0.5, 2.0, 5.0, 1.0));

        assert_eq!(forest.predict_row(&[0.0]), 1.5);
        assert_eq!(forest.predict_row(&[1.0]), 4.0);
        assert_eq!(forest.tree_predictions(&[1.0]), vec![3.0, 5.0]);
    }

    #[test]
    fn sum_forest_adds_base_score() {
        let mut forest = Forest::new(Aggregation::Sum).with_base_score(10.0);
        forest.push_tree(stump(0.5, -1.0, 1.0, 1.0));
        forest.push_tree(stump(0.5, -0.5, 0.5, 1.0));

        assert_eq!(forest.predict_row(&[0.0]), 8.5);
        assert_eq!(forest.predict_row(&[1.0]), 11.5);
    }

    #[test]
    fn empty_average_forest_returns_base() {
        let forest = Forest::new(Aggregation::Average).with_base_score(2.0);
        assert_eq!(forest.predict_row(&[0.0]), 2.0);
    }

    #[test]
    fn gain_importance_sums_trees() {
        let mut forest = Forest::new(Aggregation::Sum);
        forest.push_tree(stump(0.5, 0.0, 1.0, 3.0));
        forest.push_tree(stump(0.5, 0.0, 1.0, 2.0));

        assert_eq!(forest.gain_importance(2), vec![5.0, 0.0]);
    }

    #[test]
    fn validate_requires_trees() {
        let forest = Forest::new(Aggregation::Average);
        assert_eq!(forest.validate(), Err(TreeValidationError::EmptyTree));
    }
}
