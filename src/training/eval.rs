//! Held-out evaluation for fitted models.

use crate::dataset::Dataset;
use crate::model::PriceModel;

use super::metrics::{Mae, Metric, RSquared};

/// Evaluation summary for a fitted model.
#[derive(Clone, Debug)]
pub struct EvalReport {
    pub train_mae: f64,
    pub valid_mae: f64,
    pub train_r2: f64,
    pub valid_r2: f64,
    /// Importance ranking, best feature first.
    pub importance: Vec<(String, f32)>,
}

/// Score a model on its training and validation splits.
pub fn evaluate(model: &PriceModel, train: &Dataset, valid: &Dataset) -> EvalReport {
    let train_preds = predict_all(model, train);
    let valid_preds = predict_all(model, valid);

    EvalReport {
        train_mae: Mae.compute(&train_preds, train.targets()),
        valid_mae: Mae.compute(&valid_preds, valid.targets()),
        train_r2: RSquared.compute(&train_preds, train.targets()),
        valid_r2: RSquared.compute(&valid_preds, valid.targets()),
        importance: model.importance_ranking(),
    }
}

fn predict_all(model: &PriceModel, data: &Dataset) -> Vec<f32> {
    (0..data.n_samples())
        .map(|i| model.estimator().predict_row(&data.row(i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::housing::{synthesize, SynthConfig};
    use crate::model::PriceModel;
    use crate::training::{ForestParams, ForestTrainer};
    use crate::utils::Parallelism;

    #[test]
    fn report_scores_both_splits() {
        let data = synthesize(&SynthConfig {
            n_samples: 400,
            seed: 42,
        });
        let (train, valid) = data.split(0.2, 42);

        let forest = ForestTrainer::new(ForestParams {
            n_trees: 20,
            ..Default::default()
        })
        .train(&train, Parallelism::Sequential)
        .unwrap();
        let model = PriceModel::from_forest(forest, &train);

        let report = evaluate(&model, &train, &valid);

        assert!(report.train_mae > 0.0);
        assert!(report.valid_mae > 0.0);
        // In-sample fit is at least as good as held-out.
        assert!(report.train_mae <= report.valid_mae * 1.05);
        assert!(report.train_r2 > 0.5);
        assert_eq!(report.importance.len(), train.n_features());
    }
}
