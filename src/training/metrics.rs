//! Regression metrics.
//!
//! Metrics for evaluating model quality on held-out data. All estimators in
//! this crate are single-output, so metrics operate on plain slices.

// =============================================================================
// Metric Trait
// =============================================================================

/// A scalar evaluation metric over predictions and targets.
pub trait Metric {
    /// Compute the metric. Accumulation is done in `f64`.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// Whether larger values indicate a better model.
    fn higher_is_better(&self) -> bool;

    /// Short metric name for reports.
    fn name(&self) -> &'static str;
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - target|)
///
/// Lower is better. More robust to outliers than RMSE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl Metric for Mae {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }

        let sum_ae: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| ((p as f64) - (t as f64)).abs())
            .sum();

        sum_ae / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - target)²))
///
/// Lower is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl Metric for Rmse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }

        let sum_sq: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| {
                let diff = (p as f64) - (t as f64);
                diff * diff
            })
            .sum();

        (sum_sq / n as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// R² (Coefficient of Determination)
// =============================================================================

/// Coefficient of determination: `1 - SS_res / SS_tot`.
///
/// Higher is better; 1.0 is a perfect fit, 0.0 matches predicting the mean.
/// For a constant target: 1.0 if predictions are exact, 0.0 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RSquared;

impl Metric for RSquared {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }

        let mean: f64 = targets.iter().map(|&t| t as f64).sum::<f64>() / n as f64;

        let (ss_res, ss_tot) = predictions.iter().zip(targets).fold(
            (0.0f64, 0.0f64),
            |(res, tot), (&p, &t)| {
                let t = t as f64;
                let r = t - p as f64;
                let d = t - mean;
                (res + r * r, tot + d * d)
            },
        );

        if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        }
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

// =============================================================================
// MAPE (Mean Absolute Percentage Error)
// =============================================================================

/// Mean Absolute Percentage Error: mean(|pred - target| / |target|) * 100
///
/// Lower is better. Used when relative error matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mape;

impl Metric for Mape {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }

        const EPS: f64 = 1e-15;

        let sum_ape: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| {
                let p = p as f64;
                let t = t as f64;
                (p - t).abs() / t.abs().max(EPS)
            })
            .sum();

        (sum_ape / n as f64) * 100.0
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mape"
    }
}

// =============================================================================
// Tests
// =============================================================================
