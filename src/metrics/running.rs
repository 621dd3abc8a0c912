use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Scores at or above this value count as the positive class.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Item-weighted running loss and accuracy for one epoch.
///
/// Starts at zero and is rebuilt after every batch; after the last batch of
/// an epoch both fields are means weighted by batch size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMetrics {
    pub loss: f64,
    pub accuracy: f64,
}

impl RunningMetrics {
    pub fn new(loss: f64, accuracy: f64) -> RunningMetrics {
        RunningMetrics { loss, accuracy }
    }

    /// Adds one batch's contribution, weighted by `batch_items / total_items`.
    pub fn accumulate(
        self,
        batch_loss: f64,
        batch_accuracy: f64,
        batch_items: usize,
        total_items: usize,
    ) -> Result<RunningMetrics> {
        let weight = batch_weight(batch_items, total_items)?;
        Ok(RunningMetrics {
            loss: self.loss + batch_loss * weight,
            accuracy: self.accuracy + batch_accuracy * weight,
        })
    }
}

/// Fraction of the epoch a batch of `batch_items` represents.
pub fn batch_weight(batch_items: usize, total_items: usize) -> Result<f64> {
    if total_items == 0 {
        return Err(Error::EmptyEpoch);
    }
    Ok(batch_items as f64 / total_items as f64)
}

/// Fraction of elements where the thresholded prediction equals the target.
///
/// Assumes binary targets in {0, 1} and scores in [0, 1].
pub fn binary_accuracy(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
    if predicted.shape() != expected.shape() {
        return Err(Error::ShapeMismatch {
            context: "accuracy",
            expected: expected.shape(),
            found: predicted.shape(),
        });
    }
    if expected.is_empty() {
        return Ok(0.0);
    }
    let hits = predicted.iter().zip(expected.iter())
        .filter(|&(score, truth)| {
            let label = if *score >= DECISION_THRESHOLD { 1.0 } else { 0.0 };
            label == *truth
        })
        .count();
    Ok(hits as f64 / expected.len() as f64)
}

/// Fraction of rows whose highest-scoring column is the target's
/// highest-scoring column. Ties go to the first column.
///
/// Suits one-hot targets scored by softmax outputs.
pub fn argmax_accuracy(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
    if predicted.shape() != expected.shape() {
        return Err(Error::ShapeMismatch {
            context: "accuracy",
            expected: expected.shape(),
            found: predicted.shape(),
        });
    }
    if expected.is_empty() {
        return Ok(0.0);
    }
    let hits = predicted.data.iter().zip(expected.data.iter())
        .filter(|(scores, truth)| argmax(scores) == argmax(truth))
        .count();
    Ok(hits as f64 / expected.rows as f64)
}

fn argmax(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &x)| if x > best.1 { (i, x) } else { best })
        .0
}

/// The default performance function for `EpochRunner`: folds one batch's
/// loss and binary accuracy into `running`.
///
/// The batch's weight is its target row count over `total_items`.
pub fn running_loss_accuracy(
    loss: f64,
    predicted: &Matrix,
    expected: &Matrix,
    total_items: usize,
    running: RunningMetrics,
) -> Result<RunningMetrics> {
    let accuracy = binary_accuracy(predicted, expected)?;
    running.accumulate(loss, accuracy, expected.rows, total_items)
}

/// Like `running_loss_accuracy`, scoring with `argmax_accuracy`.
pub fn running_loss_argmax_accuracy(
    loss: f64,
    predicted: &Matrix,
    expected: &Matrix,
    total_items: usize,
    running: RunningMetrics,
) -> Result<RunningMetrics> {
    let accuracy = argmax_accuracy(predicted, expected)?;
    running.accumulate(loss, accuracy, expected.rows, total_items)
}

/// Signature shared by the built-in performance functions.
pub type MetricFn = fn(f64, &Matrix, &Matrix, usize, RunningMetrics) -> Result<RunningMetrics>;

/// How `fit` scores accuracy.
///
/// `Binary` thresholds every output at `DECISION_THRESHOLD` and only makes
/// sense for sigmoid outputs with {0, 1} targets. Use `Argmax` for one-hot
/// multi-class targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyMetric {
    #[default]
    Binary,
    Argmax,
}

impl AccuracyMetric {
    pub fn performance_fn(self) -> MetricFn {
        match self {
            AccuracyMetric::Binary => running_loss_accuracy,
            AccuracyMetric::Argmax => running_loss_argmax_accuracy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn column(values: &[f64]) -> Matrix {
        Matrix::from_rows(values.iter().map(|&v| vec![v]).collect()).unwrap()
    }

    #[test]
    fn test_perfect_and_inverted_predictions() {
        let truth = column(&[1.0, 0.0, 1.0, 0.0]);
        let exact = column(&[0.9, 0.1, 0.5, 0.49]);
        let inverted = column(&[0.1, 0.9, 0.2, 0.7]);

        let good = running_loss_accuracy(0.1, &exact, &truth, 4, RunningMetrics::default()).unwrap();
        let bad = running_loss_accuracy(0.1, &inverted, &truth, 4, RunningMetrics::default()).unwrap();

        assert_abs_diff_eq!(good.accuracy, 1.0);
        assert_abs_diff_eq!(bad.accuracy, 0.0);
    }

    #[test]
    fn test_uneven_batches_weighted_by_size() {
        // two target columns so a 3-row batch can score exactly 0.5
        let first_truth = Matrix::from_rows(vec![vec![1.0, 0.0]; 3]).unwrap();
        let first_pred = Matrix::from_rows(vec![vec![0.9, 0.9]; 3]).unwrap();
        let last_truth = Matrix::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        let last_pred = Matrix::from_rows(vec![vec![0.7, 0.2]]).unwrap();

        let m = RunningMetrics::default();
        let m = running_loss_accuracy(0.8, &first_pred, &first_truth, 4, m).unwrap();
        let m = running_loss_accuracy(0.4, &last_pred, &last_truth, 4, m).unwrap();

        assert_abs_diff_eq!(m.loss, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(m.accuracy, 0.625, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_epoch_is_an_error() {
        let y = column(&[1.0]);
        let err = running_loss_accuracy(0.3, &y, &y, 0, RunningMetrics::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyEpoch));
    }

    #[test]
    fn test_shape_mismatch() {
        let y = column(&[1.0, 0.0]);
        let p = column(&[1.0]);
        assert!(binary_accuracy(&p, &y).is_err());
    }

    #[test]
    fn test_argmax_counts_rows_not_elements() {
        // softmax row picking the right class, yet below 0.5 on every output
        let pred = Matrix::from_rows(vec![vec![0.4, 0.35, 0.25], vec![0.2, 0.3, 0.5]]).unwrap();
        let truth = Matrix::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();

        assert_abs_diff_eq!(argmax_accuracy(&pred, &truth).unwrap(), 0.5);
        assert_abs_diff_eq!(binary_accuracy(&pred, &truth).unwrap(), 4.0 / 6.0, epsilon = 1e-12);

        let m = AccuracyMetric::Argmax.performance_fn()(0.2, &pred, &truth, 4, RunningMetrics::default())
            .unwrap();
        assert_abs_diff_eq!(m.accuracy, 0.25);
        assert_abs_diff_eq!(m.loss, 0.1);
    }

    #[test]
    fn test_accuracy_metric_from_json() {
        let metric: AccuracyMetric = serde_json::from_str(r#""argmax""#).unwrap();
        assert_eq!(metric, AccuracyMetric::Argmax);
        assert_eq!(AccuracyMetric::default(), AccuracyMetric::Binary);
    }

    proptest! {
        #[test]
        fn prop_batch_weights_sum_to_one(sizes in prop::collection::vec(1usize..64, 1..20)) {
            let total: usize = sizes.iter().sum();
            let sum: f64 = sizes.iter().map(|&c| batch_weight(c, total).unwrap()).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_constant_metrics_stay_constant(
            sizes in prop::collection::vec(1usize..32, 1..10),
            loss in 0.0f64..5.0,
            acc in 0.0f64..1.0,
        ) {
            let total: usize = sizes.iter().sum();
            let m = sizes.iter().try_fold(RunningMetrics::default(), |m, &c| {
                m.accumulate(loss, acc, c, total)
            }).unwrap();
            prop_assert!((m.loss - loss).abs() < 1e-9);
            prop_assert!((m.accuracy - acc).abs() < 1e-9);
        }
    }
}
