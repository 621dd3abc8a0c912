pub mod mse;
pub mod bce;
pub mod cross_entropy;
pub mod loss_type;

pub use mse::MseLoss;
pub use bce::BceLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use loss_type::LossType;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// A differentiable loss over a batch (one item per row).
///
/// `loss` is the mean of the per-item losses; `gradient` is its derivative
/// w.r.t. `predicted`, so it already carries the `1 / rows` factor.
pub trait Loss {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64>;

    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix>;
}

pub(crate) fn check_shapes(predicted: &Matrix, expected: &Matrix) -> Result<()> {
    if predicted.shape() != expected.shape() || predicted.is_empty() {
        return Err(Error::ShapeMismatch {
            context: "loss",
            expected: expected.shape(),
            found: predicted.shape(),
        });
    }
    Ok(())
}

/// Averages a per-row loss over the batch.
pub(crate) fn mean_over_rows<F>(predicted: &Matrix, expected: &Matrix, per_row: F) -> Result<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    check_shapes(predicted, expected)?;
    let total: f64 = predicted.data.iter().zip(expected.data.iter())
        .map(|(p, y)| per_row(p, y))
        .sum();
    Ok(total / predicted.rows as f64)
}

/// Element-wise gradient scaled by `1 / rows`.
pub(crate) fn batch_gradient<F>(predicted: &Matrix, expected: &Matrix, per_element: F) -> Result<Matrix>
where
    F: Fn(f64, f64) -> f64,
{
    check_shapes(predicted, expected)?;
    let inv_batch = 1.0 / predicted.rows as f64;
    Ok(predicted.zip_map(expected, |p, y| per_element(p, y) * inv_batch))
}
