use crate::error::Result;
use crate::loss::{batch_gradient, mean_over_rows, Loss};
use crate::math::matrix::Matrix;

/// Categorical cross-entropy for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Keeps log() away from 0.
const EPS: f64 = 1e-12;

impl Loss for CrossEntropyLoss {
    /// Per item: -sum(expected[i] * log(predicted[i] + eps))
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        mean_over_rows(predicted, expected, |p, y| {
            p.iter().zip(y.iter()).map(|(p, e)| -e * (p + EPS).ln()).sum()
        })
    }

    /// Gradient w.r.t. the pre-softmax logits: `predicted - expected`.
    /// The Softmax layer passes it through unchanged.
    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        batch_gradient(predicted, expected, |p, e| p - e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cross_entropy_one_hot() {
        let p = Matrix::from_rows(vec![vec![0.25, 0.75]]).unwrap();
        let y = Matrix::from_rows(vec![vec![0.0, 1.0]]).unwrap();
        assert_abs_diff_eq!(CrossEntropyLoss.loss(&p, &y).unwrap(), -(0.75f64).ln(), epsilon = 1e-9);
        assert_eq!(CrossEntropyLoss.gradient(&p, &y).unwrap().data, vec![vec![0.25, -0.25]]);
    }
}
