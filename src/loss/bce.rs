use crate::error::Result;
use crate::loss::{batch_gradient, mean_over_rows, Loss};
use crate::math::matrix::Matrix;

/// Binary cross-entropy; pair with a Sigmoid output.
pub struct BceLoss;

const EPS: f64 = 1e-12;

impl Loss for BceLoss {
    /// Per item: -mean(y·log(p+ε) + (1-y)·log(1-p+ε))
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        mean_over_rows(predicted, expected, |p, y| {
            p.iter().zip(y.iter())
                .map(|(p, y)| -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln()))
                .sum::<f64>() / p.len() as f64
        })
    }

    /// Per output: (p - y) / ((p + ε) · (1 - p + ε))
    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        batch_gradient(predicted, expected, |p, y| (p - y) / ((p + EPS) * (1.0 - p + EPS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bce_confident_and_uncertain() {
        let y = Matrix::from_rows(vec![vec![1.0], vec![0.0]]).unwrap();
        let sure = Matrix::from_rows(vec![vec![1.0], vec![0.0]]).unwrap();
        let coin = Matrix::from_rows(vec![vec![0.5], vec![0.5]]).unwrap();
        assert_abs_diff_eq!(BceLoss.loss(&sure, &y).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(BceLoss.loss(&coin, &y).unwrap(), std::f64::consts::LN_2, epsilon = 1e-9);
    }

    #[test]
    fn test_bce_gradient_sign() {
        let y = Matrix::from_rows(vec![vec![1.0]]).unwrap();
        let p = Matrix::from_rows(vec![vec![0.3]]).unwrap();
        assert!(BceLoss.gradient(&p, &y).unwrap().data[0][0] < 0.0);
    }
}
