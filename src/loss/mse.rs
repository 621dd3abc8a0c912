use crate::error::Result;
use crate::loss::{batch_gradient, mean_over_rows, Loss};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl Loss for MseLoss {
    /// Per item: mean((predicted - expected)²)
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        mean_over_rows(predicted, expected, |p, y| {
            p.iter().zip(y.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / p.len() as f64
        })
    }

    /// Per output: predicted - expected
    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        batch_gradient(predicted, expected, |p, y| p - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mse_batch_mean() {
        let p = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.5, 0.5]]).unwrap();
        let y = Matrix::from_rows(vec![vec![0.0, 0.0], vec![0.5, 0.5]]).unwrap();
        assert_abs_diff_eq!(MseLoss.loss(&p, &y).unwrap(), 0.25);
        let g = MseLoss.gradient(&p, &y).unwrap();
        assert_eq!(g.data, vec![vec![0.5, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_mse_shape_mismatch() {
        let p = Matrix::from_rows(vec![vec![1.0]]).unwrap();
        let y = Matrix::from_rows(vec![vec![1.0], vec![0.0]]).unwrap();
        assert!(MseLoss.loss(&p, &y).is_err());
    }
}
