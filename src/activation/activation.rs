use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Normalizes each row into a probability distribution.
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
}

impl ActivationFunction {
    /// Applies the activation to a batch of pre-activations (one item per row).
    pub fn activate(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Softmax => softmax_rows(z),
            _ => z.map(|x| self.scalar(x)),
        }
    }

    /// Element-wise derivative evaluated at the pre-activation `z`.
    ///
    /// Softmax is only ever paired with cross-entropy, whose gradient is
    /// already taken w.r.t. the logits (`predicted - expected`), so it passes
    /// the incoming delta through with a derivative of 1.
    pub fn derivative(&self, z: &Matrix) -> Matrix {
        z.map(|x| match self {
            ActivationFunction::Sigmoid => {
                let fx = sigmoid(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        })
    }

    fn scalar(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax: subtract the row max before exponentiating.
fn softmax_rows(z: &Matrix) -> Matrix {
    let data = z.data.iter()
        .map(|row| {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = row.iter().map(|x| (x - max).exp()).collect();
            let sum: f64 = exps.iter().sum();
            exps.into_iter().map(|e| e / sum).collect()
        })
        .collect();
    Matrix { rows: z.rows, cols: z.cols, data }
}
