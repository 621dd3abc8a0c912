use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::loss::{BceLoss, CrossEntropyLoss, Loss, MseLoss};
use crate::math::matrix::Matrix;

/// Selects a loss by name, e.g. from a JSON `NetworkSpec`.
///
/// - `Mse`                — pair with Identity or Sigmoid output.
/// - `CrossEntropy`       — pair with Softmax output.
/// - `BinaryCrossEntropy` — pair with Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
}

impl Loss for LossType {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        match self {
            LossType::Mse                => MseLoss.loss(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss.loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss.loss(predicted, expected),
        }
    }

    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        match self {
            LossType::Mse                => MseLoss.gradient(predicted, expected),
            LossType::CrossEntropy       => CrossEntropyLoss.gradient(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss.gradient(predicted, expected),
        }
    }
}
