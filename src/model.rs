//! Capabilities the epoch runner needs from a model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::matrix::Matrix;

/// Whether an epoch updates parameters (`Train`) or only measures (`Eval`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Train,
    #[default]
    Eval,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Train => f.write_str("train"),
            Mode::Eval => f.write_str("eval"),
        }
    }
}

/// A trainable value and the gradient accumulated for it.
pub struct Parameter<'a> {
    pub value: &'a mut Matrix,
    pub grad: &'a mut Matrix,
}

/// A differentiable model driven one batch at a time.
pub trait Model {
    /// Forward pass over a batch (one item per row).
    fn forward(&mut self, input: &Matrix) -> Result<Matrix>;

    /// Backpropagates `grad_output` (dL/d output of the last `forward`),
    /// adding into each parameter's gradient.
    fn backward(&mut self, grad_output: &Matrix) -> Result<()>;

    /// Switches mode-dependent layers (dropout) to training behavior.
    fn train(&mut self);

    /// Switches mode-dependent layers to inference behavior.
    fn eval(&mut self);

    fn mode(&self) -> Mode;

    /// Every trainable parameter, in a stable order.
    fn parameters(&mut self) -> Vec<Parameter<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display_and_default() {
        assert_eq!(Mode::Train.to_string(), "train");
        assert_eq!(Mode::Eval.to_string(), "eval");
        assert_eq!(Mode::default(), Mode::Eval);
    }
}
