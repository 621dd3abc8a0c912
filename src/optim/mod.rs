pub mod sgd;

pub use sgd::Sgd;

use crate::model::Parameter;

/// Updates model parameters from their accumulated gradients.
pub trait Optimizer {
    /// Clears every gradient before the next backward pass.
    fn zero_grad(&mut self, params: &mut [Parameter<'_>]) {
        for param in params.iter_mut() {
            param.grad.fill(0.0);
        }
    }

    /// Applies one update step.
    fn step(&mut self, params: &mut [Parameter<'_>]);
}
