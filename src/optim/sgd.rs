use crate::math::matrix::Matrix;
use crate::model::Parameter;
use crate::optim::Optimizer;

/// Stochastic gradient descent with optional classical momentum.
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    velocities: Vec<Matrix>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd::with_momentum(learning_rate, 0.0)
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum, velocities: Vec::new() }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [Parameter<'_>]) {
        if self.momentum == 0.0 {
            for param in params.iter_mut() {
                param.value.add_scaled(param.grad, -self.learning_rate);
            }
            return;
        }

        // velocity buffers follow the parameter order; reset if the model changed
        let shapes_match = self.velocities.len() == params.len()
            && self.velocities.iter().zip(params.iter()).all(|(v, p)| v.shape() == p.value.shape());
        if !shapes_match {
            self.velocities = params.iter()
                .map(|p| Matrix::zeros(p.value.rows, p.value.cols))
                .collect();
        }

        let (lr, momentum) = (self.learning_rate, self.momentum);
        for (velocity, param) in self.velocities.iter_mut().zip(params.iter_mut()) {
            // v = μ·v + g ;  w -= lr·v
            *velocity = velocity.map(|v| v * momentum);
            velocity.add_scaled(param.grad, 1.0);
            param.value.add_scaled(velocity, -lr);
        }
    }
}
