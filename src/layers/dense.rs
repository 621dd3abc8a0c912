use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::model::Parameter;

/// Fully connected layer: `a = f(x·W + b)`, optionally followed by inverted
/// dropout while training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    /// Shape `(input_size, size)`.
    pub weights: Matrix,
    /// Shape `(1, size)`.
    pub biases: Matrix,
    pub activator: ActivationFunction,
    /// Probability of zeroing an activation in training mode.
    #[serde(default)]
    pub dropout: Option<f64>,

    #[serde(skip)]
    training: bool,
    #[serde(skip)]
    input: Matrix,
    // pre-activation values (z = xW + b) needed for the derivative
    #[serde(skip)]
    pre_activation: Matrix,
    #[serde(skip)]
    mask: Option<Matrix>,
    #[serde(skip)]
    weights_grad: Matrix,
    #[serde(skip)]
    biases_grad: Matrix,
    // Draws dropout masks; seeded from the construction rng.
    #[serde(skip, default = "StdRng::from_entropy")]
    rng: StdRng,
}

impl Layer {
    /// Creates a layer with Xavier weights (He for ReLU variants) and zero biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. } => {
                Matrix::he(input_size, size, rng)
            }
            _ => Matrix::xavier(input_size, size, rng),
        };
        let mask_rng = StdRng::seed_from_u64(rng.gen());

        Layer {
            size,
            weights,
            biases: Matrix::zeros(1, size),
            activator: activation,
            dropout: None,
            training: false,
            input: Matrix::default(),
            pre_activation: Matrix::default(),
            mask: None,
            weights_grad: Matrix::zeros(input_size, size),
            biases_grad: Matrix::zeros(1, size),
            rng: mask_rng,
        }
    }

    /// Enables inverted dropout. `rate` must lie in `[0, 1)`.
    pub fn with_dropout(mut self, rate: f64) -> Result<Layer> {
        if !(0.0..1.0).contains(&rate) {
            return Err(Error::InvalidDropout(rate));
        }
        self.dropout = Some(rate);
        Ok(self)
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Forward pass over a batch; caches what `backward` needs.
    pub fn feed_from(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size() {
            return Err(Error::ShapeMismatch {
                context: "layer input",
                expected: (input.rows, self.input_size()),
                found: input.shape(),
            });
        }

        let z = (input * &self.weights).add_row(&self.biases);
        let mut a = self.activator.activate(&z);

        self.mask = match self.dropout {
            Some(rate) if self.training && rate > 0.0 => {
                let keep = 1.0 - rate;
                let mut mask = Matrix::zeros(a.rows, a.cols);
                for x in mask.data.iter_mut().flatten() {
                    *x = if self.rng.gen::<f64>() < keep { 1.0 / keep } else { 0.0 };
                }
                a = a.hadamard(&mask);
                Some(mask)
            }
            _ => None,
        };

        self.input = input.clone();
        self.pre_activation = z;
        Ok(a)
    }

    /// Accumulates dL/dW and dL/db from `grad_output` (dL/da for this layer)
    /// and returns dL/dx for the previous layer.
    pub fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let expected = (self.input.rows, self.size);
        if grad_output.shape() != expected {
            return Err(Error::ShapeMismatch {
                context: "layer backward",
                expected,
                found: grad_output.shape(),
            });
        }

        let grad = match &self.mask {
            Some(mask) => grad_output.hadamard(mask),
            None => grad_output.clone(),
        };
        let delta = grad.hadamard(&self.activator.derivative(&self.pre_activation));

        self.ensure_grads();
        self.weights_grad.add_scaled(&(&self.input.transpose() * &delta), 1.0);
        self.biases_grad.add_scaled(&delta.column_sums(), 1.0);

        Ok(&delta * &self.weights.transpose())
    }

    pub fn parameters(&mut self) -> [Parameter<'_>; 2] {
        self.ensure_grads();
        [
            Parameter { value: &mut self.weights, grad: &mut self.weights_grad },
            Parameter { value: &mut self.biases, grad: &mut self.biases_grad },
        ]
    }

    // Gradient buffers are not serialized; size them on first use after a load.
    fn ensure_grads(&mut self) {
        if self.weights_grad.shape() != self.weights.shape() {
            self.weights_grad = Matrix::zeros(self.weights.rows, self.weights.cols);
        }
        if self.biases_grad.shape() != self.biases.shape() {
            self.biases_grad = Matrix::zeros(self.biases.rows, self.biases.cols);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn identity_layer() -> Layer {
        let mut layer = Layer::new(1, 2, ActivationFunction::Identity, &mut StdRng::seed_from_u64(1));
        layer.weights = Matrix::from_rows(vec![vec![2.0], vec![-1.0]]).unwrap();
        layer.biases = Matrix::row_vector(vec![0.5]);
        layer
    }

    #[test]
    fn test_feed_from_batch() {
        let mut layer = identity_layer();
        let x = Matrix::from_rows(vec![vec![1.0, 1.0], vec![0.0, 2.0]]).unwrap();
        let a = layer.feed_from(&x).unwrap();
        assert_eq!(a.data, vec![vec![1.5], vec![-1.5]]);
    }

    #[test]
    fn test_feed_from_rejects_wrong_width() {
        let mut layer = identity_layer();
        let x = Matrix::row_vector(vec![1.0, 2.0, 3.0]);
        assert!(matches!(layer.feed_from(&x), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_backward_accumulates_gradients() {
        let mut layer = identity_layer();
        let x = Matrix::from_rows(vec![vec![1.0, 3.0]]).unwrap();
        layer.feed_from(&x).unwrap();
        let grad_in = layer.backward(&Matrix::row_vector(vec![1.0])).unwrap();
        layer.backward(&Matrix::row_vector(vec![1.0])).unwrap();

        assert_eq!(grad_in.data, vec![vec![2.0, -1.0]]);
        let [w, b] = layer.parameters();
        assert_eq!(w.grad.data, vec![vec![2.0], vec![6.0]]);
        assert_abs_diff_eq!(b.grad.data[0][0], 2.0);
    }

    #[test]
    fn test_dropout_only_in_training() {
        let mut layer = identity_layer().with_dropout(0.5).unwrap();
        let x = Matrix::from_rows(vec![vec![1.0, 1.0]; 64]).unwrap();

        let eval_out = layer.feed_from(&x).unwrap();
        assert!(eval_out.iter().all(|&v| v == 1.5));

        layer.set_training(true);
        let train_out = layer.feed_from(&x).unwrap();
        assert!(train_out.iter().all(|&v| v == 0.0 || v == 3.0));
    }

    #[test]
    fn test_dropout_masks_follow_construction_seed() {
        let build = || {
            Layer::new(16, 2, ActivationFunction::Sigmoid, &mut StdRng::seed_from_u64(11))
                .with_dropout(0.5)
                .unwrap()
        };
        let (mut a, mut b) = (build(), build());
        a.set_training(true);
        b.set_training(true);
        let x = Matrix::from_rows(vec![vec![0.3, -0.7]; 8]).unwrap();

        let first = a.feed_from(&x).unwrap();
        assert_eq!(first, b.feed_from(&x).unwrap());
        assert!(first.iter().any(|&v| v == 0.0));
        assert_eq!(a.feed_from(&x).unwrap(), b.feed_from(&x).unwrap());
    }

    #[test]
    fn test_with_dropout_rejects_out_of_range() {
        for rate in [f64::NAN, 1.0, 1.5, -0.1, f64::INFINITY] {
            let err = identity_layer().with_dropout(rate).unwrap_err();
            assert!(matches!(err, Error::InvalidDropout(_)), "rate {rate} accepted");
        }
        assert_eq!(identity_layer().with_dropout(0.0).unwrap().dropout, Some(0.0));
    }
}
