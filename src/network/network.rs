use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::model::{Mode, Model, Parameter};

/// A sequential stack of dense layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(skip)]
    mode: Mode,
}

impl Network {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn new(layer_specs: Vec<(usize, usize, ActivationFunction)>) -> Network {
        Network::with_rng(layer_specs, &mut rand::thread_rng())
    }

    /// Same as `new`, drawing initial weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        layer_specs: Vec<(usize, usize, ActivationFunction)>,
        rng: &mut R,
    ) -> Network {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::new(size, input_size, activation, rng))
            .collect();
        Network::from_layers(layers)
    }

    pub fn from_layers(layers: Vec<Layer>) -> Network {
        Network { layers, mode: Mode::Eval }
    }

    /// Checks that every layer's input width matches the previous layer's size.
    pub fn validate(&self) -> Result<()> {
        for pair in self.layers.windows(2) {
            if pair[1].input_size() != pair[0].size {
                return Err(Error::ShapeMismatch {
                    context: "layer chain",
                    expected: (pair[0].size, pair[1].size),
                    found: (pair[1].input_size(), pair[1].size),
                });
            }
        }
        Ok(())
    }

    /// Predicts a single sample without touching the current mode.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let training = self.mode == Mode::Train;
        self.set_training(false);
        let out = self.forward(&Matrix::row_vector(input.to_vec()));
        self.set_training(training);
        let mut out = out?;
        Ok(out.data.swap_remove(0))
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let network: Network = serde_json::from_reader(reader)?;
        network.validate()?;
        Ok(network)
    }

    fn set_training(&mut self, training: bool) {
        for layer in &mut self.layers {
            layer.set_training(training);
        }
    }
}

impl Model for Network {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut layers = self.layers.iter_mut();
        let mut current = match layers.next() {
            Some(first) => first.feed_from(input)?,
            None => return Ok(input.clone()),
        };
        for layer in layers {
            current = layer.feed_from(&current)?;
        }
        Ok(current)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<()> {
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad)?;
        }
        Ok(())
    }

    fn train(&mut self) {
        self.mode = Mode::Train;
        self.set_training(true);
    }

    fn eval(&mut self) {
        self.mode = Mode::Eval;
        self.set_training(false);
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn parameters(&mut self) -> Vec<Parameter<'_>> {
        self.layers.iter_mut().flat_map(|layer| layer.parameters()).collect()
    }
}
