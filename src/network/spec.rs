use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::layers::dense::Layer;
use crate::loss::loss_type::LossType;
use crate::network::network::Network;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       — number of neurons in this layer
/// - `input_size` — output size of the previous layer, or the raw input
///                  dimension for the first layer
/// - `activation` — activation function applied after the linear transform
/// - `dropout`    — optional drop probability applied in training mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
    #[serde(default)]
    pub dropout: Option<f64>,
}

/// A serializable network architecture plus the loss it is trained with.
///
/// Stored separately from trained weights so an architecture can be kept
/// before any training happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    pub loss: LossType,
}

impl NetworkSpec {
    /// Instantiates freshly initialized weights for this architecture.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        let layers = self.layers.iter()
            .map(|spec| {
                let layer = Layer::new(spec.size, spec.input_size, spec.activation, rng);
                match spec.dropout {
                    Some(rate) => layer.with_dropout(rate),
                    None => Ok(layer),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let network = Network::from_layers(layers);
        network.validate()?;
        Ok(network)
    }

    pub fn from_json_str(json: &str) -> Result<NetworkSpec> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the architecture to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
