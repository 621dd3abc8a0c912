use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use serde::{Serialize, Deserialize};

use crate::data::loader::DataLoader;
use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::metrics::running::AccuracyMetric;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `fit` run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — items per mini-batch for loaders built by `loader()`
/// - `shuffle`       — reshuffle the training data on every pass
/// - `seed`          — fixes the shuffle order when set
/// - `learning_rate` — SGD step size for `optimizer()`
/// - `momentum`      — SGD momentum for `optimizer()`; 0 disables it
/// - `accuracy`      — how accuracy is scored; `binary` (thresholded, the
///                     default) or `argmax` for one-hot multi-class targets
/// - `progress_tx`   — optional sender; one `EpochStats` per completed epoch.
///                     A dropped receiver stops training.
/// - `stop_flag`     — optional flag; once `true`, training stops before the
///                     next epoch starts.
///
/// The channel and flag are runtime-only and never (de)serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub learning_rate: f64,
    pub momentum: f64,
    pub accuracy: AccuracyMetric,
    #[serde(skip)]
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    #[serde(skip)]
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            epochs: 10,
            batch_size: 32,
            shuffle: true,
            seed: None,
            learning_rate: 0.1,
            momentum: 0.0,
            accuracy: AccuracyMetric::Binary,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl FitConfig {
    /// Creates a `FitConfig` with no progress channel and no stop flag.
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64) -> Self {
        FitConfig {
            epochs,
            batch_size,
            learning_rate,
            ..FitConfig::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<FitConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_json(path: &str) -> Result<FitConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Training loader honoring `batch_size`, `shuffle` and `seed`.
    pub fn loader(&self, inputs: Matrix, targets: Matrix) -> Result<DataLoader> {
        let loader = DataLoader::new(inputs, targets, self.batch_size)?.shuffled(self.shuffle);
        Ok(match self.seed {
            Some(seed) => loader.with_seed(seed),
            None => loader,
        })
    }

    pub fn optimizer(&self) -> Sgd {
        Sgd::with_momentum(self.learning_rate, self.momentum)
    }
}
