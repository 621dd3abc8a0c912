use serde::{Serialize, Deserialize};

/// Per-epoch summary produced by `fit`.
///
/// `fit` returns the full history and, when `FitConfig::progress_tx` is set,
/// also sends each value as soon as its epoch finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Item-weighted mean training loss over the epoch.
    pub train_loss: f64,
    /// Item-weighted thresholded accuracy over the epoch, in [0, 1].
    pub train_accuracy: f64,
    /// Only set when a validation source was given.
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of the train and validation passes.
    pub elapsed_ms: u64,
}
