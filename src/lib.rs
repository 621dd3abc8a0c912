pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod model;
pub mod network;
pub mod loss;
pub mod optim;
pub mod data;
pub mod metrics;
pub mod train;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use model::{Mode, Model, Parameter};
pub use network::{Network, NetworkSpec, LayerSpec};
pub use loss::{BceLoss, CrossEntropyLoss, Loss, LossType, MseLoss};
pub use optim::{Optimizer, Sgd};
pub use data::{Batch, BatchSource, Cpu, DataLoader, Device};
pub use metrics::{running_loss_accuracy, AccuracyMetric, RunningMetrics};
pub use train::{fit, EpochRunner, EpochStats, FitConfig};
