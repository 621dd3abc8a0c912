pub mod running;

pub use running::{
    argmax_accuracy, batch_weight, binary_accuracy, running_loss_accuracy,
    running_loss_argmax_accuracy, AccuracyMetric, MetricFn, RunningMetrics, DECISION_THRESHOLD,
};
