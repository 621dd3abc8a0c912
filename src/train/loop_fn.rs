use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{info, warn};

use crate::data::batch::BatchSource;
use crate::error::Result;
use crate::loss::Loss;
use crate::model::Model;
use crate::optim::Optimizer;
use crate::train::epoch::EpochRunner;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::FitConfig;

/// Trains `model` for `config.epochs` epochs and returns one `EpochStats`
/// per completed epoch.
///
/// Each epoch is a training pass over `train` followed, when `val` is given,
/// by an evaluation pass over it. Both use item-weighted running loss and the
/// accuracy chosen by `config.accuracy`. The default thresholds each output
/// at 0.5, which is only meaningful for binary targets; softmax models with
/// one-hot targets should set `AccuracyMetric::Argmax`.
///
/// # Early termination
/// The loop stops between epochs if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// Errors from either pass abort training and are returned unchanged.
pub fn fit<M, S, L>(
    model: &mut M,
    train: &mut S,
    mut val: Option<&mut dyn BatchSource>,
    loss_fn: &L,
    optimizer: &mut dyn Optimizer,
    config: &FitConfig,
) -> Result<Vec<EpochStats>>
where
    M: Model + ?Sized,
    S: BatchSource + ?Sized,
    L: Loss + ?Sized,
{
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            warn!(epoch, "stop flag set, ending training");
            break;
        }

        let t_start = Instant::now();

        let train_metrics = EpochRunner::train(&mut *optimizer)
            .with_performance_fn(config.accuracy.performance_fn())
            .run(model, train, loss_fn)?;

        let val_metrics = match val.as_deref_mut() {
            Some(source) => Some(
                EpochRunner::eval()
                    .with_performance_fn(config.accuracy.performance_fn())
                    .run(model, source, loss_fn)?,
            ),
            None => None,
        };

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss: train_metrics.loss,
            train_accuracy: train_metrics.accuracy,
            val_loss: val_metrics.map(|m| m.loss),
            val_accuracy: val_metrics.map(|m| m.accuracy),
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        info!(
            epoch,
            total = config.epochs,
            train_loss = stats.train_loss,
            train_accuracy = stats.train_accuracy,
            val_loss = ?stats.val_loss,
            val_accuracy = ?stats.val_accuracy,
            elapsed_ms = stats.elapsed_ms,
            "epoch complete"
        );

        history.push(stats.clone());

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats).is_err() {
                warn!(epoch, "progress receiver dropped, ending training");
                break;
            }
        }
    }

    Ok(history)
}

fn stop_requested(config: &FitConfig) -> bool {
    config.stop_flag
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}
