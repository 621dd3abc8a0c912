use tracing::debug;

use crate::data::batch::BatchSource;
use crate::data::device::Device;
use crate::error::{Error, Result};
use crate::loss::Loss;
use crate::math::matrix::Matrix;
use crate::metrics::running::{running_loss_accuracy, RunningMetrics};
use crate::model::{Mode, Model};
use crate::optim::Optimizer;

/// Folds one batch into the running metrics:
/// `(loss, predicted, targets, total_items, running) -> running`.
pub type PerformanceFn<'a> =
    dyn FnMut(f64, &Matrix, &Matrix, usize, RunningMetrics) -> Result<RunningMetrics> + 'a;

/// Rewrites a batch before it is moved to the device: `(inputs, targets) -> (inputs, targets)`.
pub type PreprocessFn<'a> = dyn FnMut(Matrix, Matrix) -> (Matrix, Matrix) + 'a;

/// Forward pass plus loss for one batch. Returns `(predicted, loss)`.
pub fn evaluate_batch<M, L>(
    model: &mut M,
    loss_fn: &L,
    inputs: &Matrix,
    targets: &Matrix,
) -> Result<(Matrix, f64)>
where
    M: Model + ?Sized,
    L: Loss + ?Sized,
{
    let predicted = model.forward(inputs)?;
    let loss = loss_fn.loss(&predicted, targets)?;
    Ok((predicted, loss))
}

/// One optimization step: zero gradients, forward, loss, backward, update.
/// Returns `(predicted, loss)` from before the update.
pub fn train_batch<M, L, O>(
    model: &mut M,
    loss_fn: &L,
    optimizer: &mut O,
    inputs: &Matrix,
    targets: &Matrix,
) -> Result<(Matrix, f64)>
where
    M: Model + ?Sized,
    L: Loss + ?Sized,
    O: Optimizer + ?Sized,
{
    optimizer.zero_grad(&mut model.parameters());
    let (predicted, loss) = evaluate_batch(model, loss_fn, inputs, targets)?;
    let grad = loss_fn.gradient(&predicted, targets)?;
    model.backward(&grad)?;
    optimizer.step(&mut model.parameters());
    Ok((predicted, loss))
}

/// Runs a single pass over a `BatchSource` in training or evaluation mode.
///
/// A performance function is always required (`with_running_metrics` installs
/// the standard item-weighted loss/accuracy one). Training mode also
/// requires an optimizer. Both are checked before the first batch is drawn.
///
/// ```ignore
/// let metrics = EpochRunner::train(&mut sgd)
///     .with_running_metrics()
///     .run(&mut network, &mut loader, &LossType::BinaryCrossEntropy)?;
/// ```
pub struct EpochRunner<'a> {
    pub mode: Mode,
    optimizer: Option<&'a mut dyn Optimizer>,
    performance_fn: Option<Box<PerformanceFn<'a>>>,
    preprocess_fn: Option<Box<PreprocessFn<'a>>>,
    device: Option<&'a dyn Device>,
}

impl<'a> EpochRunner<'a> {
    pub fn new(mode: Mode) -> Self {
        EpochRunner {
            mode,
            optimizer: None,
            performance_fn: None,
            preprocess_fn: None,
            device: None,
        }
    }

    pub fn train(optimizer: &'a mut dyn Optimizer) -> Self {
        EpochRunner::new(Mode::Train).with_optimizer(optimizer)
    }

    pub fn eval() -> Self {
        EpochRunner::new(Mode::Eval)
    }

    pub fn with_optimizer(mut self, optimizer: &'a mut dyn Optimizer) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn with_performance_fn<F>(mut self, performance_fn: F) -> Self
    where
        F: FnMut(f64, &Matrix, &Matrix, usize, RunningMetrics) -> Result<RunningMetrics> + 'a,
    {
        self.performance_fn = Some(Box::new(performance_fn));
        self
    }

    /// Uses `running_loss_accuracy` as the performance function.
    pub fn with_running_metrics(self) -> Self {
        self.with_performance_fn(running_loss_accuracy)
    }

    pub fn with_preprocess_fn<F>(mut self, preprocess_fn: F) -> Self
    where
        F: FnMut(Matrix, Matrix) -> (Matrix, Matrix) + 'a,
    {
        self.preprocess_fn = Some(Box::new(preprocess_fn));
        self
    }

    pub fn with_device(mut self, device: &'a dyn Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Runs one epoch and returns the item-weighted loss and accuracy.
    ///
    /// Any error from the model, loss, device or performance function ends
    /// the epoch immediately and is returned as is.
    pub fn run<M, S, L>(&mut self, model: &mut M, source: &mut S, loss_fn: &L) -> Result<RunningMetrics>
    where
        M: Model + ?Sized,
        S: BatchSource + ?Sized,
        L: Loss + ?Sized,
    {
        let performance_fn = self.performance_fn.as_mut().ok_or(Error::MissingPerformanceFn)?;
        let mut optimizer = match self.mode {
            Mode::Train => Some(self.optimizer.as_deref_mut().ok_or(Error::MissingOptimizer)?),
            Mode::Eval => None,
        };

        let total_items = source.dataset_len();
        let mut running = RunningMetrics::default();

        for (step, batch) in source.batches().enumerate() {
            let (mut inputs, mut targets) = batch.into_parts();
            if let Some(preprocess) = self.preprocess_fn.as_mut() {
                (inputs, targets) = preprocess(inputs, targets);
            }
            if let Some(device) = self.device {
                inputs = device.transfer(inputs)?;
                targets = device.transfer(targets)?;
            }

            let (predicted, loss) = match optimizer.as_deref_mut() {
                Some(optimizer) => {
                    model.train();
                    train_batch(model, loss_fn, optimizer, &inputs, &targets)?
                }
                None => {
                    model.eval();
                    evaluate_batch(model, loss_fn, &inputs, &targets)?
                }
            };

            running = performance_fn(loss, &predicted, &targets, total_items, running)?;
            debug!(
                mode = %self.mode,
                step,
                items = targets.rows,
                loss,
                running_loss = running.loss,
                running_accuracy = running.accuracy,
                "batch done"
            );
        }

        Ok(running)
    }
}
