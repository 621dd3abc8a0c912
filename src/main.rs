// XOR demo: trains a small sigmoid network with `fit` and prints its
// predictions. Set RUST_LOG=epoch_runner=debug to see per-batch metrics.
use epoch_runner::{
    fit, ActivationFunction, DataLoader, FitConfig, LossType, Matrix, Network, Result,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let inputs = Matrix::from_rows(vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ])?;
    let targets = Matrix::from_rows(vec![vec![1.0], vec![0.0], vec![1.0], vec![0.0]])?;

    let mut network = Network::new(vec![
        (4, 2, ActivationFunction::Tanh),
        (1, 4, ActivationFunction::Sigmoid),
    ]);

    let mut config = FitConfig::new(2000, 4, 0.5);
    config.momentum = 0.9;
    config.shuffle = false;

    let mut train = config.loader(inputs.clone(), targets.clone())?;
    let mut val = DataLoader::new(inputs.clone(), targets, 4)?;
    let mut optimizer = config.optimizer();

    let history = fit(
        &mut network,
        &mut train,
        Some(&mut val),
        &LossType::BinaryCrossEntropy,
        &mut optimizer,
        &config,
    )?;

    if let Some(last) = history.last() {
        println!(
            "after {} epochs: loss = {:.6}, accuracy = {:.2}",
            last.epoch, last.train_loss, last.train_accuracy
        );
    }

    for row in &inputs.data {
        println!("Input: {:?} -> Output: {:.4}", row, network.predict(row)?[0]);
    }

    Ok(())
}
