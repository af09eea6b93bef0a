//! Epoch Loop
//!
//! Repeats [`Network::train_batch`] over the same batch and tracks how the
//! dropout-free loss evolves. Each epoch is one in-order pass of per-sample SGD;
//! the loss recorded afterwards is the mean cross-entropy of [`Network::predict`]
//! over the batch.
//!
//! ## Example
//!
//! ```rust
//! use deepdrop::{train, Network, NetworkConfig, TrainingConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut network = Network::new(&NetworkConfig::from_dims(&[4, 3, 2]), 1).unwrap();
//! let inputs = vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 1.0]];
//! let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
//! let config = TrainingConfig::new().epochs(20).log_every(0);
//!
//! let result = train(&mut network, &inputs, &targets, &config, &mut StdRng::seed_from_u64(3)).unwrap();
//! assert_eq!(result.loss_history.len(), 20);
//! ```

use crate::error::Result;
use crate::loss::{error_norm, Loss};
use crate::network::Network;
use crate::tensor::Tensor;
use crate::training_logger::TrainingLogger;
use rand::Rng;
use std::io::Write;

/// Configuration for the epoch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    /// Number of passes over the batch.
    pub epochs: usize,
    /// Log every `log_every` epochs (and the last one); 0 disables progress logging.
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 1000,
            log_every: 100,
        }
    }
}

impl TrainingConfig {
    /// Creates a new TrainingConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the logging interval.
    pub fn log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    fn should_log(&self, epoch: usize) -> bool {
        self.log_every > 0 && (epoch % self.log_every == 0 || epoch == self.epochs)
    }
}

/// Metrics gathered over a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingResult {
    /// Mean cross-entropy after each epoch.
    pub loss_history: Vec<f64>,
    /// Mean ‖target − output‖ after each epoch.
    pub error_history: Vec<f64>,
}

/// Evaluate the batch without dropout: (mean cross-entropy, mean error norm).
///
/// Fails with the same errors as [`Network::train_batch`] when the batch is malformed.
pub fn evaluate(network: &Network, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<(f64, f64)> {
    network.check_batch(inputs, targets)?;

    let mut outputs = Vec::with_capacity(inputs.len());
    for input in inputs {
        outputs.push(network.predict(input)?);
    }
    let targets: Vec<Tensor> = targets.iter().map(|t| Tensor::from_vec(t.clone())).collect();

    let loss = Loss::CrossEntropy.mean(&outputs, &targets);
    let norm = if outputs.is_empty() {
        0.0
    } else {
        outputs
            .iter()
            .zip(&targets)
            .map(|(y, t)| error_norm(y, t))
            .sum::<f64>()
            / outputs.len() as f64
    };
    Ok((loss, norm))
}

/// Train for `config.epochs` passes, logging progress through the `log` facade.
pub fn train<R: Rng + ?Sized>(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainingConfig,
    rng: &mut R,
) -> Result<TrainingResult> {
    run_epochs(network, inputs, targets, config, rng, |epoch, lr, loss, norm| {
        log::info!(
            "Epoch {}/{}: lr = {}, loss = {:.6}, error = {:.6}",
            epoch,
            config.epochs,
            lr,
            loss,
            norm
        );
        Ok(())
    })
}

/// Train like [`train`], writing each logged epoch to a [`TrainingLogger`].
pub fn train_logged<R: Rng + ?Sized, W: Write>(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainingConfig,
    rng: &mut R,
    logger: &mut TrainingLogger<W>,
) -> Result<TrainingResult> {
    run_epochs(network, inputs, targets, config, rng, |epoch, lr, loss, norm| {
        logger.log(epoch, lr, loss, norm)?;
        Ok(())
    })
}

fn run_epochs<R, F>(
    network: &mut Network,
    inputs: &[Vec<f64>],
    targets: &[Vec<f64>],
    config: &TrainingConfig,
    rng: &mut R,
    mut on_log: F,
) -> Result<TrainingResult>
where
    R: Rng + ?Sized,
    F: FnMut(usize, f64, f64, f64) -> Result<()>,
{
    let mut result = TrainingResult {
        loss_history: Vec::with_capacity(config.epochs),
        error_history: Vec::with_capacity(config.epochs),
    };
    let learning_rate = network.config().learning_rate;

    for epoch in 1..=config.epochs {
        network.train_batch(inputs, targets, rng)?;

        let (loss, norm) = evaluate(network, inputs, targets)?;
        if !loss.is_finite() {
            log::warn!("epoch {}: loss is not finite ({})", epoch, loss);
        }
        result.loss_history.push(loss);
        result.error_history.push(norm);

        if config.should_log(epoch) {
            on_log(epoch, learning_rate, loss, norm)?;
        }
    }

    Ok(result)
}
