//! Feedforward Classifier with Dropout
//!
//! This module holds the network and its per-sample training step:
//!
//! ```text
//! input [in]
//!     ↓
//! Linear → Sigmoid → Dropout      (hidden layer 1)
//!     ↓
//!    ...                           (hidden layers 2..L-1)
//!     ↓
//! Linear → Softmax                 (output layer, no dropout)
//! ```
//!
//! The reference configuration ([`NetworkConfig::deep_dropout`]) is
//! 25 → 20 → 20 → 20 → 5 with dropout 0.2 on every hidden layer and a learning rate
//! of 0.01, but any chain of layer shapes works.
//!
//! ## Training Step
//!
//! For each sample, strictly in batch order:
//!
//! 1. **Forward**: run every layer, drawing fresh dropout masks
//! 2. **Backward**: `delta_L = target − output`, then for each hidden layer
//!    `delta_l = h_l ⊙ (1 − h_l) ⊙ (W_{l+1}ᵀ · delta_{l+1})`, all against the
//!    pre-update weights
//! 3. **Update**: `W_l += α · delta_l ⊗ input_l` for every layer
//!
//! Sample `k`'s update is visible to sample `k + 1`; nothing is averaged.
//!
//! ## Validation
//!
//! Every sample of a batch is checked against the layer shapes before the first
//! weight changes. A bad batch leaves the network untouched.
//!
//! ## Example
//!
//! ```rust
//! use deepdrop::{Network, NetworkConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = NetworkConfig::deep_dropout();
//! let mut network = Network::new(&config, 42).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let mut input = vec![0.0; 25];
//! input[0] = 1.0;
//! let mut target = vec![0.0; 5];
//! target[0] = 1.0;
//!
//! network.train_batch(&[input], &[target], &mut rng).unwrap();
//! ```

use crate::error::{NetworkError, Result};
use crate::gradients::{compute_grad_norm, delta_norms};
use crate::layers::{
    sigmoid_backward, sigmoid_forward, softmax_forward, DropoutCache, DropoutMode, LinearCache,
    TrainableDropout, TrainableLinear,
};
use crate::loss::Loss;
use crate::optimizer::sgd_update;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shape of one weight matrix: it maps `input_dim` values to `output_dim` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerShape {
    pub input_dim: usize,
    pub output_dim: usize,
}

impl LayerShape {
    pub fn new(input_dim: usize, output_dim: usize) -> Self {
        Self {
            input_dim,
            output_dim,
        }
    }
}

/// Network configuration
///
/// # Fields
///
/// - `layers`: Ordered layer shapes; each `output_dim` must equal the next `input_dim`
/// - `dropout_rates`: One rate per hidden layer (every layer but the last)
/// - `dropout_mode`: Unscaled (default) or inverted dropout
/// - `learning_rate`: Step size α of the additive update
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub layers: Vec<LayerShape>,
    pub dropout_rates: Vec<f64>,
    #[serde(default)]
    pub dropout_mode: DropoutMode,
    pub learning_rate: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::deep_dropout()
    }
}

impl NetworkConfig {
    /// Reference configuration: 25 → 20 → 20 → 20 → 5, dropout 0.2, α = 0.01
    pub fn deep_dropout() -> Self {
        Self::from_dims(&[25, 20, 20, 20, 5])
    }

    /// Build a chain from layer widths, e.g. `[25, 20, 5]` gives two weight matrices
    ///
    /// Hidden layers get dropout 0.2 and the learning rate is 0.01. Fewer than two
    /// widths yields an empty topology that fails [`validate`](Self::validate).
    pub fn from_dims(dims: &[usize]) -> Self {
        let layers: Vec<LayerShape> = dims
            .windows(2)
            .map(|pair| LayerShape::new(pair[0], pair[1]))
            .collect();
        let hidden = layers.len().saturating_sub(1);
        Self {
            layers,
            dropout_rates: vec![0.2; hidden],
            dropout_mode: DropoutMode::Unscaled,
            learning_rate: 0.01,
        }
    }

    /// Use the same dropout rate on every hidden layer
    pub fn with_dropout_rate(mut self, rate: f64) -> Self {
        self.dropout_rates = vec![rate; self.num_hidden()];
        self
    }

    /// Set one dropout rate per hidden layer
    pub fn with_dropout_rates(mut self, rates: Vec<f64>) -> Self {
        self.dropout_rates = rates;
        self
    }

    pub fn with_dropout_mode(mut self, mode: DropoutMode) -> Self {
        self.dropout_mode = mode;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Number of hidden (sigmoid + dropout) layers
    pub fn num_hidden(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Length of a sample input; 0 for an empty topology
    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_dim)
    }

    /// Length of a sample target; 0 for an empty topology
    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(0, |l| l.output_dim)
    }

    /// Check the topology, dropout rates, and learning rate
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NetworkError::InvalidTopology {
                message: "at least one layer is required".to_string(),
            });
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.input_dim == 0 || layer.output_dim == 0 {
                return Err(NetworkError::InvalidTopology {
                    message: format!("layer {} has a zero dimension", i + 1),
                });
            }
        }

        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_dim != pair[1].input_dim {
                return Err(NetworkError::dimension(
                    format!("input of layer {}", i + 2),
                    pair[0].output_dim,
                    pair[1].input_dim,
                ));
            }
        }

        if self.dropout_rates.len() != self.num_hidden() {
            return Err(NetworkError::InvalidTopology {
                message: format!(
                    "{} dropout rates given for {} hidden layers",
                    self.dropout_rates.len(),
                    self.num_hidden()
                ),
            });
        }

        for (layer, &rate) in self.dropout_rates.iter().enumerate() {
            if !(0.0..=1.0).contains(&rate) {
                return Err(NetworkError::InvalidDropoutRate {
                    layer: layer + 1,
                    rate,
                });
            }
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetworkError::InvalidLearningRate(self.learning_rate));
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Values one hidden layer produced during a forward pass
#[derive(Debug, Clone)]
pub struct HiddenCache {
    /// Sigmoid output before dropout
    pub activated: Tensor,
    /// Post-dropout activation, fed to the next layer
    pub output: Tensor,
    /// Mask drawn for this pass
    pub dropout: DropoutCache,
}

/// Everything the backward pass needs from one forward pass
#[derive(Debug, Clone)]
pub struct ForwardCache {
    /// Input fed to each linear layer (sample input first)
    pub linear: Vec<LinearCache>,
    /// One entry per hidden layer
    pub hidden: Vec<HiddenCache>,
    /// Softmax output
    pub output: Tensor,
}

impl ForwardCache {
    /// Post-activation vectors: every hidden layer after dropout, then the output
    pub fn activations(&self) -> Vec<&Tensor> {
        self.hidden
            .iter()
            .map(|h| &h.output)
            .chain(std::iter::once(&self.output))
            .collect()
    }

    /// Dropout masks drawn for each hidden layer
    pub fn masks(&self) -> Vec<&DropoutCache> {
        self.hidden.iter().map(|h| &h.dropout).collect()
    }
}

/// Error signal and correction direction for one layer
#[derive(Debug, Clone)]
pub struct LayerGradients {
    /// Per-unit delta at this layer's pre-activation
    pub delta: Tensor,
    /// `delta ⊗ layer input`, shaped like the weight matrix
    pub weight: Tensor,
}

/// Per-layer gradients for one sample, first layer first
#[derive(Debug, Clone)]
pub struct NetworkGradients {
    pub layers: Vec<LayerGradients>,
}

/// Fully connected classifier: sigmoid + dropout hidden layers, softmax output
#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
    layers: Vec<TrainableLinear>,
    dropouts: Vec<TrainableDropout>,
}

impl Network {
    /// Create a network with seeded Gaussian weights
    ///
    /// Layer `i` is initialised from `seed + 1000 * i`.
    pub fn new(config: &NetworkConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let layers = config
            .layers
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                TrainableLinear::new(
                    shape.input_dim,
                    shape.output_dim,
                    seed.wrapping_add(1000 * i as u64),
                )
            })
            .collect();
        Ok(Self::assemble(config.clone(), layers))
    }

    /// Create a network around caller-supplied `[output_dim, input_dim]` matrices
    pub fn from_weights(config: &NetworkConfig, weights: Vec<Tensor>) -> Result<Self> {
        config.validate()?;
        if weights.len() != config.layers.len() {
            return Err(NetworkError::dimension(
                "weight matrix count",
                config.layers.len(),
                weights.len(),
            ));
        }

        let mut layers = Vec::with_capacity(weights.len());
        for (i, (weight, shape)) in weights.into_iter().zip(&config.layers).enumerate() {
            if weight.shape.len() != 2 {
                return Err(NetworkError::InvalidTopology {
                    message: format!("weight {} must be 2D, got {:?}", i + 1, weight.shape),
                });
            }
            if weight.shape[0] != shape.output_dim {
                return Err(NetworkError::dimension(
                    format!("rows of weight {}", i + 1),
                    shape.output_dim,
                    weight.shape[0],
                ));
            }
            if weight.shape[1] != shape.input_dim {
                return Err(NetworkError::dimension(
                    format!("columns of weight {}", i + 1),
                    shape.input_dim,
                    weight.shape[1],
                ));
            }
            layers.push(TrainableLinear::from_weight(weight));
        }

        Ok(Self::assemble(config.clone(), layers))
    }

    fn assemble(config: NetworkConfig, layers: Vec<TrainableLinear>) -> Self {
        let dropouts = config
            .dropout_rates
            .iter()
            .map(|&rate| TrainableDropout::new(rate, config.dropout_mode))
            .collect();
        Self {
            config,
            layers,
            dropouts,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn layers(&self) -> &[TrainableLinear] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [TrainableLinear] {
        &mut self.layers
    }

    /// Snapshot of every weight matrix, first layer first
    pub fn weights(&self) -> Vec<Tensor> {
        self.layers.iter().map(|l| l.weight().clone()).collect()
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        let expected = self.config.input_dim();
        if input.len() != expected {
            return Err(NetworkError::dimension("sample input", expected, input.len()));
        }
        Ok(())
    }

    fn check_target(&self, target: &[f64]) -> Result<()> {
        let expected = self.config.output_dim();
        if target.len() != expected {
            return Err(NetworkError::dimension("sample target", expected, target.len()));
        }
        Ok(())
    }

    /// Paired batch lengths and every sample's shape
    pub(crate) fn check_batch(&self, inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<()> {
        if inputs.len() != targets.len() {
            return Err(NetworkError::BatchSizeMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            });
        }
        for (input, target) in inputs.iter().zip(targets) {
            self.check_input(input)?;
            self.check_target(target)?;
        }
        Ok(())
    }

    /// A cache must come from a forward pass through a network of this shape
    fn check_cache(&self, cache: &ForwardCache) -> Result<()> {
        if cache.linear.len() != self.layers.len() {
            return Err(NetworkError::dimension(
                "forward cache layers",
                self.layers.len(),
                cache.linear.len(),
            ));
        }
        if cache.hidden.len() != self.dropouts.len() {
            return Err(NetworkError::dimension(
                "forward cache hidden layers",
                self.dropouts.len(),
                cache.hidden.len(),
            ));
        }
        if cache.output.len() != self.config.output_dim() {
            return Err(NetworkError::dimension(
                "forward cache output",
                self.config.output_dim(),
                cache.output.len(),
            ));
        }

        for (l, (layer, linear)) in self.layers.iter().zip(&cache.linear).enumerate() {
            if linear.x.len() != layer.in_features() {
                return Err(NetworkError::dimension(
                    format!("forward cache input to layer {}", l),
                    layer.in_features(),
                    linear.x.len(),
                ));
            }
        }
        for (l, (layer, hidden)) in self.layers.iter().zip(&cache.hidden).enumerate() {
            let width = layer.out_features();
            let mask_len = hidden.dropout.mask.as_ref().map_or(width, |m| m.len());
            for actual in [hidden.activated.len(), mask_len] {
                if actual != width {
                    return Err(NetworkError::dimension(
                        format!("forward cache hidden layer {}", l),
                        width,
                        actual,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Forward pass with dropout drawn from `rng`
    pub fn forward<R: Rng + ?Sized>(&self, input: &[f64], rng: &mut R) -> Result<ForwardCache> {
        self.check_input(input)?;
        Ok(self.run_forward(Tensor::from_vec(input.to_vec()), Some(rng)))
    }

    /// Inference: forward pass with dropout switched off
    pub fn predict(&self, input: &[f64]) -> Result<Tensor> {
        self.check_input(input)?;
        let cache = self.run_forward::<StdRng>(Tensor::from_vec(input.to_vec()), None);
        Ok(cache.output)
    }

    fn run_forward<R: Rng + ?Sized>(&self, input: Tensor, mut rng: Option<&mut R>) -> ForwardCache {
        let num_hidden = self.dropouts.len();
        let mut linear = Vec::with_capacity(self.layers.len());
        let mut hidden = Vec::with_capacity(num_hidden);
        let mut x = input;

        for (layer, dropout) in self.layers[..num_hidden].iter().zip(&self.dropouts) {
            let (pre, cache) = layer.forward(&x);
            linear.push(cache);
            let activated = sigmoid_forward(&pre);

            let (output, mask) = match rng.as_deref_mut() {
                Some(rng) => dropout.forward(&activated, rng),
                None => (
                    activated.clone(),
                    DropoutCache {
                        mask: None,
                        scale: 1.0,
                    },
                ),
            };

            x = output.clone();
            hidden.push(HiddenCache {
                activated,
                output,
                dropout: mask,
            });
        }

        let (logits, cache) = self.layers[num_hidden].forward(&x);
        linear.push(cache);
        let output = softmax_forward(&logits);

        ForwardCache {
            linear,
            hidden,
            output,
        }
    }

    /// Backward pass against the current (pre-update) weights
    ///
    /// Returns one [`LayerGradients`] per layer, each in its own buffer. A cache whose
    /// layer count or vector lengths do not fit this network is rejected with
    /// [`NetworkError::DimensionMismatch`].
    pub fn backward(&self, target: &[f64], cache: &ForwardCache) -> Result<NetworkGradients> {
        self.check_target(target)?;
        self.check_cache(cache)?;

        let target = Tensor::from_vec(target.to_vec());
        let mut delta = target.sub(&cache.output);
        let mut layers = Vec::with_capacity(self.layers.len());

        for l in (0..self.layers.len()).rev() {
            let grads = self.layers[l].backward(&delta, &cache.linear[l]);

            let next_delta = if l > 0 {
                let below = &cache.hidden[l - 1];
                let through_sigmoid = sigmoid_backward(&grads.x, &below.activated);
                Some(self.dropouts[l - 1].backward(&through_sigmoid, &below.dropout))
            } else {
                None
            };

            layers.push(LayerGradients {
                delta,
                weight: grads.weight,
            });

            match next_delta {
                Some(next) => delta = next,
                None => break,
            }
        }

        layers.reverse();
        Ok(NetworkGradients { layers })
    }

    /// One full training step: forward, backward, then the in-place update
    pub fn train_step<R: Rng + ?Sized>(
        &mut self,
        input: &[f64],
        target: &[f64],
        rng: &mut R,
    ) -> Result<NetworkGradients> {
        self.check_input(input)?;
        self.check_target(target)?;

        let cache = self.forward(input, rng)?;
        let grads = self.backward(target, &cache)?;

        if log::log_enabled!(log::Level::Debug) {
            let loss = Loss::CrossEntropy.compute(&cache.output, &Tensor::from_vec(target.to_vec()));
            let dropped: usize = cache.masks().iter().map(|m| m.dropped()).sum();
            log::debug!(
                "sample loss = {:.6}, grad norm = {:.6}, delta norms = {:?}, dropped units = {}",
                loss,
                compute_grad_norm(&grads),
                delta_norms(&grads),
                dropped
            );
        }
        if !cache.output.is_finite() {
            log::warn!("non-finite network output; weights may have diverged");
        }

        let learning_rate = self.config.learning_rate;
        sgd_update(self, &grads, learning_rate);
        Ok(grads)
    }

    /// Train on a batch, one sample at a time, in order
    ///
    /// The whole batch is validated before any weight changes.
    pub fn train_batch<R: Rng + ?Sized>(
        &mut self,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
        rng: &mut R,
    ) -> Result<()> {
        self.check_batch(inputs, targets)?;

        for (input, target) in inputs.iter().zip(targets) {
            self.train_step(input, target, rng)?;
        }

        log::trace!("trained on batch of {} samples", inputs.len());
        Ok(())
    }
}
