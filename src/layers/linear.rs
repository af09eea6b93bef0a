//! Linear Layer (Fully Connected, no bias)
//!
//! Every stage of the classifier starts with a bias-free linear map:
//!
//! ```text
//! Input:  x [in_features]
//! Weight: W [out_features, in_features]
//! Output: y = W · x [out_features]
//! ```
//!
//! ## Backward Pass
//!
//! Given the layer's delta (its error signal at the pre-activation):
//!
//! ```text
//! correction direction = delta ⊗ x          [out_features, in_features]
//! propagated error     = Wᵀ · delta          [in_features]
//! ```
//!
//! The delta convention throughout this crate is `target − output` at the top, so
//! `delta ⊗ x` already points downhill and is *added* to the weights.
//!
//! ## Initialisation
//!
//! Weights are drawn from a zero-mean Gaussian with standard deviation
//! `√(1/in_features)` from a seeded generator, so a given seed always yields the
//! same network.

use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Bias-free linear layer: `y = W · x`
#[derive(Debug, Clone, PartialEq)]
pub struct TrainableLinear {
    weight: Tensor,
}

impl TrainableLinear {
    /// Create a new layer with seeded Gaussian initialisation
    pub fn new(in_features: usize, out_features: usize, seed: u64) -> Self {
        let std_dev = (1.0 / in_features.max(1) as f64).sqrt();
        let mut rng = StdRng::seed_from_u64(seed);
        let data = match Normal::new(0.0, std_dev) {
            Ok(normal) => (0..in_features * out_features)
                .map(|_| normal.sample(&mut rng))
                .collect(),
            Err(_) => vec![0.0; in_features * out_features],
        };

        Self {
            weight: Tensor::new(data, vec![out_features, in_features]),
        }
    }

    /// Wrap an existing `[out_features, in_features]` weight matrix
    ///
    /// # Panics
    ///
    /// Panics if `weight` is not 2D
    pub fn from_weight(weight: Tensor) -> Self {
        assert_eq!(
            weight.shape.len(),
            2,
            "Linear weight must be 2D, got {:?}",
            weight.shape
        );
        Self { weight }
    }

    /// Expected input length
    pub fn in_features(&self) -> usize {
        self.weight.shape[1]
    }

    /// Produced output length
    pub fn out_features(&self) -> usize {
        self.weight.shape[0]
    }

    /// Current weight matrix
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Forward pass: `W · x`, caching `x` for the backward pass
    pub fn forward(&self, x: &Tensor) -> (Tensor, LinearCache) {
        let y = self.weight.matvec(x);
        let cache = LinearCache { x: x.clone() };
        (y, cache)
    }

    /// Backward pass for one sample
    ///
    /// # Arguments
    ///
    /// * `delta` - This layer's error signal [out_features]
    /// * `cache` - Input recorded by `forward`
    ///
    /// # Returns
    ///
    /// The weight correction direction `delta ⊗ x` and the error `Wᵀ · delta`
    /// for the layer below
    pub fn backward(&self, delta: &Tensor, cache: &LinearCache) -> LinearGradients {
        let weight = delta.outer(&cache.x);
        let x = self.weight.transpose().matvec(delta);

        LinearGradients { weight, x }
    }

    /// Add `correction` to the weights in place
    pub fn apply_correction(&mut self, correction: &Tensor) {
        self.weight.add_assign(correction);
    }

    pub(crate) fn weight_mut(&mut self) -> &mut Tensor {
        &mut self.weight
    }
}

/// Cache for linear layer backward pass
#[derive(Debug, Clone)]
pub struct LinearCache {
    pub x: Tensor,
}

/// Gradients for linear layer
#[derive(Debug, Clone)]
pub struct LinearGradients {
    /// `delta ⊗ x`, shaped like the weight matrix
    pub weight: Tensor,
    /// Error to hand to the previous layer
    pub x: Tensor,
}
