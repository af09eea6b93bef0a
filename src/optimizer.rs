//! Plain SGD Weight Update
//!
//! Each layer's correction is an explicit outer product scaled by the learning rate:
//!
//! ```text
//! Correction[i, j] = α · delta[i] · input[j]
//! W ← W + Correction
//! ```
//!
//! The update is additive because `delta` is defined from `target − output`, which
//! already points against the loss gradient. There is no momentum, no adaptive
//! step size, and no weight decay: every sample's correction is applied directly
//! and immediately.
//!
//! ## Example
//!
//! ```rust
//! use deepdrop::optimizer::sgd_update;
//! use deepdrop::{Network, NetworkConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = NetworkConfig::from_dims(&[3, 2]);
//! let mut network = Network::new(&config, 0).unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//!
//! let cache = network.forward(&[1.0, 0.0, 0.0], &mut rng).unwrap();
//! let grads = network.backward(&[1.0, 0.0], &cache).unwrap();
//! sgd_update(&mut network, &grads, 0.01);
//! ```

use crate::network::{Network, NetworkGradients};

/// Apply every layer's correction to the network in place
///
/// `grads.layers[l].weight` already holds `delta_l ⊗ input_l`; each layer's
/// correction is built in its own buffer from that layer's entry.
///
/// # Panics
///
/// Panics if `grads` does not have one entry per layer shaped like its weights
pub fn sgd_update(network: &mut Network, grads: &NetworkGradients, learning_rate: f64) {
    let layers = network.layers_mut();
    assert_eq!(
        layers.len(),
        grads.layers.len(),
        "Gradient count ({}) doesn't match layer count ({})",
        grads.layers.len(),
        layers.len()
    );

    for (layer, layer_grads) in layers.iter_mut().zip(&grads.layers) {
        let correction = layer_grads.weight.mul_scalar(learning_rate);
        layer.apply_correction(&correction);
    }
}
