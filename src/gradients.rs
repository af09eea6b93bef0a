//! Gradient Utilities
//!
//! Helpers for inspecting the per-sample corrections produced by backpropagation.
//! The training step logs the gradient norm at debug level; a norm that keeps
//! growing from sample to sample is the usual first sign of divergence.
//!
//! ## Algorithm
//!
//! ```text
//! norm = √(Σ_l Σ_ij weight_l[i,j]²)
//! ```

use crate::network::NetworkGradients;
use rayon::prelude::*;

/// Compute the L2 norm of all layer gradients of one sample
///
/// # Example
///
/// ```rust
/// use deepdrop::gradients::compute_grad_norm;
/// use deepdrop::{LayerGradients, NetworkGradients, Tensor};
///
/// let grads = NetworkGradients {
///     layers: vec![LayerGradients {
///         delta: Tensor::from_vec(vec![1.0]),
///         weight: Tensor::new(vec![3.0, 4.0], vec![1, 2]),
///     }],
/// };
/// assert!((compute_grad_norm(&grads) - 5.0).abs() < 1e-12);
/// ```
pub fn compute_grad_norm(grads: &NetworkGradients) -> f64 {
    let sum_sq: f64 = grads
        .layers
        .iter()
        .map(|layer| layer.weight.data.par_iter().map(|&val| val * val).sum::<f64>())
        .sum();

    sum_sq.sqrt()
}

/// Per-layer L2 norms of the deltas, first layer first
pub fn delta_norms(grads: &NetworkGradients) -> Vec<f64> {
    grads.layers.iter().map(|layer| layer.delta.norm()).collect()
}
