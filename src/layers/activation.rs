//! Activation Functions
//!
//! This module provides the two nonlinearities of the classifier and the derivative
//! needed for backpropagation through the hidden layers.
//!
//! ## Sigmoid
//!
//! ```text
//! σ(x) = 1 / (1 + e^(-x))
//! σ'(x) = σ(x) × (1 − σ(x))
//! ```
//!
//! The derivative is expressed through the *output* `y = σ(x)`, so the backward
//! pass only needs the activated values cached by the forward pass. Those values
//! are taken before dropout; the network routes the result through the dropout
//! mask afterwards, which zeroes dropped units and applies any inverted scale.
//!
//! ## Softmax
//!
//! ```text
//! softmax(x)[i] = e^(x[i]) / Σ_j e^(x[j])
//! ```
//!
//! Paired with cross-entropy, the gradient at the softmax input collapses to
//! `output − target`; the network uses its negation `target − output` as the
//! output-layer delta.

use crate::tensor::Tensor;
use rayon::prelude::*;

/// Logistic sigmoid of a single value
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid activation (forward pass), element-wise
pub fn sigmoid_forward(x: &Tensor) -> Tensor {
    x.map(sigmoid)
}

/// Sigmoid derivative (backward pass)
///
/// # Arguments
///
/// * `grad_out` - Error arriving from the layer above
/// * `y` - Sigmoid output `σ(x)`, before any dropout
///
/// # Returns
///
/// `grad_out[i] * y[i] * (1 - y[i])` for every unit
pub fn sigmoid_backward(grad_out: &Tensor, y: &Tensor) -> Tensor {
    assert_eq!(
        grad_out.shape, y.shape,
        "Sigmoid backward shapes differ: {:?} vs {:?}",
        grad_out.shape, y.shape
    );
    let grad_data: Vec<f64> = y
        .data
        .par_iter()
        .zip(&grad_out.data)
        .map(|(&y_val, &grad_val)| y_val * (1.0 - y_val) * grad_val)
        .collect();

    Tensor::new(grad_data, y.shape.clone())
}

/// Softmax activation over a whole vector
pub fn softmax_forward(x: &Tensor) -> Tensor {
    x.softmax()
}
