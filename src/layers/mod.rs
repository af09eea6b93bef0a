//! Neural Network Layers
//!
//! The building blocks of the classifier. Each trainable piece provides an explicit
//! forward pass that returns a cache, and a backward pass that consumes it.
//!
//! ## Layers
//!
//! - **activation**: Sigmoid (forward and backward) and softmax
//! - **linear**: Bias-free fully connected layer
//! - **dropout**: Bernoulli dropout with optional inverted scaling
//!
//! ## Design Pattern
//!
//! ```rust,ignore
//! impl TrainableLayer {
//!     pub fn forward(&self, x: &Tensor, ...) -> (Tensor, Cache) { }
//!     pub fn backward(&self, grad: &Tensor, cache: &Cache) -> Gradients { }
//! }
//! ```

pub mod activation;
pub mod dropout;
pub mod linear;

pub use activation::{sigmoid, sigmoid_backward, sigmoid_forward, softmax_forward};
pub use dropout::{DropoutCache, DropoutMode, TrainableDropout};
pub use linear::{LinearCache, LinearGradients, TrainableLinear};
