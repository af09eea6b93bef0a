//! deepdrop: per-sample SGD for a dropout-regularised feedforward classifier
//!
//! A small, explicit implementation of one training pass over a labeled batch:
//! sigmoid hidden layers with dropout, a softmax output layer, error
//! backpropagation, and an in-place additive weight update applied sample by sample.
//!
//! # Modules
//!
//! - [`tensor`] - Dense matrix/vector kernels
//! - [`layers`] - Sigmoid/softmax, dropout, and bias-free linear layers
//! - [`network`] - The network, its forward/backward passes, and the training step
//! - [`optimizer`] - The SGD weight update
//! - [`gradients`] - Gradient norms for monitoring
//! - [`loss`] - Cross-entropy and squared-error monitoring losses
//! - [`trainer`] - Multi-epoch loop with loss history
//! - [`training_logger`] - CSV training log
//!
//! # Example
//!
//! ```rust
//! use deepdrop::{Network, NetworkConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = NetworkConfig::deep_dropout();
//! let mut network = Network::new(&config, 0).unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let inputs: Vec<Vec<f64>> = (0..5)
//!     .map(|k| (0..25).map(|i| if i % 5 == k { 1.0 } else { 0.0 }).collect())
//!     .collect();
//! let targets: Vec<Vec<f64>> = (0..5)
//!     .map(|k| (0..5).map(|i| if i == k { 1.0 } else { 0.0 }).collect())
//!     .collect();
//!
//! network.train_batch(&inputs, &targets, &mut rng).unwrap();
//! let probs = network.predict(&inputs[0]).unwrap();
//! assert!((probs.data.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod gradients;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod tensor;
pub mod trainer;
pub mod training_logger;

// Re-export main types for convenience
pub use error::{NetworkError, Result};
pub use layers::{DropoutMode, TrainableDropout, TrainableLinear};
pub use loss::Loss;
pub use network::{
    ForwardCache, HiddenCache, LayerGradients, LayerShape, Network, NetworkConfig,
    NetworkGradients,
};
pub use tensor::Tensor;
pub use trainer::{train, train_logged, TrainingConfig, TrainingResult};
pub use training_logger::TrainingLogger;
