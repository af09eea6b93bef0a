//! Dropout Layer
//!
//! Dropout randomly zeroes hidden activations during training so the network cannot
//! rely on any single unit. Each call draws a fresh, independent keep/drop decision
//! per element from the caller's random source; masks are never reused.
//!
//! ## Scaling
//!
//! Two behaviours are supported, chosen by [`DropoutMode`]:
//!
//! - **Unscaled** (default): dropped units become 0, survivors pass through untouched.
//! - **Inverted**: survivors are multiplied by `1 / (1 - rate)` so the expected
//!   activation matches the no-dropout case.

use crate::tensor::Tensor;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How surviving units are treated after a mask is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropoutMode {
    /// Plain zeroing, survivors unchanged
    #[default]
    Unscaled,
    /// Survivors scaled by `1 / (1 - rate)`
    Inverted,
}

/// Dropout layer for one hidden stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainableDropout {
    pub rate: f64,
    pub mode: DropoutMode,
}

impl TrainableDropout {
    /// Create a new dropout layer
    ///
    /// # Arguments
    ///
    /// * `rate` - Drop probability (0.0 = keep all, 1.0 = drop all)
    /// * `mode` - Whether survivors are rescaled
    pub fn new(rate: f64, mode: DropoutMode) -> Self {
        assert!(
            (0.0..=1.0).contains(&rate),
            "Dropout rate must be between 0.0 and 1.0"
        );
        Self { rate, mode }
    }

    /// Factor applied to surviving units
    pub fn scale(&self) -> f64 {
        match self.mode {
            DropoutMode::Unscaled => 1.0,
            DropoutMode::Inverted if self.rate < 1.0 => 1.0 / (1.0 - self.rate),
            DropoutMode::Inverted => 1.0,
        }
    }

    /// Apply dropout to `x`, returning the masked values and the mask drawn
    ///
    /// A rate of 0 consumes no randomness and returns `x` unchanged.
    pub fn forward<R: Rng + ?Sized>(&self, x: &Tensor, rng: &mut R) -> (Tensor, DropoutCache) {
        if self.rate == 0.0 {
            let cache = DropoutCache {
                mask: None,
                scale: 1.0,
            };
            return (x.clone(), cache);
        }

        if self.rate >= 1.0 {
            let cache = DropoutCache {
                mask: Some(vec![false; x.data.len()]),
                scale: 1.0,
            };
            return (Tensor::zeros(x.shape.clone()), cache);
        }

        let scale = self.scale();
        let mut mask = Vec::with_capacity(x.data.len());
        let mut output = Tensor::zeros(x.shape.clone());

        for (i, &value) in x.data.iter().enumerate() {
            let keep = rng.gen::<f64>() >= self.rate;
            mask.push(keep);
            if keep {
                output.data[i] = value * scale;
            }
        }

        let cache = DropoutCache {
            mask: Some(mask),
            scale,
        };

        (output, cache)
    }

    /// Route an error signal back through the mask drawn in `forward`
    ///
    /// Dropped positions receive zero; kept positions are scaled like the forward
    /// values were.
    pub fn backward(&self, grad_output: &Tensor, cache: &DropoutCache) -> Tensor {
        match &cache.mask {
            Some(mask) => {
                let mut grad_input = Tensor::zeros(grad_output.shape.clone());
                for (i, &keep) in mask.iter().enumerate() {
                    if keep {
                        grad_input.data[i] = grad_output.data[i] * cache.scale;
                    }
                }
                grad_input
            }
            None => grad_output.clone(),
        }
    }
}

/// Mask drawn by one dropout call
#[derive(Debug, Clone, PartialEq)]
pub struct DropoutCache {
    /// `true` = kept, `false` = dropped; `None` when the rate was 0
    pub mask: Option<Vec<bool>>,
    /// Factor applied to kept values
    pub scale: f64,
}

impl DropoutCache {
    /// Number of units zeroed by this mask
    pub fn dropped(&self) -> usize {
        self.mask
            .as_ref()
            .map_or(0, |mask| mask.iter().filter(|&&keep| !keep).count())
    }
}
