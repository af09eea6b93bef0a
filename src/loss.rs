//! Loss functions for monitoring training.
//!
//! The training step itself never evaluates a loss: the output delta `target − output`
//! is the softmax/cross-entropy gradient in closed form. These functions exist to
//! report progress and to check gradients numerically.

use crate::tensor::Tensor;

/// Smallest probability fed to `ln` in cross-entropy
const PROB_FLOOR: f64 = 1e-15;

/// Supported loss functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loss {
    /// Cross-entropy `-Σ t·ln(y)` against a probability target.
    #[default]
    CrossEntropy,
    /// Squared error `Σ (t − y)²`.
    SquaredError,
}

impl Loss {
    /// Computes the loss between a predicted distribution and its target.
    pub fn compute(&self, output: &Tensor, target: &Tensor) -> f64 {
        assert_eq!(
            output.shape, target.shape,
            "Loss shapes differ: {:?} vs {:?}",
            output.shape, target.shape
        );
        match self {
            Loss::CrossEntropy => -output
                .data
                .iter()
                .zip(&target.data)
                .map(|(&y, &t)| t * y.max(PROB_FLOOR).ln())
                .sum::<f64>(),
            Loss::SquaredError => output
                .data
                .iter()
                .zip(&target.data)
                .map(|(&y, &t)| (t - y) * (t - y))
                .sum(),
        }
    }

    /// Mean loss over paired outputs and targets; 0 for an empty set.
    ///
    /// Only complete pairs count: unmatched trailing entries are ignored.
    pub fn mean(&self, outputs: &[Tensor], targets: &[Tensor]) -> f64 {
        let pairs = outputs.len().min(targets.len());
        if pairs == 0 {
            return 0.0;
        }
        let total: f64 = outputs
            .iter()
            .zip(targets)
            .map(|(y, t)| self.compute(y, t))
            .sum();
        total / pairs as f64
    }
}

/// Euclidean norm of `target − output`.
pub fn error_norm(output: &Tensor, target: &Tensor) -> f64 {
    target.sub(output).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cross_entropy_one_hot() {
        let y = Tensor::from_vec(vec![0.7, 0.2, 0.1]);
        let t = Tensor::from_vec(vec![1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(Loss::CrossEntropy.compute(&y, &t), -(0.7f64.ln()), epsilon = 1e-15);
    }

    #[test]
    fn test_cross_entropy_clamps_zero_probability() {
        let y = Tensor::from_vec(vec![0.0, 1.0]);
        let t = Tensor::from_vec(vec![1.0, 0.0]);
        let loss = Loss::CrossEntropy.compute(&y, &t);
        assert!(loss.is_finite());
        assert!(loss > 30.0);
    }

    #[test]
    fn test_squared_error_and_norm() {
        let y = Tensor::from_vec(vec![0.5, 0.5]);
        let t = Tensor::from_vec(vec![1.0, 0.0]);
        assert_abs_diff_eq!(Loss::SquaredError.compute(&y, &t), 0.5);
        assert_abs_diff_eq!(error_norm(&y, &t), 0.5f64.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_mean_over_batch() {
        let outputs = vec![Tensor::from_vec(vec![1.0, 0.0]), Tensor::from_vec(vec![0.0, 1.0])];
        let targets = vec![Tensor::from_vec(vec![1.0, 0.0]), Tensor::from_vec(vec![1.0, 0.0])];
        assert_abs_diff_eq!(Loss::SquaredError.mean(&outputs, &targets), 1.0);
        assert_eq!(Loss::SquaredError.mean(&[], &[]), 0.0);
    }

    #[test]
    fn test_mean_ignores_unpaired_outputs() {
        let outputs = vec![Tensor::from_vec(vec![0.0, 1.0]), Tensor::from_vec(vec![1.0, 0.0])];
        let targets = vec![Tensor::from_vec(vec![1.0, 0.0])];
        assert_abs_diff_eq!(Loss::SquaredError.mean(&outputs, &targets), 2.0);
    }
}
