//! Dense Tensor Operations
//!
//! This module provides the small dense-array toolkit the training step is built on:
//! matrix–vector products, transposes, outer products, and elementwise maps.
//!
//! ## Core Concepts
//!
//! - **Data**: Flat `Vec<f64>` storing all elements in row-major order
//! - **Shape**: Dimensions of the tensor (`[n]` for vectors, `[rows, cols]` for matrices)
//! - **Strides**: Step sizes for each dimension to compute flat indices
//!
//! ## Example
//!
//! ```rust
//! use deepdrop::Tensor;
//!
//! // A 2x3 weight matrix applied to a 3-element vector
//! let w = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
//! let x = Tensor::from_vec(vec![1.0, 0.0, 1.0]);
//! let y = w.matvec(&x);
//! assert_eq!(y.data, vec![4.0, 10.0]);
//! ```
//!
//! ## Shape Checks
//!
//! Shape violations inside this module are programming errors and panic with a
//! descriptive message. Anything shaped by caller data is validated by
//! [`Network`](crate::Network) before it reaches these kernels.
//!
//! ## Parallelism
//!
//! Matrix–vector products above a small work threshold and the elementwise kernels run on
//! Rayon. Every parallel kernel here is an indexed map/collect, so element order and
//! results are identical to the sequential version.

use rayon::prelude::*;

/// Work threshold (multiply-adds) above which products go parallel
const PARALLEL_WORK_THRESHOLD: usize = 4_096;

/// A dense, row-major array of `f64` values
///
/// # Memory Layout
///
/// For shape `[2, 3]`, data is stored as: `[r0c0, r0c1, r0c2, r1c0, r1c1, r1c2]`
/// and strides are `[3, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// Flat storage of all tensor elements
    pub data: Vec<f64>,
    /// Shape of the tensor (dimensions)
    pub shape: Vec<usize>,
    /// Strides for each dimension (computed from shape)
    pub strides: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor with given data and shape
    ///
    /// # Panics
    ///
    /// Panics if the product of shape dimensions doesn't equal data length
    ///
    /// # Example
    ///
    /// ```rust
    /// # use deepdrop::Tensor;
    /// let tensor = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    /// assert_eq!(tensor.shape, vec![2, 2]);
    /// ```
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Self {
        let expected_size: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_size,
            "Data length ({}) doesn't match shape {:?} (expected {})",
            data.len(),
            shape,
            expected_size
        );

        let strides = Self::compute_strides(&shape);
        Self {
            data,
            shape,
            strides,
        }
    }

    /// Create a 1D tensor from a vector of values
    pub fn from_vec(data: Vec<f64>) -> Self {
        let len = data.len();
        Self::new(data, vec![len])
    }

    /// Create a tensor filled with zeros
    ///
    /// # Example
    ///
    /// ```rust
    /// # use deepdrop::Tensor;
    /// let tensor = Tensor::zeros(vec![3, 4]);
    /// assert_eq!(tensor.data.len(), 12);
    /// assert!(tensor.data.iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::full(shape, 0.0)
    }

    /// Create a tensor with every element set to `value`
    pub fn full(shape: Vec<usize>, value: f64) -> Self {
        let size: usize = shape.iter().product();
        Self::new(vec![value; size], shape)
    }

    /// Compute strides from shape (row-major layout)
    ///
    /// For shape `[d0, d1]`, strides are `[d1, 1]`
    fn compute_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Matrix–vector product
    ///
    /// For `W` of shape `[m, k]` and `x` of shape `[k]`, returns `W · x` of shape `[m]`.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not 2D, `x` is not 1D, or the column count differs from `x.len()`
    pub fn matvec(&self, x: &Tensor) -> Tensor {
        assert_eq!(self.shape.len(), 2, "matvec requires a 2D matrix, got {:?}", self.shape);
        assert_eq!(x.shape.len(), 1, "matvec requires a 1D vector, got {:?}", x.shape);
        let (m, k) = (self.shape[0], self.shape[1]);
        assert_eq!(
            k,
            x.data.len(),
            "Matrix–vector dimensions incompatible: [{}, {}] · [{}]",
            m,
            k,
            x.data.len()
        );

        let row_dot = |i: usize| -> f64 {
            self.data[i * k..(i + 1) * k]
                .iter()
                .zip(&x.data)
                .map(|(w, v)| w * v)
                .sum()
        };

        let result: Vec<f64> = if m * k >= PARALLEL_WORK_THRESHOLD {
            (0..m).into_par_iter().map(row_dot).collect()
        } else {
            (0..m).map(row_dot).collect()
        };

        Tensor::from_vec(result)
    }

    /// Outer product of two vectors
    ///
    /// Returns the `[a.len(), b.len()]` matrix with entry `(i, j) = a[i] * b[j]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use deepdrop::Tensor;
    /// let a = Tensor::from_vec(vec![1.0, 2.0]);
    /// let b = Tensor::from_vec(vec![3.0, 4.0, 5.0]);
    /// let m = a.outer(&b);
    /// assert_eq!(m.shape, vec![2, 3]);
    /// assert_eq!(m.data, vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
    /// ```
    pub fn outer(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.shape.len(), 1, "outer requires 1D operands, got {:?}", self.shape);
        assert_eq!(other.shape.len(), 1, "outer requires 1D operands, got {:?}", other.shape);
        let (m, n) = (self.data.len(), other.data.len());

        let result: Vec<f64> = (0..m * n)
            .into_par_iter()
            .map(|idx| self.data[idx / n] * other.data[idx % n])
            .collect();

        Tensor::new(result, vec![m, n])
    }

    /// Transpose of a 2D tensor
    ///
    /// # Example
    ///
    /// ```rust
    /// # use deepdrop::Tensor;
    /// let tensor = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    /// let t = tensor.transpose();
    /// assert_eq!(t.shape, vec![3, 2]);
    /// assert_eq!(t.data, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    /// ```
    pub fn transpose(&self) -> Tensor {
        assert_eq!(self.shape.len(), 2, "transpose requires a 2D tensor, got {:?}", self.shape);
        let rows = self.shape[0];
        let cols = self.shape[1];
        let mut result = vec![0.0; rows * cols];

        for i in 0..rows {
            for j in 0..cols {
                result[j * rows + i] = self.data[i * cols + j];
            }
        }

        Tensor::new(result, vec![cols, rows])
    }

    /// Apply `f` to every element
    pub fn map<F>(&self, f: F) -> Tensor
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let result = self.data.par_iter().map(|&x| f(x)).collect();
        Tensor::new(result, self.shape.clone())
    }

    /// Softmax over all elements
    ///
    /// ```text
    /// softmax(x)[i] = exp(x[i] - max(x)) / Σ_j exp(x[j] - max(x))
    /// ```
    ///
    /// Subtracting the maximum keeps `exp` from overflowing; the factor cancels so
    /// the result equals the textbook formula.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use deepdrop::Tensor;
    /// let probs = Tensor::from_vec(vec![1.0, 2.0, 3.0]).softmax();
    /// let sum: f64 = probs.data.iter().sum();
    /// assert!((sum - 1.0).abs() < 1e-12);
    /// ```
    pub fn softmax(&self) -> Tensor {
        let max = self.data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let exp_values: Vec<f64> = self.data.iter().map(|&x| (x - max).exp()).collect();
        let sum: f64 = exp_values.iter().sum();
        let result = exp_values.into_iter().map(|x| x / sum).collect();

        Tensor::new(result, self.shape.clone())
    }

    /// In-place element-wise addition (`self += other`)
    pub fn add_assign(&mut self, other: &Tensor) {
        assert_eq!(self.shape, other.shape, "Shapes must match for addition");
        self.data
            .par_iter_mut()
            .zip(&other.data)
            .for_each(|(a, b)| *a += b);
    }

    /// Element-wise subtraction
    pub fn sub(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.shape, other.shape, "Shapes must match for subtraction");
        let result = self
            .data
            .par_iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Tensor::new(result, self.shape.clone())
    }

    /// Multiply all elements by scalar
    pub fn mul_scalar(&self, scalar: f64) -> Tensor {
        let result = self.data.par_iter().map(|&x| x * scalar).collect();
        Tensor::new(result, self.shape.clone())
    }

    /// Euclidean (Frobenius) norm
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// True when every element is finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_strides_row_major() {
        let t = Tensor::zeros(vec![3, 4]);
        assert_eq!(t.strides, vec![4, 1]);
        assert_eq!(Tensor::zeros(vec![5]).strides, vec![1]);
    }

    #[test]
    #[should_panic(expected = "doesn't match shape")]
    fn test_new_rejects_bad_length() {
        Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
    }

    #[test]
    fn test_matvec_small() {
        let w = Tensor::new(vec![1.0, -1.0, 0.5, 2.0, 0.0, 1.0], vec![2, 3]);
        let x = Tensor::from_vec(vec![2.0, 1.0, 4.0]);
        let y = w.matvec(&x);
        assert_eq!(y.shape, vec![2]);
        assert_eq!(y.data, vec![3.0, 8.0]);
    }

    #[test]
    fn test_matvec_parallel_matches_sequential() {
        let (m, k) = (80, 90);
        let data: Vec<f64> = (0..m * k).map(|i| ((i % 13) as f64 - 6.0) * 0.1).collect();
        let w = Tensor::new(data, vec![m, k]);
        let x = Tensor::from_vec((0..k).map(|i| (i as f64).sin()).collect());

        let y = w.matvec(&x);
        for i in 0..m {
            let expected: f64 = (0..k).map(|j| w.data[i * k + j] * x.data[j]).sum();
            assert_abs_diff_eq!(y.data[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "dimensions incompatible")]
    fn test_matvec_rejects_mismatch() {
        let w = Tensor::zeros(vec![2, 3]);
        w.matvec(&Tensor::zeros(vec![4]));
    }

    #[test]
    fn test_transpose_matvec_equals_row_combination() {
        let w = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let d = Tensor::from_vec(vec![1.0, -1.0]);
        let e = w.transpose().matvec(&d);
        assert_eq!(e.data, vec![-3.0, -3.0, -3.0]);
    }

    #[test]
    fn test_softmax_is_distribution() {
        let probs = Tensor::from_vec(vec![0.5, -2.0, 3.0, 0.0, 1.5]).softmax();
        assert!(probs.data.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert_abs_diff_eq!(probs.data.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_softmax_survives_large_inputs() {
        let probs = Tensor::from_vec(vec![1000.0, 1000.0, 999.0]).softmax();
        assert!(probs.is_finite());
        assert_abs_diff_eq!(probs.data[0], probs.data[1], epsilon = 1e-15);
        assert_abs_diff_eq!(probs.data.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_add_assign_and_norm() {
        let mut a = Tensor::new(vec![1.0, 2.0, 2.0, 0.0], vec![2, 2]);
        a.add_assign(&Tensor::full(vec![2, 2], 1.0));
        assert_eq!(a.data, vec![2.0, 3.0, 3.0, 1.0]);
        assert_abs_diff_eq!(Tensor::from_vec(vec![3.0, 4.0]).norm(), 5.0);
    }
}
