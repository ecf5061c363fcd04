//! Adaptive Filtering for Stick Samples
//!
//! ## Overview
//!
//! After calibration a stick sample is centred and normalized but still
//! carries sensor noise and the occasional electrical spike. This module
//! smooths it with a 2D Kalman filter whose measurement noise adapts to what
//! it sees.
//!
//! ## Model
//!
//! The stick position is modelled as a constant signal with a small random
//! walk; there is no velocity state and no control input:
//! ```text
//! Prediction:   x̂ = x            P̂ = P + Q
//! Innovation:   y = z − x̂        S = P̂ + R
//! Gain:         K = P̂·S⁻¹
//! Update:       x = x̂ + K·y      P = (I − K)·P̂
//! ```
//!
//! ## Adaptation
//!
//! Each innovation is scored against the predicted spread `√trace(P̂)`.
//! A score above 3σ marks the sample as an outlier: R is inflated so the
//! sample barely moves the state, and confidence drops. Clean samples decay
//! R back toward its base value.
//!
//! ## Memory Model
//!
//! ```text
//! AdaptiveKalmanFilter size:
//! ├── State:       2 × 4 bytes
//! ├── P, Q, R:     3 × 4 × 4 bytes
//! ├── Config:      ~40 bytes
//! └── Total:       ~110 bytes
//! ```

pub mod kalman;

pub use kalman::{AdaptiveKalmanFilter, KalmanConfig};

/// Fixed-size linear algebra for the filter
///
/// Const-generic over dimensions so the same helpers serve any small
/// square system; the filter itself only instantiates `N = 2`.
pub mod matrix {
    /// Matrix type using const generics
    pub type Matrix<const R: usize, const C: usize> = [[f32; C]; R];

    /// Square matrix type
    pub type SquareMatrix<const N: usize> = Matrix<N, N>;

    /// Vector type
    pub type Vector<const N: usize> = [f32; N];

    /// Identity matrix
    pub fn identity<const N: usize>() -> SquareMatrix<N> {
        scaled_identity(1.0)
    }

    /// Diagonal matrix with `value` on the diagonal
    pub fn scaled_identity<const N: usize>(value: f32) -> SquareMatrix<N> {
        let mut result = [[0.0; N]; N];
        for (i, row) in result.iter_mut().enumerate() {
            row[i] = value;
        }
        result
    }

    /// Matrix multiplication: C = A × B
    ///
    /// Dimensions: A[R×K] × B[K×C] = C[R×C]
    pub fn multiply<const R: usize, const K: usize, const C: usize>(
        a: &Matrix<R, K>,
        b: &Matrix<K, C>,
    ) -> Matrix<R, C> {
        let mut result = [[0.0; C]; R];
        for i in 0..R {
            for j in 0..C {
                for k in 0..K {
                    result[i][j] += a[i][k] * b[k][j];
                }
            }
        }
        result
    }

    /// Matrix addition: C = A + B
    pub fn add<const R: usize, const C: usize>(
        a: &Matrix<R, C>,
        b: &Matrix<R, C>,
    ) -> Matrix<R, C> {
        let mut result = *a;
        for i in 0..R {
            for j in 0..C {
                result[i][j] += b[i][j];
            }
        }
        result
    }

    /// Matrix subtraction: C = A − B
    pub fn sub<const R: usize, const C: usize>(
        a: &Matrix<R, C>,
        b: &Matrix<R, C>,
    ) -> Matrix<R, C> {
        let mut result = *a;
        for i in 0..R {
            for j in 0..C {
                result[i][j] -= b[i][j];
            }
        }
        result
    }

    /// Matrix-vector product: y = A·x
    pub fn matvec<const R: usize, const C: usize>(
        a: &Matrix<R, C>,
        x: &Vector<C>,
    ) -> Vector<R> {
        let mut result = [0.0; R];
        for i in 0..R {
            for j in 0..C {
                result[i] += a[i][j] * x[j];
            }
        }
        result
    }

    /// Sum of the diagonal
    pub fn trace<const N: usize>(a: &SquareMatrix<N>) -> f32 {
        (0..N).map(|i| a[i][i]).sum()
    }

    /// Closed-form 2×2 inverse
    ///
    /// Returns the identity when `|det| < min_determinant`, so a degenerate
    /// innovation covariance turns the update into a plain copy of the
    /// innovation instead of producing inf/NaN.
    pub fn invert2_or_identity(a: &SquareMatrix<2>, min_determinant: f32) -> SquareMatrix<2> {
        let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
        if !det.is_finite() || libm::fabsf(det) < min_determinant {
            return identity();
        }

        let inv_det = 1.0 / det;
        [
            [a[1][1] * inv_det, -a[0][1] * inv_det],
            [-a[1][0] * inv_det, a[0][0] * inv_det],
        ]
    }
}
