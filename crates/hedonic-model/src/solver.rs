//! Ridge regression solver
//!
//! Solves the regularized normal equations
//!
//! (XᵀX + λD)β = Xᵀy
//!
//! where D is the identity with its (0,0) entry zeroed, so the intercept in
//! column 0 is never shrunk. The system is solved by Gaussian elimination
//! with partial pivoting followed by back-substitution.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pivots smaller than this in magnitude make the system singular.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Errors that can occur while solving for coefficients
#[derive(Debug, Error)]
pub enum SolverError {
    /// The normal equations have no unique solution
    #[error("Singular matrix: pivot {pivot:e} in column {column} (collinear features or lambda too small?)")]
    Singular {
        /// Column being eliminated
        column: usize,
        /// Pivot magnitude after row swapping
        pivot: f64,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Trait for linear regression solvers
pub trait RegressionSolver {
    /// Fit coefficients for design matrix `x` (rows are observations) and target `y`.
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>, SolverError>;
}

/// Ridge solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RidgeConfig {
    /// Penalty on every coefficient but the intercept (default: 1.0)
    pub lambda: f64,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self { lambda: 1.0 }
    }
}

/// Ridge regression with an unpenalized intercept in column 0
#[derive(Debug, Clone, Default)]
pub struct RidgeSolver {
    config: RidgeConfig,
}

impl RidgeSolver {
    /// Create a solver with the given configuration
    pub const fn new(config: RidgeConfig) -> Self {
        Self { config }
    }

    /// Create a solver with penalty `lambda`
    pub const fn with_lambda(lambda: f64) -> Self {
        Self::new(RidgeConfig { lambda })
    }

    /// Get the configuration
    pub const fn config(&self) -> &RidgeConfig {
        &self.config
    }
}

impl RegressionSolver for RidgeSolver {
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>, SolverError> {
        if !(self.config.lambda.is_finite() && self.config.lambda >= 0.0) {
            return Err(SolverError::InvalidParameter(format!(
                "lambda must be non-negative, got {}",
                self.config.lambda
            )));
        }
        let (a, b) = normal_equations(x, y, self.config.lambda)?;
        solve_linear_system(a, b)
    }
}

/// Build `XᵀX + λD` and `Xᵀy`, leaving the intercept entry unpenalized.
pub fn normal_equations(
    x: &Array2<f64>,
    y: &Array1<f64>,
    lambda: f64,
) -> Result<(Array2<f64>, Array1<f64>), SolverError> {
    if x.nrows() != y.len() {
        return Err(SolverError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }

    let mut xtx = x.t().dot(x);
    for i in 1..xtx.nrows() {
        xtx[[i, i]] += lambda;
    }
    let xty = x.t().dot(y);
    Ok((xtx, xty))
}

/// Solve `a · β = b` by Gaussian elimination with partial pivoting.
///
/// # Errors
///
/// Returns [`SolverError::Singular`] when the largest available pivot in a
/// column is below [`PIVOT_TOLERANCE`] in magnitude.
pub fn solve_linear_system(
    mut a: Array2<f64>,
    mut b: Array1<f64>,
) -> Result<Array1<f64>, SolverError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            actual: a.ncols(),
        });
    }
    if n != b.len() {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            actual: b.len(),
        });
    }

    for k in 0..n {
        // Largest magnitude in column k at or below the diagonal
        let mut pivot_row = k;
        for i in (k + 1)..n {
            if a[[i, k]].abs() > a[[pivot_row, k]].abs() {
                pivot_row = i;
            }
        }
        if pivot_row != k {
            for j in 0..n {
                a.swap([k, j], [pivot_row, j]);
            }
            b.swap(k, pivot_row);
        }

        let pivot = a[[k, k]];
        if pivot.is_nan() || pivot.abs() < PIVOT_TOLERANCE {
            return Err(SolverError::Singular {
                column: k,
                pivot: pivot.abs(),
            });
        }

        for i in (k + 1)..n {
            let factor = a[[i, k]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                a[[i, j]] -= factor * a[[k, j]];
            }
            b[i] -= factor * b[k];
        }
    }

    let mut beta = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[[i, j]] * beta[j];
        }
        beta[i] = sum / a[[i, i]];
    }
    Ok(beta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve_requires_pivoting() {
        // Zero in the (0,0) position: fails without row swaps
        let a = array![[0.0, 2.0, 1.0], [1.0, 1.0, 1.0], [2.0, 1.0, 3.0]];
        let b = array![5.0, 5.0, 12.0];
        let x = solve_linear_system(a, b).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        let err = solve_linear_system(a, b).unwrap_err();
        assert!(matches!(err, SolverError::Singular { column: 1, .. }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Array2::<f64>::eye(3);
        let b = array![1.0, 2.0];
        assert!(matches!(
            solve_linear_system(a, b),
            Err(SolverError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_intercept_not_penalized() {
        let x = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = array![1.0, 2.0, 3.0];
        let (a, _) = normal_equations(&x, &y, 10.0).unwrap();
        assert_abs_diff_eq!(a[[0, 0]], 3.0);
        assert_abs_diff_eq!(a[[1, 1]], 14.0 + 10.0);
    }

    #[test]
    fn test_lambda_shrinks_slope_only() {
        // Heavy penalty pulls the slope to zero; the intercept settles on the mean
        let x = array![[1.0, -1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![4.0, 5.0, 9.0];
        let beta = RidgeSolver::with_lambda(1e9).fit(&x, &y).unwrap();
        assert_abs_diff_eq!(beta[0], 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(beta[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_collinear_without_penalty_is_singular() {
        let x = array![[1.0, 2.0, 4.0], [1.0, 3.0, 6.0], [1.0, 5.0, 10.0], [1.0, 7.0, 14.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            RidgeSolver::with_lambda(0.0).fit(&x, &y),
            Err(SolverError::Singular { .. })
        ));
        assert!(RidgeSolver::with_lambda(0.1).fit(&x, &y).is_ok());
    }

    #[test]
    fn test_negative_lambda_rejected() {
        let x = Array2::<f64>::eye(2);
        let y = array![1.0, 1.0];
        assert!(matches!(
            RidgeSolver::with_lambda(-1.0).fit(&x, &y),
            Err(SolverError::InvalidParameter(_))
        ));
    }
}
