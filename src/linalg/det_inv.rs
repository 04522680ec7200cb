//! linalg::det_inv — LU-based determinant and inverse.
//!
//! Both quantities come from a single LU factorization (via `nalgebra`), so
//! asking for both costs one decomposition. The input matrix is never
//! modified.
use nalgebra::DMatrix;
use ndarray::Array2;

use crate::linalg::errors::{LinalgError, LinalgResult};

/// Which products of the LU factorization to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetInv {
    Determinant,
    Inverse,
    Both,
}

impl DetInv {
    fn wants_determinant(self) -> bool {
        matches!(self, DetInv::Determinant | DetInv::Both)
    }

    fn wants_inverse(self) -> bool {
        matches!(self, DetInv::Inverse | DetInv::Both)
    }
}

/// Output of [`det_and_inv`]; fields are `Some` exactly when requested.
#[derive(Debug, Clone, PartialEq)]
pub struct DetAndInv {
    pub determinant: Option<f64>,
    pub inverse: Option<Array2<f64>>,
}

/// Determinant and/or inverse of a square matrix.
///
/// # Errors
/// - [`LinalgError::EmptyInput`] for a `0 × 0` matrix.
/// - [`LinalgError::NotSquare`] when `rows != cols`.
/// - [`LinalgError::Singular`] when an inverse is requested and the LU
///   factors are singular. A determinant-only request on a singular matrix
///   succeeds and returns `0.0`.
pub fn det_and_inv(m: &Array2<f64>, want: DetInv) -> LinalgResult<DetAndInv> {
    let (rows, cols) = m.dim();
    if rows == 0 || cols == 0 {
        return Err(LinalgError::EmptyInput);
    }
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    let lu = to_dmatrix(m).lu();
    let determinant = if want.wants_determinant() { Some(lu.determinant()) } else { None };
    let inverse = if want.wants_inverse() {
        let inv = lu.try_inverse().ok_or(LinalgError::Singular)?;
        if inv.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::Singular);
        }
        Some(from_dmatrix(&inv))
    } else {
        None
    };
    Ok(DetAndInv { determinant, inverse })
}

/// Inverse of a square matrix.
pub fn matrix_inverse(m: &Array2<f64>) -> LinalgResult<Array2<f64>> {
    det_and_inv(m, DetInv::Inverse)?.inverse.ok_or(LinalgError::Singular)
}

/// Determinant of a square matrix.
pub fn matrix_determinant(m: &Array2<f64>) -> LinalgResult<f64> {
    det_and_inv(m, DetInv::Determinant)?.determinant.ok_or(LinalgError::Singular)
}

// ---- Helper methods ----

/// Copy an `ndarray` matrix into a column-major `DMatrix`.
pub(crate) fn to_dmatrix(m: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

/// Copy a `DMatrix` back into a row-major `ndarray` matrix.
pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    // Purpose
    // -------
    // Inverting a random invertible 5×5 matrix and multiplying it back must
    // reproduce the identity.
    //
    // Given
    // -----
    // - A seeded random matrix made diagonally dominant (hence invertible).
    //
    // Expect
    // ------
    // - `A · A⁻¹ ≈ I` entrywise within 1e-9.
    fn inverse_times_original_is_identity() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(20_061_023);
        let mut a = Array2::from_shape_fn((5, 5), |_| rng.gen_range(-1.0..1.0));
        for i in 0..5 {
            a[[i, i]] += 5.0;
        }

        // Act
        let inv = matrix_inverse(&a).expect("diagonally dominant matrix is invertible");
        let product = a.dot(&inv);

        // Assert
        for ((i, j), &v) in product.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(v, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn determinant_matches_closed_form_for_two_by_two() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];

        let out = det_and_inv(&a, DetInv::Both).unwrap();

        assert_abs_diff_eq!(out.determinant.unwrap(), 10.0, epsilon = 1e-12);
        let inv = out.inverse.unwrap();
        assert_abs_diff_eq!(inv[[0, 0]], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[[0, 1]], -0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[[1, 0]], -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[[1, 1]], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn only_requested_products_are_returned() {
        let a = array![[2.0, 0.0], [0.0, 3.0]];

        let det_only = det_and_inv(&a, DetInv::Determinant).unwrap();
        let inv_only = det_and_inv(&a, DetInv::Inverse).unwrap();

        assert!(det_only.inverse.is_none());
        assert_abs_diff_eq!(det_only.determinant.unwrap(), 6.0, epsilon = 1e-12);
        assert!(inv_only.determinant.is_none());
        assert!(inv_only.inverse.is_some());
    }

    #[test]
    // Purpose
    // -------
    // A non-square input is a typed error, not a zero determinant.
    fn non_square_matrix_is_rejected() {
        let a = Array2::<f64>::zeros((2, 3));

        assert_eq!(matrix_determinant(&a), Err(LinalgError::NotSquare { rows: 2, cols: 3 }));
        assert_eq!(matrix_inverse(&a), Err(LinalgError::NotSquare { rows: 2, cols: 3 }));
    }

    #[test]
    fn singular_matrix_has_zero_determinant_but_no_inverse() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];

        assert_abs_diff_eq!(matrix_determinant(&a).unwrap(), 0.0, epsilon = 1e-12);
        assert_eq!(matrix_inverse(&a), Err(LinalgError::Singular));
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let a = Array2::<f64>::zeros((0, 0));

        assert_eq!(matrix_determinant(&a), Err(LinalgError::EmptyInput));
    }
}
