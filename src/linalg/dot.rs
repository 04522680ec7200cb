//! linalg::dot — dot products over tagged operands.
//!
//! Each side of the product is an [`Operand`]: a vector, or a matrix with
//! an explicit transpose flag. [`dot`] dispatches on the pair of tags and
//! checks the inner dimension before multiplying.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::linalg::errors::{LinalgError, LinalgResult};

/// One side of a dot product.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Vector(ArrayView1<'a, f64>),
    Matrix { m: ArrayView2<'a, f64>, transpose: bool },
}

impl<'a> Operand<'a> {
    pub fn vector(v: &'a Array1<f64>) -> Self {
        Operand::Vector(v.view())
    }

    pub fn matrix(m: &'a Array2<f64>) -> Self {
        Operand::Matrix { m: m.view(), transpose: false }
    }

    pub fn transposed(m: &'a Array2<f64>) -> Self {
        Operand::Matrix { m: m.view(), transpose: true }
    }

    /// Shape as seen by the product: vectors are `1 × n`.
    fn shape(&self) -> (usize, usize) {
        match self {
            Operand::Vector(v) => (1, v.len()),
            Operand::Matrix { m, transpose } => {
                if *transpose {
                    (m.ncols(), m.nrows())
                } else {
                    m.dim()
                }
            }
        }
    }
}

/// Result of [`dot`]; its variant follows from the operand pair.
#[derive(Debug, Clone, PartialEq)]
pub enum DotProduct {
    /// vector · vector
    Scalar(f64),
    /// vector · matrix or matrix · vector
    Vector(Array1<f64>),
    /// matrix · matrix
    Matrix(Array2<f64>),
}

impl DotProduct {
    pub fn into_vector(self) -> Option<Array1<f64>> {
        match self {
            DotProduct::Vector(v) => Some(v),
            _ => None,
        }
    }
}

/// `left · right`.
///
/// | left   | right  | result |
/// |--------|--------|--------|
/// | Vector | Vector | Scalar |
/// | Vector | Matrix | Vector (`vᵀM`) |
/// | Matrix | Vector | Vector (`Mv`) |
/// | Matrix | Matrix | Matrix |
///
/// # Errors
/// [`LinalgError::LengthMismatch`] for vectors of different lengths,
/// [`LinalgError::ShapeMismatch`] when the inner dimensions disagree.
pub fn dot(left: Operand<'_>, right: Operand<'_>) -> LinalgResult<DotProduct> {
    let mismatch = || LinalgError::ShapeMismatch { op: "dot product", left: left.shape(), right: right.shape() };
    match (left, right) {
        (Operand::Vector(a), Operand::Vector(b)) => {
            if a.len() != b.len() {
                return Err(LinalgError::LengthMismatch { left: a.len(), right: b.len() });
            }
            Ok(DotProduct::Scalar(a.dot(&b)))
        }
        (Operand::Vector(v), Operand::Matrix { m, transpose }) => {
            let m = oriented(m, transpose);
            if v.len() != m.nrows() {
                return Err(mismatch());
            }
            Ok(DotProduct::Vector(v.dot(&m)))
        }
        (Operand::Matrix { m, transpose }, Operand::Vector(v)) => {
            let m = oriented(m, transpose);
            if m.ncols() != v.len() {
                return Err(mismatch());
            }
            Ok(DotProduct::Vector(m.dot(&v)))
        }
        (Operand::Matrix { m: a, transpose: ta }, Operand::Matrix { m: b, transpose: tb }) => {
            let a = oriented(a, ta);
            let b = oriented(b, tb);
            if a.ncols() != b.nrows() {
                return Err(mismatch());
            }
            Ok(DotProduct::Matrix(a.dot(&b)))
        }
    }
}

fn oriented(m: ArrayView2<'_, f64>, transpose: bool) -> ArrayView2<'_, f64> {
    if transpose {
        m.reversed_axes()
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn vector_vector_gives_scalar() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![4.0, 5.0, 6.0];

        assert_eq!(dot(Operand::vector(&a), Operand::vector(&b)), Ok(DotProduct::Scalar(32.0)));
    }

    #[test]
    fn matrix_vector_respects_transpose_flag() {
        let m = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let v2 = array![1.0, 1.0];
        let v3 = array![1.0, 0.0, 1.0];

        assert_eq!(
            dot(Operand::matrix(&m), Operand::vector(&v2)),
            Ok(DotProduct::Vector(array![3.0, 7.0, 11.0]))
        );
        assert_eq!(
            dot(Operand::transposed(&m), Operand::vector(&v3)),
            Ok(DotProduct::Vector(array![6.0, 8.0]))
        );
        assert_eq!(
            dot(Operand::vector(&v3), Operand::matrix(&m)),
            Ok(DotProduct::Vector(array![6.0, 8.0]))
        );
    }

    #[test]
    fn matrix_matrix_gives_matrix() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];

        let out = dot(Operand::transposed(&a), Operand::matrix(&a)).unwrap();

        assert_eq!(out, DotProduct::Matrix(array![[10.0, 14.0], [14.0, 20.0]]));
    }

    #[test]
    // Purpose
    // -------
    // Inner-dimension disagreements are typed errors, never empty results.
    fn incompatible_operands_are_rejected() {
        let m = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let v = array![1.0, 2.0, 3.0];
        let w = array![1.0, 2.0];

        assert_eq!(
            dot(Operand::matrix(&m), Operand::vector(&v)),
            Err(LinalgError::ShapeMismatch { op: "dot product", left: (3, 2), right: (1, 3) })
        );
        assert_eq!(
            dot(Operand::vector(&v), Operand::vector(&w)),
            Err(LinalgError::LengthMismatch { left: 3, right: 2 })
        );
    }
}
