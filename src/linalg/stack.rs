//! linalg::stack — joining vectors/matrices and dropping columns.
use ndarray::{Array1, Array2, Axis, concatenate};

use crate::linalg::errors::{LinalgError, LinalgResult};

/// Placement of the second matrix relative to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    /// Second matrix goes below the first; column counts must match.
    Rows,
    /// Second matrix goes to the right of the first; row counts must match.
    Columns,
}

/// `top` followed by `bottom` in a new vector.
///
/// # Errors
/// [`LinalgError::LengthMismatch`] if `ndarray` refuses the join, which
/// only a combined length overflowing `isize` can cause.
pub fn vector_stack(top: &Array1<f64>, bottom: &Array1<f64>) -> LinalgResult<Array1<f64>> {
    concatenate(Axis(0), &[top.view(), bottom.view()])
        .map_err(|_| LinalgError::LengthMismatch { left: top.len(), right: bottom.len() })
}

/// Stack two matrices into a new one.
///
/// # Errors
/// [`LinalgError::ShapeMismatch`] when the shared dimension differs; the
/// inputs are never truncated or padded.
pub fn matrix_stack(
    first: &Array2<f64>, second: &Array2<f64>, posn: Stack,
) -> LinalgResult<Array2<f64>> {
    let (axis, op, compatible) = match posn {
        Stack::Rows => (Axis(0), "row stacking", first.ncols() == second.ncols()),
        Stack::Columns => (Axis(1), "column stacking", first.nrows() == second.nrows()),
    };
    if !compatible {
        return Err(LinalgError::ShapeMismatch { op, left: first.dim(), right: second.dim() });
    }
    concatenate(axis, &[first.view(), second.view()])
        .map_err(|_| LinalgError::ShapeMismatch { op, left: first.dim(), right: second.dim() })
}

/// Four blocks arranged as `[[ul, ur], [dl, dr]]`.
pub fn stack_two_by_two(
    ul: &Array2<f64>, ur: &Array2<f64>, dl: &Array2<f64>, dr: &Array2<f64>,
) -> LinalgResult<Array2<f64>> {
    let top = matrix_stack(ul, ur, Stack::Columns)?;
    let bottom = matrix_stack(dl, dr, Stack::Columns)?;
    matrix_stack(&top, &bottom, Stack::Rows)
}

/// Copy of `m` without the listed columns. Duplicates in `drop` are fine.
pub fn rm_columns(m: &Array2<f64>, drop: &[usize]) -> LinalgResult<Array2<f64>> {
    let ncols = m.ncols();
    if let Some(&col) = drop.iter().find(|&&c| c >= ncols) {
        return Err(LinalgError::ColumnOutOfRange { col, ncols });
    }
    let keep: Vec<usize> = (0..ncols).filter(|c| !drop.contains(c)).collect();
    Ok(m.select(Axis(1), &keep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn vectors_stack_in_order() {
        let out = vector_stack(&array![1.0, 2.0], &array![3.0]).unwrap();

        assert_eq!(out, array![1.0, 2.0, 3.0]);
        assert_eq!(vector_stack(&array![], &array![4.0]).unwrap(), array![4.0]);
    }

    #[test]
    fn rows_and_columns_stack_with_matching_shapes() {
        let a = array![[1.0, 2.0]];
        let b = array![[3.0, 4.0]];

        assert_eq!(matrix_stack(&a, &b, Stack::Rows).unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(matrix_stack(&a, &b, Stack::Columns).unwrap(), array![[1.0, 2.0, 3.0, 4.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Unequal shared dimensions are a typed error carrying both shapes.
    fn mismatched_shapes_are_rejected() {
        let a = array![[1.0, 2.0]];
        let b = array![[3.0, 4.0, 5.0]];

        assert_eq!(
            matrix_stack(&a, &b, Stack::Rows),
            Err(LinalgError::ShapeMismatch { op: "row stacking", left: (1, 2), right: (1, 3) })
        );
    }

    #[test]
    fn two_by_two_blocks_assemble() {
        let one = array![[1.0]];
        let two = array![[2.0]];
        let three = array![[3.0]];
        let four = array![[4.0]];

        let out = stack_two_by_two(&one, &two, &three, &four).unwrap();

        assert_eq!(out, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn rm_columns_keeps_the_rest_in_order() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

        assert_eq!(rm_columns(&m, &[1]).unwrap(), array![[1.0, 3.0], [4.0, 6.0]]);
        assert_eq!(rm_columns(&m, &[3]), Err(LinalgError::ColumnOutOfRange { col: 3, ncols: 3 }));
    }
}
