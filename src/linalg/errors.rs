//! Errors for the linear-algebra convenience layer.
//!
//! Every routine in [`crate::linalg`] that can be handed incompatible shapes
//! returns [`LinalgResult<T>`] instead of a zero or empty sentinel, so a
//! legitimate zero (e.g. the determinant of a singular matrix) can never be
//! confused with a failure.

/// Result alias for linear-algebra helpers.
pub type LinalgResult<T> = Result<T, LinalgError>;

#[derive(Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Determinant/inverse requested for a non-square matrix.
    NotSquare { rows: usize, cols: usize },

    /// Matrix is numerically singular; no inverse exists.
    Singular,

    /// Operand shapes are incompatible for `op`.
    ShapeMismatch { op: &'static str, left: (usize, usize), right: (usize, usize) },

    /// Vectors of different lengths passed to an elementwise operation.
    LengthMismatch { left: usize, right: usize },

    /// Zero-sized input where at least one element is required.
    EmptyInput,

    /// Requested more components than the input provides.
    InvalidDimensions { requested: usize, available: usize },

    /// Column index outside the matrix.
    ColumnOutOfRange { col: usize, ncols: usize },
}

impl std::error::Error for LinalgError {}

impl std::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinalgError::NotSquare { rows, cols } => {
                write!(f, "Expected a square matrix, got {rows} x {cols}")
            }
            LinalgError::Singular => write!(f, "Matrix is singular"),
            LinalgError::ShapeMismatch { op, left, right } => {
                write!(
                    f,
                    "Incompatible shapes for {op}: {} x {} and {} x {}",
                    left.0, left.1, right.0, right.1
                )
            }
            LinalgError::LengthMismatch { left, right } => {
                write!(f, "Vector length mismatch: {left} vs {right}")
            }
            LinalgError::EmptyInput => write!(f, "Input is empty"),
            LinalgError::InvalidDimensions { requested, available } => {
                write!(f, "Requested {requested} components, only {available} available")
            }
            LinalgError::ColumnOutOfRange { col, ncols } => {
                write!(f, "Column {col} out of range for a matrix with {ncols} columns")
            }
        }
    }
}
