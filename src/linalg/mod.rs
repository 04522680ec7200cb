//! linalg — thin linear-algebra services over `ndarray` and `nalgebra`.
//!
//! Purpose
//! -------
//! Give the estimation layers a small, typed surface for the matrix work they
//! need (determinants, inverses, principal components, stacking, dot
//! products) without exposing `nalgebra` types. Data stays in `ndarray`
//! containers; decompositions copy into `nalgebra::DMatrix` and back.
//!
//! Conventions
//! -----------
//! - Inputs are never modified; every routine returns new storage.
//! - Shape problems are reported as [`LinalgError`] through
//!   [`LinalgResult<T>`]. No routine returns a zero or empty value to signal
//!   failure.

pub mod det_inv;
pub mod dot;
pub mod errors;
pub mod stack;
pub mod svd;
pub mod vector;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::det_inv::{DetAndInv, DetInv, det_and_inv, matrix_determinant, matrix_inverse};
pub use self::dot::{DotProduct, Operand, dot};
pub use self::errors::{LinalgError, LinalgResult};
pub use self::stack::{Stack, matrix_stack, rm_columns, stack_two_by_two, vector_stack};
pub use self::svd::{PrincipalComponents, sv_decomposition};
pub use self::vector::{vector_bounded, vector_distance};
