//! linalg::vector — small vector checks and distances.
use ndarray::Array1;

use crate::linalg::errors::{LinalgError, LinalgResult};

/// `true` when every element is finite and strictly inside `(-max, max)`.
///
/// Pass `f64::INFINITY` to test finiteness only.
pub fn vector_bounded(v: &Array1<f64>, max: f64) -> bool {
    v.iter().all(|&x| x.is_finite() && x < max && x > -max)
}

/// Euclidean distance between two equal-length vectors.
pub fn vector_distance(a: &Array1<f64>, b: &Array1<f64>) -> LinalgResult<f64> {
    if a.len() != b.len() {
        return Err(LinalgError::LengthMismatch { left: a.len(), right: b.len() });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt())
}
