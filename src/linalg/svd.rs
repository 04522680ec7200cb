//! linalg::svd — principal components of a data matrix.
//!
//! Forms the cross-product `XᵀX`, rescales it to unit diagonal, and
//! decomposes it with `nalgebra`'s symmetric eigen solver. Components are
//! returned in order of descending eigenvalue together with each
//! eigenvalue's share of the total.
use ndarray::{Array1, Array2};

use crate::linalg::{
    det_inv::to_dmatrix,
    errors::{LinalgError, LinalgResult},
};

/// Leading principal components of a data matrix.
///
/// - `eigenvectors`: `p × dims`; column `k` is the `k`-th component.
/// - `variance_share`: length `dims`; eigenvalue `k` divided by the sum of
///   all `p` eigenvalues (including discarded ones).
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalComponents {
    pub eigenvectors: Array2<f64>,
    pub variance_share: Array1<f64>,
}

/// Decompose `data` (`n × p`, observations in rows) and keep `dims`
/// components.
///
/// Columns with a zero cross-product diagonal are left unscaled.
///
/// # Errors
/// - [`LinalgError::EmptyInput`] for an empty matrix.
/// - [`LinalgError::InvalidDimensions`] when `dims == 0` or `dims > p`.
/// - [`LinalgError::Singular`] when every eigenvalue is zero.
pub fn sv_decomposition(data: &Array2<f64>, dims: usize) -> LinalgResult<PrincipalComponents> {
    let (n, p) = data.dim();
    if n == 0 || p == 0 {
        return Err(LinalgError::EmptyInput);
    }
    if dims == 0 || dims > p {
        return Err(LinalgError::InvalidDimensions { requested: dims, available: p });
    }

    let mut cross = data.t().dot(data);
    let scale: Array1<f64> =
        cross.diag().mapv(|d| if d > 0.0 { 1.0 / d.sqrt() } else { 1.0 });
    for ((i, j), v) in cross.indexed_iter_mut() {
        *v *= scale[i] * scale[j];
    }

    let eigen = to_dmatrix(&cross).symmetric_eigen();
    let mut order: Vec<usize> = (0..p).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let total: f64 = eigen.eigenvalues.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(LinalgError::Singular);
    }

    let eigenvectors =
        Array2::from_shape_fn((p, dims), |(i, k)| eigen.eigenvectors[(i, order[k])]);
    let variance_share = Array1::from_shape_fn(dims, |k| eigen.eigenvalues[order[k]] / total);
    Ok(PrincipalComponents { eigenvectors, variance_share })
}
