//! inference::hessian — observed-information covariance and standard errors.
//!
//! Purpose
//! -------
//! Turn a fitted parameter vector into an asymptotic covariance matrix.
//! The observed information `J(θ̂)` is the finite-difference Hessian of the
//! guarded cost gradient `−∇ℓ`, and the covariance is its eigen
//! pseudo-inverse.
//!
//! Key behaviors
//! -------------
//! - Gradients come from the same source the optimizer uses: the model's
//!   analytic gradient when it has one, otherwise central/forward
//!   differences of the guarded cost. The Hessian is therefore a first
//!   difference of an analytic gradient, or a nested difference for
//!   gradient-less models such as Zipf.
//! - [`compute_hessian`] symmetrizes the matrix; no explicit inverse is
//!   formed.
//!
//! Invariants & assumptions
//! ------------------------
//! - `theta_hat.len()` must equal the model's parameter count.
//! - Eigenvalues at or below [`EIGEN_EPS`] are treated as zero, so weakly
//!   identified directions contribute no variance instead of exploding.
//!
//! Conventions
//! -----------
//! - The likelihood is the **sum** over observations, so the covariance is
//!   on the estimator's own scale and needs no `1/n` rescaling.
use std::cell::RefCell;

use argmin::core::Gradient;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::{
    linalg::det_inv::{from_dmatrix, to_dmatrix},
    models::Model,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            Theta,
            adapter::{ArgMinAdapter, EvalTracker},
            finite_diff::compute_hessian,
            types::Hessian,
        },
        penalty::Guarded,
    },
};

/// Eigenvalue floor for the pseudo-inverse.
pub const EIGEN_EPS: f64 = 1e-12;

/// Asymptotic covariance of an MLE.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariance {
    /// `J(θ̂)⁺`, symmetric `n × n`.
    pub matrix: Array2<f64>,
    /// Square roots of the diagonal of `matrix`.
    pub std_errors: Array1<f64>,
    /// The observed information the covariance was built from.
    pub information: Hessian,
}

/// Observed-information covariance of `model` at `theta_hat`.
///
/// # Errors
/// - [`OptError::DimensionMismatch`] / [`OptError::InvalidThetaInput`] for
///   a malformed `theta_hat`.
/// - The first error raised while evaluating gradients.
/// - Hessian validation errors (non-finite entries).
pub fn calc_covariance<M: Model + ?Sized>(
    model: &M, data: &Array2<f64>, theta_hat: &Theta,
) -> OptResult<Covariance> {
    model.check_data(data)?;
    let guarded = Guarded::new(model, data);
    guarded.boundary(theta_hat)?;
    let tracker = EvalTracker::new();
    let adapter = ArgMinAdapter::new(&guarded, &tracker);

    let failure: RefCell<Option<OptError>> = RefCell::new(None);
    let gradient = |theta: &Theta| match adapter.gradient(theta) {
        Ok(g) => g,
        Err(e) => {
            let mut slot = failure.borrow_mut();
            if slot.is_none() {
                *slot = Some(e.into());
            }
            Array1::from_elem(theta.len(), f64::NAN)
        }
    };
    let information = compute_hessian(&gradient, theta_hat);
    if let Some(err) = failure.take() {
        return Err(err);
    }
    let information = information?;

    let matrix = pseudo_inverse(&information);
    let std_errors = matrix.diag().mapv(|v| v.max(0.0).sqrt());
    Ok(Covariance { matrix, std_errors, information })
}

// ---- Helper methods ----

/// `Σ_{λ_k > EIGEN_EPS} q_k q_kᵀ / λ_k` for a symmetric matrix.
fn pseudo_inverse(information: &Hessian) -> Array2<f64> {
    let n = information.nrows();
    let eigen = to_dmatrix(information).symmetric_eigen();
    let q = &eigen.eigenvectors;
    let mut pinv = DMatrix::<f64>::zeros(n, n);
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            continue;
        }
        let col = q.column(k);
        pinv += (col * col.transpose()) / lambda;
    }
    from_dmatrix(&pinv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Exponential, Gamma, Zipf},
        optimization::loglik_optimizer::{MLEOptions, maximize},
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // For the exponential scale, J(μ̂) = n / μ̂² at μ̂ = x̄, so the standard
    // error is x̄ / √n.
    //
    // Given
    // -----
    // - Four observations with mean 0.75.
    //
    // Expect
    // ------
    // - SE ≈ 0.375 to finite-difference accuracy.
    fn exponential_standard_error_matches_closed_form() {
        let data = array![[0.5, 1.0, 0.25, 1.25]];

        let cov = calc_covariance(&Exponential, &data, &array![0.75]).unwrap();

        assert_relative_eq!(cov.std_errors[0], 0.75 / 2.0, max_relative = 1e-5);
        assert_relative_eq!(cov.matrix[[0, 0]], cov.std_errors[0].powi(2), max_relative = 1e-12);
    }

    #[test]
    fn gamma_covariance_at_the_mle_is_symmetric_and_positive() {
        let data = array![[1.2, 2.5, 0.7, 3.1, 1.9, 2.2, 0.9, 1.4]];
        let fit = maximize(&Gamma, Some(array![1.0, 1.0]), &data, &MLEOptions::default()).unwrap();

        let cov = calc_covariance(&Gamma, &data, &fit.theta_hat).unwrap();

        assert_eq!(cov.matrix[[0, 1]], cov.matrix[[1, 0]]);
        assert!(cov.std_errors.iter().all(|s| s.is_finite() && *s > 0.0));
    }

    #[test]
    fn gradient_less_model_uses_nested_differences() {
        let data = array![[120.0, 30.0, 13.0, 8.0, 5.0, 3.0]];

        let cov = calc_covariance(&Zipf, &data, &array![2.0]).unwrap();

        assert!(cov.information[[0, 0]] > 0.0);
        assert!(cov.std_errors[0].is_finite());
    }

    #[test]
    // Purpose
    // -------
    // A singular direction contributes no variance instead of infinity.
    fn pseudo_inverse_drops_null_directions() {
        let info = array![[4.0, 0.0], [0.0, 0.0]];

        let pinv = pseudo_inverse(&info);

        assert_relative_eq!(pinv[[0, 0]], 0.25, epsilon = 1e-14);
        assert_eq!(pinv[[1, 1]], 0.0);
    }

    #[test]
    fn wrong_length_is_a_dimension_mismatch() {
        let data = array![[1.0, 2.0]];

        let err = calc_covariance(&Gamma, &data, &array![1.0]).unwrap_err();

        assert_eq!(err, OptError::DimensionMismatch { expected: 2, found: 1 });
    }
}
