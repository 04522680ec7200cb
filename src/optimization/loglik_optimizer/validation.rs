//! Argument and result checks shared by the MLE driver, the argmin adapter,
//! and the covariance code.
//!
//! Option checks (`verify_*`) run when options are built; result checks
//! (`validate_*`) run on every gradient, estimate, and Hessian that crosses
//! a module boundary. Each failure maps to its own [`OptError`] variant so
//! callers can tell a bad option from a bad evaluation.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// Why a tolerance was refused, or `None` when it is usable.
fn tolerance_problem(tol: f64) -> Option<&'static str> {
    if !tol.is_finite() {
        Some("Tolerance must be finite.")
    } else if tol <= 0.0 {
        Some("Tolerance must be positive.")
    } else {
        None
    }
}

/// First entry that is `NaN` or infinite, with its position.
fn first_non_finite<'a, I, D>(entries: I) -> Option<(D, f64)>
where
    I: IntoIterator<Item = (D, &'a f64)>,
{
    entries.into_iter().find(|(_, v)| !v.is_finite()).map(|(at, &v)| (at, v))
}

/// `None`, or a finite positive gradient-norm tolerance.
///
/// # Errors
/// [`OptError::InvalidTolGrad`].
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| tolerance_problem(t).map(|reason| (t, reason))) {
        Some((tol, reason)) => Err(OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// `None`, or a finite positive relative cost tolerance.
///
/// # Errors
/// [`OptError::InvalidTolCost`].
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol.and_then(|t| tolerance_problem(t).map(|reason| (t, reason))) {
        Some((tol, reason)) => Err(OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Simplex edge length: finite and positive.
///
/// # Errors
/// [`OptError::InvalidStepSize`].
pub fn verify_step_size(step: f64) -> OptResult<()> {
    match tolerance_problem(step) {
        Some(_) => Err(OptError::InvalidStepSize {
            step,
            reason: "Step size must be finite and positive.",
        }),
        None => Ok(()),
    }
}

/// # Errors
/// [`OptError::InvalidPatience`] for zero.
pub fn verify_patience(patience: usize) -> OptResult<()> {
    if patience == 0 {
        return Err(OptError::InvalidPatience {
            patience,
            reason: "Patience must be at least one iteration.",
        });
    }
    Ok(())
}

/// # Errors
/// [`OptError::InvalidLBFGSMem`] for `Some(0)`.
pub fn verify_lbfgs_mem(mem: Option<usize>) -> OptResult<()> {
    if mem == Some(0) {
        return Err(OptError::InvalidLBFGSMem {
            mem: 0,
            reason: "L-BFGS memory must be greater than zero.",
        });
    }
    Ok(())
}

/// Length `dim` and finite entries.
///
/// # Errors
/// [`OptError::GradientDimMismatch`] before [`OptError::InvalidGradient`],
/// the latter naming the first offending entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match first_non_finite(grad.iter().enumerate()) {
        Some((index, value)) => Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap an estimate, refusing a missing or non-finite one.
///
/// # Errors
/// [`OptError::MissingThetaHat`] or [`OptError::InvalidThetaHat`].
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, value)) = first_non_finite(theta.iter().enumerate()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta)
}

/// A reported log-likelihood must be finite; its sign is free.
///
/// # Errors
/// [`OptError::NonFiniteCost`].
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

/// Square `dim × dim` with finite entries; shape is checked first.
///
/// # Errors
/// [`OptError::HessianDimMismatch`] or [`OptError::InvalidHessian`] at the
/// first non-finite entry in row-major order.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.dim() != (dim, dim) {
        return Err(OptError::HessianDimMismatch { expected: dim, found: hessian.dim() });
    }
    match first_non_finite(hessian.indexed_iter()) {
        Some(((row, col), value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tolerances_must_be_finite_and_positive() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(Some(1e-8)).is_ok());
        assert!(matches!(
            verify_tol_grad(Some(0.0)),
            Err(OptError::InvalidTolGrad { reason: "Tolerance must be positive.", .. })
        ));
        assert!(matches!(
            verify_tol_cost(Some(f64::NAN)),
            Err(OptError::InvalidTolCost { reason: "Tolerance must be finite.", .. })
        ));
    }

    #[test]
    fn method_knobs_reject_degenerate_values() {
        assert!(verify_step_size(0.5).is_ok());
        assert!(matches!(verify_step_size(0.0), Err(OptError::InvalidStepSize { .. })));
        assert!(matches!(verify_step_size(f64::INFINITY), Err(OptError::InvalidStepSize { .. })));
        assert!(matches!(verify_patience(0), Err(OptError::InvalidPatience { .. })));
        assert!(verify_lbfgs_mem(None).is_ok());
        assert!(matches!(verify_lbfgs_mem(Some(0)), Err(OptError::InvalidLBFGSMem { .. })));
    }

    #[test]
    fn validate_grad_reports_first_bad_entry() {
        let g = array![1.0, f64::NAN, f64::INFINITY];

        assert!(matches!(validate_grad(&g, 3), Err(OptError::InvalidGradient { index: 1, .. })));
        assert_eq!(
            validate_grad(&g, 2),
            Err(OptError::GradientDimMismatch { expected: 2, found: 3 })
        );
    }

    #[test]
    fn estimates_must_be_present_and_finite() {
        assert_eq!(validate_theta_hat(Some(array![1.0, -2.0])), Ok(array![1.0, -2.0]));
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_theta_hat(Some(array![0.0, f64::INFINITY])),
            Err(OptError::InvalidThetaHat { index: 1, .. })
        ));
        assert!(validate_value(-1e300).is_ok());
    }

    #[test]
    fn validate_hessian_checks_shape_before_entries() {
        let h = array![[1.0, f64::NAN]];

        assert_eq!(
            validate_hessian(&h, 2),
            Err(OptError::HessianDimMismatch { expected: 2, found: (1, 2) })
        );
        let sq = array![[1.0, 0.0], [0.0, f64::NEG_INFINITY]];
        assert!(matches!(
            validate_hessian(&sq, 2),
            Err(OptError::InvalidHessian { row: 1, col: 1, .. })
        ));
    }
}
