//! loglik_optimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Supply derivatives the model layer does not provide: cost gradients for
//! models without an analytic gradient (Zipf, or any user model), and the
//! observed-information Hessian used for standard errors. The rest of the
//! crate requests derivatives here instead of calling `finitediff` directly.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`]: central differences first, forward differences when a
//!   central evaluation failed or produced a non-finite entry.
//! - [`run_fd_diff`]: the forward-difference leg, with error capture and
//!   post-hoc validation.
//! - [`compute_hessian`]: central-difference Jacobian of a gradient,
//!   falling back to forward differences, then symmetrized.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any error raised by the objective during differencing is routed into
//!   the shared `closure_err` cell and surfaces as a hard failure of that
//!   leg.
//! - Returned gradients satisfy [`validate_grad`]; returned Hessians satisfy
//!   [`validate_hessian`] and are exactly symmetric.
//!
//! Conventions
//! -----------
//! - Differences are taken in the raw parameter space. Near a domain bound
//!   the perturbed points may land in the penalty region; the guard keeps
//!   those evaluations finite.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of `func` at `theta`: central, then forward.
///
/// `func` must report evaluation failures through `closure_err` and return
/// `NaN` in that case.
///
/// # Errors
/// The forward leg's captured error, or its validation error.
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    let central = theta.central_diff(func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, func, closure_err)
}

/// Forward-difference gradient with error capture and validation.
///
/// Clears `closure_err`, differences `func`, then returns the first captured
/// error if any, otherwise the validated gradient.
///
/// # Errors
/// - Any error captured from `func`.
/// - [`OptError::GradientDimMismatch`](crate::optimization::errors::OptError::GradientDimMismatch)
///   or [`OptError::InvalidGradient`](crate::optimization::errors::OptError::InvalidGradient)
///   from validation.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Symmetrized finite-difference Hessian from a gradient function.
///
/// Central differences are tried first; if that matrix fails validation
/// the forward-difference matrix is used instead.
///
/// # Errors
/// [`OptError::InvalidHessian`](crate::optimization::errors::OptError::InvalidHessian)
/// or a dimension mismatch when the forward fallback is also unusable.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut hess = theta.central_hessian(f);
    if validate_hessian(&hess, dim).is_err() {
        hess = theta.forward_hessian(f);
        validate_hessian(&hess, dim)?;
    }
    symmetrize_hess(&mut hess);
    Ok(hess)
}

/// Replace each off-diagonal pair with its average.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
