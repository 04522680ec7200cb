//! Adapter that exposes a guarded model as an `argmin` problem.
//!
//! Models already return the cost orientation (negated log-likelihood and
//! its gradient), so no sign flip happens here. The adapter adds three
//! things on top of [`Guarded`]:
//!
//! - finite-difference gradients of the **cost** when the model has no
//!   analytic gradient,
//! - a one-slot memo of the latest gradient (from a fused value+gradient
//!   call or a gradient request), served again to any gradient request at
//!   the identical point,
//! - best-so-far tracking of every finite cost evaluated, so a run that
//!   breaks down can still report the best point it saw.
//!
//! The memo and tracker live in an [`EvalTracker`] owned by the caller, so
//! they survive the executor taking ownership of the adapter.
use std::cell::{Cell, RefCell};

use crate::{
    models::Model,
    optimization::{
        errors::OptError,
        loglik_optimizer::{
            finite_diff::fd_gradient,
            types::{Cost, Grad, Theta},
            validation::validate_grad,
        },
        penalty::Guarded,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Per-run evaluation bookkeeping shared with the adapter.
#[derive(Debug, Default)]
pub struct EvalTracker {
    best: RefCell<Option<(Theta, Cost)>>,
    last_grad: RefCell<Option<(Theta, Grad)>>,
    cost_evals: Cell<u64>,
}

impl EvalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest finite cost seen so far and where it was evaluated.
    pub fn best(&self) -> Option<(Theta, Cost)> {
        self.best.borrow().clone()
    }

    /// Number of cost evaluations routed through the adapter.
    pub fn cost_evals(&self) -> u64 {
        self.cost_evals.get()
    }

    fn record(&self, theta: &Theta, cost: Cost) {
        self.cost_evals.set(self.cost_evals.get() + 1);
        let mut best = self.best.borrow_mut();
        let improves = match best.as_ref() {
            Some((_, c)) => cost < *c,
            None => true,
        };
        if improves {
            *best = Some((theta.clone(), cost));
        }
    }

    fn store_gradient(&self, theta: &Theta, grad: &Grad) {
        *self.last_grad.borrow_mut() = Some((theta.clone(), grad.clone()));
    }

    /// Gradient memoized for exactly `theta`, if any.
    fn cached_gradient(&self, theta: &Theta) -> Option<Grad> {
        match self.last_grad.borrow().as_ref() {
            Some((at, g)) if at == theta => Some(g.clone()),
            _ => None,
        }
    }
}

/// Bridges a [`Guarded`] model to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns the guarded negated log-likelihood.
///   When `fused` is set it calls the fused evaluator and memoizes the
///   gradient for the solver's next gradient request.
/// - `Gradient::gradient` returns the memoized gradient, the analytic
///   gradient, or a finite-difference gradient of the cost, in that order.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, M: Model + ?Sized> {
    pub guarded: &'a Guarded<'a, M>,
    pub tracker: &'a EvalTracker,
    pub fused: bool,
}

impl<'a, M: Model + ?Sized> ArgMinAdapter<'a, M> {
    /// Construct a new adapter; the fused path is used when the model
    /// advertises it.
    pub fn new(guarded: &'a Guarded<'a, M>, tracker: &'a EvalTracker) -> Self {
        let fused = guarded.model().capabilities().fused;
        Self { guarded, tracker, fused }
    }

    fn checked(&self, theta: &Theta, value: f64) -> Result<Cost, Error> {
        if !value.is_finite() {
            return Err((OptError::NonFiniteCost { value }).into());
        }
        self.tracker.record(theta, value);
        Ok(value)
    }
}

impl<'a, M: Model + ?Sized> CostFunction for ArgMinAdapter<'a, M> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ) = -ℓ(θ)` through the guard.
    ///
    /// # Errors
    /// - `NonFiniteCost` if the value is not finite.
    /// - Propagates any `OptError` from the model or guard.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        if self.fused {
            match self.guarded.neg_log_likelihood_and_gradient(theta) {
                Ok((value, grad)) => {
                    let cost = self.checked(theta, value)?;
                    self.tracker.store_gradient(theta, &grad);
                    return Ok(cost);
                }
                Err(OptError::FusedNotImplemented) => {}
                Err(e) => return Err(e.into()),
            }
        }
        let value = self.guarded.neg_log_likelihood(theta)?;
        self.checked(theta, value)
    }
}

impl<'a, M: Model + ?Sized> Gradient for ArgMinAdapter<'a, M> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// Behavior:
    /// - If the latest gradient (fused or requested) was at exactly `θ`,
    ///   reuse it.
    /// - Else, if the model implements an analytic gradient, validate and
    ///   return it (outside the domain the guard supplies the penalty
    ///   gradient).
    /// - Otherwise, compute a finite-difference gradient of the **cost** via
    ///   [`fd_gradient`] (central, falling back to forward).
    ///
    /// Implementation notes:
    /// - The FD closure must return `f64`, so we can’t use `?` inside it; we capture
    ///   the first error in `closure_err` and return `NaN` from the closure.
    ///
    /// # Errors
    /// - Propagates model errors from the gradient (other than
    ///   `GradientNotImplemented`).
    /// - Propagates any error raised by cost evaluations performed during FD.
    /// - Returns validation errors if the gradient has wrong dimension or
    ///   non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        if let Some(g) = self.tracker.cached_gradient(theta) {
            validate_grad(&g, dim)?;
            return Ok(g);
        }
        let grad = match self.guarded.neg_gradient(theta) {
            Ok(g) => g,
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                fd_gradient(theta, &cost_func, &closure_err)?
            }
            Err(e) => return Err(e.into()),
        };
        validate_grad(&grad, dim)?;
        self.tracker.store_gradient(theta, &grad);
        Ok(grad)
    }
}
