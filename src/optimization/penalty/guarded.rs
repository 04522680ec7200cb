//! Guarded evaluator: a model, one data set, and its rescue cache.
use std::cell::RefCell;

use argmin::core::Error;
use ndarray::Array2;

use crate::{
    models::Model,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            finite_diff::fd_gradient,
            types::{Grad, Theta},
        },
        penalty::{
            keep_away::{Boundary, Violation, detect, penalty},
            rescue::RescueCache,
        },
    },
};

/// Model evaluation with the keep-away guard applied.
///
/// One `Guarded` is one estimation session: it borrows the model and the
/// data and owns the [`RescueCache`] for that pair. Inside the domain every
/// call forwards to the model. Outside, with `r(x)` the rescue point (each
/// violated coordinate moved just inside its bound, the others kept), the
/// value is
///
/// `P(x) = exp(Σ|x_i − limit_i|) · |c(r(x))|`
///
/// and the gradient is its exact derivative: `−P` on each violated axis and
/// `exp(Σ|x_i − limit_i|) · sign(c) · ∂c/∂x_j (r)` on every other axis.
#[derive(Debug)]
pub struct Guarded<'a, M: Model + ?Sized> {
    model: &'a M,
    data: &'a Array2<f64>,
    cache: RescueCache,
}

impl<'a, M: Model + ?Sized> Guarded<'a, M> {
    pub fn new(model: &'a M, data: &'a Array2<f64>) -> Self {
        Self { model, data, cache: RescueCache::new() }
    }

    pub fn model(&self) -> &'a M {
        self.model
    }

    pub fn data(&self) -> &'a Array2<f64> {
        self.data
    }

    /// Dimension and finiteness checks, then boundary classification.
    pub fn boundary(&self, beta: &Theta) -> OptResult<Boundary> {
        let expected = self.model.parameter_count();
        if beta.len() != expected {
            return Err(OptError::DimensionMismatch { expected, found: beta.len() });
        }
        detect(self.model.lower_bounds(), beta)
    }

    /// `|cost(rescue)|`, memoized for this session.
    ///
    /// # Errors
    /// Propagates model errors at the rescue point and reports a non-finite
    /// rescue cost as [`OptError::NonFiniteCost`].
    pub fn rescue_base(&self, rescue: &Theta) -> OptResult<f64> {
        Ok(self.rescue_cost(rescue)?.abs())
    }

    pub fn neg_log_likelihood(&self, beta: &Theta) -> OptResult<f64> {
        match self.boundary(beta)? {
            Boundary::Inside => self.model.neg_log_likelihood(beta, self.data),
            Boundary::Outside { violations, rescue } => {
                Ok(penalty(&violations, self.rescue_base(&rescue)?))
            }
        }
    }

    /// Analytic gradient inside the domain (or the model's
    /// `GradientNotImplemented`), penalty gradient outside.
    pub fn neg_gradient(&self, beta: &Theta) -> OptResult<Grad> {
        match self.boundary(beta)? {
            Boundary::Inside => self.model.neg_gradient(beta, self.data),
            Boundary::Outside { violations, rescue } => {
                Ok(self.penalty_value_and_gradient(&violations, &rescue)?.1)
            }
        }
    }

    /// Fused value and gradient. Outside the domain this always succeeds;
    /// inside it forwards the model's fused evaluator, including
    /// `FusedNotImplemented`.
    pub fn neg_log_likelihood_and_gradient(&self, beta: &Theta) -> OptResult<(f64, Grad)> {
        match self.boundary(beta)? {
            Boundary::Inside => self.model.neg_log_likelihood_and_gradient(beta, self.data),
            Boundary::Outside { violations, rescue } => {
                self.penalty_value_and_gradient(&violations, &rescue)
            }
        }
    }

    /// Model evaluations made at rescue points so far.
    pub fn rescue_evaluations(&self) -> usize {
        self.cache.misses()
    }

    pub fn rescue_cache(&self) -> &RescueCache {
        &self.cache
    }

    // ---- Helper methods ----

    fn rescue_cost(&self, rescue: &Theta) -> OptResult<f64> {
        self.cache.cost_or_try_insert(rescue, || {
            let value = self.model.neg_log_likelihood(rescue, self.data)?;
            if !value.is_finite() {
                return Err(OptError::NonFiniteCost { value });
            }
            Ok(value)
        })
    }

    /// `∇c(rescue)`: the model's gradient, or finite differences of the
    /// guarded cost when the model has none.
    fn rescue_gradient(&self, rescue: &Theta) -> OptResult<Grad> {
        self.cache.gradient_or_try_insert(rescue, || {
            match self.model.neg_gradient(rescue, self.data) {
                Err(OptError::GradientNotImplemented) => {
                    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                    let cost = |theta: &Theta| match self.neg_log_likelihood(theta) {
                        Ok(v) => v,
                        Err(e) => {
                            closure_err.borrow_mut().get_or_insert(e.into());
                            f64::NAN
                        }
                    };
                    fd_gradient(rescue, &cost, &closure_err)
                }
                other => other,
            }
        })
    }

    fn penalty_value_and_gradient(
        &self, violations: &[Violation], rescue: &Theta,
    ) -> OptResult<(f64, Grad)> {
        let cost = self.rescue_cost(rescue)?;
        let value = penalty(violations, cost.abs());
        let dim = rescue.len();
        let mut grad = Grad::zeros(dim);
        let free_axes = (0..dim).any(|j| violations.iter().all(|v| v.axis != j));
        if free_axes && cost != 0.0 {
            let scale = penalty(violations, 1.0) * cost.signum();
            grad = self.rescue_gradient(rescue)?.mapv(|g| saturate(scale * g));
        }
        for v in violations {
            grad[v.axis] = -value;
        }
        Ok((value, grad))
    }
}

fn saturate(x: f64) -> f64 {
    if x.is_finite() { x } else { f64::MAX.copysign(x) }
}
