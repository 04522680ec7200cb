//! loglik_optimizer::convergence — relative-cost and gradient-norm stopping.
//!
//! Purpose
//! -------
//! Argmin's gradient solvers stop on an absolute cost change, which never
//! fires for log-likelihoods summed over thousands of observations, and
//! some (steepest descent, conjugate gradient) have no built-in stopping
//! rule at all. [`Convergence`] wraps any gradient solver and adds:
//!
//! - `|c_k − c_{k−1}| ≤ tol_cost · max(1, |c_{k−1}|)` for `patience`
//!   consecutive iterations, or
//! - `‖∇c(θ_k)‖ ≤ tol_grad`.
//!
//! Key behaviors
//! -------------
//! - The inner solver's own termination checks (including `max_iters`) run
//!   first; the wrapper only adds criteria.
//! - The streak counter resets whenever a step changes the cost by more
//!   than the tolerance.
//! - Both criteria report `TerminationReason::SolverConverged`.
//! - Before each step the current point is tested for stationarity,
//!   `‖∇c‖ ≤ STATIONARY_TOL · max(1, |c|)`, whether or not `tol_grad` is
//!   set. A stationary point ends the run as converged instead of handing
//!   the line search a zero direction, which it rejects.
//! - A step that fails inside the inner solver ends the run with
//!   `SolverExit` carrying the error, so the state keeps its iteration
//!   count and best point. Input errors still propagate.
use argmin::core::{
    Error, Gradient, KV, Problem, Solver, State, TerminationReason, TerminationStatus,
};
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::types::{Cost, Grad, GradientState, Theta},
};

/// Relative gradient norm below which a point counts as stationary even
/// when no gradient tolerance is configured. Matches Argmin's L-BFGS
/// default gradient tolerance, `√ε`.
pub const STATIONARY_TOL: f64 = 1.490_116_119_384_765_6e-8;

/// `‖g‖ ≤ STATIONARY_TOL · max(1, |cost|)`.
pub fn is_stationary(gradient: &Grad, cost: Cost) -> bool {
    let scale = if cost.is_finite() { cost.abs().max(1.0) } else { 1.0 };
    gradient.l2_norm() <= STATIONARY_TOL * scale
}

/// Stopping-rule wrapper around a gradient solver `S`.
#[derive(Debug, Clone)]
pub struct Convergence<S> {
    inner: S,
    tol_cost: Option<f64>,
    tol_grad: Option<f64>,
    patience: usize,
    streak: usize,
}

impl<S> Convergence<S> {
    pub fn new(inner: S, tol_cost: Option<f64>, tol_grad: Option<f64>, patience: usize) -> Self {
        Self { inner, tol_cost, tol_grad, patience: patience.max(1), streak: 0 }
    }

    /// Consecutive iterations with a sub-tolerance cost change so far.
    pub fn streak(&self) -> usize {
        self.streak
    }

    fn record_step(&mut self, prev: Cost, cost: Cost) {
        let small = match self.tol_cost {
            Some(tol) if prev.is_finite() && cost.is_finite() => {
                (prev - cost).abs() <= tol * prev.abs().max(1.0)
            }
            _ => false,
        };
        self.streak = if small { self.streak + 1 } else { 0 };
    }

    fn check(&self, gradient: Option<&Grad>) -> TerminationStatus {
        if self.tol_cost.is_some() && self.streak >= self.patience {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }
        if let (Some(tol), Some(g)) = (self.tol_grad, gradient) {
            if g.l2_norm() <= tol {
                return TerminationStatus::Terminated(TerminationReason::SolverConverged);
            }
        }
        TerminationStatus::NotTerminated
    }

    /// Close out a step that failed inside the inner solver.
    fn settle(state: GradientState, err: Error) -> Result<(GradientState, Option<KV>), Error> {
        let err = OptError::from(err);
        if err.is_input_error() {
            return Err(err.into());
        }
        log::debug!("step failed: {err}");
        Ok((state.terminate_with(TerminationReason::SolverExit(err.to_string())), None))
    }
}

impl<O, S> Solver<O, GradientState> for Convergence<S>
where
    O: Gradient<Param = Theta, Gradient = Grad>,
    S: Solver<O, GradientState>,
{
    const NAME: &'static str = <S as Solver<O, GradientState>>::NAME;

    fn init(
        &mut self, problem: &mut Problem<O>, state: GradientState,
    ) -> Result<(GradientState, Option<KV>), Error> {
        self.streak = 0;
        self.inner.init(problem, state)
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: GradientState,
    ) -> Result<(GradientState, Option<KV>), Error> {
        let prev = state.get_cost();
        // Steepest descent keeps no gradient in the state; the adapter
        // memoizes this one for the solver's own request at the same point.
        let stationary = match (state.get_gradient(), state.get_param()) {
            (Some(g), _) => is_stationary(g, prev),
            (None, Some(theta)) => problem.gradient(theta).is_ok_and(|g| is_stationary(&g, prev)),
            (None, None) => false,
        };
        if stationary {
            return Ok((state.terminate_with(TerminationReason::SolverConverged), None));
        }
        let before = state.clone();
        match self.inner.next_iter(problem, state) {
            Ok((state, kv)) => {
                self.record_step(prev, state.get_cost());
                Ok((state, kv))
            }
            Err(err) => Self::settle(before, err),
        }
    }

    fn terminate_internal(&mut self, state: &GradientState) -> TerminationStatus {
        let inner = self.inner.terminate_internal(state);
        if inner.terminated() {
            return inner;
        }
        self.terminate(state)
    }

    fn terminate(&mut self, state: &GradientState) -> TerminationStatus {
        self.check(state.get_gradient())
    }
}
