//! Execution helpers that run an `argmin` solver on a guarded likelihood and
//! return a crate-friendly [`OptimOutcome`].
//!
//! Two runners cover the two Argmin state shapes: [`run_gradient`] for
//! every line-search method and [`run_simplex`] for Nelder–Mead. Both
//! report a backend breakdown as a `Failed` outcome carrying the best
//! finite point the [`EvalTracker`] saw; only input errors and runs that
//! never produced a finite cost come back as `Err`.
//!
//! A gradient step that fails mid-run is closed out by the
//! [`Convergence`](super::convergence::Convergence) wrapper, so the
//! outcome keeps the executor's iteration count.
use crate::{
    models::Model,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            FnEvalMap, Grad, Theta,
            adapter::{ArgMinAdapter, EvalTracker},
            builders::{build_nelder_mead, simplex_vertices},
            traits::{MLEOptions, Method, OptimOutcome, Termination},
            types::{Cost, GradientState},
        },
    },
};
use argmin::core::{CostFunction, Executor, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin::core::{Gradient, observers::ObserverMode};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run a gradient-based `argmin` solver on a guarded likelihood.
///
/// Wires up the adapter, the solver, `theta0`, optional observers (behind
/// the `obs_slog` feature), and optional `max_iters`, then executes and
/// converts the final state into an [`OptimOutcome`] tagged with `method`.
///
/// # Feature flags
/// With `obs_slog` and `opts.verbose`, a terminal slog observer is attached
/// with `ObserverMode::Always` and a one-time line logs ℓ(θ₀) and ‖∇c(θ₀)‖
/// before the first iteration.
///
/// # Errors
/// - Input errors raised by the model during the run (for example a
///   dimension mismatch).
/// - [`OptError::EstimationFailure`] when the run broke down before any
///   finite cost was evaluated.
pub fn run_gradient<'a, M, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, M>, method: Method, solver: S,
) -> OptResult<OptimOutcome>
where
    M: Model + ?Sized,
    S: Solver<ArgMinAdapter<'a, M>, GradientState>,
{
    let tracker = problem.tracker;
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    log::debug!("running {method}");
    match optimizer.run() {
        Ok(result) => {
            let mut state = result.state;
            let termination = Termination::from_status(state.get_termination_status());
            let iterations = state.get_iter();
            let fn_evals = state.get_func_counts().clone();
            let best_cost = state.get_best_cost();
            let grad = state.take_gradient();
            finish(
                state.take_best_param(),
                best_cost,
                termination,
                method,
                iterations,
                fn_evals,
                grad,
                tracker,
            )
        }
        Err(e) => failed_outcome(e.into(), method, tracker),
    }
}

/// Run Nelder–Mead from the simplex around `theta0`.
///
/// Every vertex is evaluated once through the adapter before the solver
/// starts, so a vertex whose cost cannot be computed ends the run as a
/// failure instead of reaching the solver.
///
/// # Errors
/// As [`run_gradient`], plus builder errors for an invalid tolerance.
pub fn run_simplex<M>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'_, M>,
) -> OptResult<OptimOutcome>
where
    M: Model + ?Sized,
{
    let tracker = problem.tracker;
    let method = Method::NelderMead;
    let vertices = simplex_vertices(&theta0, opts.step_size);
    for vertex in &vertices {
        if let Err(e) = problem.cost(vertex) {
            return failed_outcome(e.into(), method, tracker);
        }
    }
    let solver = build_nelder_mead(vertices, opts)?;

    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    log::debug!("running {method}");
    match optimizer.run() {
        Ok(result) => {
            let mut state = result.state;
            let termination = Termination::from_status(state.get_termination_status());
            let iterations = state.get_iter();
            let fn_evals = state.get_func_counts().clone();
            let best_cost = state.get_best_cost();
            finish(
                state.take_best_param(),
                best_cost,
                termination,
                method,
                iterations,
                fn_evals,
                None,
                tracker,
            )
        }
        Err(e) => failed_outcome(e.into(), method, tracker),
    }
}

// ---- Helper Methods ----

/// Build the outcome of a run that returned normally.
///
/// Falls back to the tracker's best point when the state holds no finite
/// best (a run stopped during initialization). A failed run reports the
/// tracker's best point when it beats the state's, since line-search trial
/// points never reach the state.
#[allow(clippy::too_many_arguments)]
fn finish(
    best_param: Option<Theta>, best_cost: Cost, termination: Termination, method: Method,
    iterations: u64, fn_evals: FnEvalMap, mut grad: Option<Grad>, tracker: &EvalTracker,
) -> OptResult<OptimOutcome> {
    let (theta_hat, cost) = match best_param {
        Some(theta) if best_cost.is_finite() => (theta, best_cost),
        _ => tracker.best().ok_or_else(|| OptError::EstimationFailure {
            reason: format!("{method} finished without evaluating a finite cost"),
        })?,
    };
    let (theta_hat, cost) = match (&termination, tracker.best()) {
        (Termination::Failed { .. }, Some((theta, c))) if c < cost => {
            grad = None;
            (theta, c)
        }
        _ => (theta_hat, cost),
    };
    if let Termination::Failed { reason } = &termination {
        log::warn!("{method} stopped abnormally: {reason}");
    }
    OptimOutcome::new(Some(theta_hat), -cost, termination, method, iterations, fn_evals, grad)
}

/// Turn a solver error into a `Failed` outcome at the best point seen.
///
/// Reached only when the executor itself returns an error: a solver's
/// initialization or a Nelder–Mead step. Gradient runs get here before
/// their first iteration; for the simplex the count is lost with the
/// executor and zero is reported.
fn failed_outcome(
    err: OptError, method: Method, tracker: &EvalTracker,
) -> OptResult<OptimOutcome> {
    if err.is_input_error() {
        return Err(err);
    }
    log::warn!("{method} failed: {err}");
    let (theta_hat, cost) = tracker
        .best()
        .ok_or_else(|| OptError::EstimationFailure { reason: err.to_string() })?;
    let mut fn_evals = FnEvalMap::new();
    fn_evals.insert("cost_count".to_string(), tracker.cost_evals());
    OptimOutcome::new(
        Some(theta_hat),
        -cost,
        Termination::Failed { reason: err.to_string() },
        method,
        0,
        fn_evals,
        None,
    )
}

#[cfg(feature = "obs_slog")]
fn log_initial_state<M>(theta0: &Theta, problem: &ArgMinAdapter<'_, M>) -> OptResult<()>
where
    M: Model + ?Sized,
{
    let ll0 = -problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());

    eprintln!(
        "init: ell(theta0) = {:.6}{}",
        ll0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
