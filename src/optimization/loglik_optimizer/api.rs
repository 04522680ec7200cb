//! High-level entry point for maximizing a [`Model`]'s log-likelihood.
//!
//! [`maximize`] validates the inputs, wraps the model in a boundary
//! [`Guarded`] session, resolves the method, builds the matching solver,
//! and delegates the run to [`run_gradient`] or [`run_simplex`]. An L-BFGS
//! run that breaks down continues with steepest descent from its best
//! point. Under `Method::Auto` a gradient run that still fails is retried
//! once with Nelder–Mead from the same start and the better of the two
//! outcomes is returned.
use ndarray::Array2;

use crate::{
    models::Model,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            OptimOutcome, Theta,
            adapter::{ArgMinAdapter, EvalTracker},
            builders::{
                build_fletcher_reeves, build_optimizer_hager_zhang,
                build_optimizer_more_thuente, build_polak_ribiere, build_steepest_hager_zhang,
                build_steepest_more_thuente, with_convergence,
            },
            run::{run_gradient, run_simplex},
            traits::{LineSearcher, MLEOptions, Method},
            types::{HagerZhangLS, MoreThuenteLS},
        },
        penalty::{Boundary, Guarded},
    },
};

/// Maximize `ℓ(θ)` for `model` over `data`.
///
/// # Behavior
/// - `theta0 = None` starts from the zero vector.
/// - Validates the data via [`Model::check_data`] and the start's length
///   and finiteness.
/// - A start outside the domain is accepted only when the keep-away
///   penalty there is positive and finite, so the solver has a direction
///   back into the domain.
/// - `Auto` resolves to L-BFGS when the model has an analytic gradient and
///   to Nelder–Mead otherwise.
///
/// # Errors
/// - [`OptError::DimensionMismatch`], [`OptError::InvalidThetaInput`], and
///   data errors from `check_data`.
/// - [`OptError::EstimationFailure`] when the start offers no descent
///   direction or no finite cost was ever evaluated.
/// - Configuration errors from the solver builders.
///
/// Numeric breakdowns during a run are not errors: they come back as an
/// outcome with `Termination::Failed` at the best point seen.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_mle::models::Exponential;
/// use rust_mle::optimization::loglik_optimizer::{MLEOptions, maximize};
///
/// let data = array![[0.4, 1.3, 0.2, 0.9]];
/// let out = maximize(&Exponential, Some(array![1.0]), &data, &MLEOptions::default())?;
/// println!("mu = {}, ell = {}", out.theta_hat[0], out.value);
/// # Ok::<(), rust_mle::optimization::errors::OptError>(())
/// ```
pub fn maximize<M: Model + ?Sized>(
    model: &M, theta0: Option<Theta>, data: &Array2<f64>, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    let theta0 = theta0.unwrap_or_else(|| Theta::zeros(model.parameter_count()));
    model.check_data(data)?;
    let guarded = Guarded::new(model, data);
    check_start(&guarded, &theta0)?;

    let method = opts.method.resolve(model.capabilities().gradient);
    log::debug!(
        "{}: {} parameters, {} x {} data, method {method}",
        model.name(),
        theta0.len(),
        data.nrows(),
        data.ncols()
    );
    let first = run_method(&guarded, theta0.clone(), opts, method);
    if opts.method != Method::Auto || !method.uses_gradient() {
        return first;
    }
    match first {
        Ok(out) if !out.termination.is_failure() => Ok(out),
        Err(e) if e.is_input_error() => Err(e),
        first => {
            log::warn!("{method} failed for {}; retrying with {}", model.name(), Method::NelderMead);
            let retry = run_method(&guarded, theta0, opts, Method::NelderMead);
            better(first, retry)
        }
    }
}

/// Reject starts that leave the solver nowhere to go.
fn check_start<M: Model + ?Sized>(guarded: &Guarded<'_, M>, theta0: &Theta) -> OptResult<()> {
    let Boundary::Outside { rescue, .. } = guarded.boundary(theta0)? else {
        return Ok(());
    };
    let base = match guarded.rescue_base(&rescue) {
        Ok(base) => base,
        Err(OptError::NonFiniteCost { value }) => {
            return Err(OptError::EstimationFailure {
                reason: format!("start {theta0} is out of domain and the rescue cost is {value}"),
            });
        }
        Err(e) => return Err(e),
    };
    if base == 0.0 {
        return Err(OptError::EstimationFailure {
            reason: format!("start {theta0} is out of domain and the penalty is flat"),
        });
    }
    Ok(())
}

/// Build and run the solver for `method` with a fresh evaluation tracker.
fn run_method<M: Model + ?Sized>(
    guarded: &Guarded<'_, M>, theta0: Theta, opts: &MLEOptions, method: Method,
) -> OptResult<OptimOutcome> {
    let tracker = EvalTracker::new();
    let problem = ArgMinAdapter::new(guarded, &tracker);
    match (method, opts.line_searcher) {
        (Method::Auto, _) => {
            let resolved = method.resolve(guarded.model().capabilities().gradient);
            run_method(guarded, theta0, opts, resolved)
        }
        (Method::Lbfgs, _) => run_lbfgs(guarded, theta0, opts, problem),
        (Method::SteepestDescent, LineSearcher::MoreThuente) => {
            let solver = with_convergence(build_steepest_more_thuente(), opts);
            run_gradient(theta0, opts, problem, method, solver)
        }
        (Method::SteepestDescent, LineSearcher::HagerZhang) => {
            let solver = with_convergence(build_steepest_hager_zhang(), opts);
            run_gradient(theta0, opts, problem, method, solver)
        }
        (Method::ConjugateFletcherReeves, LineSearcher::MoreThuente) => {
            let solver = with_convergence(build_fletcher_reeves(MoreThuenteLS::new()), opts);
            run_gradient(theta0, opts, problem, method, solver)
        }
        (Method::ConjugateFletcherReeves, LineSearcher::HagerZhang) => {
            let solver = with_convergence(build_fletcher_reeves(HagerZhangLS::new()), opts);
            run_gradient(theta0, opts, problem, method, solver)
        }
        (Method::ConjugatePolakRibiere, LineSearcher::MoreThuente) => {
            let solver = with_convergence(build_polak_ribiere(MoreThuenteLS::new()), opts);
            run_gradient(theta0, opts, problem, method, solver)
        }
        (Method::ConjugatePolakRibiere, LineSearcher::HagerZhang) => {
            let solver = with_convergence(build_polak_ribiere(HagerZhangLS::new()), opts);
            run_gradient(theta0, opts, problem, method, solver)
        }
        (Method::NelderMead, _) => run_simplex(theta0, opts, problem),
    }
}

/// L-BFGS, continued with steepest descent when it breaks down.
///
/// Where the cost is concave the newest curvature pair has `sᵀy < 0`, the
/// two-loop recursion points uphill and the line search rejects it.
/// Steepest descent needs no curvature information, so it resumes from
/// the best point L-BFGS reached with the same line search. The
/// continuation replaces the first outcome only when it converges or
/// improves the log-likelihood; iterations and evaluation counts add up.
fn run_lbfgs<'a, M: Model + ?Sized>(
    guarded: &'a Guarded<'a, M>, theta0: Theta, opts: &MLEOptions,
    problem: ArgMinAdapter<'a, M>,
) -> OptResult<OptimOutcome> {
    let first = match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = with_convergence(build_optimizer_more_thuente(opts)?, opts);
            run_gradient(theta0, opts, problem, Method::Lbfgs, solver)?
        }
        LineSearcher::HagerZhang => {
            let solver = with_convergence(build_optimizer_hager_zhang(opts)?, opts);
            run_gradient(theta0, opts, problem, Method::Lbfgs, solver)?
        }
    };
    if !first.termination.is_failure() {
        return Ok(first);
    }
    log::warn!(
        "{} stopped at {} ({}); continuing with {}",
        Method::Lbfgs,
        first.theta_hat,
        first.status,
        Method::SteepestDescent
    );
    let tracker = EvalTracker::new();
    let problem = ArgMinAdapter::new(guarded, &tracker);
    let start = first.theta_hat.clone();
    let method = Method::SteepestDescent;
    let restart = match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = with_convergence(build_steepest_more_thuente(), opts);
            run_gradient(start, opts, problem, method, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = with_convergence(build_steepest_hager_zhang(), opts);
            run_gradient(start, opts, problem, method, solver)
        }
    };
    match restart {
        Ok(mut second) if !second.termination.is_failure() || second.value > first.value => {
            second.iterations += first.iterations;
            for (name, count) in first.fn_evals {
                *second.fn_evals.entry(name).or_insert(0) += count;
            }
            Ok(second)
        }
        Ok(_) => Ok(first),
        Err(e) if e.is_input_error() => Err(e),
        Err(e) => {
            log::debug!("steepest descent continuation failed: {e}");
            Ok(first)
        }
    }
}

/// Higher log-likelihood wins; an outcome beats an error.
fn better(
    first: OptResult<OptimOutcome>, retry: OptResult<OptimOutcome>,
) -> OptResult<OptimOutcome> {
    match (first, retry) {
        (Ok(a), Ok(b)) => Ok(if b.value > a.value { b } else { a }),
        (Ok(a), Err(e)) => {
            log::debug!("fallback run failed: {e}");
            Ok(a)
        }
        (Err(_), Ok(b)) => Ok(b),
        (Err(e), Err(_)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{Capabilities, Exponential, LowerBound, Zipf},
        optimization::{
            errors::OptResult,
            loglik_optimizer::{Grad, Tolerances, traits::Termination},
        },
    };
    use ndarray::array;

    const POSITIVE: [LowerBound; 1] = [LowerBound::strict(0, 0.0)];

    /// `c(θ) = (θ − 2)²`, claiming an analytic gradient that is never finite.
    struct BrokenGradient;

    impl Model for BrokenGradient {
        fn name(&self) -> &str {
            "BrokenGradient"
        }
        fn parameter_count(&self) -> usize {
            1
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities { gradient: true, fused: false, draw: false }
        }
        fn check_data(&self, _data: &Array2<f64>) -> OptResult<()> {
            Ok(())
        }
        fn neg_log_likelihood(&self, beta: &Theta, _data: &Array2<f64>) -> OptResult<f64> {
            Ok((beta[0] - 2.0).powi(2))
        }
        fn neg_gradient(&self, _beta: &Theta, _data: &Array2<f64>) -> OptResult<Grad> {
            Ok(array![f64::NAN])
        }
    }

    /// Identically zero cost on `θ > 0`.
    struct Flat;

    impl Model for Flat {
        fn name(&self) -> &str {
            "Flat"
        }
        fn parameter_count(&self) -> usize {
            1
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities { gradient: false, fused: false, draw: false }
        }
        fn lower_bounds(&self) -> &[LowerBound] {
            &POSITIVE
        }
        fn check_data(&self, _data: &Array2<f64>) -> OptResult<()> {
            Ok(())
        }
        fn neg_log_likelihood(&self, _beta: &Theta, _data: &Array2<f64>) -> OptResult<f64> {
            Ok(0.0)
        }
    }

    /// `c(θ) = (θ − 2)²` whose gradient turns NaN once `θ ≥ 1.5`.
    struct GradientBreaksMidRun;

    impl Model for GradientBreaksMidRun {
        fn name(&self) -> &str {
            "GradientBreaksMidRun"
        }
        fn parameter_count(&self) -> usize {
            1
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities { gradient: true, fused: false, draw: false }
        }
        fn check_data(&self, _data: &Array2<f64>) -> OptResult<()> {
            Ok(())
        }
        fn neg_log_likelihood(&self, beta: &Theta, _data: &Array2<f64>) -> OptResult<f64> {
            Ok((beta[0] - 2.0).powi(2))
        }
        fn neg_gradient(&self, beta: &Theta, _data: &Array2<f64>) -> OptResult<Grad> {
            if beta[0] < 1.5 { Ok(array![2.0 * (beta[0] - 2.0)]) } else { Ok(array![f64::NAN]) }
        }
    }

    fn dummy() -> Array2<f64> {
        array![[1.0]]
    }

    /// Six exponential observations with mean 2/3. The cost
    /// `6·ln μ + 4/μ` is concave for `μ > 4/3`.
    fn concave_tail_data() -> Array2<f64> {
        array![[0.2, 0.5, 0.7, 0.9, 1.0, 0.7]]
    }

    #[test]
    // Purpose
    // -------
    // The default start is the zero vector; for a positive scale that is
    // out of domain, so the guard must steer the run back in.
    //
    // Given
    // -----
    // - Exponential data with mean 0.75, `theta0 = None`.
    //
    // Expect
    // ------
    // - Converges to μ̂ ≈ 0.75 with L-BFGS.
    fn default_start_is_zero_and_is_rescued() {
        let data = array![[0.5, 1.0, 0.25, 1.25]];

        let out = maximize(&Exponential, None, &data, &MLEOptions::default()).unwrap();

        assert_eq!(out.method, Method::Lbfgs);
        assert!((out.theta_hat[0] - 0.75).abs() < 1e-3, "theta_hat = {}", out.theta_hat);
    }

    #[test]
    fn wrong_start_length_is_a_dimension_mismatch() {
        let data = array![[0.5, 1.0]];

        let err = maximize(&Exponential, Some(array![1.0, 1.0]), &data, &MLEOptions::default())
            .unwrap_err();

        assert_eq!(err, OptError::DimensionMismatch { expected: 1, found: 2 });
    }

    #[test]
    fn non_finite_start_is_rejected() {
        let data = array![[0.5, 1.0]];

        let err =
            maximize(&Exponential, Some(array![f64::NAN]), &data, &MLEOptions::default())
                .unwrap_err();

        assert!(matches!(err, OptError::InvalidThetaInput { index: 0, .. }));
    }

    #[test]
    // Purpose
    // -------
    // A start outside the domain of a flat likelihood has a zero penalty
    // base and hence no descent direction.
    fn flat_penalty_start_is_an_estimation_failure() {
        let err = maximize(&Flat, Some(array![-1.0]), &dummy(), &MLEOptions::default())
            .unwrap_err();

        assert!(matches!(err, OptError::EstimationFailure { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Under Auto, a gradient run that breaks down is retried once with
    // Nelder–Mead and the better outcome wins.
    //
    // Given
    // -----
    // - A quadratic cost whose advertised gradient is always NaN.
    //
    // Expect
    // ------
    // - The returned outcome comes from Nelder–Mead and sits near θ = 2.
    fn auto_falls_back_to_simplex_after_gradient_failure() {
        let opts = MLEOptions::default().with_step_size(0.5).unwrap();

        let out = maximize(&BrokenGradient, Some(array![0.0]), &dummy(), &opts).unwrap();

        assert_eq!(out.method, Method::NelderMead);
        assert!((out.theta_hat[0] - 2.0).abs() < 1e-3, "theta_hat = {}", out.theta_hat);
    }

    #[test]
    fn explicit_method_never_falls_back() {
        let opts = MLEOptions { method: Method::Lbfgs, ..MLEOptions::default() };

        let out = maximize(&BrokenGradient, Some(array![0.0]), &dummy(), &opts).unwrap();

        assert_eq!(out.method, Method::Lbfgs);
        assert!(out.termination.is_failure());
        assert!(!out.converged);
        assert_eq!(out.theta_hat, array![0.0]);
        assert_eq!(out.value, -4.0);
    }

    #[test]
    // Purpose
    // -------
    // Every gradient method and line search reaches the Exponential MLE,
    // including on a model without an analytic gradient (finite
    // differences).
    fn every_gradient_method_and_line_search_converges() {
        let data = array![[0.5, 1.0, 0.25, 1.25]];
        let zipf_data = array![[120.0, 30.0, 13.0, 8.0, 5.0, 3.0]];
        let tols = Tolerances::new(Some(1e-6), Some(1e-10), Some(2000)).unwrap();
        let methods = [
            Method::Lbfgs,
            Method::SteepestDescent,
            Method::ConjugateFletcherReeves,
            Method::ConjugatePolakRibiere,
        ];
        let reference = maximize(&Zipf, Some(array![2.0]), &zipf_data, &MLEOptions::default())
            .unwrap()
            .theta_hat[0];
        for method in methods {
            for line_searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
                let opts = MLEOptions::new(tols, method, line_searcher, None).unwrap();

                let out = maximize(&Exponential, Some(array![1.0]), &data, &opts).unwrap();
                assert_ne!(out.termination, Termination::IterationLimit, "{method}/{line_searcher:?}");
                assert!(
                    (out.theta_hat[0] - 0.75).abs() < 1e-3,
                    "{method}/{line_searcher:?}: {}",
                    out.theta_hat
                );

                let fd = maximize(&Zipf, Some(array![2.0]), &zipf_data, &opts).unwrap();
                assert!(
                    (fd.theta_hat[0] - reference).abs() < 1e-2,
                    "{method}/{line_searcher:?} on Zipf: {} vs {reference}",
                    fd.theta_hat
                );
            }
        }
    }

    #[test]
    fn better_prefers_higher_likelihood_and_outcomes_over_errors() {
        let make = |value: f64, method: Method| {
            OptimOutcome::new(
                Some(array![0.0]),
                value,
                Termination::Converged,
                method,
                1,
                Default::default(),
                None,
            )
        };

        let picked = better(make(-3.0, Method::Lbfgs), make(-1.0, Method::NelderMead)).unwrap();
        assert_eq!(picked.method, Method::NelderMead);
        let kept = better(make(-3.0, Method::Lbfgs), Err(OptError::UnknownError)).unwrap();
        assert_eq!(kept.method, Method::Lbfgs);
    }

    #[test]
    // Purpose
    // -------
    // L-BFGS started where the cost is concave must not stop at the point
    // where its curvature pair went negative.
    //
    // Given
    // -----
    // - Six observations with mean 2/3; start μ₀ = 3, inside the concave
    //   region `μ > 4/3`; explicit L-BFGS.
    //
    // Expect
    // ------
    // - A non-failed outcome at μ̂ = 2/3.
    fn lbfgs_from_the_concave_region_reaches_the_estimate() {
        let data = concave_tail_data();
        let opts = MLEOptions { method: Method::Lbfgs, ..MLEOptions::default() };

        let out = maximize(&Exponential, Some(array![3.0]), &data, &opts).unwrap();

        assert!(!out.termination.is_failure(), "status: {}", out.status);
        assert!((out.theta_hat[0] - 2.0 / 3.0).abs() < 1e-4, "theta_hat = {}", out.theta_hat);
    }

    #[test]
    fn auto_recovers_from_a_concave_start() {
        let data = concave_tail_data();

        let out =
            maximize(&Exponential, Some(array![3.0]), &data, &MLEOptions::default()).unwrap();

        assert!(out.converged, "status: {}", out.status);
        assert!((out.theta_hat[0] - 2.0 / 3.0).abs() < 1e-4, "theta_hat = {}", out.theta_hat);
    }

    #[test]
    // Purpose
    // -------
    // A method that lands exactly on the optimum has a zero gradient; the
    // next line search would reject the zero direction. That must read as
    // convergence even with no gradient tolerance configured.
    //
    // Given
    // -----
    // - `tol_grad = None`, `tol_cost = 1e-3`, patience 25; start μ₀ = 1.
    // - Steepest descent and Polak–Ribière.
    //
    // Expect
    // ------
    // - Converged at μ̂ = 2/3 after at least one iteration.
    fn exact_optimum_without_gradient_tolerance_is_convergence() {
        let data = concave_tail_data();
        let tols = Tolerances::new(None, Some(1e-3), Some(500)).unwrap();
        for method in [Method::SteepestDescent, Method::ConjugatePolakRibiere] {
            let opts = MLEOptions::new(tols, method, LineSearcher::MoreThuente, None)
                .unwrap()
                .with_patience(25)
                .unwrap();

            let out = maximize(&Exponential, Some(array![1.0]), &data, &opts).unwrap();

            assert!(out.converged, "{method}: {}", out.status);
            assert!(out.iterations > 0, "{method}");
            assert!((out.theta_hat[0] - 2.0 / 3.0).abs() < 1e-4, "{method}: {}", out.theta_hat);
        }
    }

    #[test]
    // Purpose
    // -------
    // Under L-BFGS the loose relative cost tolerance must wait for its
    // patience instead of stopping on the first small absolute change.
    //
    // Given
    // -----
    // - `tol_grad = None`, `tol_cost = 1e-3`, patience 25; start μ₀ = 1.
    //
    // Expect
    // ------
    // - Converged with μ̂ accurate far beyond what a 1e-3 cost change
    //   allows, and a near-zero gradient.
    fn lbfgs_honors_patience() {
        let data = concave_tail_data();
        let tols = Tolerances::new(None, Some(1e-3), Some(500)).unwrap();
        let opts = MLEOptions::new(tols, Method::Lbfgs, LineSearcher::MoreThuente, None)
            .unwrap()
            .with_patience(25)
            .unwrap();

        let out = maximize(&Exponential, Some(array![1.0]), &data, &opts).unwrap();

        assert!(out.converged, "status: {}", out.status);
        assert!((out.theta_hat[0] - 2.0 / 3.0).abs() < 1e-6, "theta_hat = {}", out.theta_hat);
        assert!(out.grad_norm.is_some_and(|g| g < 1e-5), "grad_norm = {:?}", out.grad_norm);
    }

    #[test]
    // Purpose
    // -------
    // A step that breaks down mid-run is reported as a failed outcome that
    // keeps the iteration count and the best point seen.
    //
    // Given
    // -----
    // - A quadratic whose gradient is NaN from θ = 1.5 on; steepest
    //   descent from θ = 0. The optimum θ = 2 cannot be reached without
    //   evaluating the gradient past 1.5.
    //
    // Expect
    // ------
    // - `Failed` after at least one iteration, at a point no worse than the
    //   start (ℓ(0) = −4).
    fn failed_step_keeps_iteration_count() {
        let opts = MLEOptions { method: Method::SteepestDescent, ..MLEOptions::default() };

        let out = maximize(&GradientBreaksMidRun, Some(array![0.0]), &dummy(), &opts).unwrap();

        assert!(out.termination.is_failure(), "status: {}", out.status);
        assert!(out.iterations >= 1);
        assert_eq!(out.method, Method::SteepestDescent);
        assert!(out.value >= -4.0, "value = {}", out.value);
    }
}
