//! Configuration and result types for log-likelihood maximization.
//!
//! - [`Method`]: which optimization strategy to run (or `Auto`).
//! - [`LineSearcher`]: line search used by the gradient-based methods.
//! - [`MLEOptions`] and [`Tolerances`]: validated optimizer configuration.
//! - [`Termination`] and [`OptimOutcome`]: normalized result returned by
//!   the high-level `maximize` API.
//!
//! Convention: we *maximize* a model's log-likelihood `ℓ(θ)` by minimizing
//! the cost `c(θ) = -ℓ(θ)`. Models already return the cost orientation; the
//! outcome reports `ℓ` again.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        FnEvalMap, Grad, Theta,
        validation::{
            validate_theta_hat, validate_value, verify_lbfgs_mem, verify_patience,
            verify_step_size, verify_tol_cost, verify_tol_grad,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::{fmt, str::FromStr};

/// Optimization strategy.
///
/// Variants:
/// - `Auto`: L-BFGS when the model has an analytic gradient, Nelder–Mead
///   otherwise; a failed gradient run is retried once with Nelder–Mead.
/// - `Lbfgs`: limited-memory variable-metric quasi-Newton.
/// - `SteepestDescent`: gradient descent with a line search.
/// - `ConjugateFletcherReeves` / `ConjugatePolakRibiere`: nonlinear
///   conjugate gradient with the named beta update.
/// - `NelderMead`: derivative-free simplex.
///
/// Explicit gradient methods on models without an analytic gradient use
/// finite-difference gradients.
///
/// Parsing:
/// `FromStr` is case-insensitive and ignores `-`, `_`, and spaces, so
/// `"L-BFGS"`, `"nelder_mead"`, and `"PolakRibiere"` all parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Auto,
    Lbfgs,
    SteepestDescent,
    ConjugateFletcherReeves,
    ConjugatePolakRibiere,
    NelderMead,
}

impl Method {
    /// `true` for every method that consumes gradients.
    pub fn uses_gradient(self) -> bool {
        !matches!(self, Method::NelderMead | Method::Auto)
    }

    /// Resolve `Auto` against a model's gradient availability; other
    /// methods are returned unchanged.
    pub fn resolve(self, has_gradient: bool) -> Method {
        match self {
            Method::Auto if has_gradient => Method::Lbfgs,
            Method::Auto => Method::NelderMead,
            other => other,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Auto => "Auto",
            Method::Lbfgs => "L-BFGS",
            Method::SteepestDescent => "SteepestDescent",
            Method::ConjugateFletcherReeves => "ConjugateGradient(Fletcher-Reeves)",
            Method::ConjugatePolakRibiere => "ConjugateGradient(Polak-Ribiere)",
            Method::NelderMead => "NelderMead",
        };
        f.write_str(name)
    }
}

impl FromStr for Method {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "auto" => Ok(Method::Auto),
            "lbfgs" => Ok(Method::Lbfgs),
            "steepestdescent" | "gradientdescent" => Ok(Method::SteepestDescent),
            "conjugatefletcherreeves" | "fletcherreeves" => Ok(Method::ConjugateFletcherReeves),
            "conjugatepolakribiere" | "polakribiere" => Ok(Method::ConjugatePolakRibiere),
            "neldermead" | "simplex" => Ok(Method::NelderMead),
            _ => Err(OptError::InvalidMethod {
                name: s.to_string(),
                reason: "Valid options are 'Auto', 'LBFGS', 'SteepestDescent', \
                         'FletcherReeves', 'PolakRibiere', or 'NelderMead'.",
            }),
        }
    }
}

/// Choice of line search used by the gradient-based solvers.
///
/// Variants:
/// - `MoreThuente`: More–Thuente line search.
/// - `HagerZhang`: Hager–Zhang line search.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Parse a line-search choice from a string (case-insensitive).
    ///
    /// Any other value returns `OptError::InvalidLineSearch` with a helpful message.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `method: Method` — optimization strategy.
/// - `line_searcher: LineSearcher` — line search for gradient methods.
/// - `step_size: f64` — edge length of the initial Nelder–Mead simplex.
/// - `patience: usize` — consecutive small-change iterations required
///   before a gradient method is declared converged on the cost criterion.
/// - `lbfgs_mem: Option<usize>` — L-BFGS history; `None` uses
///   [`DEFAULT_LBFGS_MEM`](super::types::DEFAULT_LBFGS_MEM).
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = 1e-9`, `max_iter = 500`
/// - `method`: `Auto`, `line_searcher`: `MoreThuente`
/// - `step_size`: `1.0`, `patience`: `2`
/// - `lbfgs_mem`: `None`, `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub method: Method,
    pub line_searcher: LineSearcher,
    pub step_size: f64,
    pub patience: usize,
    pub lbfgs_mem: Option<usize>,
    pub verbose: bool,
}

impl MLEOptions {
    /// Create a new set of optimizer options with default step size,
    /// patience, and verbosity.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, method: Method, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        verify_lbfgs_mem(lbfgs_mem)?;
        Ok(Self { tols, method, line_searcher, lbfgs_mem, ..Self::default() })
    }

    /// Set the initial simplex edge length.
    ///
    /// # Errors
    /// [`OptError::InvalidStepSize`] unless `step` is finite and positive.
    pub fn with_step_size(mut self, step: f64) -> OptResult<Self> {
        verify_step_size(step)?;
        self.step_size = step;
        Ok(self)
    }

    /// Set the number of consecutive small-change iterations.
    ///
    /// # Errors
    /// [`OptError::InvalidPatience`] if `patience == 0`.
    pub fn with_patience(mut self, patience: usize) -> OptResult<Self> {
        verify_patience(patience)?;
        self.patience = patience;
        Ok(self)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-9), max_iter: Some(500) },
            method: Method::Auto,
            line_searcher: LineSearcher::MoreThuente,
            step_size: 1.0,
            patience: 2,
            lbfgs_mem: None,
            verbose: false,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: converge when the cost-gradient norm falls to this value.
/// - `tol_cost`: converge when the relative change in cost stays at or
///   below this value for `patience` iterations; for the simplex, the
///   standard deviation of vertex costs.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// How a run ended.
///
/// - `Converged`: a convergence criterion was met.
/// - `IterationLimit`: `max_iter` was reached first. Non-fatal; the best
///   point so far is reported.
/// - `Failed`: the backend broke down (line search failure, non-finite
///   objective). The outcome still carries the best finite point seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Converged,
    IterationLimit,
    Failed { reason: String },
}

impl Termination {
    /// Map an Argmin termination status into a [`Termination`].
    pub fn from_status(status: &TerminationStatus) -> Self {
        match status {
            TerminationStatus::NotTerminated => {
                Termination::Failed { reason: "Solver stopped without terminating".to_string() }
            }
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                Termination::IterationLimit
            }
            TerminationStatus::Terminated(
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached,
            ) => Termination::Converged,
            TerminationStatus::Terminated(TerminationReason::SolverExit(reason)) => {
                Termination::Failed { reason: reason.clone() }
            }
            TerminationStatus::Terminated(other) => {
                Termination::Failed { reason: format!("{other:?}") }
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Termination::Failed { .. })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => f.write_str("Converged"),
            Termination::IterationLimit => f.write_str("Iteration limit reached"),
            Termination::Failed { reason } => write!(f, "Failed: {reason}"),
        }
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `termination`: how the run ended; `converged` mirrors
///   `termination == Converged` and `status` is its display string.
/// - `method`: the method that produced this outcome (never `Auto`).
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - Keys follow argmin’s counters, e.g., cost_count, gradient_count, etc.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub termination: Termination,
    pub converged: bool,
    pub status: String,
    pub method: Method,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver results.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Derives `(converged, status)` from `termination`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: Termination, method: Method,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let converged = termination == Termination::Converged;
        let status = termination.to_string();
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            termination,
            converged,
            status,
            method,
            iterations,
            fn_evals,
            grad_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn method_parsing_is_forgiving_about_case_and_separators() {
        assert_eq!("L-BFGS".parse::<Method>().unwrap(), Method::Lbfgs);
        assert_eq!("nelder_mead".parse::<Method>().unwrap(), Method::NelderMead);
        assert_eq!("PolakRibiere".parse::<Method>().unwrap(), Method::ConjugatePolakRibiere);
        assert!(matches!("newton".parse::<Method>(), Err(OptError::InvalidMethod { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Auto resolves on gradient availability; explicit choices are kept.
    fn auto_resolves_on_gradient_availability() {
        assert_eq!(Method::Auto.resolve(true), Method::Lbfgs);
        assert_eq!(Method::Auto.resolve(false), Method::NelderMead);
        assert_eq!(Method::SteepestDescent.resolve(false), Method::SteepestDescent);
        assert!(!Method::NelderMead.uses_gradient());
        assert!(Method::ConjugateFletcherReeves.uses_gradient());
    }

    #[test]
    fn line_searcher_rejects_unknown_names() {
        assert_eq!("hagerzhang".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert!(matches!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    fn tolerances_validate_each_field() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, Some(f64::NAN), None),
            Err(OptError::InvalidTolCost { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
    }

    #[test]
    fn options_validate_step_size_patience_and_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).unwrap();

        assert!(matches!(
            MLEOptions::new(tols, Method::Auto, LineSearcher::MoreThuente, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
        assert!(matches!(
            MLEOptions::default().with_step_size(0.0),
            Err(OptError::InvalidStepSize { .. })
        ));
        assert!(matches!(
            MLEOptions::default().with_patience(0),
            Err(OptError::InvalidPatience { .. })
        ));
        let opts = MLEOptions::default().with_step_size(0.25).unwrap().with_patience(4).unwrap();
        assert_eq!((opts.step_size, opts.patience), (0.25, 4));
    }

    #[test]
    fn defaults_match_documented_values() {
        let opts = MLEOptions::default();

        assert_eq!(opts.tols.tol_grad, Some(1e-6));
        assert_eq!(opts.tols.tol_cost, Some(1e-9));
        assert_eq!(opts.tols.max_iter, Some(500));
        assert_eq!(opts.method, Method::Auto);
        assert_eq!(opts.patience, 2);
    }

    #[test]
    fn termination_maps_argmin_status() {
        let max_iter = TerminationStatus::Terminated(TerminationReason::MaxItersReached);
        let converged = TerminationStatus::Terminated(TerminationReason::SolverConverged);

        assert_eq!(Termination::from_status(&max_iter), Termination::IterationLimit);
        assert_eq!(Termination::from_status(&converged), Termination::Converged);
        assert!(Termination::from_status(&TerminationStatus::NotTerminated).is_failure());
    }

    #[test]
    // Purpose
    // -------
    // Outcome construction validates its inputs and derives its flags.
    fn outcome_new_validates_and_derives_flags() {
        let ok = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.5,
            Termination::Converged,
            Method::Lbfgs,
            12,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();

        assert!(ok.converged);
        assert_eq!(ok.status, "Converged");
        assert_eq!(ok.grad_norm, Some(5.0));
        assert_eq!(
            OptimOutcome::new(
                None,
                0.0,
                Termination::Converged,
                Method::Lbfgs,
                0,
                FnEvalMap::new(),
                None
            ),
            Err(OptError::MissingThetaHat)
        );
    }
}
