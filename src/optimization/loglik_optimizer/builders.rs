//! loglik_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for every solver the MLE driver can run.
//! These helpers hide Argmin’s generic wiring and apply crate-level options
//! (tolerances, L-BFGS memory, simplex step) so that higher-level code can
//! request a configured solver without touching Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - L-BFGS, steepest descent, and nonlinear conjugate gradient, each with
//!   either Hager–Zhang or More–Thuente line search. L-BFGS receives only
//!   the gradient tolerance; cost stopping belongs to [`Convergence`].
//! - Nelder–Mead over the simplex `θ₀, θ₀ + s·e₁, …, θ₀ + s·eₙ` with the
//!   cost tolerance applied as the vertex-cost standard deviation bound.
//! - [`with_convergence`] wraps any gradient solver in the shared
//!   relative-cost / gradient-norm stopping rule.
//!
//! Invariants & assumptions
//! ------------------------
//! - All solvers operate on the canonical optimizer numeric types
//!   [`Theta`], [`Grad`], and [`Cost`].
//! - The L-BFGS memory (`m`) is either provided via `opts.lbfgs_mem` or
//!   defaults to [`DEFAULT_LBFGS_MEM`].
//! - Any invalid tolerance passed into Argmin is surfaced as an
//!   [`OptError`](crate::optimization::errors::OptError) via the crate’s
//!   `From<Error>` implementation.
//!
//! Conventions
//! -----------
//! - Gradient builders do **not** set an initial parameter vector or
//!   `max_iters`; the runner applies both. The simplex builder is the
//!   exception, since Argmin’s Nelder–Mead takes its vertices up front.
//! - Conjugate-gradient solvers restart every [`CG_RESTART_ITERS`]
//!   iterations or when successive gradients lose orthogonality beyond
//!   [`CG_RESTART_ORTHOGONALITY`].
use argmin::solver::{
    conjugategradient::beta::{FletcherReeves, PolakRibiere},
    quasinewton::LBFGS,
};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        convergence::Convergence,
        traits::MLEOptions,
        types::{
            ConjugateGradient, Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang,
            LbfgsMoreThuente, MoreThuenteLS, Simplex, SteepestHagerZhang, SteepestMoreThuente,
            Theta,
        },
    },
};

/// Iterations between forced conjugate-gradient restarts.
pub const CG_RESTART_ITERS: u64 = 10;

/// Powell restart threshold `|gₖ₊₁·gₖ| / ‖gₖ₊₁‖² ≥ ν`.
pub const CG_RESTART_ORTHOGONALITY: f64 = 0.1;

/// Construct L-BFGS with Hager–Zhang line search.
///
/// Consults `opts.lbfgs_mem` (falling back to [`DEFAULT_LBFGS_MEM`]) and
/// the optional gradient tolerance.
///
/// # Errors
/// Returns an `OptError` when Argmin rejects the gradient tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with More–Thuente line search.
///
/// # Errors
/// Returns an `OptError` when Argmin rejects the gradient tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply the optional gradient tolerance to an L-BFGS solver.
///
/// Only the gradient tolerance is forwarded. Argmin’s own cost test is
/// absolute and fires on the first small step, ahead of the patience
/// rule; cost-based stopping is left to [`Convergence`].
///
/// # Errors
/// Returns an `OptError` when `with_tolerance_grad` rejects the value.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    Ok(solver)
}

/// Steepest descent with Hager–Zhang line search.
pub fn build_steepest_hager_zhang() -> SteepestHagerZhang {
    SteepestHagerZhang::new(HagerZhangLS::new())
}

/// Steepest descent with More–Thuente line search.
pub fn build_steepest_more_thuente() -> SteepestMoreThuente {
    SteepestMoreThuente::new(MoreThuenteLS::new())
}

/// Nonlinear conjugate gradient with the Fletcher–Reeves update.
pub fn build_fletcher_reeves<L>(linesearch: L) -> ConjugateGradient<L, FletcherReeves> {
    configure_conjugate(ConjugateGradient::new(linesearch, FletcherReeves::new()))
}

/// Nonlinear conjugate gradient with the Polak–Ribière update.
pub fn build_polak_ribiere<L>(linesearch: L) -> ConjugateGradient<L, PolakRibiere> {
    configure_conjugate(ConjugateGradient::new(linesearch, PolakRibiere::new()))
}

fn configure_conjugate<L, B>(solver: ConjugateGradient<L, B>) -> ConjugateGradient<L, B> {
    solver.restart_iters(CG_RESTART_ITERS).restart_orthogonality(CG_RESTART_ORTHOGONALITY)
}

/// Initial simplex: `θ₀` plus one vertex per axis offset by `step`.
pub fn simplex_vertices(theta0: &Theta, step: f64) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut v = theta0.clone();
        v[i] += step;
        vertices.push(v);
    }
    vertices
}

/// Construct Nelder–Mead over prepared vertices.
///
/// `opts.tols.tol_cost`, when present, bounds the standard deviation of
/// the vertex costs; otherwise Argmin’s default (`EPSILON`) applies.
///
/// # Errors
/// Returns an `OptError` when Argmin rejects the tolerance.
pub fn build_nelder_mead(vertices: Vec<Theta>, opts: &MLEOptions) -> OptResult<Simplex> {
    let mut solver = Simplex::new(vertices);
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_sd_tolerance(c)?;
    }
    Ok(solver)
}

/// Wrap a gradient solver in the relative-cost / gradient-norm stopping rule.
pub fn with_convergence<S>(solver: S, opts: &MLEOptions) -> Convergence<S> {
    Convergence::new(solver, opts.tols.tol_cost, opts.tols.tol_grad, opts.patience)
}
