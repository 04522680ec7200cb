//! loglik_optimizer — argmin-powered maximum-likelihood driver.
//!
//! Purpose
//! -------
//! Maximize a [`Model`](crate::models::Model)'s log-likelihood `ℓ(θ)` over
//! a data matrix. Callers pick a [`Method`] (or leave it on `Auto`) and
//! invoke [`maximize`]; the driver handles domain guarding, solver
//! construction, convergence, and failure reporting.
//!
//! Key behaviors
//! -------------
//! - Models are evaluated through a boundary
//!   [`Guarded`](crate::optimization::penalty::Guarded) session and bridged
//!   to Argmin by [`adapter::ArgMinAdapter`], which adds finite-difference
//!   gradients, fused-gradient reuse, and best-so-far tracking.
//! - [`builders`] constructs L-BFGS, steepest descent, nonlinear conjugate
//!   gradient (Fletcher–Reeves / Polak–Ribière), and Nelder–Mead solvers;
//!   gradient solvers are wrapped in [`convergence::Convergence`].
//! - [`run`] executes a solver and normalizes the result into an
//!   [`OptimOutcome`], turning numeric breakdowns into a `Failed`
//!   termination at the best point seen.
//! - [`finite_diff`] and [`validation`] provide derivative fallbacks and
//!   shared checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** `ℓ(θ)` by minimizing the cost
//!   `c(θ) = -ℓ(θ)`. Models return the cost orientation directly; only the
//!   outcome flips it back.
//! - Vectors and matrices use the canonical aliases [`Theta`], [`Grad`],
//!   [`types::Hessian`].
//! - Configuration types ([`Tolerances`], [`MLEOptions`]) are validated on
//!   construction.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover cost orientation and gradient sources
//!   in [`adapter`], solver wiring in [`builders`], stopping rules in
//!   [`convergence`], runners and failure mapping in [`run`], and method
//!   selection and fallback in [`api`].
//! - End-to-end fits on simulated data live in `tests/`.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod convergence;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, MLEOptions, Method, OptimOutcome, Termination, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_mle::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, MLEOptions, Method, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
