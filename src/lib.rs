//! rust_mle — maximum-likelihood estimation with boundary-guarded objectives.
//!
//! Purpose
//! -------
//! Serve as the crate root for fitting parametric models by maximum
//! likelihood. A model supplies its negated log-likelihood (and optionally
//! its gradient, a fused value+gradient evaluator, and a random draw); the
//! optimizer maximizes it with an `argmin` solver while a keep-away penalty
//! keeps unconstrained solvers out of the model's invalid parameter region.
//!
//! Key behaviors
//! -------------
//! - `models`: the [`Model`](models::Model) contract and built-in families
//!   (Gamma, Exponential, Probit, Waring, Yule, Zipf).
//! - `optimization`: the MLE driver ([`maximize`](optimization::loglik_optimizer::maximize)),
//!   the boundary penalty, and the crate-wide error surface.
//! - `inference`: observed-information covariance and standard errors at a
//!   fitted point.
//! - `linalg`: determinant / inverse, principal components, stacking, and
//!   typed dot-product dispatch over `ndarray` storage.
//! - `special`: special functions the likelihoods need (ln Γ, ψ, ζ, normal
//!   log-CDF and Mills ratio).
//!
//! Invariants & assumptions
//! ------------------------
//! - Data is a dense `Array2<f64>`; each model documents how it reads rows
//!   and columns.
//! - Nothing in non-test code panics on bad input; every failure is a
//!   typed error.
//!
//! Conventions
//! -----------
//! - Models return the **cost** orientation (`−ℓ`, `−∇ℓ`); outcomes report
//!   `ℓ`.
//! - The library logs through the `log` facade and installs no logger.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code they cover.
//! - End-to-end fits on simulated samples live in `tests/`.

pub mod inference;
pub mod linalg;
pub mod models;
pub mod optimization;
pub mod special;
