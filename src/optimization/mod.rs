//! optimization — MLE driver, boundary penalty, and unified error surface.
//!
//! Purpose
//! -------
//! Fit parametric models by maximizing their log-likelihood. Callers hand a
//! [`Model`](crate::models::Model), a data matrix, and options to
//! [`loglik_optimizer::maximize`] and get back fitted parameters and
//! diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: method selection, solver construction, execution,
//!   and outcome normalization on top of `argmin`.
//! - `penalty`: the keep-away guard that turns out-of-domain parameters
//!   into finite, steeply rising costs so unconstrained solvers can be used
//!   on bounded parameter spaces.
//! - `errors`: configuration issues, numerical failures, and backend solver
//!   errors normalized into [`errors::OptError`] with the alias
//!   [`errors::OptResult`].
//!
//! Conventions
//! -----------
//! - All solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; the reported
//!   value is `ℓ` again.
//! - Input errors are returned as `Err`; numeric breakdowns inside a run are
//!   reported as a failed outcome at the best point seen.

pub mod errors;
pub mod loglik_optimizer;
pub mod penalty;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::penalty::Guarded;
}
