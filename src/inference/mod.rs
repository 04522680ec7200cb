//! inference — uncertainty quantification for fitted models.
//!
//! [`hessian::calc_covariance`] builds the observed information at an MLE
//! from the same guarded gradients the optimizer used, and returns the
//! eigen pseudo-inverse covariance together with standard errors.

pub mod hessian;

pub use self::hessian::{Covariance, EIGEN_EPS, calc_covariance};
