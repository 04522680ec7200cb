//! special — special functions used by the likelihood models.
//!
//! Log-gamma, digamma, and the error function come from `statrs`; this
//! module adds the pieces `statrs` does not provide in the needed form:
//! a Riemann zeta for real `s > 1`, the scaled complementary error function
//! `erfcx`, and the normal log-CDF and inverse Mills ratio built on it.

pub mod normal;
pub mod zeta;

pub use self::normal::{erfcx, inverse_mills, ln_norm_cdf, ln_norm_pdf};
pub use self::zeta::zeta;
pub use statrs::function::gamma::{digamma, ln_gamma};
