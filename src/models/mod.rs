//! models — parametric likelihood families and their shared contract.
//!
//! Purpose
//! -------
//! Describe a parametric family once, as a [`Model`]: a name, a parameter
//! count, the negated log-likelihood, and the optional roles (analytic
//! gradient, fused value+gradient, random draw) the optimizer can exploit.
//! Six families ship with the crate: [`Gamma`], [`Probit`], [`Waring`],
//! [`Yule`], [`Zipf`], and [`Exponential`].
//!
//! Key behaviors
//! -------------
//! - Every likelihood role returns the **negated** log-likelihood (or its
//!   gradient), i.e. a cost to minimize. The driver flips the sign back when
//!   reporting.
//! - Each model declares its domain through [`Model::lower_bounds`]. Raw
//!   evaluation outside that domain fails with [`OptError::DomainViolation`];
//!   the penalty layer intercepts out-of-domain points before they reach the
//!   model.
//! - [`Model::capabilities`] advertises which optional roles are present so
//!   method selection does not have to find out by calling.
//!
//! Invariants & assumptions
//! ------------------------
//! - `beta.len() == parameter_count()` for every likelihood call; anything
//!   else is [`OptError::DimensionMismatch`]. Parameters are never truncated
//!   or padded.
//! - Built-in models are immutable plain values. None of them keeps state
//!   between calls, so repeated evaluation at the same point is
//!   bit-identical.
//!
//! Conventions
//! -----------
//! - Data is an `ndarray::Array2<f64>`. Layout is model-specific (see each
//!   model's docs): observation cells, rank-count tables, or an outcome
//!   column followed by covariates.
//! - Rank-count layout: column `j` holds the counts of rank `r = j + 1`;
//!   rows are pooled.
//!
//! Testing notes
//! -------------
//! - Each model module checks its analytic gradient against central finite
//!   differences of its value and exercises its draw.
//! - `likelihood_vector` is checked against the summed likelihood here.
use ndarray::{Array1, Array2, s};
use rand::RngCore;

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::{Grad, Theta},
};

pub mod exponential;
pub mod gamma;
pub mod probit;
pub mod waring;
pub mod yule;
pub mod zipf;

pub use self::exponential::Exponential;
pub use self::gamma::Gamma;
pub use self::probit::Probit;
pub use self::waring::Waring;
pub use self::yule::Yule;
pub use self::zipf::Zipf;

/// A declared lower limit on one parameter.
///
/// - `strict = true`: the parameter must satisfy `x > limit`.
/// - `strict = false`: the parameter must satisfy `x >= limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerBound {
    pub axis: usize,
    pub limit: f64,
    pub strict: bool,
}

impl LowerBound {
    pub const fn strict(axis: usize, limit: f64) -> Self {
        Self { axis, limit, strict: true }
    }

    pub const fn inclusive(axis: usize, limit: f64) -> Self {
        Self { axis, limit, strict: false }
    }

    /// `true` when `value` lies outside the bound.
    pub fn is_violated_by(&self, value: f64) -> bool {
        if self.strict { value <= self.limit } else { value < self.limit }
    }
}

/// Optional roles a model implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub gradient: bool,
    pub fused: bool,
    pub draw: bool,
}

/// A parametric likelihood family.
///
/// Required:
/// - `name`, `parameter_count`, `capabilities`.
/// - `check_data(data)`: reject data the model cannot evaluate (wrong shape,
///   non-finite or out-of-support cells). Called once before estimation.
/// - `neg_log_likelihood(beta, data)`: `-Σ ℓ`.
///
/// Optional (defaults return the matching "not implemented" error):
/// - `neg_gradient(beta, data)`: `-∇ℓ`, one entry per parameter.
/// - `neg_log_likelihood_and_gradient(beta, data)`: both at once; must agree
///   with the separate calls.
/// - `draw(params, rng)`: one random variate.
/// - `lower_bounds()`: declared domain; empty means unconstrained.
pub trait Model {
    fn name(&self) -> &str;
    fn parameter_count(&self) -> usize;
    fn capabilities(&self) -> Capabilities;
    fn check_data(&self, data: &Array2<f64>) -> OptResult<()>;
    fn neg_log_likelihood(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<f64>;

    fn lower_bounds(&self) -> &[LowerBound] {
        &[]
    }

    fn neg_gradient(&self, _beta: &Theta, _data: &Array2<f64>) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }

    fn neg_log_likelihood_and_gradient(
        &self, _beta: &Theta, _data: &Array2<f64>,
    ) -> OptResult<(f64, Grad)> {
        Err(OptError::FusedNotImplemented)
    }

    fn draw(&self, _params: &Theta, _rng: &mut dyn RngCore) -> OptResult<f64> {
        Err(OptError::DrawNotImplemented { model: self.name().to_string() })
    }
}

/// Per-row log-likelihood (positive orientation) at `beta`.
///
/// Row `i` of the result is `ℓ` of `data` row `i` alone, so the entries sum
/// to `-neg_log_likelihood(beta, data)`. Useful for comparing two fitted
/// models observation by observation.
///
/// # Errors
/// Propagates `check_data` and evaluation errors from the model.
pub fn likelihood_vector<M: Model + ?Sized>(
    model: &M, beta: &Theta, data: &Array2<f64>,
) -> OptResult<Array1<f64>> {
    model.check_data(data)?;
    let mut out = Array1::zeros(data.nrows());
    for (i, slot) in out.iter_mut().enumerate() {
        let row = data.slice(s![i..i + 1, ..]).to_owned();
        *slot = -model.neg_log_likelihood(beta, &row)?;
    }
    Ok(out)
}

// ---- Shared validation helpers ----

/// Length, finiteness, and domain checks applied before a raw evaluation.
///
/// # Errors
/// - [`OptError::DimensionMismatch`] when `beta.len() != expected`.
/// - [`OptError::InvalidThetaInput`] for a non-finite entry.
/// - [`OptError::DomainViolation`] for the first violated bound.
pub(crate) fn check_params(beta: &Theta, expected: usize, bounds: &[LowerBound]) -> OptResult<()> {
    check_dimension(beta, expected)?;
    if let Some((index, &value)) = beta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidThetaInput { index, value });
    }
    for b in bounds {
        if b.is_violated_by(beta[b.axis]) {
            return Err(OptError::DomainViolation { axis: b.axis, value: beta[b.axis], limit: b.limit });
        }
    }
    Ok(())
}

pub(crate) fn check_dimension(beta: &Theta, expected: usize) -> OptResult<()> {
    if beta.len() != expected {
        return Err(OptError::DimensionMismatch { expected, found: beta.len() });
    }
    Ok(())
}

/// Every cell finite and non-negative, and at least one cell positive.
///
/// Used for both observation cells (Gamma, Exponential) and rank-count
/// tables (Waring, Yule, Zipf).
pub(crate) fn check_nonnegative_cells(data: &Array2<f64>) -> OptResult<()> {
    if data.is_empty() {
        return Err(OptError::EmptyData);
    }
    let mut any_positive = false;
    for ((row, col), &value) in data.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidData { row, col, value, reason: "Data must be finite." });
        }
        if value < 0.0 {
            return Err(OptError::InvalidData { row, col, value, reason: "Data must be non-negative." });
        }
        any_positive |= value > 0.0;
    }
    if !any_positive {
        return Err(OptError::EmptyData);
    }
    Ok(())
}

/// `(rank, count)` for every non-zero cell of a rank-count table.
pub(crate) fn rank_counts(data: &Array2<f64>) -> impl Iterator<Item = (f64, f64)> + '_ {
    data.indexed_iter().filter(|(_, &c)| c != 0.0).map(|((_, col), &c)| ((col + 1) as f64, c))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use approx::assert_relative_eq;

    /// Compare a model's analytic negated gradient against central finite
    /// differences of its negated log-likelihood.
    pub(crate) fn assert_gradient_matches_fd<M: Model>(model: &M, beta: &Theta, data: &Array2<f64>) {
        let analytic = model.neg_gradient(beta, data).expect("analytic gradient");
        for j in 0..beta.len() {
            let h = 1e-6 * beta[j].abs().max(1.0);
            let mut up = beta.clone();
            let mut down = beta.clone();
            up[j] += h;
            down[j] -= h;
            let fd = (model.neg_log_likelihood(&up, data).unwrap()
                - model.neg_log_likelihood(&down, data).unwrap())
                / (2.0 * h);
            assert_relative_eq!(analytic[j], fd, max_relative = 1e-4, epsilon = 1e-6);
        }
    }
}
