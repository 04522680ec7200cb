//! Scalar barrier and boundary detection.
use crate::{
    models::LowerBound,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::Theta,
    },
};

/// Relative distance inside the domain at which violated coordinates are
/// rescued. Scaled by `max(|limit|, 1)` so the rescue point stays off the
/// bound for large limits.
pub const RESCUE_OFFSET: f64 = 1e-6;

/// Coordinate just inside a lower bound at `limit`.
pub fn rescue_value(limit: f64) -> f64 {
    limit + RESCUE_OFFSET * limit.abs().max(1.0)
}

/// `exp(|value − limit|) · base`.
///
/// Saturates at `f64::MAX` instead of overflowing to infinity.
pub fn keep_away(value: f64, limit: f64, base: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    let out = (value - limit).abs().exp() * base;
    if out.is_finite() { out } else { f64::MAX.copysign(base) }
}

/// One violated lower bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub axis: usize,
    pub value: f64,
    pub limit: f64,
}

/// Where a parameter vector sits relative to a model's domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Inside,
    Outside { violations: Vec<Violation>, rescue: Theta },
}

impl Boundary {
    pub fn is_inside(&self) -> bool {
        matches!(self, Boundary::Inside)
    }
}

/// Classify `beta` against `bounds`.
///
/// # Errors
/// [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn detect(bounds: &[LowerBound], beta: &Theta) -> OptResult<Boundary> {
    if let Some((index, &value)) = beta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidThetaInput { index, value });
    }
    let violations: Vec<Violation> = bounds
        .iter()
        .filter(|b| b.axis < beta.len() && b.is_violated_by(beta[b.axis]))
        .map(|b| Violation { axis: b.axis, value: beta[b.axis], limit: b.limit })
        .collect();
    if violations.is_empty() {
        return Ok(Boundary::Inside);
    }
    let mut rescue = beta.clone();
    for v in &violations {
        rescue[v.axis] = rescue_value(v.limit);
    }
    Ok(Boundary::Outside { violations, rescue })
}

/// Barrier value for `violations` around `base`: `keep_away` folded across
/// every violated axis, i.e. `exp(Σ|x_i − limit_i|) · base`.
pub fn penalty(violations: &[Violation], base: f64) -> f64 {
    violations.iter().fold(base, |acc, v| keep_away(v.value, v.limit, acc))
}
