//! Yule rank distribution, the one-parameter (`a = 0`) Waring special case.
//!
//! `P(r) = (b−1) Γ(b) Γ(r) / Γ(r+b)` for ranks `r >= 1`, `b > 1`.
use ndarray::{Array2, array};
use rand::RngCore;

use crate::{
    models::{
        Capabilities, LowerBound, Model, check_nonnegative_cells, check_params, rank_counts,
        waring::waring_draw,
    },
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::{Grad, Theta},
    },
    special::{digamma, ln_gamma},
};

const BOUNDS: [LowerBound; 1] = [LowerBound::strict(0, 1.0)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Yule;

impl Model for Yule {
    fn name(&self) -> &str {
        "Yule"
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { gradient: true, fused: false, draw: true }
    }

    fn lower_bounds(&self) -> &[LowerBound] {
        &BOUNDS
    }

    fn check_data(&self, data: &Array2<f64>) -> OptResult<()> {
        check_nonnegative_cells(data)
    }

    fn neg_log_likelihood(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<f64> {
        check_params(beta, 1, &BOUNDS)?;
        let b = beta[0];
        let base = (b - 1.0).ln() + ln_gamma(b);
        let ll: f64 =
            rank_counts(data).map(|(r, c)| c * (base + ln_gamma(r) - ln_gamma(r + b))).sum();
        Ok(-ll)
    }

    fn neg_gradient(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<Grad> {
        check_params(beta, 1, &BOUNDS)?;
        let b = beta[0];
        let head = 1.0 / (b - 1.0) + digamma(b);
        let d_b: f64 = rank_counts(data).map(|(r, c)| c * (head - digamma(r + b))).sum();
        Ok(array![-d_b])
    }

    fn draw(&self, params: &Theta, rng: &mut dyn RngCore) -> OptResult<f64> {
        check_params(params, 1, &BOUNDS).map_err(|_| OptError::InvalidDrawParam {
            model: self.name().to_string(),
            reason: "Requires finite b > 1.",
        })?;
        waring_draw(params[0], 0.0, self.name(), rng)
    }
}
