//! Waring rank distribution with parameters `(b, a)`, `b > 1`, `a >= 0`.
//!
//! `P(r) = (b−1) Γ(b+a) Γ(r+a) / (Γ(a+1) Γ(r+a+b))` for ranks `r >= 1`.
//! Data is a rank-count table (column `j` counts rank `j + 1`).
//!
//! Draws use the beta-geometric mixture: `p ~ Beta(b−1, a+1)`, then the
//! number of trials up to the first success of a `Geometric(p)`.
use ndarray::{Array2, array};
use rand::RngCore;
use rand_distr::{Beta, Distribution, Geometric};

use crate::{
    models::{Capabilities, LowerBound, Model, check_nonnegative_cells, check_params, rank_counts},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::{Grad, Theta},
    },
    special::{digamma, ln_gamma},
};

const BOUNDS: [LowerBound; 2] = [LowerBound::strict(0, 1.0), LowerBound::inclusive(1, 0.0)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Waring;

impl Model for Waring {
    fn name(&self) -> &str {
        "Waring"
    }

    fn parameter_count(&self) -> usize {
        2
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
        check_params(beta, 2, &BOUNDS)?;
        let (b, a) = (beta[0], beta[1]);
        let base = (b - 1.0).ln() + ln_gamma(b + a) - ln_gamma(a + 1.0);
        let ll: f64 = rank_counts(data)
            .map(|(r, c)| c * (base + ln_gamma(r + a) - ln_gamma(r + a + b)))
            .sum();
        Ok(-ll)
    }

    /// `∂b = 1/(b−1) + ψ(b+a) − ψ(r+a+b)`,
    /// `∂a = ψ(b+a) + ψ(r+a) − ψ(a+1) − ψ(r+a+b)`.
    fn neg_gradient(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<Grad> {
        check_params(beta, 2, &BOUNDS)?;
        let (b, a) = (beta[0], beta[1]);
        let psi_ba = digamma(b + a);
        let psi_a1 = digamma(a + 1.0);
        let (d_b, d_a) = rank_counts(data).fold((0.0, 0.0), |(d_b, d_a), (r, c)| {
            let psi_rab = digamma(r + a + b);
            (
                d_b + c * (1.0 / (b - 1.0) + psi_ba - psi_rab),
                d_a + c * (psi_ba + digamma(r + a) - psi_a1 - psi_rab),
            )
        });
        Ok(array![-d_b, -d_a])
    }

    fn draw(&self, params: &Theta, rng: &mut dyn RngCore) -> OptResult<f64> {
        check_params(params, 2, &BOUNDS).map_err(|_| invalid_draw(self.name()))?;
        waring_draw(params[0], params[1], self.name(), rng)
    }
}

fn invalid_draw(model: &str) -> OptError {
    OptError::InvalidDrawParam {
        model: model.to_string(),
        reason: "Requires finite b > 1 and a >= 0.",
    }
}

/// One Waring rank; shared with the Yule model (`a = 0`).
pub(crate) fn waring_draw(b: f64, a: f64, model: &str, rng: &mut dyn RngCore) -> OptResult<f64> {
    let p = Beta::new(b - 1.0, a + 1.0).map_err(|_| invalid_draw(model))?.sample(rng);
    let failures = Geometric::new(p.clamp(f64::MIN_POSITIVE, 1.0))
        .map_err(|_| invalid_draw(model))?
        .sample(rng);
    Ok(failures as f64 + 1.0)
}
