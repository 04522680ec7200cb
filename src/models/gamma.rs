//! Gamma(shape `a`, scale `b`) over positive observations.
//!
//! Every cell of the data matrix is an observation; zero cells are treated
//! as padding and skipped, so ragged samples can share one matrix.
use ndarray::{Array2, array};
use rand::RngCore;
use rand_distr::Distribution;

use crate::{
    models::{Capabilities, LowerBound, Model, check_nonnegative_cells, check_params},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::{Grad, Theta},
    },
    special::{digamma, ln_gamma},
};

const BOUNDS: [LowerBound; 2] = [LowerBound::strict(0, 0.0), LowerBound::strict(1, 0.0)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gamma;

/// Sufficient statistics over the positive cells: `(n, Σ ln x, Σ x)`.
fn sufficient_stats(data: &Array2<f64>) -> (f64, f64, f64) {
    data.iter().filter(|&&x| x != 0.0).fold((0.0, 0.0, 0.0), |(n, sl, sx), &x| {
        (n + 1.0, sl + x.ln(), sx + x)
    })
}

impl Model for Gamma {
    fn name(&self) -> &str {
        "Gamma"
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

    /// `-Σ [−lnΓ(a) − a ln b + (a−1) ln x − x/b]`
    fn neg_log_likelihood(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<f64> {
        check_params(beta, 2, &BOUNDS)?;
        let (a, b) = (beta[0], beta[1]);
        let (n, sum_ln, sum_x) = sufficient_stats(data);
        let ll = -n * (ln_gamma(a) + a * b.ln()) + (a - 1.0) * sum_ln - sum_x / b;
        Ok(-ll)
    }

    /// `∂a = −ψ(a) − ln b + ln x`, `∂b = −a/b + x/b²`, summed and negated.
    fn neg_gradient(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<Grad> {
        check_params(beta, 2, &BOUNDS)?;
        let (a, b) = (beta[0], beta[1]);
        let (n, sum_ln, sum_x) = sufficient_stats(data);
        let d_a = -n * (digamma(a) + b.ln()) + sum_ln;
        let d_b = -n * a / b + sum_x / (b * b);
        Ok(array![-d_a, -d_b])
    }

    fn draw(&self, params: &Theta, rng: &mut dyn RngCore) -> OptResult<f64> {
        check_params(params, 2, &BOUNDS).map_err(|_| OptError::InvalidDrawParam {
            model: self.name().to_string(),
            reason: "Shape and scale must both be finite and positive.",
        })?;
        let dist = rand_distr::Gamma::new(params[0], params[1]).map_err(|_| {
            OptError::InvalidDrawParam {
                model: self.name().to_string(),
                reason: "Shape and scale must both be finite and positive.",
            }
        })?;
        Ok(dist.sample(rng))
    }
}
