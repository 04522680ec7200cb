//! Exponential with scale `μ` (mean) over non-negative observations.
use ndarray::{Array2, array};
use rand::RngCore;
use rand_distr::{Distribution, Exp};

use crate::{
    models::{Capabilities, LowerBound, Model, check_nonnegative_cells, check_params},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::{Grad, Theta},
    },
};

const BOUNDS: [LowerBound; 1] = [LowerBound::strict(0, 0.0)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exponential;

impl Model for Exponential {
    fn name(&self) -> &str {
        "Exponential"
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { gradient: true, fused: true, draw: true }
    }

    fn lower_bounds(&self) -> &[LowerBound] {
        &BOUNDS
    }

    fn check_data(&self, data: &Array2<f64>) -> OptResult<()> {
        check_nonnegative_cells(data)
    }

    fn neg_log_likelihood(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<f64> {
        Ok(self.neg_log_likelihood_and_gradient(beta, data)?.0)
    }

    fn neg_gradient(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<Grad> {
        Ok(self.neg_log_likelihood_and_gradient(beta, data)?.1)
    }

    /// `ℓ = −n ln μ − Σx/μ`, `∂μ = −n/μ + Σx/μ²`.
    fn neg_log_likelihood_and_gradient(
        &self, beta: &Theta, data: &Array2<f64>,
    ) -> OptResult<(f64, Grad)> {
        check_params(beta, 1, &BOUNDS)?;
        let mu = beta[0];
        let n = data.len() as f64;
        let sum_x = data.sum();
        let ll = -n * mu.ln() - sum_x / mu;
        let d_mu = -n / mu + sum_x / (mu * mu);
        Ok((-ll, array![-d_mu]))
    }

    fn draw(&self, params: &Theta, rng: &mut dyn RngCore) -> OptResult<f64> {
        let invalid = || OptError::InvalidDrawParam {
            model: self.name().to_string(),
            reason: "Scale must be finite and positive.",
        };
        check_params(params, 1, &BOUNDS).map_err(|_| invalid())?;
        let dist = Exp::new(1.0 / params[0]).map_err(|_| invalid())?;
        Ok(dist.sample(rng))
    }
}
