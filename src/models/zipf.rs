//! Zipf rank distribution: `P(r) = r^{−a} / ζ(a)`, `a > 1`.
//!
//! No analytic gradient is provided; gradient-based solvers fall back to
//! finite differences and `Method::Auto` selects the simplex.
use ndarray::Array2;
use rand::RngCore;
use rand_distr::{Distribution, Zeta};

use crate::{
    models::{Capabilities, LowerBound, Model, check_nonnegative_cells, check_params, rank_counts},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::Theta,
    },
    special::zeta,
};

const BOUNDS: [LowerBound; 1] = [LowerBound::strict(0, 1.0)];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zipf;

impl Model for Zipf {
    fn name(&self) -> &str {
        "Zipf"
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { gradient: false, fused: false, draw: true }
    }

    fn lower_bounds(&self) -> &[LowerBound] {
        &BOUNDS
    }

    fn check_data(&self, data: &Array2<f64>) -> OptResult<()> {
        check_nonnegative_cells(data)
    }

    fn neg_log_likelihood(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<f64> {
        check_params(beta, 1, &BOUNDS)?;
        let a = beta[0];
        let ln_zeta = zeta(a).ln();
        let ll: f64 = rank_counts(data).map(|(r, c)| -c * (ln_zeta + a * r.ln())).sum();
        Ok(-ll)
    }

    fn draw(&self, params: &Theta, rng: &mut dyn RngCore) -> OptResult<f64> {
        let invalid = || OptError::InvalidDrawParam {
            model: self.name().to_string(),
            reason: "Requires finite a > 1.",
        };
        check_params(params, 1, &BOUNDS).map_err(|_| invalid())?;
        let dist = Zeta::new(params[0]).map_err(|_| invalid())?;
        Ok(dist.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn gradient_is_not_provided() {
        assert_eq!(
            Zipf.neg_gradient(&array![2.0], &array![[1.0]]),
            Err(OptError::GradientNotImplemented)
        );
        assert!(!Zipf.capabilities().gradient);
    }

    #[test]
    // Purpose
    // -------
    // Rank one at a = 2 has probability 6/π².
    fn rank_one_probability_matches_closed_form() {
        let v = Zipf.neg_log_likelihood(&array![2.0], &array![[1.0]]).unwrap();

        let pi2 = std::f64::consts::PI.powi(2);
        assert_relative_eq!((-v).exp(), 6.0 / pi2, max_relative = 1e-12);
    }

    #[test]
    fn draws_are_ranks_and_mostly_one_for_steep_exponent() {
        let mut rng = StdRng::seed_from_u64(9);
        let n = 10_000;

        let ones = (0..n)
            .map(|_| Zipf.draw(&array![3.0], &mut rng).unwrap())
            .inspect(|x| assert!(*x >= 1.0))
            .filter(|&x| x == 1.0)
            .count();

        // P(1) = 1/ζ(3) ≈ 0.832
        assert_relative_eq!(ones as f64 / n as f64, 0.832, max_relative = 0.03);
    }
}
