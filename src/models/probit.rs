//! Probit regression: `P(y = 1 | x) = Φ(x·β)`.
//!
//! Data layout: column 0 holds the binary outcome (0 or 1); columns
//! `1..=k` hold the `k` covariates, one per coefficient. Include a column of
//! ones for an intercept.
//!
//! The fused evaluator computes `X·β` once and shares it between the value
//! and the gradient. Log-CDF and Mills ratio use the tail-stable forms from
//! [`crate::special::normal`], so large `|x·β|` never produce `ln 0`.
use ndarray::{Array1, Array2, ArrayView1, s};

use crate::{
    models::{Capabilities, Model, check_dimension},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::types::{Grad, Theta},
    },
    special::{inverse_mills, ln_norm_cdf},
};

/// Probit over `k` covariates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probit {
    pub k: usize,
}

impl Probit {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    fn check_beta(&self, beta: &Theta) -> OptResult<()> {
        check_dimension(beta, self.k)?;
        if let Some((index, &value)) = beta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        Ok(())
    }

    fn check_shape(&self, data: &Array2<f64>) -> OptResult<()> {
        if data.ncols() != self.k + 1 {
            return Err(OptError::DataShapeMismatch {
                expected_cols: self.k + 1,
                found_cols: data.ncols(),
            });
        }
        Ok(())
    }

    /// `±1` for each row's outcome.
    fn signs(outcome: ArrayView1<'_, f64>) -> Array1<f64> {
        outcome.mapv(|y| if y != 0.0 { 1.0 } else { -1.0 })
    }
}

impl Model for Probit {
    fn name(&self) -> &str {
        "Probit"
    }

    fn parameter_count(&self) -> usize {
        self.k
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { gradient: true, fused: true, draw: false }
    }

    fn check_data(&self, data: &Array2<f64>) -> OptResult<()> {
        if data.nrows() == 0 {
            return Err(OptError::EmptyData);
        }
        self.check_shape(data)?;
        for ((row, col), &value) in data.indexed_iter() {
            if !value.is_finite() {
                return Err(OptError::InvalidData { row, col, value, reason: "Data must be finite." });
            }
            if col == 0 && value != 0.0 && value != 1.0 {
                return Err(OptError::InvalidData {
                    row,
                    col,
                    value,
                    reason: "Outcome column must hold 0 or 1.",
                });
            }
        }
        Ok(())
    }

    fn neg_log_likelihood(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<f64> {
        self.check_beta(beta)?;
        self.check_shape(data)?;
        let xb = data.slice(s![.., 1..]).dot(beta);
        let q = Self::signs(data.column(0));
        let ll: f64 = q.iter().zip(xb.iter()).map(|(&q, &xb)| ln_norm_cdf(q * xb)).sum();
        Ok(-ll)
    }

    fn neg_gradient(&self, beta: &Theta, data: &Array2<f64>) -> OptResult<Grad> {
        Ok(self.neg_log_likelihood_and_gradient(beta, data)?.1)
    }

    /// `ℓ = Σ ln Φ(q·xβ)`, `∂β = Σ q·φ(xβ)/Φ(q·xβ)·x` with `q = 2y − 1`.
    fn neg_log_likelihood_and_gradient(
        &self, beta: &Theta, data: &Array2<f64>,
    ) -> OptResult<(f64, Grad)> {
        self.check_beta(beta)?;
        self.check_shape(data)?;
        let x = data.slice(s![.., 1..]);
        let xb = x.dot(beta);
        let q = Self::signs(data.column(0));

        let mut ll = 0.0;
        let mut weights = Array1::zeros(xb.len());
        for (i, w) in weights.iter_mut().enumerate() {
            let z = q[i] * xb[i];
            ll += ln_norm_cdf(z);
            *w = q[i] * inverse_mills(z);
        }
        let grad = x.t().dot(&weights);
        Ok((-ll, -grad))
    }
}
