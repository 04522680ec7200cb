//! Standard normal log-density, log-CDF, and inverse Mills ratio.
//!
//! Everything in the lower tail goes through the scaled complementary error
//! function `erfcx(z) = exp(z²)·erfc(z)`:
//!
//! `ln Φ(x) = −x²/2 − ln 2 + ln erfcx(−x/√2)`
//!
//! so `Φ(x)` is never formed and nothing underflows. `erfcx` is `statrs`'s
//! `erfc` rescaled for moderate arguments and Laplace's continued fraction,
//! iterated to convergence, beyond [`CF_SWITCH`].
use statrs::function::erf::erfc;
use std::f64::consts::{FRAC_1_SQRT_2, LN_2, PI};

/// From this argument on `erfcx` uses the continued fraction.
pub const CF_SWITCH: f64 = 6.0;

/// Relative step at which the continued fraction is considered converged.
const CF_TOL: f64 = 1e-16;

const CF_MAX_TERMS: usize = 1_000;

/// `√(2/π)`.
const SQRT_2_OVER_PI: f64 = 0.797_884_560_802_865_4;

/// `ln φ(x)`.
pub fn ln_norm_pdf(x: f64) -> f64 {
    -0.5 * x * x - 0.5 * (2.0 * PI).ln()
}

/// `ln Φ(x)`, finite for every finite `x`.
pub fn ln_norm_cdf(x: f64) -> f64 {
    if x >= 0.0 {
        return (-0.5 * erfc(x * FRAC_1_SQRT_2)).ln_1p();
    }
    -0.5 * x * x - LN_2 + erfcx(-x * FRAC_1_SQRT_2).ln()
}

/// `φ(x) / Φ(x)`.
pub fn inverse_mills(x: f64) -> f64 {
    if x >= 0.0 {
        return (ln_norm_pdf(x) - ln_norm_cdf(x)).exp();
    }
    SQRT_2_OVER_PI / erfcx(-x * FRAC_1_SQRT_2)
}

/// Scaled complementary error function `exp(z²)·erfc(z)`.
///
/// Finite and positive for `z > −26.6`; below that `2·exp(z²)` overflows.
pub fn erfcx(z: f64) -> f64 {
    if z < 0.0 {
        return 2.0 * (z * z).exp() - erfcx(-z);
    }
    if z < CF_SWITCH {
        return (z * z).exp() * erfc(z);
    }
    erfcx_continued_fraction(z)
}

/// `erfcx(z) = 1 / (√π · (z + (1/2)/(z + 1/(z + (3/2)/(z + …)))))`,
/// evaluated with the modified Lentz method. Requires `z > 0`.
fn erfcx_continued_fraction(z: f64) -> f64 {
    let tiny = f64::MIN_POSITIVE;
    let mut f = z;
    let mut c = z;
    let mut d = 0.0;
    for k in 1..=CF_MAX_TERMS {
        let a = 0.5 * k as f64;
        d = z + a * d;
        if d == 0.0 {
            d = tiny;
        }
        d = 1.0 / d;
        c = z + a / c;
        if c == 0.0 {
            c = tiny;
        }
        let delta = c * d;
        f *= delta;
        if (delta - 1.0).abs() < CF_TOL {
            break;
        }
    }
    1.0 / (PI.sqrt() * f)
}
