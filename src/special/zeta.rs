//! Riemann zeta for real arguments `s > 1`.
//!
//! Euler–Maclaurin summation: a direct partial sum up to `N - 1`, the
//! integral tail, the half-term at `N`, and six Bernoulli corrections. With
//! `N = 10` the truncation error is below `1e-15` relative across `s > 1`.

const HEAD_TERMS: usize = 10;

/// `B_2, B_4, ..., B_12`.
const BERNOULLI_EVEN: [f64; 6] =
    [1.0 / 6.0, -1.0 / 30.0, 1.0 / 42.0, -1.0 / 30.0, 5.0 / 66.0, -691.0 / 2730.0];

/// `ζ(s) = Σ_{k≥1} k^{-s}`.
///
/// Returns `f64::INFINITY` for `s <= 1` (the series diverges) and `NaN` for
/// `NaN` input.
pub fn zeta(s: f64) -> f64 {
    if s.is_nan() {
        return f64::NAN;
    }
    if s <= 1.0 {
        return f64::INFINITY;
    }
    if s > 60.0 {
        // 2^{-60} is already below machine epsilon.
        return 1.0 + 2f64.powf(-s) + 3f64.powf(-s);
    }

    let n = HEAD_TERMS as f64;
    let head: f64 = (1..HEAD_TERMS).map(|k| (k as f64).powf(-s)).sum();
    let n_pow = n.powf(-s);
    let mut total = head + n * n_pow / (s - 1.0) + 0.5 * n_pow;

    // T_j = B_{2j} / (2j)! · s(s+1)…(s+2j-2) · N^{-s-2j+1}
    let mut rising = s;
    let mut factorial = 2.0;
    let mut n_term = n_pow / n;
    for (j, b) in BERNOULLI_EVEN.iter().enumerate() {
        if j > 0 {
            let m = 2.0 * j as f64;
            rising *= (s + m - 1.0) * (s + m);
            factorial *= (m + 1.0) * (m + 2.0);
            n_term /= n * n;
        }
        total += b / factorial * rising * n_term;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    // Purpose
    // -------
    // Closed forms at even integers pin the summation.
    //
    // Expect
    // ------
    // - ζ(2) = π²/6, ζ(4) = π⁴/90 to 1e-12 relative.
    fn matches_closed_forms_at_even_integers() {
        assert_relative_eq!(zeta(2.0), PI * PI / 6.0, max_relative = 1e-12);
        assert_relative_eq!(zeta(4.0), PI.powi(4) / 90.0, max_relative = 1e-12);
    }

    #[test]
    fn matches_apery_constant() {
        assert_relative_eq!(zeta(3.0), 1.202_056_903_159_594_3, max_relative = 1e-12);
    }

    #[test]
    fn near_pole_behaves_like_reciprocal() {
        let s = 1.0 + 1e-4;
        // ζ(s) ≈ 1/(s-1) + γ
        assert_relative_eq!(zeta(s), 1e4 + 0.577_215_664_9, max_relative = 1e-6);
    }

    #[test]
    fn diverges_at_or_below_one() {
        assert!(zeta(1.0).is_infinite());
        assert!(zeta(0.5).is_infinite());
        assert!(zeta(f64::NAN).is_nan());
    }
}
