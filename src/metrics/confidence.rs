//! Confidence intervals for proportions and Cohen's Kappa.
//!
//! The Wilson score interval is used for every accuracy proportion. It stays
//! inside [0, 1] and behaves well near 0 and 1 and for small samples, where
//! the normal (Wald) interval does not (Agresti & Coull, 1998).

use crate::core::constants::STANDARD_Z_SCORES;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::ConfidenceInterval;

// Abramowitz & Stegun 26.2.23
const PROBIT_C0: f64 = 2.515517;
const PROBIT_C1: f64 = 0.802853;
const PROBIT_C2: f64 = 0.010328;
const PROBIT_D1: f64 = 1.432788;
const PROBIT_D2: f64 = 0.189269;
const PROBIT_D3: f64 = 0.001308;

/// Two-sided z-score for a confidence level in (0, 1).
///
/// The standard levels 0.80, 0.85, 0.90, 0.95 and 0.99 return tabulated
/// values. Any other level goes through [`probit`] on `(1 + level) / 2`.
pub fn z_score_for_confidence(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(AccuracyError::invalid_parameter(
            "confidence_level",
            confidence_level,
            "must be in the open interval (0, 1)",
        ));
    }

    if let Some(&(_, z)) = STANDARD_Z_SCORES
        .iter()
        .find(|(level, _)| (level - confidence_level).abs() < 1e-12)
    {
        return Ok(z);
    }

    probit((1.0 + confidence_level) / 2.0)
}

/// Approximate inverse of the standard normal CDF, accurate to about 4.5e-4.
pub fn probit(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(AccuracyError::invalid_parameter(
            "p",
            p,
            "must be in the open interval (0, 1)",
        ));
    }

    if p < 0.5 {
        return probit(1.0 - p).map(|z| -z);
    }

    let t = (-2.0 * (1.0 - p).ln()).sqrt();
    let numerator = PROBIT_C0 + PROBIT_C1 * t + PROBIT_C2 * t * t;
    let denominator = 1.0 + PROBIT_D1 * t + PROBIT_D2 * t * t + PROBIT_D3 * t * t * t;
    Ok(t - numerator / denominator)
}

/// Wilson score interval for proportion `p` observed over `n` trials.
///
/// `n == 0` yields the whole range [0, 1].
pub fn wilson_ci(p: f64, n: u64, z: f64) -> ConfidenceInterval {
    if n == 0 {
        return ConfidenceInterval::unit();
    }

    let n = n as f64;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let spread = z * ((p * (1.0 - p) / n) + z2 / (4.0 * n * n)).max(0.0).sqrt() / denom;

    ConfidenceInterval::new(center - spread, center + spread).clamp_probability()
}

/// Large-sample interval for Cohen's Kappa.
///
/// Variance is `p_o (1 - p_o) / (n (1 - p_e)^2)` (Congalton & Green, 2019).
/// Returns `[0, 0]` when `n == 0` or `p_e == 1`.
pub fn kappa_ci(kappa: f64, p_o: f64, p_e: f64, n: u64, z: f64) -> ConfidenceInterval {
    if n == 0 || p_e == 1.0 {
        return ConfidenceInterval::zero();
    }

    let variance = (p_o * (1.0 - p_o)) / (n as f64 * (1.0 - p_e).powi(2));
    let se = variance.max(0.0).sqrt();
    ConfidenceInterval::around(kappa, z * se)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_levels() {
        assert_eq!(z_score_for_confidence(0.95).unwrap(), 1.96);
        assert_eq!(z_score_for_confidence(0.99).unwrap(), 2.5758);
        assert_eq!(z_score_for_confidence(0.80).unwrap(), 1.2816);
    }

    #[test]
    fn test_nonstandard_level_uses_probit() {
        // True value 2.1701
        let z = z_score_for_confidence(0.97).unwrap();
        assert_abs_diff_eq!(z, 2.1701, epsilon = 1e-3);
    }

    #[test]
    fn test_level_out_of_range() {
        assert!(z_score_for_confidence(0.0).is_err());
        assert!(z_score_for_confidence(1.0).is_err());
        assert!(z_score_for_confidence(f64::NAN).is_err());
    }

    #[test]
    fn test_probit_symmetry_and_domain() {
        let hi = probit(0.975).unwrap();
        let lo = probit(0.025).unwrap();
        assert_abs_diff_eq!(hi, 1.96, epsilon = 1e-3);
        assert_abs_diff_eq!(hi, -lo, epsilon = 1e-12);
        assert_abs_diff_eq!(probit(0.5).unwrap(), 0.0, epsilon = 1e-3);
        assert!(probit(0.0).is_err());
        assert!(probit(1.0).is_err());
    }

    #[test]
    fn test_wilson_known_value() {
        // p = 0.8, n = 100, z = 1.96 -> [0.7112, 0.8666]
        let ci = wilson_ci(0.8, 100, 1.96);
        assert_abs_diff_eq!(ci.lower, 0.7112, epsilon = 1e-4);
        assert_abs_diff_eq!(ci.upper, 0.8666, epsilon = 1e-4);
    }

    #[test]
    fn test_wilson_edges() {
        assert_eq!(wilson_ci(0.5, 0, 1.96), ConfidenceInterval::unit());

        let ci = wilson_ci(1.0, 10, 1.96);
        assert!(ci.upper <= 1.0);
        assert!(ci.lower < 1.0);

        let ci = wilson_ci(0.0, 10, 1.96);
        assert_eq!(ci.lower, 0.0);
        assert!(ci.upper > 0.0);
    }

    #[test]
    fn test_wilson_narrows_with_n() {
        let small = wilson_ci(0.7, 20, 1.96);
        let large = wilson_ci(0.7, 200, 1.96);
        assert!(large.width() < small.width());
    }

    #[test]
    fn test_kappa_ci() {
        let ci = kappa_ci(0.6, 0.8, 0.5, 100, 1.96);
        // se = sqrt(0.16 / 25) = 0.08
        assert_abs_diff_eq!(ci.lower, 0.6 - 1.96 * 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(ci.upper, 0.6 + 1.96 * 0.08, epsilon = 1e-12);

        assert_eq!(kappa_ci(0.0, 1.0, 1.0, 100, 1.96), ConfidenceInterval::zero());
        assert_eq!(kappa_ci(0.5, 0.8, 0.5, 0, 1.96), ConfidenceInterval::zero());
    }
}
