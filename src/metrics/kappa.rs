//! Cohen's Kappa coefficient.
//!
//! Off by default in assessments. Quantity and allocation disagreement are
//! easier to interpret, but Kappa is still requested by journal reviewers.

use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_Z_SCORE, KAPPA_DEGENERATE_EPSILON};
use crate::core::error::{AccuracyError, Result};
use crate::core::types::ConfidenceInterval;
use crate::metrics::confidence::kappa_ci;
use crate::metrics::confusion::ConfusionMatrix;

/// Kappa with its ingredients and interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KappaResult {
    /// Chance-corrected agreement
    pub kappa: f64,
    /// Interval, intersected with [-1, 1]
    pub ci: ConfidenceInterval,
    /// Observed agreement
    pub p_o: f64,
    /// Agreement expected by chance
    pub p_e: f64,
}

impl KappaResult {
    /// Whether expected agreement is 1 and Kappa was set to 0 by convention
    pub fn is_degenerate(&self) -> bool {
        (1.0 - self.p_e).abs() < KAPPA_DEGENERATE_EPSILON
    }
}

/// Kappa with a 95% interval.
pub fn compute(matrix: &ConfusionMatrix) -> Result<KappaResult> {
    compute_with_z(matrix, DEFAULT_Z_SCORE)
}

/// Kappa with an interval at the given z-score.
pub fn compute_with_z(matrix: &ConfusionMatrix, z: f64) -> Result<KappaResult> {
    let n = matrix.total();
    if n == 0 {
        return Err(AccuracyError::empty_input(
            "Cannot compute Kappa on empty matrix",
        ));
    }

    let nf = n as f64;
    let row_totals = matrix.row_totals();
    let col_totals = matrix.col_totals();

    let p_o = matrix.trace() as f64 / nf;
    let p_e = row_totals
        .iter()
        .zip(col_totals.iter())
        .map(|(&r, &c)| r as f64 * c as f64)
        .sum::<f64>()
        / (nf * nf);

    if (1.0 - p_e).abs() < KAPPA_DEGENERATE_EPSILON {
        log::debug!("Expected agreement is 1, Kappa undefined; reporting 0");
        return Ok(KappaResult {
            kappa: 0.0,
            ci: ConfidenceInterval::zero(),
            p_o,
            p_e,
        });
    }

    let kappa = (p_o - p_e) / (1.0 - p_e);
    let ci = kappa_ci(kappa, p_o, p_e, n, z).clamp(-1.0, 1.0);

    Ok(KappaResult { kappa, ci, p_o, p_e })
}
