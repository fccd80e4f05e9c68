//! Quantity and allocation disagreement (Pontius & Millones, 2011).
//!
//! Total disagreement `1 - OA` splits into quantity disagreement (the map has
//! the wrong class proportions) and allocation disagreement (the proportions
//! are right but the pixels are in the wrong place). `QD + AD = 1 - OA` holds
//! exactly; [`compute`] checks it on every call.

use serde::{Deserialize, Serialize};

use crate::core::constants::PONTIUS_IDENTITY_TOLERANCE;
use crate::core::error::{AccuracyError, Result};
use crate::metrics::confusion::ConfusionMatrix;

/// One class's share of the disagreement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassDisagreement {
    /// `|classified proportion - reference proportion| / 2`
    pub quantity: f64,
    /// `min(commission, omission)`
    pub allocation: f64,
}

/// Disagreement decomposition of one matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisagreementResult {
    /// Quantity disagreement
    pub quantity_disagreement: f64,
    /// Allocation disagreement
    pub allocation_disagreement: f64,
    /// Per-class components in matrix order, summing to the totals
    pub per_class: Vec<ClassDisagreement>,
}

impl DisagreementResult {
    /// `QD + AD`
    pub fn total_disagreement(&self) -> f64 {
        self.quantity_disagreement + self.allocation_disagreement
    }
}

/// Decompose the disagreement of `matrix`.
pub fn compute(matrix: &ConfusionMatrix) -> Result<DisagreementResult> {
    let n = matrix.total();
    if n == 0 {
        return Err(AccuracyError::empty_input(
            "Cannot compute Pontius metrics on empty matrix",
        ));
    }
    let n = n as f64;

    let row_totals = matrix.row_totals();
    let col_totals = matrix.col_totals();
    let diagonal = matrix.diagonal();

    let mut per_class = Vec::with_capacity(matrix.k());
    let mut qd = 0.0;
    let mut ad = 0.0;
    let mut oa = 0.0;

    for i in 0..matrix.k() {
        let row = row_totals[i] as f64 / n;
        let col = col_totals[i] as f64 / n;
        let diag = diagonal[i] as f64 / n;

        let q_i = (col - row).abs();
        let commission = col - diag;
        let omission = row - diag;
        let a_i = 2.0 * commission.min(omission);

        qd += q_i;
        ad += a_i;
        oa += diag;
        per_class.push(ClassDisagreement {
            quantity: q_i / 2.0,
            allocation: a_i / 2.0,
        });
    }

    qd /= 2.0;
    ad /= 2.0;

    let total_disagreement = 1.0 - oa;
    let residual = (qd + ad - total_disagreement).abs();
    if !(residual <= PONTIUS_IDENTITY_TOLERANCE) {
        return Err(AccuracyError::invariant(format!(
            "Pontius identity violated: QD({:.10}) + AD({:.10}) = {:.10} != 1 - OA = {:.10} (residual={:.2e})",
            qd,
            ad,
            qd + ad,
            total_disagreement,
            residual
        )));
    }

    Ok(DisagreementResult {
        quantity_disagreement: qd,
        allocation_disagreement: ad,
        per_class,
    })
}
