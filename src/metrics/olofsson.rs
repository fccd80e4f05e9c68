//! Area-weighted accuracy and area estimation (Olofsson et al., 2014).
//!
//! "Good practices for estimating area and assessing accuracy of land
//! change", Remote Sensing of Environment 148, 42-57.
//!
//! When samples are not allocated in proportion to class prevalence, the raw
//! confusion matrix over-represents small classes. Mapped class areas act as
//! stratum weights `W_j` and turn counts into estimated area proportions
//!
//! ```text
//! p_hat[i, j] = W_j * n_ij / n_j
//! ```
//!
//! from which unbiased area estimates and accuracies follow. Columns are the
//! strata (classified classes), rows the reference classes.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{AccuracyError, Result};
use crate::core::types::{ClassLabel, ClassLabelSet, ConfidenceInterval};
use crate::metrics::confusion::ConfusionMatrix;

/// Area-weighted estimates for one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAreaEstimate {
    /// Class label
    pub label: ClassLabel,
    /// Mapped area fraction `W`
    pub weight: f64,
    /// Mapped area in hectares
    pub mapped_area_ha: f64,
    /// Estimated true area in hectares
    pub estimated_area_ha: f64,
    /// Standard error of the estimated area in hectares
    pub standard_error_ha: f64,
    /// Interval of the estimated area, never below zero
    pub estimated_area_ci_ha: ConfidenceInterval,
    /// Area-weighted producer's accuracy
    pub producers_accuracy: Option<f64>,
    /// Area-weighted user's accuracy
    pub users_accuracy: Option<f64>,
}

/// Olofsson estimates for a full assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaWeightedResult {
    /// Sum of mapped areas of the labelled classes
    pub total_mapped_area_ha: f64,
    /// Area-weighted overall accuracy
    pub overall_accuracy: f64,
    /// Interval of the weighted overall accuracy, within [0, 1]
    pub overall_accuracy_ci: ConfidenceInterval,
    /// One entry per label, in label order
    pub per_class: Vec<ClassAreaEstimate>,
}

impl AreaWeightedResult {
    /// Estimates of a single class
    pub fn class(&self, label: ClassLabel) -> Option<&ClassAreaEstimate> {
        self.per_class.iter().find(|c| c.label == label)
    }

    /// Mapped-area weights keyed by label
    pub fn weights(&self) -> BTreeMap<ClassLabel, f64> {
        self.per_class.iter().map(|c| (c.label, c.weight)).collect()
    }

    /// Estimated areas keyed by label
    pub fn estimated_areas_ha(&self) -> BTreeMap<ClassLabel, f64> {
        self.per_class
            .iter()
            .map(|c| (c.label, c.estimated_area_ha))
            .collect()
    }
}

/// Compute area-weighted estimates.
///
/// `mapped_area_ha` must hold an entry for every label; entries for other
/// labels are ignored. `z` scales every interval.
pub fn compute(
    matrix: &ConfusionMatrix,
    mapped_area_ha: &BTreeMap<ClassLabel, f64>,
    labels: &ClassLabelSet,
    z: f64,
) -> Result<AreaWeightedResult> {
    matrix.ensure_labels(labels)?;
    let k = labels.len();

    if !z.is_finite() || z < 0.0 {
        return Err(AccuracyError::invalid_parameter(
            "z",
            z,
            "must be finite and non-negative",
        ));
    }

    let mut areas = Vec::with_capacity(k);
    for label in labels.iter() {
        let area = *mapped_area_ha
            .get(&label)
            .ok_or(AccuracyError::MissingArea { label })?;
        if !area.is_finite() || area < 0.0 {
            return Err(AccuracyError::invalid_parameter(
                format!("mapped_area_ha[{}]", label),
                area,
                "must be finite and non-negative",
            ));
        }
        areas.push(area);
    }

    let total_area: f64 = areas.iter().sum();
    if !(total_area > 0.0) {
        return Err(AccuracyError::invalid_parameter(
            "mapped_area_ha",
            total_area,
            "total mapped area must be positive",
        ));
    }

    let weights: Vec<f64> = areas.iter().map(|a| a / total_area).collect();
    let n_j = matrix.col_totals();

    for (j, label) in labels.iter().enumerate() {
        if n_j[j] == 0 {
            return Err(AccuracyError::ZeroSampleColumn { label });
        }
    }

    let counts = matrix.counts();
    let p_hat = Array2::from_shape_fn((k, k), |(i, j)| {
        weights[j] * counts[[i, j]] as f64 / n_j[j] as f64
    });

    let overall_accuracy: f64 = p_hat.diag().sum();

    let users_accuracy: Vec<Option<f64>> = (0..k)
        .map(|j| {
            let col_sum = p_hat.column(j).sum();
            (col_sum > 0.0).then(|| p_hat[[j, j]] / col_sum)
        })
        .collect();

    let mut var_oa = 0.0;
    for j in (0..k).filter(|&j| n_j[j] > 1) {
        if let Some(ua) = users_accuracy[j] {
            var_oa += weights[j].powi(2) * ua * (1.0 - ua) / (n_j[j] - 1) as f64;
        }
    }
    let overall_accuracy_ci =
        ConfidenceInterval::around(overall_accuracy, z * var_oa.max(0.0).sqrt()).clamp_probability();

    let per_class = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let row_sum = p_hat.row(i).sum();
            let estimated_area_ha = total_area * row_sum;

            let variance: f64 = (0..k)
                .filter(|&j| n_j[j] > 1)
                .map(|j| {
                    let p = counts[[i, j]] as f64 / n_j[j] as f64;
                    weights[j].powi(2) * p * (1.0 - p) / (n_j[j] - 1) as f64
                })
                .sum();
            let standard_error_ha = total_area * variance.max(0.0).sqrt();

            log::debug!(
                "class {}: W={:.4} mapped={:.2} ha estimated={:.2} ha (SE {:.2})",
                label,
                weights[i],
                areas[i],
                estimated_area_ha,
                standard_error_ha
            );

            ClassAreaEstimate {
                label,
                weight: weights[i],
                mapped_area_ha: areas[i],
                estimated_area_ha,
                standard_error_ha,
                estimated_area_ci_ha: ConfidenceInterval::around(
                    estimated_area_ha,
                    z * standard_error_ha,
                )
                .clamp_non_negative(),
                producers_accuracy: (row_sum > 0.0).then(|| p_hat[[i, i]] / row_sum),
                users_accuracy: users_accuracy[i],
            }
        })
        .collect();

    Ok(AreaWeightedResult {
        total_mapped_area_ha: total_area,
        overall_accuracy,
        overall_accuracy_ci,
        per_class,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Olofsson et al. (2014), section 5, transposed to reference rows.
    fn paper_case() -> (ConfusionMatrix, BTreeMap<ClassLabel, f64>, ClassLabelSet) {
        let m = ConfusionMatrix::from_rows(&[
            [66u64, 0, 1, 2],
            [0, 55, 0, 1],
            [5, 8, 153, 9],
            [4, 12, 11, 313],
        ])
        .unwrap();
        let areas: BTreeMap<ClassLabel, f64> = [
            (1, 200_000.0),
            (2, 150_000.0),
            (3, 3_200_000.0),
            (4, 6_450_000.0),
        ]
        .into_iter()
        .collect();
        (m, areas, ClassLabelSet::new(vec![1, 2, 3, 4]).unwrap())
    }

    #[test]
    fn test_paper_values() {
        let (m, areas, labels) = paper_case();
        let result = compute(&m, &areas, &labels, 1.96).unwrap();

        assert_abs_diff_eq!(result.overall_accuracy, 0.9465, epsilon = 1e-4);

        let deforestation = result.class(1).unwrap();
        assert_abs_diff_eq!(deforestation.weight, 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(deforestation.estimated_area_ha, 235_086.0, epsilon = 1.0);
        let half_width = deforestation.estimated_area_ci_ha.width() / 2.0;
        assert_abs_diff_eq!(half_width, 68_418.0, epsilon = 5.0);
        assert_abs_diff_eq!(deforestation.users_accuracy.unwrap(), 0.88, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_and_areas_sum() {
        let (m, areas, labels) = paper_case();
        let result = compute(&m, &areas, &labels, 1.96).unwrap();

        let weight_sum: f64 = result.weights().values().sum();
        assert_abs_diff_eq!(weight_sum, 1.0, epsilon = 1e-10);

        let area_sum: f64 = result.estimated_areas_ha().values().sum();
        assert_abs_diff_eq!(area_sum, result.total_mapped_area_ha, epsilon = 1e-3);

        for class in &result.per_class {
            assert!(class.estimated_area_ci_ha.contains(class.estimated_area_ha));
            assert!(class.estimated_area_ci_ha.lower >= 0.0);
        }
        assert!(result.overall_accuracy_ci.contains(result.overall_accuracy));
        assert!(result.overall_accuracy_ci.upper <= 1.0);
    }

    #[test]
    fn test_missing_area() {
        let (m, mut areas, labels) = paper_case();
        areas.remove(&3);
        assert!(matches!(
            compute(&m, &areas, &labels, 1.96),
            Err(AccuracyError::MissingArea { label: 3 })
        ));
    }

    #[test]
    fn test_zero_total_area() {
        let (m, _, labels) = paper_case();
        let areas: BTreeMap<ClassLabel, f64> = labels.iter().map(|l| (l, 0.0)).collect();
        assert!(matches!(
            compute(&m, &areas, &labels, 1.96),
            Err(AccuracyError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_zero_sample_column() {
        let m = ConfusionMatrix::from_rows(&[[10u64, 0], [5, 0]]).unwrap();
        let labels = ClassLabelSet::new(vec![1, 2]).unwrap();
        let areas: BTreeMap<ClassLabel, f64> = [(1, 10.0), (2, 90.0)].into_iter().collect();
        assert!(matches!(
            compute(&m, &areas, &labels, 1.96),
            Err(AccuracyError::ZeroSampleColumn { label: 2 })
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let (m, areas, _) = paper_case();
        let labels = ClassLabelSet::new(vec![1, 2]).unwrap();
        assert!(matches!(
            compute(&m, &areas, &labels, 1.96),
            Err(AccuracyError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_reference_class_never_sampled_has_no_pa() {
        // Class 2 is mapped and sampled but never confirmed by reference.
        let m = ConfusionMatrix::from_rows(&[[10u64, 4], [0, 0]]).unwrap();
        let labels = ClassLabelSet::new(vec![1, 2]).unwrap();
        let areas: BTreeMap<ClassLabel, f64> = [(1, 50.0), (2, 50.0)].into_iter().collect();
        let result = compute(&m, &areas, &labels, 1.96).unwrap();
        assert_eq!(result.class(2).unwrap().producers_accuracy, None);
        assert_eq!(result.class(2).unwrap().users_accuracy, Some(0.0));
        assert_abs_diff_eq!(result.class(2).unwrap().estimated_area_ha, 0.0, epsilon = 1e-12);
    }
}
