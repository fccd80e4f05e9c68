//! Total sample size (Cochran, 1977) and its allocation across strata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::constants::RECOMMENDED_MIN_SAMPLES_PER_CLASS;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::{label_keys, ClassLabel};
use crate::metrics::confidence::z_score_for_confidence;

/// Per-class sample counts plus the warnings produced while computing them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Sample count per class
    #[serde(with = "label_keys")]
    pub per_class: BTreeMap<ClassLabel, usize>,
    /// Human-readable warnings
    pub warnings: Vec<String>,
}

impl Allocation {
    /// Sum of all class counts
    pub fn total(&self) -> usize {
        self.per_class.values().sum()
    }

    /// Count for one class, 0 if absent
    pub fn get(&self, label: ClassLabel) -> usize {
        self.per_class.get(&label).copied().unwrap_or(0)
    }
}

fn check_open_unit(parameter: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(AccuracyError::invalid_parameter(
            parameter,
            value,
            "must be in the open interval (0, 1)",
        ));
    }
    Ok(())
}

/// Cochran's sample size `n = z^2 p (1 - p) / E^2`, rounded up.
///
/// A non-zero `population_size` applies the finite population correction
/// `n / (1 + n / N)`. Zero means an infinite population.
pub fn calculate_sample_size(
    confidence_level: f64,
    expected_accuracy: f64,
    margin_of_error: f64,
    population_size: u64,
) -> Result<usize> {
    check_open_unit("expected_accuracy", expected_accuracy)?;
    check_open_unit("margin_of_error", margin_of_error)?;
    check_open_unit("confidence_level", confidence_level)?;

    let z = z_score_for_confidence(confidence_level)?;
    let p = expected_accuracy;

    let mut n = z * z * p * (1.0 - p) / (margin_of_error * margin_of_error);
    if population_size > 0 {
        n /= 1.0 + n / population_size as f64;
    }

    Ok(n.ceil() as usize)
}

/// Allocate `total_n` samples in proportion to class pixel counts.
///
/// Every class gets at least one sample and never more than its pixel count.
/// Classes below `min_per_class` are raised to it when they have enough
/// pixels, otherwise they receive all of their pixels. The resulting surplus or deficit is taken from the remaining
/// classes so the counts sum to `total_n` whenever the constraints allow;
/// otherwise a warning states the achieved total.
pub fn allocate_proportional(
    total_n: usize,
    class_pixel_counts: &BTreeMap<ClassLabel, u64>,
    min_per_class: usize,
) -> Result<Allocation> {
    if class_pixel_counts.is_empty() {
        return Err(AccuracyError::empty_input("No classes provided"));
    }
    let total_pixels: u64 = class_pixel_counts.values().sum();
    if total_pixels == 0 {
        return Err(AccuracyError::empty_input("Total pixel count is zero"));
    }

    let mut warnings = Vec::new();
    let mut allocation: BTreeMap<ClassLabel, i64> = class_pixel_counts
        .iter()
        .map(|(&label, &pixels)| {
            let share = pixels as f64 / total_pixels as f64;
            let n = (total_n as f64 * share).round_ties_even() as i64;
            (label, n.max(1))
        })
        .collect();

    let min = min_per_class as i64;
    let mut bumped = Vec::new();
    let mut capped = Vec::new();
    for (&label, n) in allocation.iter_mut() {
        let pixels = class_pixel_counts[&label] as i64;
        if *n >= min {
            if *n > pixels {
                capped.push(label);
                warnings.push(format!(
                    "Class {}: proportional share of {} exceeds the {} available pixels. Allocating all available pixels.",
                    label, n, pixels
                ));
                *n = pixels;
            }
            continue;
        }
        if pixels >= min {
            bumped.push(label);
            *n = min;
        } else {
            capped.push(label);
            *n = pixels;
            warnings.push(format!(
                "Class {}: only {} pixels available (< {} minimum). Allocating all available pixels.",
                label, pixels, min_per_class
            ));
        }
    }

    if !bumped.is_empty() {
        warnings.push(format!(
            "Classes {:?} bumped to minimum {} samples (proportional allocation was lower).",
            bumped, min_per_class
        ));
    }

    let adjustable: Vec<ClassLabel> = allocation
        .keys()
        .copied()
        .filter(|l| !bumped.contains(l) && !capped.contains(l))
        .collect();
    let ceiling = |label: ClassLabel| class_pixel_counts[&label] as i64;

    let current: i64 = allocation.values().sum();
    let diff = total_n as i64 - current;
    let adjustable_total: i64 = adjustable.iter().map(|l| allocation[l]).sum();
    if diff != 0 && adjustable_total > 0 {
        for &label in &adjustable {
            let n = allocation[&label];
            let share = n as f64 / adjustable_total as f64;
            let adjusted = n + (diff as f64 * share).round_ties_even() as i64;
            allocation.insert(label, adjusted.clamp(1, ceiling(label).max(1)));
        }
    }

    // Settle what rounding left over, one sample at a time, largest class first.
    let mut order = adjustable.clone();
    order.sort_by(|a, b| allocation[b].cmp(&allocation[a]).then(a.cmp(b)));
    let mut residual = total_n as i64 - allocation.values().sum::<i64>();
    while residual != 0 {
        let mut moved = false;
        for &label in &order {
            if residual == 0 {
                break;
            }
            let n = allocation[&label];
            if residual > 0 && n < ceiling(label) {
                allocation.insert(label, n + 1);
                residual -= 1;
                moved = true;
            } else if residual < 0 && n > 1 {
                allocation.insert(label, n - 1);
                residual += 1;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }

    let per_class: BTreeMap<ClassLabel, usize> = allocation
        .into_iter()
        .map(|(label, n)| (label, n.max(0) as usize))
        .collect();

    let achieved: usize = per_class.values().sum();
    if achieved != total_n {
        warnings.push(format!(
            "Allocated {} samples instead of the requested {} (class minimums or pixel counts prevent an exact split).",
            achieved, total_n
        ));
    }

    for warning in &warnings {
        log::warn!("{}", warning);
    }
    log::debug!("Proportional allocation: {:?}", per_class);

    Ok(Allocation {
        per_class,
        warnings,
    })
}

/// Allocate `total_n` samples equally, the remainder going to the lowest labels.
pub fn allocate_equal(total_n: usize, class_labels: &[ClassLabel]) -> Result<Allocation> {
    let mut labels = class_labels.to_vec();
    labels.sort_unstable();
    labels.dedup();
    if labels.is_empty() {
        return Err(AccuracyError::empty_input("No classes provided"));
    }

    let k = labels.len();
    let base = total_n / k;
    let remainder = total_n % k;

    let per_class = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| (label, base + usize::from(i < remainder)))
        .collect();

    let mut warnings = Vec::new();
    if base < RECOMMENDED_MIN_SAMPLES_PER_CLASS {
        let warning = format!(
            "Equal allocation gives {} samples per class. Minimum recommended is {} (Olofsson et al. 2014).",
            base, RECOMMENDED_MIN_SAMPLES_PER_CLASS
        );
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    Ok(Allocation {
        per_class,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels(entries: &[(ClassLabel, u64)]) -> BTreeMap<ClassLabel, u64> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_cochran_textbook_value() {
        assert_eq!(calculate_sample_size(0.95, 0.85, 0.05, 0).unwrap(), 196);
    }

    #[test]
    fn test_cochran_monotonicity() {
        let base = calculate_sample_size(0.95, 0.85, 0.05, 0).unwrap();
        assert!(calculate_sample_size(0.95, 0.85, 0.03, 0).unwrap() > base);
        assert!(calculate_sample_size(0.99, 0.85, 0.05, 0).unwrap() > base);
        assert!(calculate_sample_size(0.95, 0.85, 0.05, 1000).unwrap() < base);
        assert!(calculate_sample_size(0.95, 0.5, 0.05, 0).unwrap() > base);
    }

    #[test]
    fn test_cochran_rejects_bad_parameters() {
        for (c, p, e) in [(1.0, 0.85, 0.05), (0.95, 0.0, 0.05), (0.95, 0.85, 1.0)] {
            assert!(matches!(
                calculate_sample_size(c, p, e, 0),
                Err(AccuracyError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_proportional_bumps_small_classes() {
        let allocation =
            allocate_proportional(100, &pixels(&[(1, 9000), (2, 900), (3, 100)]), 25).unwrap();
        assert_eq!(allocation.get(1), 50);
        assert_eq!(allocation.get(2), 25);
        assert_eq!(allocation.get(3), 25);
        assert_eq!(allocation.total(), 100);
        assert!(allocation.warnings.iter().any(|w| w.contains("[2, 3] bumped")));
    }

    #[test]
    fn test_proportional_caps_tiny_classes() {
        let allocation =
            allocate_proportional(200, &pixels(&[(1, 50_000), (2, 40_000), (3, 10)]), 25).unwrap();
        assert_eq!(allocation.get(3), 10);
        assert_eq!(allocation.total(), 200);
        assert!(allocation.warnings[0].starts_with("Class 3: only 10 pixels"));
    }

    #[test]
    fn test_proportional_never_exceeds_pixels() {
        // 50 samples over 6 pixels: every share is larger than its class.
        let allocation =
            allocate_proportional(50, &pixels(&[(1, 1), (2, 2), (3, 3)]), 1).unwrap();
        assert_eq!(allocation.get(1), 1);
        assert_eq!(allocation.get(2), 2);
        assert_eq!(allocation.get(3), 3);
        assert!(allocation.warnings[0].starts_with("Class 1: proportional share of 8 exceeds"));
        assert!(allocation
            .warnings
            .iter()
            .any(|w| w.starts_with("Allocated 6 samples instead of the requested 50")));
    }

    #[test]
    fn test_proportional_empty_class_gets_nothing() {
        let allocation =
            allocate_proportional(50, &pixels(&[(1, 0), (2, 500), (3, 500)]), 1).unwrap();
        assert_eq!(allocation.get(1), 0);
        assert_eq!(allocation.get(2), 25);
        assert_eq!(allocation.get(3), 25);
        assert_eq!(allocation.total(), 50);
    }

    #[test]
    fn test_proportional_exact_sum_after_rounding() {
        // Three equal classes: 100 / 3 rounds to 33 each.
        let allocation =
            allocate_proportional(100, &pixels(&[(1, 1000), (2, 1000), (3, 1000)]), 25).unwrap();
        assert_eq!(allocation.total(), 100);
        assert!(allocation.per_class.values().all(|&n| n == 33 || n == 34));
    }

    #[test]
    fn test_proportional_unreachable_total_warns() {
        // Minimums alone exceed the requested total.
        let allocation =
            allocate_proportional(30, &pixels(&[(1, 1000), (2, 1000), (3, 1000)]), 25).unwrap();
        assert_eq!(allocation.total(), 75);
        assert!(allocation
            .warnings
            .iter()
            .any(|w| w.starts_with("Allocated 75 samples instead of the requested 30")));
    }

    #[test]
    fn test_proportional_errors() {
        assert!(matches!(
            allocate_proportional(100, &BTreeMap::new(), 25),
            Err(AccuracyError::EmptyInput { .. })
        ));
        assert!(matches!(
            allocate_proportional(100, &pixels(&[(1, 0), (2, 0)]), 25),
            Err(AccuracyError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_equal_allocation() {
        let allocation = allocate_equal(100, &[3, 1, 2]).unwrap();
        assert_eq!(allocation.total(), 100);
        assert_eq!(allocation.get(1), 34);
        assert_eq!(allocation.get(2), 33);
        assert_eq!(allocation.get(3), 33);
        assert!(allocation.warnings.is_empty());

        let small = allocate_equal(40, &[1, 2]).unwrap();
        assert_eq!(small.get(1), 20);
        assert_eq!(small.warnings.len(), 1);

        assert!(allocate_equal(10, &[]).is_err());
    }
}
