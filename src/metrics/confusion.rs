//! Confusion matrix construction and basic accuracy metrics.
//!
//! Convention: rows are reference (true) classes, columns are classified
//! (predicted) classes, following Congalton & Green (2019). Row `i` and
//! column `i` both refer to the `i`-th label of the run's [`ClassLabelSet`].

use ndarray::{Array1, Array2, Axis};
use num_traits::PrimInt;
use serde::{Deserialize, Serialize};

use crate::core::error::{AccuracyError, Result};
use crate::core::types::{ClassLabel, ClassLabelSet, ConfidenceInterval, NormalizeAxis};
use crate::metrics::confidence::{wilson_ci, z_score_for_confidence};

/// Square matrix of co-occurrence counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Array2<u64>", into = "Array2<u64>")]
pub struct ConfusionMatrix {
    counts: Array2<u64>,
}

impl ConfusionMatrix {
    /// Wrap a count grid, which must be square and non-empty.
    pub fn from_counts(counts: Array2<u64>) -> Result<Self> {
        let (rows, cols) = counts.dim();
        if rows == 0 {
            return Err(AccuracyError::empty_input("confusion matrix has no classes"));
        }
        if rows != cols {
            return Err(AccuracyError::shape_mismatch(
                format!("({}, {})", rows, rows),
                format!("({}, {})", rows, cols),
            ));
        }
        Ok(ConfusionMatrix { counts })
    }

    /// Build from row slices, reference class first.
    pub fn from_rows<R: AsRef<[u64]>>(rows: &[R]) -> Result<Self> {
        let k = rows.len();
        let mut counts = Array2::zeros((k, k));
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != k {
                return Err(AccuracyError::shape_mismatch(
                    format!("row {} of length {}", i, k),
                    format!("length {}", row.len()),
                ));
            }
            for (j, &value) in row.iter().enumerate() {
                counts[[i, j]] = value;
            }
        }
        Self::from_counts(counts)
    }

    /// All-zero `k`×`k` matrix.
    pub fn zeros(k: usize) -> Self {
        ConfusionMatrix {
            counts: Array2::zeros((k, k)),
        }
    }

    /// Number of classes.
    pub fn k(&self) -> usize {
        self.counts.nrows()
    }

    /// Raw counts.
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Count at reference `row`, classified `col`.
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.counts[[row, col]]
    }

    /// Total number of samples, `N`.
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Reference totals, one per row.
    pub fn row_totals(&self) -> Array1<u64> {
        self.counts.sum_axis(Axis(1))
    }

    /// Classified totals, one per column.
    pub fn col_totals(&self) -> Array1<u64> {
        self.counts.sum_axis(Axis(0))
    }

    /// Agreement counts.
    pub fn diagonal(&self) -> Array1<u64> {
        self.counts.diag().to_owned()
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> u64 {
        self.counts.diag().sum()
    }

    /// Cell counts divided by `N`. Fails on an empty matrix.
    pub fn proportions(&self) -> Result<Array2<f64>> {
        let n = self.total();
        if n == 0 {
            return Err(AccuracyError::empty_input(
                "Confusion matrix has zero total samples",
            ));
        }
        let n = n as f64;
        Ok(self.counts.mapv(|c| c as f64 / n))
    }

    pub(crate) fn ensure_labels(&self, labels: &ClassLabelSet) -> Result<()> {
        let k = labels.len();
        if self.k() != k {
            return Err(AccuracyError::shape_mismatch(
                format!("({}, {}) for {} class labels", k, k, k),
                format!("({}, {})", self.k(), self.k()),
            ));
        }
        Ok(())
    }
}

impl TryFrom<Array2<u64>> for ConfusionMatrix {
    type Error = AccuracyError;

    fn try_from(counts: Array2<u64>) -> Result<Self> {
        ConfusionMatrix::from_counts(counts)
    }
}

impl From<ConfusionMatrix> for Array2<u64> {
    fn from(matrix: ConfusionMatrix) -> Self {
        matrix.counts
    }
}

/// Count co-occurrences of paired classified/reference values.
///
/// Pairs where either value is outside `labels` are dropped entirely. Values
/// that do not fit the label type count as outside.
pub fn build_matrix<T>(
    classified: &[T],
    reference: &[T],
    labels: &ClassLabelSet,
) -> Result<ConfusionMatrix>
where
    T: PrimInt,
{
    if classified.len() != reference.len() {
        return Err(AccuracyError::LengthMismatch {
            classified: classified.len(),
            reference: reference.len(),
        });
    }
    if classified.is_empty() {
        return Err(AccuracyError::empty_input(
            "Cannot build confusion matrix from empty arrays",
        ));
    }

    let lookup = |value: &T| -> Option<usize> {
        value
            .to_i64()
            .and_then(|label: ClassLabel| labels.index_of(label))
    };

    let mut matrix = ConfusionMatrix::zeros(labels.len());
    let mut dropped = 0usize;
    for (c_val, r_val) in classified.iter().zip(reference) {
        match (lookup(r_val), lookup(c_val)) {
            (Some(r), Some(c)) => matrix.counts[[r, c]] += 1,
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!(
            "{} of {} sample pairs fall outside the class label set",
            dropped,
            classified.len()
        );
    }

    Ok(matrix)
}

/// Per-class accuracy. Ratios are `None` where their denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAccuracy {
    /// Class label
    pub label: ClassLabel,
    /// Reference samples of the class (row total)
    pub reference_total: u64,
    /// Samples classified as the class (column total)
    pub classified_total: u64,
    /// Producer's accuracy, diagonal / row total
    pub producers_accuracy: Option<f64>,
    /// Wilson interval of the producer's accuracy
    pub producers_accuracy_ci: Option<ConfidenceInterval>,
    /// User's accuracy, diagonal / column total
    pub users_accuracy: Option<f64>,
    /// Wilson interval of the user's accuracy
    pub users_accuracy_ci: Option<ConfidenceInterval>,
    /// Harmonic mean of PA and UA
    pub f1: Option<f64>,
}

impl ClassAccuracy {
    /// Precision, identical to the user's accuracy.
    pub fn precision(&self) -> Option<f64> {
        self.users_accuracy
    }

    /// Recall, identical to the producer's accuracy.
    pub fn recall(&self) -> Option<f64> {
        self.producers_accuracy
    }
}

/// Overall and per-class accuracy of one confusion matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMetrics {
    /// Samples in the matrix
    pub n_samples: u64,
    /// Trace / N
    pub overall_accuracy: f64,
    /// Wilson interval over N
    pub overall_accuracy_ci: ConfidenceInterval,
    /// One entry per label, in label order
    pub per_class: Vec<ClassAccuracy>,
}

impl ConfusionMetrics {
    /// Metrics of a single class.
    pub fn class(&self, label: ClassLabel) -> Option<&ClassAccuracy> {
        self.per_class.iter().find(|c| c.label == label)
    }
}

/// Compute overall, producer's and user's accuracy with Wilson intervals, and F1.
pub fn compute_metrics(
    matrix: &ConfusionMatrix,
    labels: &ClassLabelSet,
    confidence_level: f64,
) -> Result<ConfusionMetrics> {
    matrix.ensure_labels(labels)?;

    let n = matrix.total();
    if n == 0 {
        return Err(AccuracyError::empty_input(
            "Confusion matrix has zero total samples",
        ));
    }

    let z = z_score_for_confidence(confidence_level)?;
    let row_totals = matrix.row_totals();
    let col_totals = matrix.col_totals();
    let diagonal = matrix.diagonal();

    let overall_accuracy = matrix.trace() as f64 / n as f64;
    let overall_accuracy_ci = wilson_ci(overall_accuracy, n, z);

    let per_class = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let ratio = |total: u64| {
                (total > 0).then(|| {
                    let value = diagonal[i] as f64 / total as f64;
                    (value, wilson_ci(value, total, z))
                })
            };
            let pa = ratio(row_totals[i]);
            let ua = ratio(col_totals[i]);

            let f1 = match (pa, ua) {
                (Some((p, _)), Some((u, _))) if p + u > 0.0 => Some(2.0 * p * u / (p + u)),
                _ => None,
            };

            ClassAccuracy {
                label,
                reference_total: row_totals[i],
                classified_total: col_totals[i],
                producers_accuracy: pa.map(|(v, _)| v),
                producers_accuracy_ci: pa.map(|(_, ci)| ci),
                users_accuracy: ua.map(|(v, _)| v),
                users_accuracy_ci: ua.map(|(_, ci)| ci),
                f1,
            }
        })
        .collect();

    Ok(ConfusionMetrics {
        n_samples: n,
        overall_accuracy,
        overall_accuracy_ci,
        per_class,
    })
}

/// Percentages along `axis`; zero-sum rows or columns stay all zero.
pub fn normalize_confusion_matrix(matrix: &ConfusionMatrix, axis: NormalizeAxis) -> Array2<f64> {
    let counts = matrix.counts().mapv(|c| c as f64);
    let mut out = Array2::zeros(counts.raw_dim());

    let sum_axis = match axis {
        NormalizeAxis::Rows => Axis(0),
        NormalizeAxis::Columns => Axis(1),
    };

    for (mut target, source) in out
        .axis_iter_mut(sum_axis)
        .zip(counts.axis_iter(sum_axis))
    {
        let total: f64 = source.sum();
        if total > 0.0 {
            target.assign(&source.mapv(|c| c / total * 100.0));
        }
    }

    out
}
