//! Accuracy statistics computed from a confusion matrix.
//!
//! - [`confidence`]: z-scores, Wilson and Kappa intervals
//! - [`confusion`]: matrix construction, OA/PA/UA/F1, normalization
//! - [`kappa`]: Cohen's Kappa
//! - [`pontius`]: quantity and allocation disagreement
//! - [`olofsson`]: area-weighted estimation
//!
//! # Examples
//!
//! ```rust
//! use map_accuracy::core::types::ClassLabelSet;
//! use map_accuracy::metrics::{build_matrix, compute_metrics, kappa, pontius};
//!
//! # fn example() -> map_accuracy::Result<()> {
//! let labels = ClassLabelSet::new(vec![1, 2])?;
//! let classified = [1, 1, 2, 2, 1];
//! let reference = [1, 2, 2, 2, 1];
//! let matrix = build_matrix(&classified, &reference, &labels)?;
//!
//! let metrics = compute_metrics(&matrix, &labels, 0.95)?;
//! let disagreement = pontius::compute(&matrix)?;
//! assert!((disagreement.total_disagreement() - (1.0 - metrics.overall_accuracy)).abs() < 1e-9);
//!
//! let k = kappa::compute(&matrix)?;
//! println!("OA {:.3}, Kappa {:.3}", metrics.overall_accuracy, k.kappa);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod confidence;
pub mod confusion;
pub mod kappa;
pub mod olofsson;
pub mod pontius;

pub use confidence::{kappa_ci, probit, wilson_ci, z_score_for_confidence};
pub use confusion::{
    build_matrix, compute_metrics, normalize_confusion_matrix, ClassAccuracy, ConfusionMatrix,
    ConfusionMetrics,
};
pub use kappa::KappaResult;
pub use olofsson::{AreaWeightedResult, ClassAreaEstimate};
pub use pontius::{ClassDisagreement, DisagreementResult};
