//! # map-accuracy
//!
//! Accuracy assessment and sampling design for classified raster maps.
//!
//! Given a land-cover classification and a set of reference observations,
//! the crate builds the confusion matrix, reports overall, producer's and
//! user's accuracy with Wilson intervals, decomposes disagreement into
//! quantity and allocation components, optionally computes Cohen's Kappa,
//! and estimates area-weighted accuracy and class areas with confidence
//! intervals. For the design side it computes the required sample size,
//! allocates it across strata and draws a seeded stratified random sample
//! with an optional minimum distance between points.
//!
//! ## Features
//!
//! - **Wilson intervals** for every proportion, well-behaved at 0 and 1
//! - **Pontius decomposition** with the QD + AD = 1 - OA identity checked
//! - **Olofsson area estimation** with stratified standard errors
//! - **Reproducible sampling**: the same seed and inputs give the same points
//! - **Proximity strategies**: k-d tree (feature `spatial-index`) or brute force
//!
//! ## Quick Start
//!
//! ```rust
//! use map_accuracy::{
//!     run_accuracy_assessment, AccuracyConfig, AccuracyInputs, ClassLabelSet, RasterInfo,
//!     SourceInfo,
//! };
//!
//! # fn main() -> map_accuracy::Result<()> {
//! let classified = vec![Some(1), Some(1), Some(2), Some(2), None];
//! let reference = vec![Some(1), Some(2), Some(2), Some(2), Some(1)];
//!
//! let inputs = AccuracyInputs {
//!     classified,
//!     reference,
//!     class_labels: ClassLabelSet::new(vec![1, 2])?,
//!     class_names: Default::default(),
//!     pixel_counts: [(1, 600), (2, 400)].into_iter().collect(),
//!     raster: RasterInfo::projected(32633, 30.0),
//!     source: SourceInfo::default(),
//! };
//! let config = AccuracyConfig::builder()
//!     .compute_kappa(true)
//!     .min_samples_per_class(1)
//!     .build()?;
//!
//! let run = run_accuracy_assessment(&inputs, &config)?;
//! assert_eq!(run.assessment.n_excluded_nodata, 1);
//! println!("OA = {:.3}", run.assessment.overall_accuracy());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: value types, constants and the error type
//! - [`config`]: run configuration and input validation
//! - [`metrics`]: statistics over a confusion matrix
//! - [`sampling`]: sample size, allocation and stratified selection
//! - [`workflow`]: end-to-end pipelines, provenance and methods text

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration and validation
pub mod config;

// Accuracy statistics
pub mod metrics;

// Sample design
pub mod sampling;

// End-to-end pipelines
pub mod workflow;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{AccuracyError, Result},
    types::*,
};

// Re-export configuration functionality
pub use config::{
    core::{
        AccuracyConfig, AccuracyConfigBuilder, AllocationMethod, SamplingConfig,
        SamplingConfigBuilder,
    },
    validation::{ValidationIssue, ValidationReport, ValidationSeverity},
};

// Re-export statistics
pub use metrics::{
    AreaWeightedResult, ClassAccuracy, ConfusionMatrix, ConfusionMetrics, DisagreementResult,
    KappaResult,
};

// Re-export sampling
pub use sampling::{DistanceStrategy, SampleDesign, SamplePoint, SampleSet, StratumInfo};

// Re-export workflows
pub use workflow::{
    generate_methods_text, generate_references, run_accuracy_assessment, run_sample_generation,
    sampling_metadata, AccuracyAssessment, AccuracyInputs, AccuracyRun, RunMetadata, SamplingInputs, SourceInfo,
};

// Version information
pub use self::core::constants::MAP_ACCURACY_VERSION as VERSION;

/// Initialize the library.
///
/// Installs an `env_logger` logger (level from `RUST_LOG`, `info` by
/// default) unless the host already installed one. Calling it is optional;
/// without it log records are simply dropped.
///
/// # Examples
///
/// ```rust
/// fn main() -> map_accuracy::Result<()> {
///     map_accuracy::init()?;
///     assert!(map_accuracy::is_initialized());
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    core::is_core_initialized()
}

/// Get capability information of this build.
///
/// ```rust
/// let caps = map_accuracy::capabilities();
/// println!("{}", caps.summary());
/// ```
pub fn capabilities() -> core::CoreCapabilities {
    core::CoreCapabilities::default()
}
