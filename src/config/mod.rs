//! Configuration management for accuracy assessment and sample design.
//!
//! [`AccuracyConfig`] and [`SamplingConfig`] hold the run parameters,
//! [`validation`] holds the structured findings the accuracy workflow
//! collects before computing anything.

pub mod core;
pub mod validation;

pub use self::core::{
    AccuracyConfig, AccuracyConfigBuilder, AllocationMethod, SamplingConfig,
    SamplingConfigBuilder,
};
pub use validation::{
    validate_accuracy_inputs, AccuracyInputSummary, ValidationIssue, ValidationReport,
    ValidationSeverity,
};
