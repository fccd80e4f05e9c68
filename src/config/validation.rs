//! Input validation for accuracy assessment runs.
//!
//! Findings are collected, never acted on here. The accuracy workflow decides
//! whether to proceed: any [`ValidationSeverity::Fatal`] finding blocks the
//! run, everything else is handed back to the caller with the result.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::core::types::{ClassLabel, RasterInfo};

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationSeverity {
    /// Blocks the computation
    Fatal,
    /// Serious, reported but not blocking
    Error,
    /// Informational
    Warning,
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationSeverity::Fatal => "FATAL",
            ValidationSeverity::Error => "ERROR",
            ValidationSeverity::Warning => "WARNING",
        };
        f.write_str(name)
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity
    pub severity: ValidationSeverity,
    /// What was found
    pub message: String,
    /// Suggested fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a finding without a suggestion
    pub fn new<S: Into<String>>(severity: ValidationSeverity, message: S) -> Self {
        ValidationIssue {
            severity,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a suggested fix
    pub fn with_suggestion<S: Into<String>>(mut self, suggestion: S) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Whether this finding blocks the computation
    pub fn is_fatal(&self) -> bool {
        self.severity == ValidationSeverity::Fatal
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Aggregated validation findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All findings in the order they were produced
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no finding is fatal
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_fatal)
    }

    /// True when at least one warning was produced
    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Warning)
    }

    /// Fatal findings only
    pub fn fatal_issues(&self) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.is_fatal()).collect()
    }

    /// Warnings only
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .collect()
    }

    fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            ValidationSeverity::Fatal | ValidationSeverity::Error => {
                log::error!("{}", issue)
            }
            ValidationSeverity::Warning => log::warn!("{}", issue),
        }
        self.issues.push(issue);
    }
}

/// What the accuracy workflow knows about its inputs before any math runs
#[derive(Debug, Clone)]
pub struct AccuracyInputSummary<'a> {
    /// Classified raster properties
    pub raster: &'a RasterInfo,
    /// Distinct reference values among valid samples
    pub reference_classes: &'a BTreeSet<ClassLabel>,
    /// Distinct classified values among valid samples
    pub classified_classes: &'a BTreeSet<ClassLabel>,
    /// Samples left after nodata exclusion
    pub n_reference_samples: usize,
    /// Samples dropped as nodata
    pub n_excluded_nodata: usize,
    /// Whether area-weighted estimation was requested
    pub area_weighted: bool,
    /// Recommended minimum reference samples per class
    pub min_samples_per_class: usize,
    /// Reference sample count per class
    pub class_sample_counts: Option<&'a BTreeMap<ClassLabel, usize>>,
}

/// Validate inputs for a categorical accuracy assessment.
pub fn validate_accuracy_inputs(inputs: &AccuracyInputSummary<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if inputs.area_weighted && inputs.raster.crs_is_geographic {
        report.push(
            ValidationIssue::new(
                ValidationSeverity::Fatal,
                format!(
                    "Area-weighted analysis requires projected CRS. Raster CRS is EPSG:{} (geographic/degrees).",
                    inputs.raster.epsg_or_zero()
                ),
            )
            .with_suggestion(
                "Reproject the raster to a projected CRS (e.g., UTM), or disable area-weighted analysis.",
            ),
        );
    }

    if inputs.n_reference_samples == 0 {
        report.push(ValidationIssue::new(
            ValidationSeverity::Fatal,
            "No valid reference samples after nodata exclusion.",
        ));
        return report;
    }

    if inputs.n_excluded_nodata > 0 {
        let total = inputs.n_reference_samples + inputs.n_excluded_nodata;
        let pct = inputs.n_excluded_nodata as f64 / total as f64 * 100.0;
        report.push(ValidationIssue::new(
            ValidationSeverity::Warning,
            format!(
                "{} of {} samples excluded (nodata) ({:.1}%).",
                inputs.n_excluded_nodata, total, pct
            ),
        ));
    }

    let reference_only: Vec<ClassLabel> = inputs
        .reference_classes
        .difference(inputs.classified_classes)
        .copied()
        .collect();
    let classified_only: Vec<ClassLabel> = inputs
        .classified_classes
        .difference(inputs.reference_classes)
        .copied()
        .collect();

    if !reference_only.is_empty() {
        report.push(
            ValidationIssue::new(
                ValidationSeverity::Warning,
                format!(
                    "Reference classes {:?} not found in classified data at sample locations.",
                    reference_only
                ),
            )
            .with_suggestion("These classes will have 0 user's accuracy."),
        );
    }
    if !classified_only.is_empty() {
        report.push(
            ValidationIssue::new(
                ValidationSeverity::Warning,
                format!(
                    "Classified classes {:?} not found in reference data.",
                    classified_only
                ),
            )
            .with_suggestion("These classes will have 0 producer's accuracy."),
        );
    }

    if let Some(counts) = inputs.class_sample_counts {
        for (&label, &count) in counts {
            if count < inputs.min_samples_per_class {
                report.push(
                    ValidationIssue::new(
                        ValidationSeverity::Warning,
                        format!(
                            "Class {} has only {} reference samples. Minimum recommended: {}.",
                            label, count, inputs.min_samples_per_class
                        ),
                    )
                    .with_suggestion(
                        "Per-class metrics may be unreliable. Consider collecting more reference data for this class.",
                    ),
                );
            }
        }
    }

    report
}
