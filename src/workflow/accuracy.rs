//! Accuracy assessment pipeline: validate, build the matrix, compute, package.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::validation::{validate_accuracy_inputs, AccuracyInputSummary, ValidationReport};
use crate::config::AccuracyConfig;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::{label_keys, ClassLabel, ClassLabelSet, RasterInfo};
use crate::metrics::confidence::z_score_for_confidence;
use crate::metrics::confusion::{build_matrix, compute_metrics, ConfusionMatrix, ConfusionMetrics};
use crate::metrics::kappa::{self, KappaResult};
use crate::metrics::olofsson::{self, AreaWeightedResult};
use crate::metrics::pontius::{self, DisagreementResult};
use crate::workflow::area::compute_class_areas_ha;
use crate::workflow::provenance::{RunMetadata, SourceInfo};

/// Everything an assessment consumes, already read from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyInputs {
    /// Classified value at each reference sample, `None` for nodata
    pub classified: Vec<Option<ClassLabel>>,
    /// Reference value of each sample, `None` for missing
    pub reference: Vec<Option<ClassLabel>>,
    /// Classes of the assessment in matrix order
    pub class_labels: ClassLabelSet,
    /// Display names
    #[serde(default, with = "label_keys")]
    pub class_names: BTreeMap<ClassLabel, String>,
    /// Mapped pixels per class of the classified raster
    #[serde(default, with = "label_keys")]
    pub pixel_counts: BTreeMap<ClassLabel, u64>,
    /// Classified raster properties
    pub raster: RasterInfo,
    /// Provenance strings
    #[serde(default)]
    pub source: SourceInfo,
}

/// Complete categorical accuracy assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyAssessment {
    /// Reference rows, classified columns
    pub matrix: ConfusionMatrix,
    /// Matrix order
    pub class_labels: ClassLabelSet,
    /// Display names
    #[serde(with = "label_keys")]
    pub class_names: BTreeMap<ClassLabel, String>,
    /// Samples left after nodata exclusion
    pub n_samples: usize,
    /// Samples dropped as nodata
    pub n_excluded_nodata: usize,
    /// OA, PA, UA, F1 with intervals
    pub metrics: ConfusionMetrics,
    /// Quantity and allocation disagreement
    pub disagreement: DisagreementResult,
    /// Cohen's Kappa, when requested
    pub kappa: Option<KappaResult>,
    /// Olofsson estimates, when requested
    pub area_weighted: Option<AreaWeightedResult>,
}

impl AccuracyAssessment {
    /// Overall accuracy
    pub fn overall_accuracy(&self) -> f64 {
        self.metrics.overall_accuracy
    }

    /// Display name of a class, its number when unnamed
    pub fn class_name(&self, label: ClassLabel) -> String {
        self.class_names
            .get(&label)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }
}

/// Result, non-fatal findings and provenance of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRun {
    /// Computed assessment
    pub assessment: AccuracyAssessment,
    /// All validation findings, none of them fatal
    pub validation: ValidationReport,
    /// Provenance
    pub metadata: RunMetadata,
}

/// Run the accuracy assessment.
///
/// Fails with [`AccuracyError::ValidationFailure`] when input validation
/// produces a fatal finding. Non-fatal findings come back in the result.
pub fn run_accuracy_assessment(
    inputs: &AccuracyInputs,
    config: &AccuracyConfig,
) -> Result<AccuracyRun> {
    config.validate()?;

    crate::ensure!(
        inputs.classified.len() == inputs.reference.len(),
        AccuracyError::LengthMismatch {
            classified: inputs.classified.len(),
            reference: inputs.reference.len(),
        }
    );

    log::info!(
        "Accuracy assessment: {} samples, {} classes",
        inputs.reference.len(),
        inputs.class_labels.len()
    );

    let (classified, reference): (Vec<ClassLabel>, Vec<ClassLabel>) = inputs
        .classified
        .iter()
        .zip(&inputs.reference)
        .filter_map(|(c, r)| Some((config.map_class((*c)?), (*r)?)))
        .unzip();
    let n_valid = reference.len();
    let n_excluded = inputs.reference.len() - n_valid;

    let classified_classes: BTreeSet<ClassLabel> = classified.iter().copied().collect();
    let reference_classes: BTreeSet<ClassLabel> = reference.iter().copied().collect();
    let class_sample_counts: BTreeMap<ClassLabel, usize> = inputs
        .class_labels
        .iter()
        .map(|label| (label, reference.iter().filter(|&&r| r == label).count()))
        .collect();

    let validation = validate_accuracy_inputs(&AccuracyInputSummary {
        raster: &inputs.raster,
        reference_classes: &reference_classes,
        classified_classes: &classified_classes,
        n_reference_samples: n_valid,
        n_excluded_nodata: n_excluded,
        area_weighted: config.compute_area_weighted,
        min_samples_per_class: config.min_samples_per_class,
        class_sample_counts: Some(&class_sample_counts),
    });
    if !validation.is_valid() {
        return Err(AccuracyError::ValidationFailure {
            issues: validation.issues,
        });
    }
    log::info!(
        "Validation passed with {} finding(s)",
        validation.issues.len()
    );

    let labels = &inputs.class_labels;
    let matrix = build_matrix(&classified, &reference, labels)?;
    let metrics = compute_metrics(&matrix, labels, config.confidence_level)?;
    let disagreement = pontius::compute(&matrix)?;
    let z = z_score_for_confidence(config.confidence_level)?;

    let kappa = if config.compute_kappa {
        Some(kappa::compute_with_z(&matrix, z)?)
    } else {
        None
    };

    let area_weighted = if config.compute_area_weighted {
        let areas = compute_class_areas_ha(&inputs.raster, &inputs.pixel_counts, Some(labels))?;
        Some(olofsson::compute(&matrix, &areas.area_ha, labels, z)?)
    } else {
        None
    };

    log::info!(
        "OA {:.4} (QD {:.4}, AD {:.4})",
        metrics.overall_accuracy,
        disagreement.quantity_disagreement,
        disagreement.allocation_disagreement
    );

    let assessment = AccuracyAssessment {
        matrix,
        class_labels: labels.clone(),
        class_names: inputs.class_names.clone(),
        n_samples: n_valid,
        n_excluded_nodata: n_excluded,
        metrics,
        disagreement,
        kappa,
        area_weighted,
    };

    let metadata = RunMetadata::new(&inputs.source, inputs.raster.crs_epsg)
        .with_class_mapping(config.class_mapping.clone())
        .with_parameter("compute_kappa", config.compute_kappa)
        .with_parameter("compute_area_weighted", config.compute_area_weighted)
        .with_parameter("confidence_level", config.confidence_level)
        .with_parameter("n_classes", labels.len() as u64);

    Ok(AccuracyRun {
        assessment,
        validation,
        metadata,
    })
}
