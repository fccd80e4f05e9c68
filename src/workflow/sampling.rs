//! Sample design pipeline: size, allocate, draw.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{AllocationMethod, SamplingConfig};
use crate::core::constants::STRATIFIED_RANDOM_SCHEME;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::{label_keys, ClassLabel, Coordinate};
use crate::sampling::{
    allocate_equal, allocate_proportional, calculate_sample_size, SampleDesign, SampleSet,
    StratifiedSampler, StratumInfo,
};
use crate::workflow::provenance::{RunMetadata, SourceInfo};

/// Class statistics and candidate locations of the classified raster
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplingInputs {
    /// Mapped pixels per class
    #[serde(with = "label_keys")]
    pub pixel_counts: BTreeMap<ClassLabel, u64>,
    /// Candidate pixel centres per class
    #[serde(with = "label_keys")]
    pub candidates: BTreeMap<ClassLabel, Vec<Coordinate>>,
    /// Display names
    #[serde(default, with = "label_keys")]
    pub class_names: BTreeMap<ClassLabel, String>,
}

/// Generate a stratified random sample design.
///
/// The total comes from `total_n_override` when set, otherwise from Cochran's
/// formula with the raster's pixel count as population. A non-empty
/// `allocation_override` replaces the computed allocation; classes absent
/// from the raster are ignored and the total becomes the sum of what is left.
pub fn run_sample_generation(
    inputs: &SamplingInputs,
    config: &SamplingConfig,
    progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<SampleSet> {
    config.validate()?;

    if inputs.pixel_counts.is_empty() {
        return Err(AccuracyError::empty_input(
            "No valid pixels found in classified raster",
        ));
    }
    let total_pixels: u64 = inputs.pixel_counts.values().sum();

    let mut warnings = Vec::new();
    let (total_n, n_per_class) = if config.allocation_override.is_empty() {
        let total_n = match config.total_n_override {
            Some(n) => n,
            None => calculate_sample_size(
                config.confidence_level,
                config.expected_accuracy,
                config.margin_of_error,
                total_pixels,
            )?,
        };
        log::info!(
            "Sample size {} over {} classes ({} allocation)",
            total_n,
            inputs.pixel_counts.len(),
            config.allocation
        );

        let allocation = match config.allocation {
            AllocationMethod::Proportional => {
                allocate_proportional(total_n, &inputs.pixel_counts, config.min_per_class)?
            }
            AllocationMethod::Equal => {
                let labels: Vec<ClassLabel> = inputs.pixel_counts.keys().copied().collect();
                allocate_equal(total_n, &labels)?
            }
        };
        warnings.extend(allocation.warnings);
        (total_n, allocation.per_class)
    } else {
        let n_per_class: BTreeMap<ClassLabel, usize> = config
            .allocation_override
            .iter()
            .filter(|(label, _)| inputs.pixel_counts.contains_key(label))
            .map(|(&label, &n)| (label, n))
            .collect();
        let total_n = n_per_class.values().sum();
        log::info!("Using fixed allocation of {} samples", total_n);
        (total_n, n_per_class)
    };

    let mut sampler = StratifiedSampler::new(config.seed)
        .min_distance(config.min_distance)
        .strategy(config.distance_strategy);
    if let Some(callback) = progress {
        sampler = sampler.on_progress(move |done, total| callback(done, total));
    }
    let sample = sampler.generate(&inputs.candidates, &n_per_class)?;
    warnings.extend(sample.warnings);

    let strata_info = n_per_class
        .iter()
        .map(|(&label, &n_requested)| {
            let info = StratumInfo {
                name: inputs
                    .class_names
                    .get(&label)
                    .cloned()
                    .unwrap_or_else(|| format!("Class {}", label)),
                pixel_count: inputs.pixel_counts.get(&label).copied().unwrap_or(0),
                n_requested,
                n_generated: sample
                    .points
                    .iter()
                    .filter(|p| p.stratum_class == label)
                    .count(),
            };
            (label, info)
        })
        .collect();

    let design = SampleDesign {
        scheme: STRATIFIED_RANDOM_SCHEME.to_string(),
        total_n,
        allocation: config.allocation,
        n_per_class,
        min_distance: config.min_distance,
        confidence_level: config.confidence_level,
        expected_accuracy: config.expected_accuracy,
        margin_of_error: config.margin_of_error,
        random_seed: config.seed,
    };

    log::info!(
        "Generated {} of {} samples",
        sample.points.len(),
        design.total_n
    );

    Ok(SampleSet::new(design, sample.points, strata_info, warnings))
}

/// Provenance of a generated sample set, carrying its seed and design totals.
pub fn sampling_metadata(set: &SampleSet, source: &SourceInfo, crs_epsg: Option<u32>) -> RunMetadata {
    let design = set.design();
    RunMetadata::new(source, crs_epsg)
        .with_seed(design.random_seed)
        .with_parameter("scheme", design.scheme.as_str())
        .with_parameter("allocation", design.allocation.as_str())
        .with_parameter("total_n", design.total_n)
        .with_parameter("n_generated", set.len())
        .with_parameter("min_distance", design.min_distance)
}
