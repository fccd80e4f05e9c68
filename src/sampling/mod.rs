//! Stratified sample design.
//!
//! - [`sample_size`]: Cochran's formula and allocation across strata
//! - [`spatial_index`]: proximity strategies for the minimum-distance rule
//! - [`stratified`]: seeded stratified random point selection
//!
//! The records here are the output of a sampling run. A [`SampleSet`] is
//! never edited in place; [`SampleSet::with_points`] returns a new one.

pub mod sample_size;
pub mod spatial_index;
pub mod stratified;

pub use sample_size::{allocate_equal, allocate_proportional, calculate_sample_size, Allocation};
pub use spatial_index::{BruteForceIndex, DistanceStrategy, KdTreeIndex, ProximityIndex};
pub use stratified::{generate_stratified_random, StratifiedSample, StratifiedSampler};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AllocationMethod;
use crate::core::types::{label_keys, ClassLabel, Coordinate};

/// Parameters of one sample generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleDesign {
    /// Sampling scheme, currently always `stratified_random`
    pub scheme: String,
    /// Requested total sample count
    pub total_n: usize,
    /// How `total_n` was split
    pub allocation: AllocationMethod,
    /// Requested count per class
    #[serde(with = "label_keys")]
    pub n_per_class: BTreeMap<ClassLabel, usize>,
    /// Minimum distance between accepted points, in CRS units
    pub min_distance: f64,
    /// Confidence level of the sample size calculation
    pub confidence_level: f64,
    /// Expected overall accuracy
    pub expected_accuracy: f64,
    /// Margin of error
    pub margin_of_error: f64,
    /// Seed of the point shuffle
    pub random_seed: u64,
}

/// A single sample location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Sequential id, starting at 1 within a run
    pub id: u64,
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
    /// Class of the stratum the point was drawn from
    pub stratum_class: ClassLabel,
}

impl SamplePoint {
    /// Location as a coordinate
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

/// Summary of one stratum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratumInfo {
    /// Display name of the class
    pub name: String,
    /// Mapped pixels of the class
    pub pixel_count: u64,
    /// Points requested
    pub n_requested: usize,
    /// Points actually generated
    pub n_generated: usize,
}

/// Result of a sample generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    design: SampleDesign,
    points: Vec<SamplePoint>,
    #[serde(with = "label_keys")]
    strata_info: BTreeMap<ClassLabel, StratumInfo>,
    warnings: Vec<String>,
}

impl SampleSet {
    /// Bundle the outputs of a run
    pub fn new(
        design: SampleDesign,
        points: Vec<SamplePoint>,
        strata_info: BTreeMap<ClassLabel, StratumInfo>,
        warnings: Vec<String>,
    ) -> Self {
        SampleSet {
            design,
            points,
            strata_info,
            warnings,
        }
    }

    /// Design the points were generated under
    pub fn design(&self) -> &SampleDesign {
        &self.design
    }

    /// Points in generation order
    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    /// Per-stratum summary
    pub fn strata_info(&self) -> &BTreeMap<ClassLabel, StratumInfo> {
        &self.strata_info
    }

    /// Warnings raised while generating
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point was generated
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points of one stratum
    pub fn points_for(&self, label: ClassLabel) -> impl Iterator<Item = &SamplePoint> + '_ {
        self.points.iter().filter(move |p| p.stratum_class == label)
    }

    /// A new set with `points` in place of the current ones.
    ///
    /// Generated counts in the strata summary follow the new points.
    pub fn with_points(&self, points: Vec<SamplePoint>) -> SampleSet {
        let mut strata_info = self.strata_info.clone();
        for (label, info) in strata_info.iter_mut() {
            info.n_generated = points.iter().filter(|p| p.stratum_class == *label).count();
        }
        SampleSet {
            design: self.design.clone(),
            points,
            strata_info,
            warnings: self.warnings.clone(),
        }
    }
}
