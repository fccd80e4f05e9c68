//! Stratified random point selection.
//!
//! Classes are processed in ascending label order from one seeded generator,
//! so the same candidate pools and seed always give the same points. Within a
//! class, candidates are shuffled and accepted greedily. With a positive
//! minimum distance a candidate must keep that distance to every point
//! accepted so far in its own class (linear scan) and in earlier classes
//! (proximity index, rebuilt once per class).

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::constants::DEFAULT_RANDOM_SEED;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::{ClassLabel, Coordinate};
use crate::sampling::spatial_index::{
    BruteForceIndex, DistanceStrategy, KdTreeIndex, ProximityIndex,
};
use crate::sampling::SamplePoint;

/// Points and warnings of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedSample {
    /// Accepted points, ids `1..=len`
    pub points: Vec<SamplePoint>,
    /// One message per class that fell short
    pub warnings: Vec<String>,
}

type ProgressFn<'a> = Box<dyn FnMut(usize, usize) + 'a>;

/// Seeded stratified random sampler
pub struct StratifiedSampler<'a> {
    seed: u64,
    min_distance: f64,
    strategy: DistanceStrategy,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> std::fmt::Debug for StratifiedSampler<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StratifiedSampler")
            .field("seed", &self.seed)
            .field("min_distance", &self.min_distance)
            .field("strategy", &self.strategy)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> Default for StratifiedSampler<'a> {
    fn default() -> Self {
        Self::new(DEFAULT_RANDOM_SEED)
    }
}

impl<'a> StratifiedSampler<'a> {
    /// Sampler without a distance constraint
    pub fn new(seed: u64) -> Self {
        StratifiedSampler {
            seed,
            min_distance: 0.0,
            strategy: DistanceStrategy::default(),
            progress: None,
        }
    }

    /// Require this distance between any two accepted points
    pub fn min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Select the proximity strategy
    pub fn strategy(mut self, strategy: DistanceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Called with `(classes done, classes total)` after each class
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, usize) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Draw `n_per_class[c]` points for every class `c` from its candidates.
    pub fn generate(
        &mut self,
        candidates_per_class: &BTreeMap<ClassLabel, Vec<Coordinate>>,
        n_per_class: &BTreeMap<ClassLabel, usize>,
    ) -> Result<StratifiedSample> {
        crate::ensure!(
            self.min_distance.is_finite() && self.min_distance >= 0.0,
            AccuracyError::invalid_parameter(
                "min_distance",
                self.min_distance,
                "must be finite and non-negative",
            )
        );
        for (label, pool) in candidates_per_class {
            if let Some(bad) = pool.iter().find(|c| !(c.x.is_finite() && c.y.is_finite())) {
                return Err(AccuracyError::invalid_parameter(
                    format!("candidates[{}]", label),
                    format!("({}, {})", bad.x, bad.y),
                    "candidate coordinates must be finite",
                ));
            }
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let min_distance_sq = self.min_distance * self.min_distance;
        let total_classes = n_per_class.len();

        let mut accepted: Vec<Coordinate> = Vec::new();
        let mut points = Vec::new();
        let mut warnings = Vec::new();
        let mut next_id: u64 = 1;

        for (done, (&label, &n_desired)) in n_per_class.iter().enumerate() {
            let pool = candidates_per_class
                .get(&label)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            if pool.is_empty() {
                if n_desired > 0 {
                    warnings.push(format!(
                        "Class {}: no candidate pixels found. 0 of {} samples generated.",
                        label, n_desired
                    ));
                }
            } else {
                let mut order: Vec<usize> = (0..pool.len()).collect();
                order.shuffle(&mut rng);

                let selected = if self.min_distance > 0.0 {
                    match self.strategy {
                        DistanceStrategy::KdTree => select_with_distance::<KdTreeIndex>(
                            pool,
                            &order,
                            n_desired,
                            min_distance_sq,
                            &accepted,
                        ),
                        DistanceStrategy::BruteForce => select_with_distance::<BruteForceIndex>(
                            pool,
                            &order,
                            n_desired,
                            min_distance_sq,
                            &accepted,
                        ),
                    }
                } else {
                    order.iter().take(n_desired).map(|&i| pool[i]).collect()
                };

                if selected.len() < n_desired {
                    warnings.push(format!(
                        "Class {}: only {} of {} samples generated (insufficient candidates or distance constraint too strict).",
                        label,
                        selected.len(),
                        n_desired
                    ));
                }

                log::debug!(
                    "Class {}: {} of {} samples from {} candidates",
                    label,
                    selected.len(),
                    n_desired,
                    pool.len()
                );

                for coord in selected {
                    points.push(SamplePoint {
                        id: next_id,
                        x: coord.x,
                        y: coord.y,
                        stratum_class: label,
                    });
                    accepted.push(coord);
                    next_id += 1;
                }
            }

            if let Some(progress) = self.progress.as_mut() {
                progress(done + 1, total_classes);
            }
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        Ok(StratifiedSample { points, warnings })
    }
}

fn select_with_distance<I: ProximityIndex>(
    pool: &[Coordinate],
    order: &[usize],
    n_desired: usize,
    min_distance_sq: f64,
    accepted_elsewhere: &[Coordinate],
) -> Vec<Coordinate> {
    let index = I::build(accepted_elsewhere);
    let mut selected: Vec<Coordinate> = Vec::with_capacity(n_desired);

    for &i in order {
        if selected.len() >= n_desired {
            break;
        }
        let candidate = pool[i];

        if selected
            .iter()
            .any(|s| candidate.distance_sq(s) < min_distance_sq)
        {
            continue;
        }
        if index.has_point_within(&candidate, min_distance_sq) {
            continue;
        }

        selected.push(candidate);
    }

    selected
}

/// Stratified random sample with the default proximity strategy.
pub fn generate_stratified_random(
    candidates_per_class: &BTreeMap<ClassLabel, Vec<Coordinate>>,
    n_per_class: &BTreeMap<ClassLabel, usize>,
    min_distance: f64,
    seed: u64,
) -> Result<StratifiedSample> {
    StratifiedSampler::new(seed)
        .min_distance(min_distance)
        .generate(candidates_per_class, n_per_class)
}
