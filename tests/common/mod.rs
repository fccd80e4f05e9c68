//! Shared fixtures for map-accuracy integration tests.
#![allow(dead_code)]

use map_accuracy::*;
use std::collections::BTreeMap;

/// Expand a reference-rows confusion matrix into sample pairs.
pub fn samples_from_matrix(
    rows: &[&[u64]],
    labels: &[ClassLabel],
) -> (Vec<Option<ClassLabel>>, Vec<Option<ClassLabel>>) {
    let mut classified = Vec::new();
    let mut reference = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            for _ in 0..count {
                reference.push(Some(labels[i]));
                classified.push(Some(labels[j]));
            }
        }
    }
    (classified, reference)
}

/// Assessment inputs on a 1 ha pixel grid, so pixel counts are hectares.
pub fn hectare_inputs(
    rows: &[&[u64]],
    labels: &[ClassLabel],
    pixel_counts: &[u64],
) -> AccuracyInputs {
    let (classified, reference) = samples_from_matrix(rows, labels);
    AccuracyInputs {
        classified,
        reference,
        class_labels: ClassLabelSet::new(labels.to_vec()).unwrap(),
        class_names: labels
            .iter()
            .map(|&l| (l, format!("Class {}", l)))
            .collect(),
        pixel_counts: labels.iter().copied().zip(pixel_counts.iter().copied()).collect(),
        raster: RasterInfo::projected(32633, 100.0),
        source: SourceInfo {
            classified_layer_path: "/data/classified.tif".into(),
            reference_layer_path: "/data/reference.gpkg".into(),
            reference_field: "class".into(),
            ..SourceInfo::default()
        },
    }
}

/// Olofsson et al. (2014) case study, reference rows.
pub fn olofsson_case() -> AccuracyInputs {
    hectare_inputs(
        &[
            &[66, 0, 1, 2],
            &[0, 55, 0, 1],
            &[5, 8, 153, 9],
            &[4, 12, 11, 313],
        ],
        &[1, 2, 3, 4],
        &[200_000, 150_000, 3_200_000, 6_450_000],
    )
}

/// Square grid of candidate centres starting at `(x0, y0)`.
pub fn grid(x0: f64, y0: f64, side: usize, spacing: f64) -> Vec<Coordinate> {
    let mut out = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            out.push(Coordinate::new(x0 + i as f64 * spacing, y0 + j as f64 * spacing));
        }
    }
    out
}

/// Three classes on separate grids with pixel counts matching the grids.
pub fn three_class_sampling_inputs() -> SamplingInputs {
    let candidates: BTreeMap<ClassLabel, Vec<Coordinate>> = [
        (1, grid(0.0, 0.0, 60, 30.0)),
        (2, grid(3000.0, 0.0, 30, 30.0)),
        (3, grid(0.0, 3000.0, 10, 30.0)),
    ]
    .into_iter()
    .collect();
    let pixel_counts = candidates
        .iter()
        .map(|(&label, pool)| (label, pool.len() as u64))
        .collect();
    SamplingInputs {
        pixel_counts,
        candidates,
        class_names: [(1, "Forest".to_string()), (2, "Cropland".to_string()), (3, "Water".to_string())]
            .into_iter()
            .collect(),
    }
}
