//! Mapped area per class from pixel counts.
//!
//! Area needs a projected CRS with metre units; geographic rasters are
//! rejected rather than converted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::constants::SQUARE_METERS_PER_HECTARE;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::{label_keys, ClassLabel, ClassLabelSet, RasterInfo};

/// Mapped area and pixel count per class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAreas {
    /// Area in hectares
    #[serde(with = "label_keys")]
    pub area_ha: BTreeMap<ClassLabel, f64>,
    /// Pixel count
    #[serde(with = "label_keys")]
    pub pixel_counts: BTreeMap<ClassLabel, u64>,
}

impl ClassAreas {
    /// Sum of all class areas
    pub fn total_area_ha(&self) -> f64 {
        self.area_ha.values().sum()
    }
}

/// Area of one pixel in hectares, assuming metre units.
pub fn pixel_area_ha(raster: &RasterInfo) -> Result<f64> {
    if raster.crs_is_geographic {
        return Err(AccuracyError::GeographicCrs {
            epsg: raster.epsg_or_zero(),
        });
    }

    let area = (raster.pixel_size_x * raster.pixel_size_y).abs();
    if !area.is_finite() || area <= 0.0 {
        return Err(AccuracyError::invalid_parameter(
            "pixel_size",
            format!("{} x {}", raster.pixel_size_x, raster.pixel_size_y),
            "pixel dimensions must be finite and non-zero",
        ));
    }

    Ok(area / SQUARE_METERS_PER_HECTARE)
}

/// Area per class in hectares, restricted to `labels` when given.
pub fn compute_class_areas_ha(
    raster: &RasterInfo,
    pixel_counts: &BTreeMap<ClassLabel, u64>,
    labels: Option<&ClassLabelSet>,
) -> Result<ClassAreas> {
    let pixel_area = pixel_area_ha(raster)?;

    let pixel_counts: BTreeMap<ClassLabel, u64> = pixel_counts
        .iter()
        .filter(|(label, _)| labels.map_or(true, |set| set.contains(**label)))
        .map(|(&label, &count)| (label, count))
        .collect();

    let area_ha = pixel_counts
        .iter()
        .map(|(&label, &count)| (label, count as f64 * pixel_area))
        .collect();

    Ok(ClassAreas {
        area_ha,
        pixel_counts,
    })
}
