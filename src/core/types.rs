//! Core value types shared by the metrics, sampling and workflow layers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::error::{AccuracyError, Result};

/// Class value as stored in a classified raster or reference layer.
pub type ClassLabel = i64;

/// A point in map-projection units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Easting
    pub x: f64,
    /// Northing
    pub y: f64,
}

impl Coordinate {
    /// Create a coordinate.
    pub const fn new(x: f64, y: f64) -> Self {
        Coordinate { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_sq(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Coordinate) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate { x, y }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Coordinate { x, y }
    }
}

/// Ordered set of distinct class labels.
///
/// Fixes the matrix dimension `k` and the label-to-index mapping for one
/// assessment run. Row `i` and column `i` of every matrix built against the
/// set refer to `labels()[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClassLabel>", into = "Vec<ClassLabel>")]
pub struct ClassLabelSet {
    labels: Vec<ClassLabel>,
    index: HashMap<ClassLabel, usize>,
}

impl ClassLabelSet {
    /// Create a label set in the given order.
    pub fn new(labels: Vec<ClassLabel>) -> Result<Self> {
        if labels.is_empty() {
            return Err(AccuracyError::empty_input("class label set is empty"));
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, &label) in labels.iter().enumerate() {
            if index.insert(label, i).is_some() {
                return Err(AccuracyError::invalid_parameter(
                    "class_labels",
                    label,
                    "class labels must be distinct",
                ));
            }
        }

        Ok(ClassLabelSet { labels, index })
    }

    /// Create a label set sorted ascending, dropping duplicates.
    pub fn sorted<I: IntoIterator<Item = ClassLabel>>(labels: I) -> Result<Self> {
        let mut labels: Vec<ClassLabel> = labels.into_iter().collect();
        labels.sort_unstable();
        labels.dedup();
        Self::new(labels)
    }

    /// Number of classes, `k`.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Matrix index of `label`, if it belongs to the set.
    #[inline]
    pub fn index_of(&self, label: ClassLabel) -> Option<usize> {
        self.index.get(&label).copied()
    }

    /// Whether `label` belongs to the set.
    pub fn contains(&self, label: ClassLabel) -> bool {
        self.index.contains_key(&label)
    }

    /// Labels in matrix order.
    pub fn labels(&self) -> &[ClassLabel] {
        &self.labels
    }

    /// Iterate labels in matrix order.
    pub fn iter(&self) -> impl Iterator<Item = ClassLabel> + '_ {
        self.labels.iter().copied()
    }
}

impl TryFrom<Vec<ClassLabel>> for ClassLabelSet {
    type Error = AccuracyError;

    fn try_from(labels: Vec<ClassLabel>) -> Result<Self> {
        ClassLabelSet::new(labels)
    }
}

impl From<ClassLabelSet> for Vec<ClassLabel> {
    fn from(set: ClassLabelSet) -> Self {
        set.labels
    }
}

/// Closed interval `[lower, upper]` with `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Create an interval from two bounds in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            ConfidenceInterval { lower: a, upper: b }
        } else {
            ConfidenceInterval { lower: b, upper: a }
        }
    }

    /// `estimate ± margin`.
    pub fn around(estimate: f64, margin: f64) -> Self {
        Self::new(estimate - margin, estimate + margin)
    }

    /// The whole probability range `[0, 1]`.
    pub const fn unit() -> Self {
        ConfidenceInterval {
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Degenerate `[0, 0]` interval.
    pub const fn zero() -> Self {
        ConfidenceInterval {
            lower: 0.0,
            upper: 0.0,
        }
    }

    /// Intersect with `[min, max]`.
    pub fn clamp(self, min: f64, max: f64) -> Self {
        ConfidenceInterval {
            lower: self.lower.clamp(min, max),
            upper: self.upper.clamp(min, max),
        }
    }

    /// Intersect with `[0, 1]`.
    pub fn clamp_probability(self) -> Self {
        self.clamp(0.0, 1.0)
    }

    /// Intersect with `[0, inf)`.
    pub fn clamp_non_negative(self) -> Self {
        self.clamp(0.0, f64::INFINITY)
    }

    /// `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `value` lies inside the interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.lower, self.upper)
    }
}

/// Raster properties the assessment needs, as reported by the raster reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterInfo {
    /// EPSG code of the raster CRS, if known
    pub crs_epsg: Option<u32>,
    /// Whether the CRS is geographic (degree units)
    pub crs_is_geographic: bool,
    /// Pixel width in CRS units
    pub pixel_size_x: f64,
    /// Pixel height in CRS units, negative for north-up rasters
    pub pixel_size_y: f64,
    /// Columns
    #[serde(default)]
    pub width: usize,
    /// Rows
    #[serde(default)]
    pub height: usize,
    /// Nodata value of the band
    #[serde(default)]
    pub nodata: Option<f64>,
}

impl RasterInfo {
    /// Projected raster with square pixels of `pixel_size` units.
    pub fn projected(epsg: u32, pixel_size: f64) -> Self {
        RasterInfo {
            crs_epsg: Some(epsg),
            crs_is_geographic: false,
            pixel_size_x: pixel_size,
            pixel_size_y: -pixel_size,
            width: 0,
            height: 0,
            nodata: None,
        }
    }

    /// EPSG code, 0 when unknown.
    pub fn epsg_or_zero(&self) -> u32 {
        self.crs_epsg.unwrap_or(0)
    }
}

/// Axis along which a confusion matrix is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeAxis {
    /// Each reference row sums to 100
    Rows,
    /// Each classified column sums to 100
    Columns,
}

impl Default for NormalizeAxis {
    fn default() -> Self {
        NormalizeAxis::Rows
    }
}

/// Serde helpers for maps keyed by class label.
///
/// Labels are written as strings so the same schema works in JSON objects
/// and TOML tables.
pub mod label_keys {
    use super::ClassLabel;
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    /// Serialize with stringified keys.
    pub fn serialize<S, V>(map: &BTreeMap<ClassLabel, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (label, value) in map {
            out.serialize_entry(&label.to_string(), value)?;
        }
        out.end()
    }

    /// Deserialize stringified keys back into labels.
    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<ClassLabel, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let raw: BTreeMap<String, V> = BTreeMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, value)| {
                key.trim()
                    .parse::<ClassLabel>()
                    .map(|label| (label, value))
                    .map_err(|e| D::Error::custom(format!("invalid class label key '{}': {}", key, e)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_set_index() {
        let labels = ClassLabelSet::new(vec![10, 3, 7]).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.index_of(10), Some(0));
        assert_eq!(labels.index_of(7), Some(2));
        assert_eq!(labels.index_of(4), None);
    }

    #[test]
    fn test_label_set_rejects_empty_and_duplicates() {
        assert!(matches!(
            ClassLabelSet::new(vec![]),
            Err(AccuracyError::EmptyInput { .. })
        ));
        assert!(matches!(
            ClassLabelSet::new(vec![1, 2, 1]),
            Err(AccuracyError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_label_set_sorted() {
        let labels = ClassLabelSet::sorted(vec![5, 1, 5, 3]).unwrap();
        assert_eq!(labels.labels(), &[1, 3, 5]);
    }

    #[test]
    fn test_label_set_serde() {
        let labels = ClassLabelSet::new(vec![2, 1]).unwrap();
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, "[2,1]");
        let back: ClassLabelSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index_of(1), Some(1));
        assert!(serde_json::from_str::<ClassLabelSet>("[1,1]").is_err());
    }

    #[test]
    fn test_interval_ordering_and_clamp() {
        let ci = ConfidenceInterval::new(0.9, -0.1);
        assert_eq!(ci.lower, -0.1);
        let clamped = ci.clamp_probability();
        assert_eq!(clamped.lower, 0.0);
        assert_eq!(clamped.upper, 0.9);
        assert!(clamped.contains(0.5));
        assert!((clamped.width() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_raster_info_deserialize_defaults() {
        let info: RasterInfo = serde_json::from_str(
            r#"{"crs_epsg": 32633, "crs_is_geographic": false, "pixel_size_x": 30.0, "pixel_size_y": -30.0}"#,
        )
        .unwrap();
        assert_eq!(info, RasterInfo::projected(32633, 30.0));
        assert_eq!(info.epsg_or_zero(), 32633);
    }

    #[test]
    fn test_coordinate_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::from((3.0, 4.0));
        assert_eq!(a.distance_sq(&b), 25.0);
        assert_eq!(a.distance(&b), 5.0);
    }
}
