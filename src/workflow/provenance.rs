//! Run provenance exported next to reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::constants::MAP_ACCURACY_VERSION;
use crate::core::error::Result;
use crate::core::types::{label_keys, ClassLabel};

/// Where the assessment inputs came from, as opaque strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceInfo {
    /// Application hosting the run, with version
    pub host_application: String,
    /// Path of the classified raster
    pub classified_layer_path: String,
    /// Display name of the classified raster
    pub classified_layer_name: String,
    /// Path of the reference layer
    pub reference_layer_path: String,
    /// Display name of the reference layer
    pub reference_layer_name: String,
    /// Attribute holding the reference class
    pub reference_field: String,
}

/// Parameters and sources of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Version of this library
    pub software_version: String,
    /// Application hosting the run
    pub host_application: String,
    /// Start of the run, UTC
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Path of the classified raster
    pub classified_layer_path: String,
    /// Display name of the classified raster
    pub classified_layer_name: String,
    /// Path of the reference layer
    pub reference_layer_path: String,
    /// Display name of the reference layer
    pub reference_layer_name: String,
    /// Attribute holding the reference class
    pub reference_field: String,
    /// EPSG code of the classified raster
    pub crs_epsg: Option<u32>,
    /// Seed, when the run was randomized
    pub random_seed: Option<u64>,
    /// Classified value to reference value
    #[serde(with = "label_keys")]
    pub class_mapping: BTreeMap<ClassLabel, ClassLabel>,
    /// Free-form run parameters
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl RunMetadata {
    /// Metadata stamped with the current time
    pub fn new(source: &SourceInfo, crs_epsg: Option<u32>) -> Self {
        RunMetadata {
            software_version: MAP_ACCURACY_VERSION.to_string(),
            host_application: source.host_application.clone(),
            timestamp: chrono::Utc::now(),
            classified_layer_path: source.classified_layer_path.clone(),
            classified_layer_name: if source.classified_layer_name.is_empty() {
                source.classified_layer_path.clone()
            } else {
                source.classified_layer_name.clone()
            },
            reference_layer_path: source.reference_layer_path.clone(),
            reference_layer_name: source.reference_layer_name.clone(),
            reference_field: source.reference_field.clone(),
            crs_epsg,
            random_seed: None,
            class_mapping: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Record the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Record the class mapping
    pub fn with_class_mapping(mut self, mapping: BTreeMap<ClassLabel, ClassLabel>) -> Self {
        self.class_mapping = mapping;
        self
    }

    /// Record one parameter
    pub fn with_parameter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON written by [`RunMetadata::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write pretty JSON to `path`
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
