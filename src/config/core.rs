//! Run configuration for accuracy assessment and sample design.
//!
//! Both records carry the defaults of a standard land-cover assessment
//! (95% confidence, 85% expected accuracy, 5% margin, 25 samples per class)
//! and can be loaded from or saved to `.json` and `.toml` files.

use crate::core::constants::*;
use crate::core::error::{AccuracyError, Result};
use crate::core::types::{label_keys, ClassLabel};
use crate::sampling::spatial_index::DistanceStrategy;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How the total sample count is split across strata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// In proportion to mapped class area, with a per-class minimum
    Proportional,
    /// The same count for every class
    Equal,
}

impl Default for AllocationMethod {
    fn default() -> Self {
        AllocationMethod::Proportional
    }
}

impl AllocationMethod {
    /// Name as written in design records
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMethod::Proportional => "proportional",
            AllocationMethod::Equal => "equal",
        }
    }
}

impl std::fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_open_unit(parameter: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(AccuracyError::invalid_parameter(
            parameter,
            value,
            "must be in the open interval (0, 1)",
        ));
    }
    Ok(())
}

fn load_record<T, P>(path: P) -> Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| AccuracyError::config(format!("Failed to read config file: {}", e)))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .map_err(|e| AccuracyError::config(format!("Failed to parse JSON config: {}", e))),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(AccuracyError::config(
            "Unsupported config file format. Use .json or .toml",
        )),
    }
}

fn save_record<T, P>(record: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::to_string_pretty(record)
            .map_err(|e| AccuracyError::config(format!("Failed to serialize to JSON: {}", e)))?,
        Some("toml") => toml::to_string_pretty(record)?,
        _ => {
            return Err(AccuracyError::config(
                "Unsupported config file format. Use .json or .toml",
            ))
        }
    };

    std::fs::write(path, content)
        .map_err(|e| AccuracyError::config(format!("Failed to write config file: {}", e)))?;
    Ok(())
}

/// Configuration of an accuracy assessment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyConfig {
    /// Confidence level of every interval in the result
    pub confidence_level: f64,
    /// Compute Cohen's Kappa
    pub compute_kappa: bool,
    /// Compute Olofsson area-weighted estimates
    pub compute_area_weighted: bool,
    /// Recommended minimum reference samples per class
    pub min_samples_per_class: usize,
    /// Classified value to reference value, applied before matrix construction
    #[serde(with = "label_keys")]
    pub class_mapping: BTreeMap<ClassLabel, ClassLabel>,
}

impl Default for AccuracyConfig {
    fn default() -> Self {
        AccuracyConfig {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            compute_kappa: false,
            compute_area_weighted: true,
            min_samples_per_class: RECOMMENDED_MIN_SAMPLES_PER_CLASS,
            class_mapping: BTreeMap::new(),
        }
    }
}

impl AccuracyConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a validating builder
    pub fn builder() -> AccuracyConfigBuilder {
        AccuracyConfigBuilder::new()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        check_open_unit("confidence_level", self.confidence_level)
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: AccuracyConfig = load_record(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_record(self, path)
    }

    /// Map a classified value through `class_mapping`
    pub fn map_class(&self, value: ClassLabel) -> ClassLabel {
        self.class_mapping.get(&value).copied().unwrap_or(value)
    }
}

/// Fluent builder for [`AccuracyConfig`]
#[derive(Debug, Clone, Default)]
pub struct AccuracyConfigBuilder {
    config: AccuracyConfig,
    validation_errors: Vec<String>,
}

impl AccuracyConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence level
    pub fn confidence_level(mut self, level: f64) -> Self {
        if !(level > 0.0 && level < 1.0) {
            self.validation_errors
                .push("confidence_level must be in range (0.0, 1.0)".to_string());
        }
        self.config.confidence_level = level;
        self
    }

    /// Enable or disable Kappa
    pub fn compute_kappa(mut self, enabled: bool) -> Self {
        self.config.compute_kappa = enabled;
        self
    }

    /// Enable or disable area-weighted estimation
    pub fn compute_area_weighted(mut self, enabled: bool) -> Self {
        self.config.compute_area_weighted = enabled;
        self
    }

    /// Set the recommended minimum per class
    pub fn min_samples_per_class(mut self, min: usize) -> Self {
        self.config.min_samples_per_class = min;
        self
    }

    /// Map classified value `from` to reference value `to`
    pub fn map_class(mut self, from: ClassLabel, to: ClassLabel) -> Self {
        self.config.class_mapping.insert(from, to);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AccuracyConfig> {
        if !self.validation_errors.is_empty() {
            return Err(AccuracyError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration of a sample design run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Confidence level used by Cochran's formula
    pub confidence_level: f64,
    /// Anticipated overall accuracy
    pub expected_accuracy: f64,
    /// Tolerated half-width of the accuracy interval
    pub margin_of_error: f64,
    /// Allocation method
    pub allocation: AllocationMethod,
    /// Minimum distance between any two accepted points, in CRS units
    pub min_distance: f64,
    /// Seed of the point shuffle
    pub seed: u64,
    /// Minimum samples per class for proportional allocation
    pub min_per_class: usize,
    /// Fixed total sample count instead of Cochran's formula
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_n_override: Option<usize>,
    /// Proximity check strategy
    pub distance_strategy: DistanceStrategy,
    /// Fixed per-class counts instead of computed allocation
    #[serde(with = "label_keys")]
    pub allocation_override: BTreeMap<ClassLabel, usize>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            expected_accuracy: DEFAULT_EXPECTED_ACCURACY,
            margin_of_error: DEFAULT_MARGIN_OF_ERROR,
            allocation: AllocationMethod::default(),
            min_distance: 0.0,
            seed: DEFAULT_RANDOM_SEED,
            min_per_class: RECOMMENDED_MIN_SAMPLES_PER_CLASS,
            total_n_override: None,
            distance_strategy: DistanceStrategy::default(),
            allocation_override: BTreeMap::new(),
        }
    }
}

impl SamplingConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a validating builder
    pub fn builder() -> SamplingConfigBuilder {
        SamplingConfigBuilder::new()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        check_open_unit("confidence_level", self.confidence_level)?;
        check_open_unit("expected_accuracy", self.expected_accuracy)?;
        check_open_unit("margin_of_error", self.margin_of_error)?;

        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(AccuracyError::invalid_parameter(
                "min_distance",
                self.min_distance,
                "must be finite and non-negative",
            ));
        }

        if self.total_n_override == Some(0) {
            return Err(AccuracyError::invalid_parameter(
                "total_n_override",
                0,
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: SamplingConfig = load_record(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_record(self, path)
    }
}

/// Fluent builder for [`SamplingConfig`]
#[derive(Debug, Clone, Default)]
pub struct SamplingConfigBuilder {
    config: SamplingConfig,
    validation_errors: Vec<String>,
}

impl SamplingConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence level
    pub fn confidence_level(mut self, level: f64) -> Self {
        if !(level > 0.0 && level < 1.0) {
            self.validation_errors
                .push("confidence_level must be in range (0.0, 1.0)".to_string());
        }
        self.config.confidence_level = level;
        self
    }

    /// Set the expected overall accuracy
    pub fn expected_accuracy(mut self, accuracy: f64) -> Self {
        if !(accuracy > 0.0 && accuracy < 1.0) {
            self.validation_errors
                .push("expected_accuracy must be in range (0.0, 1.0)".to_string());
        }
        self.config.expected_accuracy = accuracy;
        self
    }

    /// Set the margin of error
    pub fn margin_of_error(mut self, margin: f64) -> Self {
        if !(margin > 0.0 && margin < 1.0) {
            self.validation_errors
                .push("margin_of_error must be in range (0.0, 1.0)".to_string());
        }
        self.config.margin_of_error = margin;
        self
    }

    /// Set the allocation method
    pub fn allocation(mut self, allocation: AllocationMethod) -> Self {
        self.config.allocation = allocation;
        self
    }

    /// Set the minimum distance between points
    pub fn min_distance(mut self, distance: f64) -> Self {
        if !distance.is_finite() || distance < 0.0 {
            self.validation_errors
                .push("min_distance must be finite and non-negative".to_string());
        }
        self.config.min_distance = distance;
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the proportional-allocation minimum per class
    pub fn min_per_class(mut self, min: usize) -> Self {
        self.config.min_per_class = min;
        self
    }

    /// Use a fixed total instead of Cochran's formula
    pub fn total_n(mut self, total: usize) -> Self {
        if total == 0 {
            self.validation_errors
                .push("total_n must be at least 1".to_string());
        }
        self.config.total_n_override = Some(total);
        self
    }

    /// Use a fixed count for one class
    pub fn class_count(mut self, label: ClassLabel, count: usize) -> Self {
        self.config.allocation_override.insert(label, count);
        self
    }

    /// Select the proximity check strategy
    pub fn distance_strategy(mut self, strategy: DistanceStrategy) -> Self {
        self.config.distance_strategy = strategy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SamplingConfig> {
        if !self.validation_errors.is_empty() {
            return Err(AccuracyError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}
