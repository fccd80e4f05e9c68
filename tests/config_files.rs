//! Configuration and provenance files on disk.

use map_accuracy::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_accuracy_config_toml_and_json() {
    let dir = TempDir::new().unwrap();
    let config = AccuracyConfig::builder()
        .confidence_level(0.9)
        .compute_kappa(true)
        .map_class(11, 1)
        .map_class(12, 1)
        .build()
        .unwrap();

    for name in ["accuracy.toml", "accuracy.json"] {
        let path = dir.path().join(name);
        config.save_to_file(&path).unwrap();
        let loaded = AccuracyConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}

#[test]
fn test_sampling_config_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.toml");
    fs::write(
        &path,
        "margin_of_error = 0.04\nallocation = \"equal\"\nmin_distance = 150.0\ndistance_strategy = \"brute_force\"\n",
    )
    .unwrap();

    let config = SamplingConfig::load_from_file(&path).unwrap();
    assert_eq!(config.margin_of_error, 0.04);
    assert_eq!(config.allocation, AllocationMethod::Equal);
    assert_eq!(config.distance_strategy, DistanceStrategy::BruteForce);
    assert_eq!(config.confidence_level, DEFAULT_CONFIDENCE_LEVEL);
    assert_eq!(config.seed, DEFAULT_RANDOM_SEED);
    assert_eq!(config.total_n_override, None);
}

#[test]
fn test_invalid_file_values_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sampling.json");
    fs::write(&path, r#"{"expected_accuracy": 1.2}"#).unwrap();

    let err = SamplingConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, AccuracyError::InvalidParameter { .. }));
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accuracy.yaml");
    let err = AccuracyConfig::default().save_to_file(&path).unwrap_err();
    assert_eq!(err.category(), "config");
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accuracy.toml");
    fs::write(&path, "confidence_level = = 0.9").unwrap();
    assert!(matches!(
        AccuracyConfig::load_from_file(&path),
        Err(AccuracyError::Config { .. })
    ));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = AccuracyConfig::load_from_file(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.category(), "config");
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_run_metadata_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run_metadata.json");
    let source = SourceInfo {
        host_application: "QGIS 3.34".into(),
        classified_layer_path: "/data/map.tif".into(),
        classified_layer_name: "map".into(),
        ..SourceInfo::default()
    };
    let metadata = RunMetadata::new(&source, Some(32633))
        .with_seed(7)
        .with_parameter("total_n", 196u64);
    metadata.save_json(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let parsed = RunMetadata::from_json(&text).unwrap();
    assert_eq!(parsed, metadata);
    assert_eq!(parsed.classified_layer_name, "map");
    assert_eq!(parsed.parameters["total_n"], 196);
}
