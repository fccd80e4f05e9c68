//! End-to-end tests of the accuracy assessment workflow through the public API.

use approx::assert_abs_diff_eq;
use map_accuracy::*;

mod common;
use common::*;

#[test]
fn test_two_class_scenario() {
    assert!(map_accuracy::init().is_ok());

    let inputs = hectare_inputs(&[&[40, 10], &[10, 40]], &[1, 2], &[5000, 5000]);
    let config = AccuracyConfig::builder().compute_kappa(true).build().unwrap();
    let run = run_accuracy_assessment(&inputs, &config).unwrap();
    let a = &run.assessment;

    assert_eq!(a.matrix.counts()[[0, 1]], 10);
    assert_abs_diff_eq!(a.overall_accuracy(), 0.8, epsilon = 1e-12);
    assert_abs_diff_eq!(a.metrics.overall_accuracy_ci.lower, 0.7112, epsilon = 1e-4);
    assert_abs_diff_eq!(a.metrics.overall_accuracy_ci.upper, 0.8667, epsilon = 1e-4);

    for class in &a.metrics.per_class {
        assert_abs_diff_eq!(class.producers_accuracy.unwrap(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(class.users_accuracy.unwrap(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(class.f1.unwrap(), 0.8, epsilon = 1e-12);
    }

    assert_abs_diff_eq!(a.disagreement.quantity_disagreement, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(a.disagreement.allocation_disagreement, 0.2, epsilon = 1e-12);

    let kappa = a.kappa.unwrap();
    assert_abs_diff_eq!(kappa.kappa, 0.6, epsilon = 1e-12);
    assert!(kappa.ci.contains(0.6));

    let aw = a.area_weighted.as_ref().unwrap();
    assert_abs_diff_eq!(aw.total_mapped_area_ha, 10_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(aw.overall_accuracy, 0.8, epsilon = 1e-12);
}

#[test]
fn test_olofsson_case_through_workflow() {
    let run = run_accuracy_assessment(&olofsson_case(), &AccuracyConfig::default()).unwrap();
    let aw = run.assessment.area_weighted.unwrap();

    assert_abs_diff_eq!(aw.overall_accuracy, 0.9465, epsilon = 1e-4);
    let class1 = aw.class(1).unwrap();
    assert_abs_diff_eq!(class1.estimated_area_ha, 235_086.0, epsilon = 1.0);
    assert_abs_diff_eq!(class1.estimated_area_ci_ha.width() / 2.0, 68_418.0, epsilon = 5.0);

    let area_sum: f64 = aw.estimated_areas_ha().values().sum();
    assert_abs_diff_eq!(area_sum, 10_000_000.0, epsilon = 1e-3);
}

#[test]
fn test_pontius_identity_holds() {
    let run = run_accuracy_assessment(&olofsson_case(), &AccuracyConfig::default()).unwrap();
    let a = &run.assessment;
    assert_abs_diff_eq!(
        a.disagreement.total_disagreement(),
        1.0 - a.overall_accuracy(),
        epsilon = 1e-9
    );
}

#[test]
fn test_small_classes_warn_but_compute() {
    let inputs = hectare_inputs(&[&[8, 2], &[1, 30]], &[1, 2], &[100, 900]);
    let run = run_accuracy_assessment(&inputs, &AccuracyConfig::default()).unwrap();
    assert!(run.validation.is_valid());
    assert!(run.validation.has_warnings());
    assert!(run
        .validation
        .warnings()
        .iter()
        .any(|w| w.message.starts_with("Class 1 has only 10 reference samples")));
}

#[test]
fn test_reference_class_outside_map_warns() {
    let mut inputs = hectare_inputs(&[&[30, 0], &[0, 30]], &[1, 2], &[500, 500]);
    inputs.reference[0] = Some(9);
    let run = run_accuracy_assessment(&inputs, &AccuracyConfig::default()).unwrap();
    assert!(run
        .validation
        .warnings()
        .iter()
        .any(|w| w.message.contains("[9]")));
    assert_eq!(run.assessment.matrix.total(), 59);
    assert_eq!(run.assessment.n_samples, 60);
}

#[test]
fn test_geographic_raster_is_fatal_with_areas() {
    let mut inputs = hectare_inputs(&[&[30, 0], &[0, 30]], &[1, 2], &[500, 500]);
    inputs.raster.crs_is_geographic = true;
    inputs.raster.crs_epsg = Some(4326);

    match run_accuracy_assessment(&inputs, &AccuracyConfig::default()) {
        Err(AccuracyError::ValidationFailure { issues }) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].severity, ValidationSeverity::Fatal);
        }
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_result_serializes_with_string_keys() {
    let run = run_accuracy_assessment(&olofsson_case(), &AccuracyConfig::default()).unwrap();
    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["assessment"]["class_names"]["3"], "Class 3");
    assert_eq!(json["metadata"]["reference_field"], "class");
    assert_eq!(json["metadata"]["classified_layer_name"], "/data/classified.tif");

    let back: AccuracyRun = serde_json::from_value(json).unwrap();
    assert_eq!(back.assessment.matrix, run.assessment.matrix);
    assert_eq!(back.assessment.class_labels, run.assessment.class_labels);
    assert_eq!(back.validation, run.validation);
}

#[test]
fn test_methods_text_from_run() {
    let config = AccuracyConfig::builder().compute_kappa(true).build().unwrap();
    let run = run_accuracy_assessment(&olofsson_case(), &config).unwrap();
    let text = generate_methods_text(&run.assessment, config.confidence_level, None);

    assert!(text.contains("using 640 reference samples across 4 land cover classes"));
    assert!(text.contains("Cohen's Kappa was"));
    assert!(text.contains("Area-weighted overall accuracy was 94."));
    assert!(text.contains("Pontius, R.G. Jr. and Millones, M. (2011)"));
}
