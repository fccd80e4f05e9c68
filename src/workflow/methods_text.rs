//! Publication-style methods paragraphs for an assessment.

use crate::core::constants::MAP_ACCURACY_VERSION;
use crate::workflow::accuracy::AccuracyAssessment;

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

fn level_label(confidence_level: f64) -> String {
    let pct = confidence_level * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{:.0}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Methods section text, paragraphs separated by blank lines, followed by
/// the reference list.
///
/// `sampling_info` is appended to the first sentence, e.g.
/// `"selected by stratified random sampling"`.
pub fn generate_methods_text(
    assessment: &AccuracyAssessment,
    confidence_level: f64,
    sampling_info: Option<&str>,
) -> String {
    let level = level_label(confidence_level);
    let metrics = &assessment.metrics;
    let disagreement = &assessment.disagreement;
    let mut paragraphs = Vec::new();

    let mut p1 = format!(
        "Accuracy assessment was conducted using {} reference samples across {} land cover classes",
        assessment.n_samples,
        assessment.class_labels.len()
    );
    if let Some(info) = sampling_info.filter(|s| !s.is_empty()) {
        p1.push_str(", ");
        p1.push_str(info);
    }
    p1.push_str(
        ". A confusion matrix was constructed following the convention of Congalton and \
         Green (2019), with reference data in rows and classified data in columns.",
    );
    if assessment.n_excluded_nodata > 0 {
        p1.push_str(&format!(
            " {} sample(s) were excluded due to nodata values in the classified raster.",
            assessment.n_excluded_nodata
        ));
    }
    paragraphs.push(p1);

    let mut p2 = format!(
        "Overall accuracy was {} ({} Wilson CI: {}\u{2013}{}). Disagreement was decomposed \
         into quantity disagreement ({:.4}) and allocation disagreement ({:.4}) following \
         Pontius and Millones (2011).",
        percent(metrics.overall_accuracy),
        level,
        percent(metrics.overall_accuracy_ci.lower),
        percent(metrics.overall_accuracy_ci.upper),
        disagreement.quantity_disagreement,
        disagreement.allocation_disagreement
    );
    if let Some(kappa) = &assessment.kappa {
        p2.push_str(&format!(" Cohen's Kappa was {:.4}.", kappa.kappa));
    }
    paragraphs.push(p2);

    if let Some(aw) = &assessment.area_weighted {
        let ci = aw.overall_accuracy_ci.clamp_probability();
        paragraphs.push(format!(
            "Area-weighted accuracy estimation followed the good practices recommended by \
             Olofsson et al. (2014). Mapped area proportions were used as inclusion weights \
             (W_i = A_i / A_total). Area-weighted overall accuracy was {} ({} CI: {}\u{2013}{}). \
             Estimated class areas with {} confidence intervals are reported in the \
             accompanying table.",
            percent(aw.overall_accuracy),
            level,
            percent(ci.lower),
            percent(ci.upper),
            level
        ));
    }

    paragraphs.push(format!(
        "Per-class producer's and user's accuracies with {} Wilson confidence intervals \
         are reported in the per-class metrics table.",
        level
    ));

    paragraphs.push(format!(
        "All accuracy metrics were computed using map-accuracy v{}.",
        MAP_ACCURACY_VERSION
    ));

    paragraphs.push(format!("References\n\n{}", generate_references()));

    paragraphs.join("\n\n")
}

/// Works cited by the methods text.
pub fn generate_references() -> String {
    [
        "Congalton, R.G. and Green, K. (2019). Assessing the Accuracy of Remotely Sensed \
         Data: Principles and Practices, 3rd ed. CRC Press.",
        "Olofsson, P., Foody, G.M., Herold, M., Stehman, S.V., Woodcock, C.E. and Wulder, \
         M.A. (2014). Good practices for estimating area and assessing accuracy of land use \
         change. Remote Sensing of Environment, 148, 42-57. \
         https://doi.org/10.1016/j.rse.2014.02.015",
        "Pontius, R.G. Jr. and Millones, M. (2011). Death to Kappa: birth of quantity \
         disagreement and allocation disagreement for accuracy assessment. International \
         Journal of Remote Sensing, 32(15), 4407-4429. \
         https://doi.org/10.1080/01431161.2011.552923",
        "ISO (2013). ISO 19157:2013 Geographic information - Data quality. International \
         Organization for Standardization.",
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccuracyConfig;
    use crate::core::types::{ClassLabelSet, RasterInfo};
    use crate::workflow::accuracy::{run_accuracy_assessment, AccuracyInputs};
    use crate::workflow::provenance::SourceInfo;

    fn assessment(kappa: bool, area_weighted: bool, drop: usize) -> AccuracyAssessment {
        let mut classified = Vec::new();
        let mut reference = Vec::new();
        for (r, c, n) in [(1, 1, 40), (1, 2, 10), (2, 1, 10), (2, 2, 40)] {
            for _ in 0..n {
                reference.push(Some(r));
                classified.push(Some(c));
            }
        }
        for c in classified.iter_mut().take(drop) {
            *c = None;
        }
        let inputs = AccuracyInputs {
            classified,
            reference,
            class_labels: ClassLabelSet::new(vec![1, 2]).unwrap(),
            class_names: Default::default(),
            pixel_counts: [(1, 500), (2, 500)].into_iter().collect(),
            raster: RasterInfo::projected(32633, 30.0),
            source: SourceInfo::default(),
        };
        let config = AccuracyConfig {
            compute_kappa: kappa,
            compute_area_weighted: area_weighted,
            min_samples_per_class: 1,
            ..AccuracyConfig::default()
        };
        run_accuracy_assessment(&inputs, &config).unwrap().assessment
    }

    #[test]
    fn test_basic_paragraphs() {
        let text = generate_methods_text(&assessment(false, false, 0), 0.95, None);
        assert!(text.starts_with(
            "Accuracy assessment was conducted using 100 reference samples across 2 land cover classes. "
        ));
        assert!(text.contains("Overall accuracy was 80.0% (95% Wilson CI: 71.1%\u{2013}86.7%)"));
        assert!(text.contains("quantity disagreement (0.0000) and allocation disagreement (0.2000)"));
        assert!(!text.contains("Kappa was"));
        assert!(!text.contains("Olofsson et al. (2014). Mapped"));
        assert!(!text.contains("excluded"));
        assert!(text.ends_with(&generate_references()));
    }

    #[test]
    fn test_optional_paragraphs() {
        let text = generate_methods_text(
            &assessment(true, true, 3),
            0.95,
            Some("selected by stratified random sampling"),
        );
        assert!(text.contains("land cover classes, selected by stratified random sampling."));
        assert!(text.contains(" 3 sample(s) were excluded due to nodata"));
        assert!(text.contains("Cohen's Kappa was"));
        assert!(text.contains("Area-weighted overall accuracy was"));
    }

    #[test]
    fn test_confidence_level_label() {
        let text = generate_methods_text(&assessment(false, false, 0), 0.9, None);
        assert!(text.contains("(90% Wilson CI:"));
        assert_eq!(level_label(0.975), "97.5%");
    }

    #[test]
    fn test_references() {
        let refs = generate_references();
        assert_eq!(refs.split("\n\n").count(), 4);
        assert!(refs.contains("10.1016/j.rse.2014.02.015"));
    }
}
