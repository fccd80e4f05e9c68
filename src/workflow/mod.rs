//! End-to-end pipelines over already-read raster and vector data.
//!
//! Readers for specific file formats live outside this crate. Callers pass
//! pixel counts, candidate locations and sample values; the workflows
//! validate them, run the statistics and return serializable records.

pub mod accuracy;
pub mod area;
pub mod methods_text;
pub mod provenance;
pub mod sampling;

pub use accuracy::{run_accuracy_assessment, AccuracyAssessment, AccuracyInputs, AccuracyRun};
pub use area::{compute_class_areas_ha, pixel_area_ha, ClassAreas};
pub use methods_text::{generate_methods_text, generate_references};
pub use provenance::{RunMetadata, SourceInfo};
pub use sampling::{run_sample_generation, sampling_metadata, SamplingInputs};
