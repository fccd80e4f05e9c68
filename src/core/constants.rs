//! Statistical constants and configuration defaults.

/// Crate version string.
pub const MAP_ACCURACY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default confidence level for intervals and sample-size calculation.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default expected overall accuracy used by Cochran's formula.
pub const DEFAULT_EXPECTED_ACCURACY: f64 = 0.85;

/// Default margin of error used by Cochran's formula.
pub const DEFAULT_MARGIN_OF_ERROR: f64 = 0.05;

/// Minimum samples per class recommended by Olofsson et al. (2014).
pub const RECOMMENDED_MIN_SAMPLES_PER_CLASS: usize = 25;

/// Default random seed for sample generation.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// z-score used when a caller supplies none (95% two-sided).
pub const DEFAULT_Z_SCORE: f64 = 1.96;

/// Exact z-scores for the standard confidence levels.
pub const STANDARD_Z_SCORES: [(f64, f64); 5] = [
    (0.80, 1.2816),
    (0.85, 1.4395),
    (0.90, 1.6449),
    (0.95, 1.9600),
    (0.99, 2.5758),
];

/// Absolute tolerance of the Pontius identity QD + AD = 1 - OA.
pub const PONTIUS_IDENTITY_TOLERANCE: f64 = 1e-9;

/// Below this distance from 1, expected agreement makes Kappa undefined.
pub const KAPPA_DEGENERATE_EPSILON: f64 = 1e-15;

/// Square metres per hectare.
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Name of the only sampling scheme currently produced.
pub const STRATIFIED_RANDOM_SCHEME: &str = "stratified_random";
