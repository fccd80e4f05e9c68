//! Error handling and error types for map accuracy assessment.
//!
//! Every statistical precondition has its own variant so callers can tell
//! "the input was wrong" apart from "the computation itself is broken".
//! Nothing here is transient: these are pure functions over given inputs,
//! so no variant is ever retried.

use std::io;
use thiserror::Error;

use crate::config::validation::ValidationIssue;
use crate::core::types::ClassLabel;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum AccuracyError {
    /// Statistical parameter outside its valid domain
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Offending value, rendered as text
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Empty arrays, zero-sum matrices, empty label sets
    #[error("Empty input: {message}")]
    EmptyInput {
        /// Description of what was empty
        message: String,
    },

    /// Paired classified/reference arrays of differing length
    #[error("Array length mismatch: classified={classified}, reference={reference}")]
    LengthMismatch {
        /// Length of the classified sequence
        classified: usize,
        /// Length of the reference sequence
        reference: usize,
    },

    /// Matrix dimensions inconsistent with the declared class labels
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected shape
        expected: String,
        /// Actual shape
        actual: String,
    },

    /// A class label has no mapped area
    #[error("Missing mapped area for class {label}")]
    MissingArea {
        /// Class without an area entry
        label: ClassLabel,
    },

    /// A class has no classified samples, area-weighted estimation is undefined
    #[error("Class {label} has 0 samples in classified map; cannot compute area-weighted estimates")]
    ZeroSampleColumn {
        /// Class whose column total is zero
        label: ClassLabel,
    },

    /// An algebraic identity of the computation did not hold
    #[error("Invariant violated: {message}")]
    InvariantViolation {
        /// Description of the violated identity
        message: String,
    },

    /// Input validation produced at least one fatal finding
    #[error("Validation failed: {}", summarize_issues(.issues))]
    ValidationFailure {
        /// All findings, fatal or not
        issues: Vec<ValidationIssue>,
    },

    /// Area calculation attempted on a geographic (degree-based) CRS
    #[error("Raster CRS (EPSG:{epsg}) is geographic; area calculation requires a projected CRS")]
    GeographicCrs {
        /// EPSG code of the offending CRS, 0 when unknown
        epsg: u32,
    },

    /// Configuration loading or building errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },
}

/// Type alias for Results using AccuracyError
pub type Result<T> = std::result::Result<T, AccuracyError>;

fn summarize_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .filter(|issue| issue.is_fatal())
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl AccuracyError {
    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: ToString,
        R: Into<String>,
    {
        AccuracyError::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an empty input error
    pub fn empty_input<S: Into<String>>(message: S) -> Self {
        AccuracyError::EmptyInput {
            message: message.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        AccuracyError::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant<S: Into<String>>(message: S) -> Self {
        AccuracyError::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        AccuracyError::Config {
            message: message.into(),
        }
    }

    /// Whether the error reports a defect in the computation rather than bad input
    pub fn is_internal_defect(&self) -> bool {
        matches!(self, AccuracyError::InvariantViolation { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AccuracyError::InvalidParameter { .. } => "invalid_parameter",
            AccuracyError::EmptyInput { .. } => "empty_input",
            AccuracyError::LengthMismatch { .. } => "length_mismatch",
            AccuracyError::ShapeMismatch { .. } => "shape_mismatch",
            AccuracyError::MissingArea { .. } => "missing_area",
            AccuracyError::ZeroSampleColumn { .. } => "zero_sample_column",
            AccuracyError::InvariantViolation { .. } => "invariant_violation",
            AccuracyError::ValidationFailure { .. } => "validation_failure",
            AccuracyError::GeographicCrs { .. } => "geographic_crs",
            AccuracyError::Config { .. } => "config",
            AccuracyError::IO { .. } => "io",
            AccuracyError::Json { .. } => "json",
        }
    }
}

impl From<toml::de::Error> for AccuracyError {
    fn from(err: toml::de::Error) -> Self {
        AccuracyError::config(format!("Failed to parse TOML config: {}", err))
    }
}

impl From<toml::ser::Error> for AccuracyError {
    fn from(err: toml::ser::Error) -> Self {
        AccuracyError::config(format!("Failed to serialize TOML config: {}", err))
    }
}

/// Return early with an error when a condition does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
