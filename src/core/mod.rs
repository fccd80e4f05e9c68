//! Core infrastructure module.
//!
//! Fundamental value types, constants and the crate error type. Everything
//! else in the crate builds on these.
//!
//! - [`types`]: class labels, coordinates, confidence intervals
//! - [`constants`]: statistical constants and defaults
//! - [`error`]: the [`AccuracyError`] taxonomy
//!
//! ```rust
//! use map_accuracy::core::{
//!     types::{ClassLabelSet, ConfidenceInterval},
//!     constants::DEFAULT_CONFIDENCE_LEVEL,
//!     error::Result,
//! };
//!
//! let labels = ClassLabelSet::new(vec![1, 2, 3])?;
//! assert_eq!(labels.index_of(2), Some(1));
//! assert_eq!(DEFAULT_CONFIDENCE_LEVEL, 0.95);
//! let ci = ConfidenceInterval::new(0.7, 0.9);
//! assert!(ci.contains(0.8));
//! # Ok::<(), map_accuracy::AccuracyError>(())
//! ```

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{AccuracyError, Result};
pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};

/// Optional capabilities compiled into this build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreCapabilities {
    /// k-d tree proximity strategy is the default
    pub spatial_index_default: bool,
    /// JSON/TOML configuration and provenance export
    pub serialization: bool,
}

impl Default for CoreCapabilities {
    fn default() -> Self {
        CoreCapabilities {
            spatial_index_default: cfg!(feature = "spatial-index"),
            serialization: true,
        }
    }
}

impl CoreCapabilities {
    /// Get a summary of available capabilities
    pub fn summary(&self) -> String {
        let mut features = Vec::new();
        if self.spatial_index_default {
            features.push("k-d tree proximity index");
        } else {
            features.push("brute-force proximity checks");
        }
        if self.serialization {
            features.push("JSON/TOML serialization");
        }
        format!("Core capabilities: {}", features.join(", "))
    }
}

static CORE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize logging for the crate. Safe to call more than once.
pub fn initialize_core() -> Result<()> {
    if CORE_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    // A host application may already have installed a logger.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    log::info!("map-accuracy {} initialized", MAP_ACCURACY_VERSION);
    log::debug!("{}", CoreCapabilities::default().summary());
    Ok(())
}

/// Check if [`initialize_core`] has run
pub fn is_core_initialized() -> bool {
    CORE_INITIALIZED.load(Ordering::SeqCst)
}
