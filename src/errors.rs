//! Error types for seismocast.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur in seismocast operations.
#[derive(Error, Debug)]
pub enum EewError {
    /// Reading input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Intensity code outside the defined scale
    #[error("Invalid intensity code: {0} (expected 0-9)")]
    InvalidIntensity(i64),

    /// Intensity label that is not on the scale
    #[error("Invalid intensity label: {0}")]
    InvalidIntensityLabel(String),

    /// A city group references a region the prediction never evaluated
    #[error("City '{city}' references region {code} which is missing from the prediction")]
    UnknownRegion { city: String, code: u32 },

    /// Region catalog is inconsistent
    #[error("Invalid region catalog: {0}")]
    Catalog(String),

    /// Derived prediction requested before it was computed
    #[error("Expected intensity has not been calculated for this earthquake")]
    NotComputed,

    /// Event validation failed
    #[error("Invalid event data: {0}")]
    InvalidEvent(String),
}
