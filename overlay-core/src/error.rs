//! Error types for overlay document operations.
//!
//! Editing operations never fail: lookup misses are no-ops and out-of-range
//! values are clamped. Errors only surface at text boundaries (JSON documents,
//! element id parsing, artifact rendering).

use thiserror::Error;

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that can occur at the document boundary.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// An element id could not be parsed.
    #[error("Invalid element id: {0}")]
    InvalidElementId(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Artifact rendering failed.
    #[error("Export error: {0}")]
    Export(String),
}

impl From<std::fmt::Error> for OverlayError {
    fn from(e: std::fmt::Error) -> Self {
        Self::Export(e.to_string())
    }
}
