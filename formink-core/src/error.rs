//! Error types for core annotation operations.

use thiserror::Error;

/// Result type for core annotation operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the annotation core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document's base image has not resolved, so its intrinsic size is
    /// unknown and coordinate transforms or exports cannot be produced.
    #[error("document not ready: base image '{0}' has no intrinsic size")]
    DocumentNotReady(String),

    /// A view transform was requested for degenerate dimensions.
    #[error("invalid transform: {0}")]
    InvalidTransform(String),

    /// A stroke handle no longer refers to a stroke in the list.
    #[error("stale stroke handle: {0}")]
    StaleStrokeHandle(usize),

    /// A deserialized payload violates a model invariant (e.g. a stroke
    /// with no points).
    #[error("invalid annotation data: {0}")]
    InvalidAnnotation(String),

    /// Annotation list serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
