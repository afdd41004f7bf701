//! Error types for rendering and export.

use thiserror::Error;

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The base image bytes could not be decoded.
    #[error("invalid base image: {0}")]
    InvalidImage(String),

    /// A raster surface could not be allocated.
    #[error("surface allocation failed: {0}")]
    Surface(String),

    /// The annotation layer could not be rasterized.
    #[error("annotation layer rendering failed: {0}")]
    Layer(String),

    /// Terminal export failure: both the primary and the fallback encoder
    /// failed.
    #[error("export failed: {0}")]
    ExportFailed(String),

    /// An error bubbled up from the annotation core (e.g. document not
    /// ready).
    #[error(transparent)]
    Core(#[from] formink_core::CoreError),
}
