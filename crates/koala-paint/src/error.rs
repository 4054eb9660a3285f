//! Paint failures.

use thiserror::Error;

/// Why a node (or a whole paint call) could not be painted.
///
/// Image load failures are recovered inside the image painter, so
/// [`PaintError::ImageLoad`] only shows up from the loader API itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaintError {
    /// The paint context is unusable (e.g. a non-positive scale factor).
    #[error("invalid paint context")]
    InvalidContext,
    /// A frame with non-finite geometry.
    #[error("invalid frame")]
    InvalidFrame,
    /// The text backend failed to shape or measure.
    #[error("text rendering failed: {0}")]
    TextRendering(String),
    /// An image could not be fetched or decoded.
    #[error("image load failed: {0}")]
    ImageLoad(String),
    /// Content the painter cannot handle.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result alias for paint steps.
pub type PaintResult<T> = Result<T, PaintError>;
