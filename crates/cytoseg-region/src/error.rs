//! Error types for cytoseg-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cytoseg_core::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Marker and surface rasters disagree
    #[error("segmentation error: {0}")]
    SegmentationError(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
