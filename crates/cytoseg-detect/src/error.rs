//! Error types for cytoseg-detect

use thiserror::Error;

/// Errors that can occur during cell detection
///
/// Cancellation is not an error; see [`Detection::Cancelled`](crate::Detection).
#[derive(Debug, Error)]
pub enum DetectError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cytoseg_core::Error),

    /// Filter error
    #[error("filter error: {0}")]
    Filter(#[from] cytoseg_filter::FilterError),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] cytoseg_morph::MorphError),

    /// Region processing error
    #[error("region error: {0}")]
    Region(#[from] cytoseg_region::RegionError),

    /// Colour deconvolution error
    #[error("color error: {0}")]
    Color(#[from] cytoseg_color::ColorError),

    /// Missing or empty ROI, zero-sized region, invalid parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Pixel layout or channel set the detector cannot use
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// The region supplier failed to produce pixels
    #[error("region supplier failed: {0}")]
    Supplier(String),
}

/// Result type for detection operations
pub type DetectResult<T> = Result<T, DetectError>;
