//! Error types for cytoseg-color

use thiserror::Error;

/// Errors that can occur during colour processing operations
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] cytoseg_core::Error),

    /// Stain vector with no direction or non-finite components
    #[error("invalid stain vector {name}: {reason}")]
    InvalidStain { name: String, reason: &'static str },

    /// Stain vectors that cannot be unmixed
    #[error("stain vectors are linearly dependent")]
    SingularStains,

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for colour operations
pub type ColorResult<T> = Result<T, ColorError>;
