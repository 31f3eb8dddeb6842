//! cytoseg-morph - Morphological operations
//!
//! This crate provides morphological operations including:
//!
//! - Structuring elements (SEL) for defining operation neighborhoods
//! - Binary morphology on [`Mask`](cytoseg_core::Mask): erosion, dilation,
//!   opening, closing
//! - Grayscale morphology on [`FPix`](cytoseg_core::FPix): erosion,
//!   dilation, opening, closing

pub mod binary;
mod error;
pub mod grayscale;
pub mod sel;

pub use error::{MorphError, MorphResult};
pub use sel::Sel;

// Re-export commonly used binary morphology functions
pub use binary::{close, dilate, dilate_brick, erode, erode_brick, open};

// Re-export commonly used grayscale morphology functions
pub use grayscale::{close_gray, dilate_gray, erode_gray, open_gray};
