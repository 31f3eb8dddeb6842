//! cytoseg-color - Stain separation for brightfield images
//!
//! This crate provides:
//!
//! - **Stain vectors** ([`stain`]): normalised stain directions, residual
//!   computation, H-DAB and H&E presets
//! - **Colour deconvolution** ([`deconvolve`]): optical density and
//!   unmixing of RGB pixels into per-stain float rasters

pub mod deconvolve;
pub mod error;
pub mod stain;

// Re-export core types
pub use cytoseg_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

pub use deconvolve::{color_deconvolve, optical_density, optical_density_sum};
pub use stain::{StainVector, StainVectors};
