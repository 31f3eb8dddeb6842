//! cytoseg core - basic data structures for cell segmentation
//!
//! This crate provides the containers shared by every other crate in the
//! workspace:
//!
//! - [`FPix`] - single-channel floating-point raster
//! - [`LabelPix`] - integer label raster (0 = background)
//! - [`Mask`] - binary raster
//! - [`Rect`] - integer pixel rectangle
//! - [`Polygon`] - closed polygon with `f64` vertices
//! - [`PixelCalibration`] - physical pixel size

pub mod calibration;
pub mod error;
pub mod fpix;
pub mod label;
pub mod mask;
pub mod polygon;
pub mod rect;

pub use calibration::PixelCalibration;
pub use error::{Error, Result};
pub use fpix::{FPix, check_dimensions};
pub use label::LabelPix;
pub use mask::Mask;
pub use polygon::{Polygon, point_segment_distance};
pub use rect::Rect;
