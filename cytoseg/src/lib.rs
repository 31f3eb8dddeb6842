//! cytoseg - Nucleus and cell detection for microscopy images
//!
//! # Overview
//!
//! cytoseg finds nuclei in a region of a (possibly very large) microscopy
//! image, optionally grows them into cells, and reports boundary polygons
//! with shape and per-channel intensity measurements:
//!
//! - Raster containers, polygons and pixel calibration
//! - Gaussian, Laplacian-of-Gaussian and rank filters
//! - Grayscale and binary morphology
//! - Connected components, distance transform, watershed, border tracing
//! - Stain separation of brightfield RGB
//! - The detection pipeline itself
//!
//! # Example
//!
//! ```
//! use cytoseg::{FPix, Mask};
//! use cytoseg::detect::{
//!     DetectionContext, DetectionParameters, ImagePlane, NucleusSegmenter, SegmentationInput,
//!     SegmentationRun,
//! };
//!
//! let mut fpix = FPix::new(30, 30).unwrap();
//! for y in 10..20 {
//!     for x in 10..20 {
//!         fpix.set_pixel(x, y, 100.0).unwrap();
//!     }
//! }
//! let roi = Mask::new_with_value(30, 30, true).unwrap();
//! let input = SegmentationInput {
//!     detection: &fpix,
//!     membrane: None,
//!     roi: &roi,
//!     plane: ImagePlane::default(),
//! };
//! let params = DetectionParameters::new()
//!     .with_background_radius(0.0)
//!     .with_sigma(1.0)
//!     .with_threshold(10.0)
//!     .with_min_area(1.0);
//! let mut segmenter = NucleusSegmenter::new();
//! let run = segmenter
//!     .segment(&input, &params, &mut DetectionContext::new())
//!     .unwrap();
//! assert!(matches!(run, SegmentationRun::Completed(r) if r.kept.len() == 1));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use cytoseg_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use cytoseg_color as color;
pub use cytoseg_detect as detect;
pub use cytoseg_filter as filter;
pub use cytoseg_morph as morph;
pub use cytoseg_region as region;
