//! cytoseg-detect - Nucleus and cell detection
//!
//! This crate implements watershed-based cell detection on microscopy
//! images:
//!
//! - **Channel extraction** - Stain separation or named fluorescence bands
//! - **Background estimation** - Grayscale opening, optionally by reconstruction
//! - **Nucleus segmentation** - LoG oversegmentation, gating and fusion, with a seed cache
//! - **Cell expansion** - Distance-limited growth of nuclei into cells
//! - **Measurements** - Shape and per-channel intensity statistics
//! - **Object assembly** - Smoothed boundaries in image coordinates
//!
//! # Example
//!
//! ```
//! use cytoseg_core::Polygon;
//! use cytoseg_detect::{
//!     CellDetector, DetectResult, DetectionContext, DetectionParameters, ImageRegion,
//!     RegionRequest, RegionSupplier,
//! };
//!
//! struct Tile;
//!
//! impl RegionSupplier for Tile {
//!     fn image_size(&self) -> (u32, u32) {
//!         (30, 30)
//!     }
//!
//!     fn read_region(&self, request: &RegionRequest) -> DetectResult<ImageRegion> {
//!         let (w, h) = request.output_size();
//!         let r = request.rect;
//!         let mut values = Vec::with_capacity((w * h) as usize);
//!         for y in r.y..r.y + h as i32 {
//!             for x in r.x..r.x + w as i32 {
//!                 let inside = (10..20).contains(&x) && (10..20).contains(&y);
//!                 values.push(if inside { 100.0 } else { 0.0 });
//!             }
//!         }
//!         Ok(ImageRegion::Channels {
//!             width: w,
//!             height: h,
//!             channels: vec![("DAPI".to_string(), values)],
//!         })
//!     }
//! }
//!
//! let params = DetectionParameters::new()
//!     .with_background_radius(0.0)
//!     .with_sigma(1.0)
//!     .with_threshold(10.0)
//!     .with_min_area(1.0)
//!     .with_cell_expansion(0.0);
//! let roi = Polygon::rectangle(0.0, 0.0, 30.0, 30.0);
//! let mut detector = CellDetector::new();
//! let result = detector
//!     .detect(&Tile, &roi, &params, &mut DetectionContext::new())
//!     .unwrap();
//! assert_eq!(result.objects().map(|o| o.len()), Some(1));
//! ```

pub mod assemble;
pub mod background;
pub mod batch;
pub mod cancel;
pub mod channels;
pub mod debug;
pub mod detector;
pub mod error;
pub mod expand;
pub mod measure;
pub mod object;
pub mod params;
pub mod segment;
pub mod shape;
pub mod smooth;

// Re-export lower crates
pub use cytoseg_color;
pub use cytoseg_core;
pub use cytoseg_region;

// Re-export error types
pub use error::{DetectError, DetectResult};

// Re-export configuration
pub use params::{
    DetectionChannel, DetectionParameters, ImagePlane, PhysicalParameters, ProcessingScale,
};

// Re-export pipeline stages
pub use assemble::{RegionPlacement, assemble_objects};
pub use background::{BackgroundEstimate, estimate_background};
pub use channels::{ChannelSet, ImageRegion, OD_SUM_CHANNEL, extract_channels};
pub use expand::{CellExpansion, expand_cells};
pub use measure::{
    AREA_RATIO, Compartment, RunningStats, Statistic, intensity_name, measure_labels,
    put_intensity,
};
pub use segment::{
    NucleusSegmentation, NucleusSegmenter, SeedKey, SeedPartition, SegmentationInput,
    SegmentationRun,
};
pub use shape::ShapeMeasurements;
pub use smooth::smooth_polygon;

// Re-export objects and the detector
pub use batch::detect_batch;
pub use cancel::CancellationToken;
pub use debug::{DebugRaster, DebugSink, DebugStage, DetectionContext};
pub use detector::{CellDetector, Detection, RegionRequest, RegionSupplier};
pub use object::{DetectedObject, MeasurementList, NucleusView, ObjectKind};
