//! Detection of cells inside a polygon ROI
//!
//! [`CellDetector`] reads the pixels under an ROI from a [`RegionSupplier`],
//! segments nuclei, optionally expands them into cells and returns the
//! objects in full-resolution image coordinates.

use std::time::Instant;

use crate::assemble::{RegionPlacement, assemble_objects};
use crate::channels::{ImageRegion, extract_channels};
use crate::debug::{DebugRaster, DebugStage, DetectionContext};
use crate::error::{DetectError, DetectResult};
use crate::expand::expand_cells;
use crate::object::DetectedObject;
use crate::params::{DetectionChannel, DetectionParameters, ImagePlane};
use crate::segment::{NucleusSegmenter, SegmentationInput, SegmentationRun};
use cytoseg_color::StainVectors;
use cytoseg_core::{PixelCalibration, Polygon, Rect};

/// Pixels requested from a [`RegionSupplier`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRequest {
    pub downsample: f64,
    /// Region in full-resolution pixels
    pub rect: Rect,
    pub plane: ImagePlane,
}

impl RegionRequest {
    /// Width and height of the pixels to return
    pub fn output_size(&self) -> (u32, u32) {
        self.rect.scaled_size(self.downsample)
    }
}

/// Source of image pixels
pub trait RegionSupplier {
    /// Full-resolution image width and height
    fn image_size(&self) -> (u32, u32);

    /// Full-resolution pixel size
    fn calibration(&self) -> PixelCalibration {
        PixelCalibration::Uncalibrated
    }

    /// Read a region at the requested downsample
    ///
    /// The returned region must be `request.output_size()` pixels.
    fn read_region(&self, request: &RegionRequest) -> DetectResult<ImageRegion>;
}

/// Outcome of one detection
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Completed(Vec<DetectedObject>),
    Cancelled,
}

impl Detection {
    /// Objects of a completed detection
    pub fn objects(&self) -> Option<&[DetectedObject]> {
        match self {
            Detection::Completed(objects) => Some(objects),
            Detection::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Detection::Cancelled)
    }
}

/// Cell detector with a seed cache
#[derive(Debug)]
pub struct CellDetector {
    segmenter: NucleusSegmenter,
    stains: Option<StainVectors>,
    channel: DetectionChannel,
    downsample: f64,
}

impl Default for CellDetector {
    fn default() -> Self {
        Self {
            segmenter: NucleusSegmenter::new(),
            stains: None,
            channel: DetectionChannel::default(),
            downsample: 1.0,
        }
    }
}

impl CellDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stain vectors for brightfield images
    pub fn with_stains(mut self, stains: StainVectors) -> Self {
        self.stains = Some(stains);
        self
    }

    pub fn with_detection_channel(mut self, channel: DetectionChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Downsample at which detection runs
    pub fn with_downsample(mut self, downsample: f64) -> Self {
        self.downsample = downsample;
        self
    }

    pub fn downsample(&self) -> f64 {
        self.downsample
    }

    pub fn segmenter(&self) -> &NucleusSegmenter {
        &self.segmenter
    }

    /// Same configuration with an empty seed cache
    pub fn fork(&self) -> Self {
        Self {
            segmenter: NucleusSegmenter::new(),
            stains: self.stains.clone(),
            channel: self.channel.clone(),
            downsample: self.downsample,
        }
    }

    /// Detect nuclei and cells inside `roi`
    ///
    /// # Arguments
    ///
    /// * `supplier` - Pixel source
    /// * `roi` - Region of interest in full-resolution image coordinates
    /// * `params` - Parameters in pixels at the detector's downsample
    /// * `ctx` - Cancellation token and optional debug sink
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidInput`] for an empty ROI, one outside
    /// the image or invalid parameters, [`DetectError::UnsupportedInput`]
    /// when the channels cannot be used, and supplier errors unchanged.
    pub fn detect<S: RegionSupplier + ?Sized>(
        &mut self,
        supplier: &S,
        roi: &Polygon,
        params: &DetectionParameters,
        ctx: &mut DetectionContext<'_>,
    ) -> DetectResult<Detection> {
        let start = Instant::now();
        params.validate()?;
        let downsample = self.downsample;
        if !(downsample.is_finite() && downsample >= 1.0) {
            return Err(DetectError::InvalidInput(format!(
                "downsample must be at least 1, got {downsample}"
            )));
        }
        if roi.len() < 3 || !(roi.area() > 0.0) {
            return Err(DetectError::InvalidInput("ROI has no area".to_string()));
        }
        let Some((min_x, min_y, max_x, max_y)) = roi.bounds() else {
            return Err(DetectError::InvalidInput("ROI has no vertices".to_string()));
        };

        let pad = (params.cell_expansion * downsample).ceil() as i32;
        let (image_w, image_h) = supplier.image_size();
        let rect = Rect::enclosing(min_x, min_y, max_x, max_y)
            .pad(pad)
            .clip_to(image_w, image_h)
            .ok_or_else(|| DetectError::InvalidInput("ROI lies outside the image".to_string()))?;

        let request = RegionRequest {
            downsample,
            rect,
            plane: params.plane,
        };
        let region = supplier.read_region(&request)?;
        let (width, height) = request.output_size();
        if region.dimensions() != (width, height) {
            return Err(DetectError::UnsupportedInput(format!(
                "supplier returned {:?}, expected {:?}",
                region.dimensions(),
                (width, height)
            )));
        }

        let channels = extract_channels(&region, self.stains.as_ref(), &self.channel)?;
        let roi_mask = roi.rasterize(rect.x as f64, rect.y as f64, downsample, width, height)?;
        if roi_mask.is_clear() {
            return Err(DetectError::InvalidInput(
                "ROI covers no pixel centres".to_string(),
            ));
        }

        let input = SegmentationInput {
            detection: &channels.detection,
            membrane: channels.membrane.as_ref(),
            roi: &roi_mask,
            plane: params.plane,
        };
        let nuclei = match self.segmenter.segment(&input, params, ctx)? {
            SegmentationRun::Completed(nuclei) => nuclei,
            SegmentationRun::Cancelled => return Ok(Detection::Cancelled),
        };

        if ctx.is_cancelled() {
            return Ok(Detection::Cancelled);
        }
        let cells = expand_cells(&nuclei.labels, params.cell_expansion)?;
        if let Some(exp) = &cells {
            ctx.emit(DebugStage::Cells, DebugRaster::Labels(&exp.cells));
        }

        let placement = RegionPlacement {
            origin_x: rect.x as f64,
            origin_y: rect.y as f64,
            downsample,
            calibration: supplier.calibration(),
        };
        let objects = assemble_objects(&nuclei, cells.as_ref(), &channels, &placement, params)?;

        let duration = start.elapsed();
        let pixels = (width as u64 * height as u64).max(1);
        log::debug!(
            "detection complete: channel={} nuclei={} objects={} seeds_reused={} duration={:.3}ms time_per_pixel={:.2}ns/pixel",
            channels.detection_name,
            nuclei.kept.len(),
            objects.len(),
            self.segmenter.last_run_reused_seeds(),
            duration.as_secs_f64() * 1e3,
            duration.as_nanos() as f64 / pixels as f64
        );
        Ok(Detection::Completed(objects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl RegionSupplier for Blank {
        fn image_size(&self) -> (u32, u32) {
            (40, 40)
        }

        fn read_region(&self, request: &RegionRequest) -> DetectResult<ImageRegion> {
            let (width, height) = request.output_size();
            Ok(ImageRegion::Channels {
                width,
                height,
                channels: vec![("DAPI".to_string(), vec![0.0; (width * height) as usize])],
            })
        }
    }

    #[test]
    fn test_request_output_size() {
        let request = RegionRequest {
            downsample: 2.0,
            rect: Rect::new(0, 0, 10, 7).unwrap(),
            plane: ImagePlane::default(),
        };
        assert_eq!(request.output_size(), (5, 4));
    }

    #[test]
    fn test_degenerate_roi() {
        let mut det = CellDetector::new();
        let line = Polygon::from_points(vec![(0.0, 0.0), (10.0, 10.0), (5.0, 5.0)]);
        let err = det
            .detect(&Blank, &line, &DetectionParameters::new(), &mut DetectionContext::new())
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidInput(_)));
    }

    #[test]
    fn test_roi_outside_image() {
        let mut det = CellDetector::new();
        let roi = Polygon::rectangle(100.0, 100.0, 10.0, 10.0);
        let params = DetectionParameters::new().with_cell_expansion(0.0);
        let err = det
            .detect(&Blank, &roi, &params, &mut DetectionContext::new())
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_image_has_no_objects() {
        let mut det = CellDetector::new();
        let roi = Polygon::rectangle(5.0, 5.0, 30.0, 30.0);
        let run = det
            .detect(&Blank, &roi, &DetectionParameters::new(), &mut DetectionContext::new())
            .unwrap();
        assert_eq!(run.objects().map(<[_]>::len), Some(0));
    }
}
