//! Detection parameters
//!
//! [`DetectionParameters`] holds every setting in pixels at the processing
//! resolution. [`PhysicalParameters`] is the micron-denominated form users
//! enter; it converts to pixel parameters once the image calibration and
//! processing scale are known.

use crate::error::{DetectError, DetectResult};
use cytoseg_core::PixelCalibration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Z-slice and timepoint of the plane being analysed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImagePlane {
    pub z: u32,
    pub t: u32,
}

impl ImagePlane {
    pub fn new(z: u32, t: u32) -> Self {
        Self { z, t }
    }
}

/// Which channel drives segmentation
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetectionChannel {
    /// First non-residual stain of a brightfield image, or the first
    /// channel of a multi-channel image
    #[default]
    NuclearStain,
    /// Sum of the RGB optical densities (brightfield only)
    OpticalDensitySum,
    /// Channel selected by name
    Named(String),
}

/// Settings for one detection, in pixels at the processing resolution
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionParameters {
    /// Median filter radius applied before detection (0 disables)
    pub median_radius: f64,
    /// Opening radius for background estimation (0 disables)
    pub background_radius: f64,
    /// Background level above which the surroundings are excluded (0 disables)
    pub max_background: f64,
    /// Gaussian sigma of the Laplacian-of-Gaussian
    pub sigma: f64,
    /// Minimum mean of a nucleus in the background-subtracted channel
    pub threshold: f64,
    /// Minimum nucleus area in pixels
    pub min_area: f64,
    /// Maximum nucleus area in pixels (0 disables)
    pub max_area: f64,
    /// Split fused nuclei along distance-map ridges
    pub watershed_post_process: bool,
    /// Suppress detection where a membrane stain dominates
    pub exclude_membrane_channel: bool,
    /// Distance nuclei are grown into cells (0 disables)
    pub cell_expansion: f64,
    /// Smooth and simplify traced boundaries
    pub smooth_boundaries: bool,
    /// Keep the nucleus attached to its cell
    pub include_nuclei: bool,
    /// Attach shape and intensity measurements
    pub make_measurements: bool,
    /// Estimate background by reconstruction instead of plain opening
    pub background_by_reconstruction: bool,
    /// Plane to read
    pub plane: ImagePlane,
}

impl Default for DetectionParameters {
    fn default() -> Self {
        Self {
            median_radius: 0.0,
            background_radius: 15.0,
            max_background: 2.0,
            sigma: 3.0,
            threshold: 0.1,
            min_area: 10.0,
            max_area: 1000.0,
            watershed_post_process: true,
            exclude_membrane_channel: false,
            cell_expansion: 10.0,
            smooth_boundaries: true,
            include_nuclei: true,
            make_measurements: true,
            background_by_reconstruction: true,
            plane: ImagePlane::default(),
        }
    }
}

impl DetectionParameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_median_radius(mut self, radius: f64) -> Self {
        self.median_radius = radius;
        self
    }

    pub fn with_background_radius(mut self, radius: f64) -> Self {
        self.background_radius = radius;
        self
    }

    pub fn with_max_background(mut self, level: f64) -> Self {
        self.max_background = level;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_area(mut self, area: f64) -> Self {
        self.min_area = area;
        self
    }

    pub fn with_max_area(mut self, area: f64) -> Self {
        self.max_area = area;
        self
    }

    pub fn with_watershed_post_process(mut self, enabled: bool) -> Self {
        self.watershed_post_process = enabled;
        self
    }

    pub fn with_exclude_membrane_channel(mut self, enabled: bool) -> Self {
        self.exclude_membrane_channel = enabled;
        self
    }

    pub fn with_cell_expansion(mut self, distance: f64) -> Self {
        self.cell_expansion = distance;
        self
    }

    pub fn with_smooth_boundaries(mut self, enabled: bool) -> Self {
        self.smooth_boundaries = enabled;
        self
    }

    pub fn with_include_nuclei(mut self, enabled: bool) -> Self {
        self.include_nuclei = enabled;
        self
    }

    pub fn with_make_measurements(mut self, enabled: bool) -> Self {
        self.make_measurements = enabled;
        self
    }

    pub fn with_background_by_reconstruction(mut self, enabled: bool) -> Self {
        self.background_by_reconstruction = enabled;
        self
    }

    pub fn with_plane(mut self, plane: ImagePlane) -> Self {
        self.plane = plane;
        self
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidInput`] for non-finite values, negative
    /// radii or areas, or a positive `max_area` below `min_area`.
    pub fn validate(&self) -> DetectResult<()> {
        let fields = [
            ("median_radius", self.median_radius),
            ("background_radius", self.background_radius),
            ("max_background", self.max_background),
            ("sigma", self.sigma),
            ("min_area", self.min_area),
            ("max_area", self.max_area),
            ("cell_expansion", self.cell_expansion),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(DetectError::InvalidInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
            if value < 0.0 {
                return Err(DetectError::InvalidInput(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if !self.threshold.is_finite() {
            return Err(DetectError::InvalidInput(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.max_area > 0.0 && self.max_area < self.min_area {
            return Err(DetectError::InvalidInput(format!(
                "max_area {} is below min_area {}",
                self.max_area, self.min_area
            )));
        }
        Ok(())
    }
}

/// Downsample factor at which detection runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingScale {
    pub downsample: f64,
}

impl ProcessingScale {
    /// Full resolution
    pub const FULL: ProcessingScale = ProcessingScale { downsample: 1.0 };

    /// Downsample so pixels are close to `requested_pixel_size` microns
    ///
    /// Never upsamples. Uncalibrated images or a non-positive request run
    /// at full resolution.
    pub fn for_request(calibration: &PixelCalibration, requested_pixel_size: f64) -> Self {
        if !calibration.is_calibrated() || !(requested_pixel_size > 0.0) {
            return Self::FULL;
        }
        Self {
            downsample: (requested_pixel_size / calibration.average_pixel_size()).max(1.0),
        }
    }
}

/// User-facing settings in microns
///
/// For uncalibrated images the length and area fields are read as
/// full-resolution pixels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalParameters {
    pub requested_pixel_size: f64,
    pub median_radius: f64,
    pub background_radius: f64,
    pub max_background: f64,
    pub sigma: f64,
    pub threshold: f64,
    pub min_area: f64,
    pub max_area: f64,
    pub watershed_post_process: bool,
    pub exclude_membrane_channel: bool,
    pub cell_expansion: f64,
    pub smooth_boundaries: bool,
    pub include_nuclei: bool,
    pub make_measurements: bool,
    pub background_by_reconstruction: bool,
    pub plane: ImagePlane,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            requested_pixel_size: 0.5,
            median_radius: 0.0,
            background_radius: 8.0,
            max_background: 2.0,
            sigma: 1.5,
            threshold: 0.1,
            min_area: 10.0,
            max_area: 400.0,
            watershed_post_process: true,
            exclude_membrane_channel: false,
            cell_expansion: 5.0,
            smooth_boundaries: true,
            include_nuclei: true,
            make_measurements: true,
            background_by_reconstruction: true,
            plane: ImagePlane::default(),
        }
    }
}

impl PhysicalParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to pixel parameters at `downsample`
    ///
    /// Lengths are divided by the processing pixel size, areas by its
    /// square.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidInput`] if `downsample` is not positive
    /// or the converted parameters fail validation.
    pub fn to_pixel_parameters(
        &self,
        calibration: &PixelCalibration,
        downsample: f64,
    ) -> DetectResult<DetectionParameters> {
        if !(downsample.is_finite() && downsample > 0.0) {
            return Err(DetectError::InvalidInput(format!(
                "downsample must be positive, got {downsample}"
            )));
        }
        let pixel = calibration.average_pixel_size() * downsample;
        let area = pixel * pixel;
        let params = DetectionParameters {
            median_radius: self.median_radius / pixel,
            background_radius: self.background_radius / pixel,
            max_background: self.max_background,
            sigma: self.sigma / pixel,
            threshold: self.threshold,
            min_area: self.min_area / area,
            max_area: self.max_area / area,
            watershed_post_process: self.watershed_post_process,
            exclude_membrane_channel: self.exclude_membrane_channel,
            cell_expansion: self.cell_expansion / pixel,
            smooth_boundaries: self.smooth_boundaries,
            include_nuclei: self.include_nuclei,
            make_measurements: self.make_measurements,
            background_by_reconstruction: self.background_by_reconstruction,
            plane: self.plane,
        };
        params.validate()?;
        Ok(params)
    }

    /// Processing scale and pixel parameters for an image
    pub fn resolve(
        &self,
        calibration: &PixelCalibration,
    ) -> DetectResult<(ProcessingScale, DetectionParameters)> {
        let scale = ProcessingScale::for_request(calibration, self.requested_pixel_size);
        let params = self.to_pixel_parameters(calibration, scale.downsample)?;
        Ok((scale, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(DetectionParameters::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let p = DetectionParameters::new().with_sigma(-1.0);
        assert!(matches!(p.validate(), Err(DetectError::InvalidInput(_))));
        let p = DetectionParameters::new().with_min_area(50.0).with_max_area(20.0);
        assert!(p.validate().is_err());
        let p = DetectionParameters::new().with_min_area(50.0).with_max_area(0.0);
        assert!(p.validate().is_ok());
        let p = DetectionParameters::new().with_threshold(f64::NAN);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_processing_scale() {
        let cal = PixelCalibration::microns(0.25, 0.25).unwrap();
        assert_eq!(ProcessingScale::for_request(&cal, 0.5).downsample, 2.0);
        assert_eq!(ProcessingScale::for_request(&cal, 0.1).downsample, 1.0);
        let uncal = PixelCalibration::Uncalibrated;
        assert_eq!(ProcessingScale::for_request(&uncal, 0.5), ProcessingScale::FULL);
    }

    #[test]
    fn test_physical_conversion() {
        let cal = PixelCalibration::microns(0.25, 0.25).unwrap();
        let phys = PhysicalParameters::new();
        let (scale, px) = phys.resolve(&cal).unwrap();
        assert_eq!(scale.downsample, 2.0);
        // 0.5 micron processing pixels
        assert_eq!(px.background_radius, 16.0);
        assert_eq!(px.sigma, 3.0);
        assert_eq!(px.min_area, 40.0);
        assert_eq!(px.max_area, 1600.0);
        assert_eq!(px.cell_expansion, 10.0);
        assert_eq!(px.threshold, phys.threshold);
    }

    #[test]
    fn test_uncalibrated_reads_pixels() {
        let phys = PhysicalParameters::new();
        let px = phys
            .to_pixel_parameters(&PixelCalibration::Uncalibrated, 1.0)
            .unwrap();
        assert_eq!(px.background_radius, phys.background_radius);
        assert_eq!(px.min_area, phys.min_area);
    }
}
