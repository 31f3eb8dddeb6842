//! Pixel calibration
//!
//! A raster is either uncalibrated (distances in pixels) or carries the
//! physical width and height of one pixel, expressed in micrometres.

use crate::error::{Error, Result};

/// Physical size of a pixel at full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PixelCalibration {
    /// Distances are reported in pixels
    #[default]
    Uncalibrated,
    /// Pixel width and height in micrometres
    Microns { pixel_width: f64, pixel_height: f64 },
}

impl PixelCalibration {
    /// Create a calibration from a pixel width and height in micrometres.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCalibration` unless both sizes are finite and
    /// strictly positive.
    pub fn microns(pixel_width: f64, pixel_height: f64) -> Result<Self> {
        if !(pixel_width.is_finite() && pixel_height.is_finite())
            || pixel_width <= 0.0
            || pixel_height <= 0.0
        {
            return Err(Error::InvalidCalibration {
                width: pixel_width,
                height: pixel_height,
            });
        }
        Ok(Self::Microns {
            pixel_width,
            pixel_height,
        })
    }

    /// Whether a physical pixel size is known
    #[inline]
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Microns { .. })
    }

    /// Pixel width in calibrated units (1.0 when uncalibrated)
    #[inline]
    pub fn pixel_width(&self) -> f64 {
        match *self {
            Self::Uncalibrated => 1.0,
            Self::Microns { pixel_width, .. } => pixel_width,
        }
    }

    /// Pixel height in calibrated units (1.0 when uncalibrated)
    #[inline]
    pub fn pixel_height(&self) -> f64 {
        match *self {
            Self::Uncalibrated => 1.0,
            Self::Microns { pixel_height, .. } => pixel_height,
        }
    }

    /// Mean of pixel width and height, used to convert isotropic lengths
    #[inline]
    pub fn average_pixel_size(&self) -> f64 {
        0.5 * (self.pixel_width() + self.pixel_height())
    }

    /// Unit name for lengths
    pub fn length_unit(&self) -> &'static str {
        match self {
            Self::Uncalibrated => "px",
            Self::Microns { .. } => "µm",
        }
    }

    /// Calibration of a raster read at `downsample` relative to full resolution.
    pub fn scaled(&self, downsample: f64) -> Self {
        match *self {
            Self::Uncalibrated => Self::Uncalibrated,
            Self::Microns {
                pixel_width,
                pixel_height,
            } => Self::Microns {
                pixel_width: pixel_width * downsample,
                pixel_height: pixel_height * downsample,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncalibrated_defaults() {
        let cal = PixelCalibration::default();
        assert!(!cal.is_calibrated());
        assert_eq!(cal.pixel_width(), 1.0);
        assert_eq!(cal.average_pixel_size(), 1.0);
        assert_eq!(cal.length_unit(), "px");
    }

    #[test]
    fn test_microns_rejects_nonpositive() {
        assert!(PixelCalibration::microns(0.0, 0.5).is_err());
        assert!(PixelCalibration::microns(0.5, f64::NAN).is_err());
        assert!(PixelCalibration::microns(0.25, 0.5).is_ok());
    }

    #[test]
    fn test_scaled() {
        let cal = PixelCalibration::microns(0.25, 0.5).unwrap().scaled(4.0);
        assert_eq!(cal.pixel_width(), 1.0);
        assert_eq!(cal.pixel_height(), 2.0);
    }
}
