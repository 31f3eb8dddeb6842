//! FPix - Floating-point raster
//!
//! `FPix` is a 2D array of `f32` values. Every channel handed to the
//! detector (optical densities, fluorescence intensities, background
//! estimates, filter responses) is an `FPix`.
//!
//! # Examples
//!
//! ```
//! use cytoseg_core::FPix;
//!
//! // Create a 100x100 floating-point raster
//! let mut fpix = FPix::new(100, 100).unwrap();
//!
//! // Set and get pixel values
//! fpix.set_pixel(10, 20, 0.5).unwrap();
//! assert_eq!(fpix.get_pixel(10, 20).unwrap(), 0.5);
//!
//! // Get statistics
//! let (min_val, _, _) = fpix.min().unwrap();
//! let (max_val, max_x, max_y) = fpix.max().unwrap();
//! assert_eq!((min_val, max_val, max_x, max_y), (0.0, 0.5, 10, 20));
//! ```

use crate::calibration::PixelCalibration;
use crate::error::{Error, Result};

/// Floating-point raster
///
/// A 2D array of `f32` values tagged with the pixel calibration of the
/// resolution it was read at.
///
/// # Memory Layout
///
/// Data is stored in row-major order with no padding. The pixel at (x, y)
/// is at index `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FPix {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Pixel data (row-major, no padding)
    data: Vec<f32>,
    /// Physical pixel size at this raster's resolution
    calibration: PixelCalibration,
}

impl FPix {
    /// Create a new FPix with all pixels set to zero
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use cytoseg_core::FPix;
    ///
    /// let fpix = FPix::new(640, 480).unwrap();
    /// assert_eq!(fpix.width(), 640);
    /// assert_eq!(fpix.height(), 480);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, 0.0)
    }

    /// Create a new FPix with all pixels set to the specified value
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let size = (width as usize) * (height as usize);
        Ok(FPix {
            width,
            height,
            data: vec![value; size],
            calibration: PixelCalibration::Uncalibrated,
        })
    }

    /// Create a FPix from raw data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let expected_size = (width as usize) * (height as usize);
        if data.len() != expected_size {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{} = {}",
                data.len(),
                width,
                height,
                expected_size
            )));
        }

        Ok(FPix {
            width,
            height,
            data,
            calibration: PixelCalibration::Uncalibrated,
        })
    }

    /// Builder-style calibration setter
    pub fn with_calibration(mut self, calibration: PixelCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Get the image width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the image dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed raster; provided for API symmetry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel calibration
    #[inline]
    pub fn calibration(&self) -> PixelCalibration {
        self.calibration
    }

    /// Get the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<f32> {
        let idx = self.checked_index(x, y)?;
        Ok(self.data[idx])
    }

    /// Set the pixel value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, value: f32) -> Result<()> {
        let idx = self.checked_index(x, y)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Set the pixel value at (x, y) without bounds checking
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: f32) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.data[idx] = value;
    }

    /// Get the pixel at signed coordinates, replicating the nearest edge
    /// pixel for coordinates outside the raster.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[cy * self.width as usize + cx]
    }

    fn checked_index(&self, x: u32, y: u32) -> Result<usize> {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.data.len(),
            });
        }
        Ok(idx)
    }

    /// Get raw access to the pixel data
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Clear all pixels to zero
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Create a template FPix with the same dimensions, zeroed data.
    ///
    /// Preserves the calibration of the source.
    pub fn create_template(&self) -> FPix {
        FPix {
            width: self.width,
            height: self.height,
            data: vec![0.0; self.data.len()],
            calibration: self.calibration,
        }
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    /// Add two FPix images element-wise
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn add(&self, other: &FPix) -> Result<FPix> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Subtract other FPix from this one element-wise
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn sub(&self, other: &FPix) -> Result<FPix> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Combine two rasters element-wise with `f`
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn zip_with(&self, other: &FPix, f: impl Fn(f32, f32) -> f32) -> Result<FPix> {
        self.check_same_size(other)?;

        let mut result = self.create_template();
        for ((r, &a), &b) in result.data.iter_mut().zip(&self.data).zip(&other.data) {
            *r = f(a, b);
        }
        Ok(result)
    }

    /// Multiply all pixels by a constant (in-place)
    pub fn mul_constant(&mut self, value: f32) {
        for v in &mut self.data {
            *v *= value;
        }
    }

    /// Replace every non-finite value with `value` (in-place)
    pub fn replace_non_finite(&mut self, value: f32) {
        for v in &mut self.data {
            if !v.is_finite() {
                *v = value;
            }
        }
    }

    /// Check that two FPix have the same dimensions
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn check_same_size(&self, other: &FPix) -> Result<()> {
        check_dimensions(self.dimensions(), other.dimensions())
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Find the minimum value and its location
    ///
    /// NaN values are ignored. Returns `None` if every pixel is NaN.
    pub fn min(&self) -> Option<(f32, u32, u32)> {
        self.extreme(|candidate, best| candidate < best)
    }

    /// Find the maximum value and its location
    ///
    /// NaN values are ignored. Returns `None` if every pixel is NaN.
    pub fn max(&self) -> Option<(f32, u32, u32)> {
        self.extreme(|candidate, best| candidate > best)
    }

    fn extreme(&self, better: impl Fn(f32, f32) -> bool) -> Option<(f32, u32, u32)> {
        let mut best: Option<(f32, usize)> = None;
        for (i, &v) in self.data.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((b, _)) if !better(v, b) => {}
                _ => best = Some((v, i)),
            }
        }
        best.map(|(v, i)| {
            let w = self.width as usize;
            (v, (i % w) as u32, (i / w) as u32)
        })
    }

    /// Minimum and maximum over finite values only
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        let mut range: Option<(f32, f32)> = None;
        for &v in self.data.iter().filter(|v| v.is_finite()) {
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        range
    }

    /// Mean of all pixel values
    pub fn mean(&self) -> Option<f32> {
        if self.data.is_empty() {
            return None;
        }
        Some((self.sum() / self.data.len() as f64) as f32)
    }

    /// Sum of all pixel values, accumulated in f64
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }
}

/// Check that two rasters share dimensions
///
/// # Errors
///
/// Returns `Error::IncompatibleSizes` if dimensions don't match.
pub fn check_dimensions(a: (u32, u32), b: (u32, u32)) -> Result<()> {
    if a != b {
        return Err(Error::IncompatibleSizes(a.0, a.1, b.0, b.1));
    }
    Ok(())
}
