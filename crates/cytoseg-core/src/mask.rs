//! Mask - binary raster
//!
//! `Mask` marks foreground pixels (rough nucleus masks, ROI masks,
//! background exclusion masks). It plays the role a 1-bpp image plays in
//! a packed-pixel library but stores one `bool` per pixel.

use crate::error::{Error, Result};
use crate::fpix::{FPix, check_dimensions};

/// Binary raster, row-major, one `bool` per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// Create an all-background mask
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::new_with_value(width, height, false)
    }

    /// Create a mask with every pixel set to `value`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new_with_value(width: u32, height: u32, value: bool) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        })
    }

    /// Create a mask from raw row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if data.len() != width as usize * height as usize {
            return Err(Error::InvalidParameter(format!(
                "mask data length {} doesn't match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from parts already validated by another raster type
    pub(crate) fn from_raw(width: u32, height: u32, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Threshold a float raster: foreground where `pred(value)` holds
    pub fn from_fpix(fpix: &FPix, pred: impl Fn(f32) -> bool) -> Self {
        Self {
            width: fpix.width(),
            height: fpix.height(),
            data: fpix.data().iter().map(|&v| pred(v)).collect(),
        }
    }

    /// Foreground where `a[i] >= b[i]`
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn greater_equal(a: &FPix, b: &FPix) -> Result<Self> {
        a.check_same_size(b)?;
        Ok(Self {
            width: a.width(),
            height: a.height(),
            data: a.data().iter().zip(b.data()).map(|(x, y)| x >= y).collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the value at (x, y); out-of-range coordinates read as background
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[self.index(x, y)]
    }

    /// Set the value at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    pub fn set(&mut self, x: u32, y: u32, value: bool) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: self.index(x, y),
                len: self.data.len(),
            });
        }
        let idx = self.index(x, y);
        self.data[idx] = value;
        Ok(())
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn data(&self) -> &[bool] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [bool] {
        &mut self.data
    }

    /// Number of foreground pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True if no pixel is set
    pub fn is_clear(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Invert all pixels (in-place)
    pub fn invert(&mut self) {
        for v in &mut self.data {
            *v = !*v;
        }
    }

    /// Intersect with another mask (in-place)
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn and_with(&mut self, other: &Mask) -> Result<()> {
        self.combine(other, |a, b| a && b)
    }

    /// Union with another mask (in-place)
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn or_with(&mut self, other: &Mask) -> Result<()> {
        self.combine(other, |a, b| a || b)
    }

    /// Remove pixels set in `other` (in-place)
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn subtract(&mut self, other: &Mask) -> Result<()> {
        self.combine(other, |a, b| a && !b)
    }

    fn combine(&mut self, other: &Mask, f: impl Fn(bool, bool) -> bool) -> Result<()> {
        check_dimensions(self.dimensions(), other.dimensions())?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = f(*a, b);
        }
        Ok(())
    }

    /// Set every pixel of `fpix` under the mask to `value`
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn fill_fpix(&self, fpix: &mut FPix, value: f32) -> Result<()> {
        check_dimensions(self.dimensions(), fpix.dimensions())?;
        for (v, &m) in fpix.data_mut().iter_mut().zip(&self.data) {
            if m {
                *v = value;
            }
        }
        Ok(())
    }
}
