//! LabelPix - integer label raster
//!
//! 0 is background; positive values identify regions. Labeling passes
//! produce dense labels `1..=N`; later filtering may zero out individual
//! labels without renumbering the survivors.

use crate::error::{Error, Result};
use crate::fpix::check_dimensions;
use crate::mask::Mask;

/// Integer label raster, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPix {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl LabelPix {
    /// Create an all-background label raster
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        })
    }

    /// Create a label raster from raw row-major data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or data length doesn't match.
    pub fn from_data(width: u32, height: u32, data: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if data.len() != width as usize * height as usize {
            return Err(Error::InvalidParameter(format!(
                "label data length {} doesn't match {}x{}",
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

    /// Label at (x, y); out-of-range coordinates read as background
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        if x < self.width && y < self.height {
            self.data[y as usize * self.width as usize + x as usize]
        } else {
            0
        }
    }

    /// Set the label at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    pub fn set(&mut self, x: u32, y: u32, label: u32) -> Result<()> {
        let idx = y as usize * self.width as usize + x as usize;
        if x >= self.width || y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.data.len(),
            });
        }
        self.data[idx] = label;
        Ok(())
    }

    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Largest label present (0 for an empty raster)
    pub fn max_label(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Foreground mask of all positive labels
    pub fn to_mask(&self) -> Mask {
        Mask::from_raw(
            self.width,
            self.height,
            self.data.iter().map(|&l| l > 0).collect(),
        )
    }

    /// Zero every pixel whose label is flagged in `inactive` (indexed by
    /// label; labels beyond the slice are kept)
    pub fn clear_labels(&mut self, inactive: &[bool]) {
        for l in &mut self.data {
            if inactive.get(*l as usize).copied().unwrap_or(false) {
                *l = 0;
            }
        }
    }

    /// Zero every pixel that is set in `mask`
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleSizes` if dimensions don't match.
    pub fn clear_where(&mut self, mask: &Mask) -> Result<()> {
        check_dimensions(self.dimensions(), mask.dimensions())?;
        for (l, &m) in self.data.iter_mut().zip(mask.data()) {
            if m {
                *l = 0;
            }
        }
        Ok(())
    }

    /// Pixel count per label, indexed by label (index 0 counts background)
    pub fn label_areas(&self) -> Vec<u32> {
        let mut areas = vec![0u32; self.max_label() as usize + 1];
        for &l in &self.data {
            areas[l as usize] += 1;
        }
        areas
    }
}
