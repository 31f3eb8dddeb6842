//! Convolution kernels
//!
//! A kernel is a small row-major grid of weights with an origin (`cx`,
//! `cy`) that is aligned with the output pixel during convolution.

use crate::{FilterError, FilterResult};

/// A 2D convolution kernel
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Width of the kernel
    width: u32,
    /// Height of the kernel
    height: u32,
    /// X coordinate of the center
    cx: u32,
    /// Y coordinate of the center
    cy: u32,
    /// Kernel data (row-major order)
    data: Vec<f32>,
}

impl Kernel {
    /// Create a zero kernel with the origin at its centre.
    pub fn new(width: u32, height: u32) -> FilterResult<Self> {
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidKernel(format!(
                "kernel dimensions must be positive: {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Create a kernel from row-major values, origin at the centre.
    pub fn from_slice(width: u32, height: u32, data: &[f32]) -> FilterResult<Self> {
        let mut kernel = Self::new(width, height)?;
        if data.len() != kernel.data.len() {
            return Err(FilterError::InvalidKernel(format!(
                "expected {} values for a {}x{} kernel, got {}",
                kernel.data.len(),
                width,
                height,
                data.len()
            )));
        }
        kernel.data.copy_from_slice(data);
        Ok(kernel)
    }

    /// Horizontal 1-D normalized Gaussian of the given sigma.
    ///
    /// The half-width is `ceil(3.5 * sigma)` (at least 1), which keeps the
    /// truncated tail below 0.1% of the total weight. Use
    /// [`Kernel::transposed`] for the vertical pass.
    pub fn gaussian_1d(sigma: f32) -> FilterResult<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "gaussian sigma must be positive: {}",
                sigma
            )));
        }
        let radius = ((3.5 * sigma).ceil() as u32).max(1);
        let size = 2 * radius + 1;
        let s2 = 2.0 * (sigma as f64) * (sigma as f64);
        let weights: Vec<f64> = (0..size)
            .map(|i| {
                let d = i as f64 - radius as f64;
                (-d * d / s2).exp()
            })
            .collect();
        let total: f64 = weights.iter().sum();
        let data: Vec<f32> = weights.iter().map(|w| (w / total) as f32).collect();
        Self::from_slice(size, 1, &data)
    }

    /// 4-neighbour Laplacian `[0,-1,0; -1,4,-1; 0,-1,0]`.
    ///
    /// Positive on bright blob interiors; not normalized (sums to 0).
    pub fn laplacian() -> Self {
        Self {
            width: 3,
            height: 3,
            cx: 1,
            cy: 1,
            data: vec![0.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 0.0],
        }
    }

    /// Swap rows and columns (origin included).
    pub fn transposed(&self) -> Self {
        let mut data = vec![0.0; self.data.len()];
        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                data[x * self.height as usize + y] = self.data[y * self.width as usize + x];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cx: self.cy,
            cy: self.cx,
            data,
        }
    }

    /// Get the kernel width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the kernel height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn center_x(&self) -> u32 {
        self.cx
    }

    #[inline]
    pub fn center_y(&self) -> u32 {
        self.cy
    }

    /// Get the kernel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.data[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Get the sum of all kernel values.
    pub fn sum(&self) -> f32 {
        self.data.iter().map(|&v| v as f64).sum::<f64>() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_normalized_and_symmetric() {
        let k = Kernel::gaussian_1d(1.0).unwrap();
        assert_eq!(k.width(), 9);
        assert_eq!(k.height(), 1);
        assert!((k.sum() - 1.0).abs() < 1e-5);
        assert_eq!(k.get(0, 0), k.get(8, 0));
        assert!(k.get(4, 0).unwrap() > k.get(3, 0).unwrap());
    }

    #[test]
    fn test_gaussian_rejects_bad_sigma() {
        assert!(Kernel::gaussian_1d(0.0).is_err());
        assert!(Kernel::gaussian_1d(f32::NAN).is_err());
    }

    #[test]
    fn test_transposed() {
        let k = Kernel::from_slice(3, 1, &[1.0, 2.0, 3.0]).unwrap();
        let t = k.transposed();
        assert_eq!((t.width(), t.height()), (1, 3));
        assert_eq!(t.get(0, 2), Some(3.0));
        assert_eq!((t.center_x(), t.center_y()), (0, 1));
    }

    #[test]
    fn test_laplacian_sums_to_zero() {
        assert_eq!(Kernel::laplacian().sum(), 0.0);
    }
}
