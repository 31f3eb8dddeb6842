//! Edge enhancement
//!
//! The Laplacian response used for nucleus detection is strongly positive
//! over bright blob interiors and negative just outside their boundaries,
//! so thresholding it at zero yields a rough foreground mask.

use crate::convolve::{fpix_convolve, gaussian_blur};
use crate::{FilterResult, Kernel};
use cytoseg_core::FPix;

/// Convolve with the 4-neighbour Laplacian `[0,-1,0; -1,4,-1; 0,-1,0]`.
pub fn laplacian(fpix: &FPix) -> FilterResult<FPix> {
    fpix_convolve(fpix, &Kernel::laplacian(), false)
}

/// Gaussian smoothing with `sigma` followed by [`laplacian`].
///
/// # Arguments
/// * `fpix` - Input raster
/// * `sigma` - Gaussian sigma in pixels; non-positive skips smoothing
pub fn laplacian_of_gaussian(fpix: &FPix, sigma: f32) -> FilterResult<FPix> {
    let smoothed = gaussian_blur(fpix, sigma)?;
    laplacian(&smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laplacian_flat_is_zero() {
        let fpix = FPix::new_with_value(5, 5, 3.0).unwrap();
        let out = laplacian(&fpix).unwrap();
        assert!(out.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_laplacian_of_square_sign() {
        let mut fpix = FPix::new(20, 20).unwrap();
        for y in 6..14 {
            for x in 6..14 {
                fpix.set_pixel(x, y, 100.0).unwrap();
            }
        }
        let out = laplacian_of_gaussian(&fpix, 1.0).unwrap();
        // Just inside the edge is positive, just outside is negative
        assert!(out.get_pixel(6, 10).unwrap() > 0.0);
        assert!(out.get_pixel(5, 10).unwrap() < 0.0);
    }
}
