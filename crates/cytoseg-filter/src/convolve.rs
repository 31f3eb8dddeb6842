//! Convolution operations
//!
//! Implements float raster convolution with arbitrary and separable
//! kernels. Sums are accumulated in `f64` so that flat regions convolve to
//! exactly their input value.

use crate::{FilterResult, Kernel};
use cytoseg_core::FPix;

/// Convolve an FPix with a kernel.
///
/// Each pixel in the output is the weighted sum of the kernel applied to
/// the corresponding neighborhood in the input. Uses replicate (clamp)
/// border handling.
///
/// If `normalize` is true, the kernel values are scaled so that they sum
/// to 1.0 before convolution. Kernels whose sum is near zero are applied
/// unscaled.
pub fn fpix_convolve(fpix: &FPix, kernel: &Kernel, normalize: bool) -> FilterResult<FPix> {
    let w = fpix.width() as i64;
    let h = fpix.height() as i64;
    let kw = kernel.width() as i64;
    let kh = kernel.height() as i64;
    let cx = kernel.center_x() as i64;
    let cy = kernel.center_y() as i64;

    let ksum = kernel.sum() as f64;
    let scale = if normalize && ksum.abs() >= 1e-6 {
        1.0 / ksum
    } else {
        1.0
    };

    let mut fpixd = fpix.create_template();
    let kdata = kernel.data();

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f64;
            for ky in 0..kh {
                for kx in 0..kw {
                    let k = kdata[(ky * kw + kx) as usize];
                    if k == 0.0 {
                        continue;
                    }
                    let val = fpix.get_clamped(x + kx - cx, y + ky - cy);
                    sum += val as f64 * k as f64;
                }
            }
            fpixd.set_pixel_unchecked(x as u32, y as u32, (sum * scale) as f32);
        }
    }

    Ok(fpixd)
}

/// Convolve an FPix with a pair of separable 1-D kernels.
///
/// Applies `kernel_x` in the horizontal direction, then `kernel_y` in the
/// vertical direction.
pub fn fpix_convolve_sep(
    fpix: &FPix,
    kernel_x: &Kernel,
    kernel_y: &Kernel,
    normalize: bool,
) -> FilterResult<FPix> {
    let tmp = fpix_convolve(fpix, kernel_x, normalize)?;
    fpix_convolve(&tmp, kernel_y, normalize)
}

/// Gaussian blur with the given sigma.
///
/// A non-positive sigma returns an unmodified copy.
pub fn gaussian_blur(fpix: &FPix, sigma: f32) -> FilterResult<FPix> {
    if sigma <= 0.0 {
        return Ok(fpix.clone());
    }
    let kx = Kernel::gaussian_1d(sigma)?;
    let ky = kx.transposed();
    fpix_convolve_sep(fpix, &kx, &ky, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_kernel() {
        let fpix = FPix::from_data(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let k = Kernel::from_slice(3, 3, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let out = fpix_convolve(&fpix, &k, false).unwrap();
        assert_eq!(out.data(), fpix.data());
    }

    #[test]
    fn test_gaussian_preserves_flat_field() {
        let fpix = FPix::new_with_value(12, 9, 37.5).unwrap();
        let out = gaussian_blur(&fpix, 1.7).unwrap();
        assert!(out.data().iter().all(|&v| (v - 37.5).abs() < 1e-4));
    }

    #[test]
    fn test_gaussian_spreads_impulse() {
        let mut fpix = FPix::new(11, 11).unwrap();
        fpix.set_pixel(5, 5, 1.0).unwrap();
        let out = gaussian_blur(&fpix, 1.0).unwrap();
        assert!((out.sum() - 1.0).abs() < 1e-4);
        let centre = out.get_pixel(5, 5).unwrap();
        assert!(centre < 1.0 && centre > out.get_pixel(6, 5).unwrap());
        assert_eq!(out.get_pixel(4, 5).unwrap(), out.get_pixel(6, 5).unwrap());
    }

    #[test]
    fn test_zero_sigma_is_copy() {
        let fpix = FPix::from_data(2, 1, vec![1.0, 9.0]).unwrap();
        assert_eq!(gaussian_blur(&fpix, 0.0).unwrap(), fpix);
    }
}
