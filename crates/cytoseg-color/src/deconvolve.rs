//! Optical density and colour deconvolution
//!
//! Brightfield RGB pixels are converted to optical density per channel,
//! `-log10(max(v, 1) / background)`, and unmixed into one concentration
//! raster per stain with the inverse of the stain basis.

use crate::error::{ColorError, ColorResult};
use crate::stain::StainVectors;
use cytoseg_core::FPix;

/// Optical density of one channel value against its white point
///
/// Values are floored at 1 so that black pixels give a finite density.
#[inline]
pub fn optical_density(value: f64, background: f64) -> f64 {
    -(value.max(1.0) / background).log10()
}

fn check_rgb(rgb: &[[u8; 3]], width: u32, height: u32) -> ColorResult<()> {
    let expected = width as usize * height as usize;
    if rgb.len() != expected {
        return Err(ColorError::InvalidParameters(format!(
            "expected {expected} RGB pixels for {width}x{height}, got {}",
            rgb.len()
        )));
    }
    Ok(())
}

/// Lookup tables of optical density per channel and 8-bit value
fn density_tables(background: [f64; 3]) -> [[f32; 256]; 3] {
    background.map(|bg| {
        let mut table = [0.0f32; 256];
        for (v, t) in table.iter_mut().enumerate() {
            *t = optical_density(v as f64, bg) as f32;
        }
        table
    })
}

/// Unmix RGB pixels into one raster per non-residual stain
///
/// # Arguments
///
/// * `rgb` - Row-major pixels, `width * height` entries
/// * `width`, `height` - Raster dimensions
/// * `stains` - Unmixing basis
///
/// # Returns
///
/// `(stain name, concentration raster)` pairs in basis order.
pub fn color_deconvolve(
    rgb: &[[u8; 3]],
    width: u32,
    height: u32,
    stains: &StainVectors,
) -> ColorResult<Vec<(String, FPix)>> {
    check_rgb(rgb, width, height)?;
    let inv = stains.inverse()?;
    let tables = density_tables(stains.background());

    let mut outputs = Vec::new();
    for (j, stain) in stains.stains().iter().enumerate() {
        if stain.is_residual() {
            continue;
        }
        let col = [inv[0][j] as f32, inv[1][j] as f32, inv[2][j] as f32];
        let data = rgb
            .iter()
            .map(|px| {
                (0..3)
                    .map(|k| tables[k][px[k] as usize] * col[k])
                    .sum::<f32>()
            })
            .collect();
        outputs.push((
            stain.name().to_string(),
            FPix::from_data(width, height, data)?,
        ));
    }
    Ok(outputs)
}

/// Sum of the optical densities of the three channels
pub fn optical_density_sum(
    rgb: &[[u8; 3]],
    width: u32,
    height: u32,
    background: [f64; 3],
) -> ColorResult<FPix> {
    check_rgb(rgb, width, height)?;
    let tables = density_tables(background);
    let data = rgb
        .iter()
        .map(|px| (0..3).map(|k| tables[k][px[k] as usize]).sum())
        .collect();
    Ok(FPix::from_data(width, height, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optical_density() {
        assert_eq!(optical_density(255.0, 255.0), 0.0);
        assert!((optical_density(25.5, 255.0) - 1.0).abs() < 1e-12);
        assert!(optical_density(0.0, 255.0).is_finite());
    }

    #[test]
    fn test_white_is_zero() {
        let rgb = vec![[255u8; 3]; 6];
        let channels = color_deconvolve(&rgb, 3, 2, &StainVectors::hematoxylin_dab()).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].0, "Hematoxylin");
        assert_eq!(channels[1].0, "DAB");
        for (_, c) in &channels {
            assert!(c.data().iter().all(|&v| v.abs() < 1e-6));
        }
    }

    #[test]
    fn test_size_mismatch() {
        let rgb = vec![[255u8; 3]; 5];
        assert!(optical_density_sum(&rgb, 3, 2, [255.0; 3]).is_err());
    }
}
