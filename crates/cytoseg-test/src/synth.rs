//! Deterministic synthetic rasters for regression tests
//!
//! Every builder is a pure function of its arguments so that test outputs
//! are reproducible run to run.

use crate::error::TestResult;
use cytoseg_core::FPix;

/// Uniform raster
pub fn uniform(width: u32, height: u32, value: f32) -> TestResult<FPix> {
    Ok(FPix::new_with_value(width, height, value)?)
}

/// Set every pixel in `[x, x+w) x [y, y+h)` (clipped) to `value`
pub fn fill_rect(fpix: &mut FPix, x: i32, y: i32, w: i32, h: i32, value: f32) {
    let (fw, fh) = (fpix.width() as i32, fpix.height() as i32);
    for yy in y.max(0)..(y + h).min(fh) {
        for xx in x.max(0)..(x + w).min(fw) {
            fpix.set_pixel_unchecked(xx as u32, yy as u32, value);
        }
    }
}

/// Set every pixel whose centre offset from `(cx, cy)` satisfies
/// `dx^2 + dy^2 <= r^2` to `value`
pub fn fill_disc(fpix: &mut FPix, cx: i32, cy: i32, r: i32, value: f32) {
    let (fw, fh) = (fpix.width() as i32, fpix.height() as i32);
    for yy in (cy - r).max(0)..=(cy + r).min(fh - 1) {
        for xx in (cx - r).max(0)..=(cx + r).min(fw - 1) {
            let (dx, dy) = (xx - cx, yy - cy);
            if dx * dx + dy * dy <= r * r {
                fpix.set_pixel_unchecked(xx as u32, yy as u32, value);
            }
        }
    }
}

/// A single bright square of side `size` at `(x, y)` on a flat background
pub fn square_on_background(
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    size: i32,
    foreground: f32,
    background: f32,
) -> TestResult<FPix> {
    let mut fpix = uniform(width, height, background)?;
    fill_rect(&mut fpix, x, y, size, size, foreground);
    Ok(fpix)
}

/// Two radius-8 discs centred at (18, 20) and (42, 20) on a 60x40 raster,
/// joined by a one-pixel-wide horizontal neck along y = 20
pub fn necked_pair(foreground: f32, background: f32) -> TestResult<FPix> {
    let mut fpix = uniform(60, 40, background)?;
    fill_disc(&mut fpix, 18, 20, 8, foreground);
    fill_disc(&mut fpix, 42, 20, 8, foreground);
    fill_rect(&mut fpix, 26, 20, 9, 1, foreground);
    Ok(fpix)
}

/// Discs of the given radius and intensity at the given centres
pub fn discs(
    width: u32,
    height: u32,
    background: f32,
    discs: &[(i32, i32, i32, f32)],
) -> TestResult<FPix> {
    let mut fpix = uniform(width, height, background)?;
    for &(cx, cy, r, value) in discs {
        fill_disc(&mut fpix, cx, cy, r, value);
    }
    Ok(fpix)
}

/// Brightfield RGB pixels for a mixture of stains
///
/// Each stain is a unit optical-density vector paired with a per-pixel
/// concentration raster. Transmitted intensity follows Beer-Lambert with a
/// white (255) background: `255 * 10^-(sum of c_i * v_i)`.
pub fn brightfield_rgb(stains: &[([f64; 3], &FPix)]) -> Vec<[u8; 3]> {
    let Some((_, first)) = stains.first() else {
        return Vec::new();
    };
    (0..first.len())
        .map(|i| {
            let mut od = [0.0f64; 3];
            for (vector, conc) in stains {
                let c = conc.data()[i] as f64;
                for (o, v) in od.iter_mut().zip(vector) {
                    *o += c * v;
                }
            }
            od.map(|o| (255.0 * 10f64.powf(-o)).round().clamp(0.0, 255.0) as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_area() {
        let fpix = square_on_background(30, 30, 10, 10, 10, 100.0, 0.0).unwrap();
        let count = fpix.data().iter().filter(|&&v| v == 100.0).count();
        assert_eq!(count, 100);
    }

    #[test]
    fn test_necked_pair_is_connected() {
        let fpix = necked_pair(100.0, 0.0).unwrap();
        for x in 18..=42 {
            assert_eq!(fpix.get_pixel(x, 20).unwrap(), 100.0);
        }
        assert_eq!(fpix.get_pixel(30, 19).unwrap(), 0.0);
    }

    #[test]
    fn test_brightfield_white_background() {
        let zero = uniform(2, 1, 0.0).unwrap();
        let rgb = brightfield_rgb(&[([0.65, 0.70, 0.29], &zero)]);
        assert_eq!(rgb, vec![[255, 255, 255]; 2]);
    }
}
