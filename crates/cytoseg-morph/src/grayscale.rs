//! Grayscale morphological operations
//!
//! Implements erosion, dilation, opening, and closing for float rasters.
//!
//! # Algorithm
//!
//! - **Dilation**: maximum pixel value in the SEL neighborhood
//! - **Erosion**: minimum pixel value in the SEL neighborhood
//! - **Opening**: erosion followed by dilation (removes small bright features)
//! - **Closing**: dilation followed by erosion (fills small dark features)
//!
//! Neighbours outside the raster and NaN pixels are skipped. For SELs that
//! are symmetric and convex this equals replicating the border pixels.

use crate::{MorphResult, Sel};
use cytoseg_core::FPix;

/// Dilate a float raster
///
/// Dilation computes the maximum pixel value in the SE neighborhood,
/// which expands bright regions and shrinks dark regions.
pub fn dilate_gray(fpix: &FPix, sel: &Sel) -> MorphResult<FPix> {
    Ok(extremum(fpix, sel, f32::NEG_INFINITY, f32::max))
}

/// Erode a float raster
///
/// Erosion computes the minimum pixel value in the SE neighborhood,
/// which shrinks bright regions and expands dark regions.
pub fn erode_gray(fpix: &FPix, sel: &Sel) -> MorphResult<FPix> {
    Ok(extremum(fpix, sel, f32::INFINITY, f32::min))
}

/// Open a float raster (erosion followed by dilation)
pub fn open_gray(fpix: &FPix, sel: &Sel) -> MorphResult<FPix> {
    dilate_gray(&erode_gray(fpix, sel)?, sel)
}

/// Close a float raster (dilation followed by erosion)
pub fn close_gray(fpix: &FPix, sel: &Sel) -> MorphResult<FPix> {
    erode_gray(&dilate_gray(fpix, sel)?, sel)
}

fn extremum(fpix: &FPix, sel: &Sel, init: f32, pick: fn(f32, f32) -> f32) -> FPix {
    let (w, h) = (fpix.width() as i32, fpix.height() as i32);
    let offsets: Vec<(i32, i32)> = sel.hit_offsets().collect();
    let src = fpix.data();
    let mut out = fpix.create_template();
    let dst = out.data_mut();

    for y in 0..h {
        for x in 0..w {
            let mut acc = init;
            let mut seen = false;
            for &(dx, dy) in &offsets {
                let (sx, sy) = (x + dx, y + dy);
                if sx < 0 || sx >= w || sy < 0 || sy >= h {
                    continue;
                }
                let v = src[(sy * w + sx) as usize];
                if !v.is_nan() {
                    acc = pick(acc, v);
                    seen = true;
                }
            }
            dst[(y * w + x) as usize] = if seen { acc } else { f32::NAN };
        }
    }
    out
}
