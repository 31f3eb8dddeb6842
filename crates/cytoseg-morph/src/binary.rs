//! Binary morphological operations
//!
//! Implements erosion, dilation, opening, and closing for [`Mask`].
//!
//! Boundary conditions are asymmetric: pixels outside the mask are
//! background for dilation and also background for erosion, so erosion
//! clears foreground touching the image edge when the SEL reaches out.

use crate::{MorphResult, Sel};
use cytoseg_core::Mask;

/// Dilate a mask
///
/// For each hit `(dx, dy)` in the SEL, the source is shifted by that
/// offset and OR-accumulated into the output.
pub fn dilate(mask: &Mask, sel: &Sel) -> MorphResult<Mask> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let mut out = Mask::new(mask.width(), mask.height())?;
    let src = mask.data();
    let dst = out.data_mut();

    for (dx, dy) in sel.hit_offsets() {
        for y in 0..h {
            let sy = y - dy;
            if sy < 0 || sy >= h {
                continue;
            }
            let (x0, x1) = (dx.max(0), (w + dx).min(w));
            for x in x0..x1 {
                if src[(sy * w + x - dx) as usize] {
                    dst[(y * w + x) as usize] = true;
                }
            }
        }
    }
    Ok(out)
}

/// Erode a mask
///
/// A pixel stays set only if every hit of the SEL, placed at that pixel,
/// lands on foreground.
pub fn erode(mask: &Mask, sel: &Sel) -> MorphResult<Mask> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let mut out = mask.clone();
    let src = mask.data();
    let dst = out.data_mut();
    dst.fill(true);

    for (dx, dy) in sel.hit_offsets() {
        for y in 0..h {
            let sy = y + dy;
            for x in 0..w {
                let sx = x + dx;
                let hit = sx >= 0 && sx < w && sy >= 0 && sy < h && src[(sy * w + sx) as usize];
                if !hit {
                    dst[(y * w + x) as usize] = false;
                }
            }
        }
    }
    Ok(out)
}

/// Open a mask
///
/// Opening = Erosion followed by Dilation.
/// Removes small foreground objects and smooths contours.
pub fn open(mask: &Mask, sel: &Sel) -> MorphResult<Mask> {
    dilate(&erode(mask, sel)?, sel)
}

/// Close a mask
///
/// Closing = Dilation followed by Erosion.
pub fn close(mask: &Mask, sel: &Sel) -> MorphResult<Mask> {
    erode(&dilate(mask, sel)?, sel)
}

/// Dilate with a `width x height` brick
pub fn dilate_brick(mask: &Mask, width: u32, height: u32) -> MorphResult<Mask> {
    dilate(mask, &Sel::create_brick(width, height)?)
}

/// Erode with a `width x height` brick
pub fn erode_brick(mask: &Mask, width: u32, height: u32) -> MorphResult<Mask> {
    erode(mask, &Sel::create_brick(width, height)?)
}
