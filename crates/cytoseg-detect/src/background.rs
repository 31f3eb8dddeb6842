//! Background estimation
//!
//! The background is a grayscale opening of the detection channel with a
//! disc of the background radius: erosion followed by either a plain
//! dilation or a reconstruction by dilation under the original image. The
//! reconstruction never exceeds the image and follows it more closely near
//! large bright structures.

use crate::error::DetectResult;
use cytoseg_core::{FPix, Mask};
use cytoseg_morph::{Sel, dilate, dilate_gray, erode_gray};
use cytoseg_region::{ConnectivityType, seedfill_gray};

/// Result of background estimation
#[derive(Debug, Clone)]
pub struct BackgroundEstimate {
    /// Detection channel minus background
    pub subtracted: FPix,
    /// Background raster; `None` when estimation was disabled
    pub background: Option<FPix>,
    /// Pixels whose background is implausibly bright, plus surroundings
    pub exclusion: Option<Mask>,
}

/// Estimate and subtract the background of `fpix`
///
/// # Arguments
///
/// * `fpix` - Detection channel
/// * `radius` - Opening radius; `<= 0` skips estimation
/// * `max_background` - Background ceiling; `> 0` enables exclusion
/// * `by_reconstruction` - Use reconstruction instead of plain dilation
///
/// Excluded pixels get an infinite background, so their subtracted value
/// is `-inf`.
pub fn estimate_background(
    fpix: &FPix,
    radius: f64,
    max_background: f64,
    by_reconstruction: bool,
) -> DetectResult<BackgroundEstimate> {
    if !(radius > 0.0) {
        return Ok(BackgroundEstimate {
            subtracted: fpix.clone(),
            background: None,
            exclusion: None,
        });
    }

    let sel = Sel::create_disk(radius)?;
    let seed = erode_gray(fpix, &sel)?;
    let mut background = if by_reconstruction {
        seedfill_gray(&seed, fpix, ConnectivityType::EightWay)?
    } else {
        dilate_gray(&seed, &sel)?
    };

    let exclusion = if max_background > 0.0 {
        let ceiling = max_background as f32;
        let bright = Mask::from_fpix(&background, |v| v > ceiling);
        let grown = dilate(&bright, &sel)?;
        grown.fill_fpix(&mut background, f32::INFINITY)?;
        Some(grown)
    } else {
        None
    };

    let subtracted = fpix.sub(&background)?;
    Ok(BackgroundEstimate {
        subtracted,
        background: Some(background),
        exclusion,
    })
}
