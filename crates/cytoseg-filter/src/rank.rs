//! Rank filtering operations
//!
//! Rank (order-statistic) filters over a circular window: median, min and
//! max. The window of radius `r` contains every offset with
//! `dx^2 + dy^2 <= r^2 + 1`, which gives the familiar "round" kernels at
//! small integer radii (radius 1 is the 3x3 square, radius 0.5 the plus).
//!
//! NaN pixels are ignored; a window holding only NaN yields NaN.

use crate::{FilterError, FilterResult};
use cytoseg_core::FPix;

/// Circular neighbourhood stored as one horizontal span per row offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularWindow {
    /// `(dy, half_width)`: offsets `dx` in `-half_width..=half_width`
    spans: Vec<(i32, i32)>,
}

impl CircularWindow {
    /// Window for the given radius
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is negative or not finite.
    pub fn new(radius: f64) -> FilterResult<Self> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(FilterError::InvalidParameters(format!(
                "window radius must be non-negative: {}",
                radius
            )));
        }
        let r2 = radius * radius + 1.0;
        let kr = (r2 + 1e-10).sqrt() as i32;
        let spans = (-kr..=kr)
            .map(|dy| {
                let dx = (r2 - (dy * dy) as f64 + 1e-10).sqrt() as i32;
                (dy, dx)
            })
            .collect();
        Ok(Self { spans })
    }

    /// Row spans `(dy, half_width)`
    pub fn spans(&self) -> &[(i32, i32)] {
        &self.spans
    }

    /// Number of offsets in the window
    pub fn len(&self) -> usize {
        self.spans.iter().map(|&(_, hw)| (2 * hw + 1) as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterate every `(dx, dy)` offset
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.spans
            .iter()
            .flat_map(|&(dy, hw)| (-hw..=hw).map(move |dx| (dx, dy)))
    }
}

/// Apply a rank filter over a circular window.
///
/// # Arguments
/// * `fpix` - Input raster
/// * `radius` - Window radius in pixels
/// * `rank` - Rank value in [0.0, 1.0] (0.0=min, 0.5=median, 1.0=max)
pub fn rank_filter(fpix: &FPix, radius: f64, rank: f32) -> FilterResult<FPix> {
    if !(0.0..=1.0).contains(&rank) {
        return Err(FilterError::InvalidParameters(format!(
            "rank must be in [0, 1]: {}",
            rank
        )));
    }
    let window = CircularWindow::new(radius)?;
    let mut values: Vec<f32> = Vec::with_capacity(window.len());
    Ok(apply(fpix, |x, y| {
        values.clear();
        values.extend(
            window
                .offsets()
                .map(|(dx, dy)| fpix.get_clamped(x + dx as i64, y + dy as i64))
                .filter(|v| !v.is_nan()),
        );
        if values.is_empty() {
            return f32::NAN;
        }
        let k = ((values.len() - 1) as f32 * rank).round() as usize;
        let (_, v, _) = values.select_nth_unstable_by(k, f32::total_cmp);
        *v
    }))
}

/// Median filter over a circular window.
pub fn median_filter(fpix: &FPix, radius: f64) -> FilterResult<FPix> {
    rank_filter(fpix, radius, 0.5)
}

/// Minimum filter over a circular window.
pub fn min_filter(fpix: &FPix, radius: f64) -> FilterResult<FPix> {
    let window = CircularWindow::new(radius)?;
    Ok(apply(fpix, |x, y| {
        fold_window(fpix, &window, x, y, f32::INFINITY, f32::min)
    }))
}

/// Maximum filter over a circular window.
pub fn max_filter(fpix: &FPix, radius: f64) -> FilterResult<FPix> {
    let window = CircularWindow::new(radius)?;
    Ok(apply(fpix, |x, y| {
        fold_window(fpix, &window, x, y, f32::NEG_INFINITY, f32::max)
    }))
}

fn fold_window(
    fpix: &FPix,
    window: &CircularWindow,
    x: i64,
    y: i64,
    init: f32,
    f: fn(f32, f32) -> f32,
) -> f32 {
    let mut acc = init;
    let mut seen = false;
    for (dx, dy) in window.offsets() {
        let v = fpix.get_clamped(x + dx as i64, y + dy as i64);
        if !v.is_nan() {
            acc = f(acc, v);
            seen = true;
        }
    }
    if seen { acc } else { f32::NAN }
}

fn apply(fpix: &FPix, mut f: impl FnMut(i64, i64) -> f32) -> FPix {
    let mut out = fpix.create_template();
    for y in 0..fpix.height() {
        for x in 0..fpix.width() {
            out.set_pixel_unchecked(x, y, f(x as i64, y as i64));
        }
    }
    out
}
