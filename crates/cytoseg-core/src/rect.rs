//! Rect - rectangular pixel regions
//!
//! Region requests, ROI bounds and raster extents are all expressed as
//! integer rectangles in full-resolution pixel coordinates.

use crate::error::{Error, Result};

/// A rectangle region
///
/// A small `Copy` type; `right()`/`bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is negative.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParameter(format!(
                "rect dimensions must be non-negative: w={}, h={}",
                w, h
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rectangle without validation
    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Smallest integer rectangle covering the float bounds
    /// `[min_x, max_x) x [min_y, max_y)`
    pub fn enclosing(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        let x = min_x.floor() as i32;
        let y = min_y.floor() as i32;
        let right = max_x.ceil() as i32;
        let bottom = max_y.ceil() as i32;
        Self {
            x,
            y,
            w: (right - x).max(0),
            h: (bottom - y).max(0),
        }
    }

    /// Right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// Check if the rectangle is empty (zero area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Compute the intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect {
                x,
                y,
                w: right - x,
                h: bottom - y,
            })
        } else {
            None
        }
    }

    /// Grow the rectangle by `pad` pixels on every side
    pub fn pad(&self, pad: i32) -> Rect {
        Rect {
            x: self.x - pad,
            y: self.y - pad,
            w: self.w + 2 * pad,
            h: self.h + 2 * pad,
        }
    }

    /// Clip to an image of the given size
    ///
    /// Returns `None` if nothing of the rectangle lies inside the image.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        self.intersect(&Rect::new_unchecked(0, 0, width as i32, height as i32))
    }

    /// Size in pixels after reading at `downsample`
    ///
    /// At least one pixel in each direction for non-empty rectangles.
    pub fn scaled_size(&self, downsample: f64) -> (u32, u32) {
        let scale = |v: i32| ((v as f64 / downsample).round() as i64).max(1) as u32;
        (scale(self.w), scale(self.h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Rect::new(0, 0, -1, 3).is_err());
        assert!(Rect::new(0, 0, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new_unchecked(0, 0, 10, 10);
        let b = Rect::new_unchecked(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new_unchecked(5, 5, 5, 5)));
        let c = Rect::new_unchecked(20, 20, 2, 2);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_pad_and_clip() {
        let r = Rect::new_unchecked(2, 3, 4, 4).pad(5);
        assert_eq!(r, Rect::new_unchecked(-3, -2, 14, 14));
        assert_eq!(r.clip_to(8, 100), Some(Rect::new_unchecked(0, 0, 8, 12)));
    }

    #[test]
    fn test_enclosing() {
        let r = Rect::enclosing(1.5, 2.0, 4.2, 6.0);
        assert_eq!(r, Rect::new_unchecked(1, 2, 4, 4));
    }

    #[test]
    fn test_scaled_size() {
        let r = Rect::new_unchecked(0, 0, 100, 3);
        assert_eq!(r.scaled_size(4.0), (25, 1));
    }
}
