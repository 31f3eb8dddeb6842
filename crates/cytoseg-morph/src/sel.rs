//! Structuring Element (SEL) for morphological operations
//!
//! A structuring element defines the neighborhood used in morphological
//! operations. Only hit positions matter here; there is no hit-miss
//! transform.

use crate::{MorphError, MorphResult};

/// Structuring Element (SEL)
///
/// Defines the neighborhood pattern for morphological operations.
/// The origin (cx, cy) is the reference point for the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sel {
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
    hits: Vec<bool>,
}

impl Sel {
    /// Create a new empty structuring element with a centred origin
    pub fn new(width: u32, height: u32) -> MorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(MorphError::InvalidSel(format!(
                "dimensions must be positive: {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            cx: width / 2,
            cy: height / 2,
            hits: vec![false; (width * height) as usize],
        })
    }

    /// Create a rectangular "brick" structuring element with all hits
    pub fn create_brick(width: u32, height: u32) -> MorphResult<Self> {
        let mut sel = Self::new(width, height)?;
        sel.hits.fill(true);
        Ok(sel)
    }

    /// Create a square structuring element with all hits
    pub fn create_square(size: u32) -> MorphResult<Self> {
        Self::create_brick(size, size)
    }

    /// Create a 3x3 cross (+), the 4-connected unit neighbourhood
    pub fn create_cross() -> Self {
        Self {
            width: 3,
            height: 3,
            cx: 1,
            cy: 1,
            hits: vec![false, true, false, true, true, true, false, true, false],
        }
    }

    /// Create a disk structuring element
    ///
    /// Contains every offset with `dx^2 + dy^2 <= radius^2 + 1`, so radius 1
    /// is the 3x3 square and larger radii approximate a circle.
    pub fn create_disk(radius: f64) -> MorphResult<Self> {
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(MorphError::InvalidSel(format!(
                "disk radius must be non-negative: {}",
                radius
            )));
        }
        let r2 = radius * radius + 1.0;
        let kr = (r2 + 1e-10).sqrt() as i32;
        let size = (2 * kr + 1) as u32;
        let mut sel = Self::new(size, size)?;
        for dy in -kr..=kr {
            let half = (r2 - (dy * dy) as f64 + 1e-10).sqrt() as i32;
            for dx in -half..=half {
                let idx = ((dy + kr) as u32 * size + (dx + kr) as u32) as usize;
                sel.hits[idx] = true;
            }
        }
        Ok(sel)
    }

    /// Get the width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn origin_x(&self) -> u32 {
        self.cx
    }

    #[inline]
    pub fn origin_y(&self) -> u32 {
        self.cy
    }

    /// Whether (x, y) is a hit; `None` outside the SEL
    #[inline]
    pub fn is_hit(&self, x: u32, y: u32) -> Option<bool> {
        if x < self.width && y < self.height {
            Some(self.hits[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Count the number of hit elements
    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|&&h| h).count()
    }

    /// Iterate hit positions as `(dx, dy)` offsets from the origin
    pub fn hit_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let w = self.width as usize;
        self.hits
            .iter()
            .enumerate()
            .filter(|&(_, &h)| h)
            .map(move |(i, _)| {
                (
                    (i % w) as i32 - self.cx as i32,
                    (i / w) as i32 - self.cy as i32,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brick() {
        let sel = Sel::create_brick(5, 3).unwrap();
        assert_eq!(sel.hit_count(), 15);
        assert_eq!((sel.origin_x(), sel.origin_y()), (2, 1));
        assert!(Sel::create_brick(0, 3).is_err());
    }

    #[test]
    fn test_disk_sizes() {
        assert_eq!(Sel::create_disk(1.0).unwrap().hit_count(), 9);
        assert_eq!(Sel::create_disk(2.0).unwrap().hit_count(), 21);
        let d3 = Sel::create_disk(3.0).unwrap();
        assert_eq!(d3.width(), 7);
        assert_eq!(d3.is_hit(0, 0), Some(false));
        assert_eq!(d3.is_hit(3, 0), Some(true));
    }

    #[test]
    fn test_cross_offsets() {
        let mut offsets: Vec<_> = Sel::create_cross().hit_offsets().collect();
        offsets.sort();
        assert_eq!(offsets, vec![(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)]);
    }
}
