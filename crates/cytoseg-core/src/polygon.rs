//! Polygon - closed vertex rings
//!
//! Object boundaries and ROIs are simple closed polygons with `f64`
//! vertices. The ring is implicitly closed: the last vertex connects back
//! to the first, and the first vertex is not repeated.
//!
//! Coordinates follow the raster convention: pixel `(x, y)` covers the unit
//! square `[x, x+1) x [y, y+1)`, so a polygon traced along pixel corners has
//! an area equal to its pixel count.

use crate::calibration::PixelCalibration;
use crate::error::{Error, Result};
use crate::mask::Mask;

/// A simple closed polygon
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    points: Vec<(f64, f64)>,
}

impl Polygon {
    /// Create an empty polygon
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polygon from its vertices
    pub fn from_points(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle `[x, x+w) x [y, y+h)`
    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            points: vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)],
        }
    }

    /// Number of vertices
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Iterate over edges `(p[i], p[i+1])`, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Signed area by the shoelace formula
    ///
    /// Positive for clockwise rings in image coordinates (y pointing down).
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        0.5 * self
            .edges()
            .map(|((x0, y0), (x1, y1))| x0 * y1 - x1 * y0)
            .sum::<f64>()
    }

    /// Enclosed area
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Boundary length
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges()
            .map(|((x0, y0), (x1, y1))| (x1 - x0).hypot(y1 - y0))
            .sum()
    }

    /// Area centroid, or the vertex mean for degenerate rings
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let a = self.signed_area();
        if a.abs() < 1e-12 {
            let n = self.points.len() as f64;
            let (sx, sy) = self
                .points
                .iter()
                .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
            return Some((sx / n, sy / n));
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for ((x0, y0), (x1, y1)) in self.edges() {
            let cross = x0 * y1 - x1 * y0;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }
        Some((cx / (6.0 * a), cy / (6.0 * a)))
    }

    /// Bounding box as `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let (&(x0, y0), rest) = self.points.split_first()?;
        Some(rest.iter().fold(
            (x0, y0, x0, y0),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        ))
    }

    /// Shift every vertex by `(dx, dy)`
    pub fn translate(&self, dx: f64, dy: f64) -> Polygon {
        self.map(|x, y| (x + dx, y + dy))
    }

    /// Scale about the origin
    pub fn scale(&self, sx: f64, sy: f64) -> Polygon {
        self.map(|x, y| (x * sx, y * sy))
    }

    /// Map a polygon in region-local pixels to image coordinates:
    /// `origin + downsample * local`
    pub fn to_image_space(&self, origin_x: f64, origin_y: f64, downsample: f64) -> Polygon {
        self.map(|x, y| (origin_x + downsample * x, origin_y + downsample * y))
    }

    /// Convert pixel coordinates to calibrated units
    pub fn calibrated(&self, calibration: &PixelCalibration) -> Polygon {
        self.scale(calibration.pixel_width(), calibration.pixel_height())
    }

    fn map(&self, f: impl Fn(f64, f64) -> (f64, f64)) -> Polygon {
        Polygon {
            points: self.points.iter().map(|&(x, y)| f(x, y)).collect(),
        }
    }

    /// Point-in-polygon test using the even-odd rule
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;
        for ((x0, y0), (x1, y1)) in self.edges() {
            if (y0 > y) != (y1 > y) {
                let xc = x0 + (y - y0) * (x1 - x0) / (y1 - y0);
                if x < xc {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// True if the point is inside or within `tol` of the boundary
    pub fn covers(&self, x: f64, y: f64, tol: f64) -> bool {
        self.contains(x, y) || self.distance_to_boundary(x, y) <= tol
    }

    /// Shortest distance from a point to any edge
    pub fn distance_to_boundary(&self, x: f64, y: f64) -> f64 {
        self.edges()
            .map(|(a, b)| point_segment_distance((x, y), a, b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Rasterize into a `width x height` mask whose pixel `(i, j)` samples
    /// the image point `origin + downsample * (i + 0.5, j + 0.5)`
    ///
    /// Pixels are set when their centre lies inside the polygon (even-odd).
    ///
    /// # Errors
    ///
    /// Returns an error if the mask dimensions are invalid or the downsample
    /// factor is not positive.
    pub fn rasterize(
        &self,
        origin_x: f64,
        origin_y: f64,
        downsample: f64,
        width: u32,
        height: u32,
    ) -> Result<Mask> {
        if !(downsample.is_finite() && downsample > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "downsample must be positive: {downsample}"
            )));
        }
        let mut mask = Mask::new(width, height)?;
        let w = width as usize;
        let mut crossings: Vec<f64> = Vec::new();

        for j in 0..height as usize {
            let y = origin_y + downsample * (j as f64 + 0.5);
            crossings.clear();
            for ((x0, y0), (x1, y1)) in self.edges() {
                if (y0 > y) != (y1 > y) {
                    crossings.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
                }
            }
            crossings.sort_by(f64::total_cmp);

            let row = &mut mask.data_mut()[j * w..(j + 1) * w];
            for pair in crossings.chunks_exact(2) {
                // Pixel i is inside when pair[0] <= centre_x(i) < pair[1]
                let start = ((pair[0] - origin_x) / downsample - 0.5).ceil();
                let end = ((pair[1] - origin_x) / downsample - 0.5).ceil();
                let start = start.clamp(0.0, w as f64) as usize;
                let end = end.clamp(0.0, w as f64) as usize;
                for v in &mut row[start..end.max(start)] {
                    *v = true;
                }
            }
        }
        Ok(mask)
    }

    /// Convex hull (Andrew's monotone chain), counter-clockwise in a y-up
    /// frame, without collinear points
    pub fn convex_hull(&self) -> Polygon {
        let mut pts = self.points.clone();
        pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        pts.dedup();
        if pts.len() < 3 {
            return Polygon { points: pts };
        }

        let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
            (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
        };

        let mut hull: Vec<(f64, f64)> = Vec::with_capacity(pts.len() * 2);
        for &p in &pts {
            while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
                hull.pop();
            }
            hull.push(p);
        }
        let lower_len = hull.len() + 1;
        for &p in pts.iter().rev().skip(1) {
            while hull.len() >= lower_len
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();
        Polygon { points: hull }
    }
}

/// Distance from `p` to the segment `a`-`b`
pub fn point_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (p.0 - a.0).hypot(p.1 - a.1);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_area_perimeter() {
        let p = Polygon::rectangle(2.0, 3.0, 10.0, 5.0);
        assert_eq!(p.area(), 50.0);
        assert_eq!(p.perimeter(), 30.0);
        assert_eq!(p.bounds(), Some((2.0, 3.0, 12.0, 8.0)));
        assert_eq!(p.centroid(), Some((7.0, 5.5)));
    }

    #[test]
    fn test_contains_even_odd() {
        let p = Polygon::rectangle(0.0, 0.0, 4.0, 4.0);
        assert!(p.contains(1.0, 1.0));
        assert!(!p.contains(5.0, 1.0));
        assert!(p.covers(4.0, 2.0, 1e-9));
    }

    #[test]
    fn test_rasterize_pixel_centres() {
        let p = Polygon::rectangle(1.0, 1.0, 3.0, 2.0);
        let mask = p.rasterize(0.0, 0.0, 1.0, 6, 5).unwrap();
        assert_eq!(mask.count(), 6);
        assert!(mask.get(1, 1));
        assert!(mask.get(3, 2));
        assert!(!mask.get(4, 2));
        assert!(!mask.get(0, 1));
    }

    #[test]
    fn test_rasterize_downsampled() {
        let p = Polygon::rectangle(10.0, 10.0, 8.0, 8.0);
        let mask = p.rasterize(10.0, 10.0, 2.0, 4, 4).unwrap();
        assert_eq!(mask.count(), 16);
    }

    #[test]
    fn test_convex_hull_drops_interior() {
        let p = Polygon::from_points(vec![
            (0.0, 0.0),
            (2.0, 1.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (2.0, 2.0),
            (0.0, 4.0),
        ]);
        let hull = p.convex_hull();
        assert_eq!(hull.len(), 4);
        assert_eq!(hull.area(), 16.0);
    }

    #[test]
    fn test_calibrated_and_image_space() {
        let cal = PixelCalibration::microns(0.5, 0.25).unwrap();
        let p = Polygon::rectangle(0.0, 0.0, 4.0, 4.0);
        assert_eq!(p.calibrated(&cal).area(), 4.0);
        let q = p.to_image_space(100.0, 50.0, 2.0);
        assert_eq!(q.bounds(), Some((100.0, 50.0, 108.0, 58.0)));
    }
}
