//! Shape measurements of object boundaries
//!
//! All values are computed on the calibrated polygon, so lengths are in
//! the calibration's unit and areas in its square.

use crate::measure::Compartment;
use crate::object::MeasurementList;
use cytoseg_core::Polygon;

/// Shape descriptors of one polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMeasurements {
    pub area: f64,
    pub perimeter: f64,
    /// `4 pi A / P^2`, clamped to `[0, 1]`
    pub circularity: f64,
    /// Largest distance between two boundary points
    pub max_caliper: f64,
    /// Smallest width over all directions
    pub min_caliper: f64,
    /// Eccentricity of the ellipse with the same second moments
    pub eccentricity: f64,
}

impl ShapeMeasurements {
    pub fn of(polygon: &Polygon) -> Self {
        let area = polygon.area();
        let perimeter = polygon.perimeter();
        let circularity = if perimeter > 0.0 {
            (4.0 * std::f64::consts::PI * area / (perimeter * perimeter)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let hull = polygon.convex_hull();
        let (max_caliper, min_caliper) = calipers(hull.points());
        Self {
            area,
            perimeter,
            circularity,
            max_caliper,
            min_caliper,
            eccentricity: eccentricity(polygon),
        }
    }

    /// Append `"<compartment>: <name>"` entries to `list`
    pub fn put(&self, list: &mut MeasurementList, compartment: Compartment) {
        let entries = [
            ("Area", self.area),
            ("Perimeter", self.perimeter),
            ("Circularity", self.circularity),
            ("Max caliper", self.max_caliper),
            ("Min caliper", self.min_caliper),
            ("Eccentricity", self.eccentricity),
        ];
        for (name, value) in entries {
            list.put(format!("{compartment}: {name}"), value);
        }
    }
}

/// Maximum and minimum caliper of a convex hull
fn calipers(hull: &[(f64, f64)]) -> (f64, f64) {
    let mut max = 0.0f64;
    for (i, &(x0, y0)) in hull.iter().enumerate() {
        for &(x1, y1) in &hull[i + 1..] {
            max = max.max((x1 - x0).hypot(y1 - y0));
        }
    }
    if hull.len() < 3 {
        return (max, 0.0);
    }

    let n = hull.len();
    let mut min = f64::INFINITY;
    for i in 0..n {
        let (ax, ay) = hull[i];
        let (bx, by) = hull[(i + 1) % n];
        let len = (bx - ax).hypot(by - ay);
        if len == 0.0 {
            continue;
        }
        let width = hull
            .iter()
            .map(|&(px, py)| ((bx - ax) * (py - ay) - (by - ay) * (px - ax)).abs() / len)
            .fold(0.0, f64::max);
        min = min.min(width);
    }
    (max, if min.is_finite() { min } else { 0.0 })
}

fn eccentricity(polygon: &Polygon) -> f64 {
    let Some(&(ox, oy)) = polygon.points().first() else {
        return 0.0;
    };
    // Moments about the first vertex keep the sums well conditioned
    let local = polygon.translate(-ox, -oy);
    let (mut a, mut sx, mut sy, mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for ((x0, y0), (x1, y1)) in local.edges() {
        let c = x0 * y1 - x1 * y0;
        a += c;
        sx += (x0 + x1) * c;
        sy += (y0 + y1) * c;
        sxx += (x0 * x0 + x0 * x1 + x1 * x1) * c;
        syy += (y0 * y0 + y0 * y1 + y1 * y1) * c;
        sxy += (x0 * y1 + 2.0 * x0 * y0 + 2.0 * x1 * y1 + x1 * y0) * c;
    }
    a *= 0.5;
    if a.abs() < 1e-12 {
        return 0.0;
    }
    let cx = sx / (6.0 * a);
    let cy = sy / (6.0 * a);
    let mu20 = sxx / (12.0 * a) - cx * cx;
    let mu02 = syy / (12.0 * a) - cy * cy;
    let mu11 = sxy / (24.0 * a) - cx * cy;

    let mean = 0.5 * (mu20 + mu02);
    let spread = (0.25 * (mu20 - mu02).powi(2) + mu11 * mu11).sqrt();
    let major = mean + spread;
    let minor = (mean - spread).max(0.0);
    if !(major > 0.0) {
        return 0.0;
    }
    (1.0 - minor / major).max(0.0).sqrt()
}
