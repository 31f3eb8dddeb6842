//! Boundary smoothing
//!
//! Traced borders follow pixel edges. They are densified, smoothed with a
//! three-point moving average, densified again and simplified with a
//! closed Douglas-Peucker pass whose tolerance is half a pixel.

use cytoseg_core::{Polygon, point_segment_distance};

/// Largest spacing between interpolated vertices
const MAX_STEP: f64 = 2.5;
/// Douglas-Peucker tolerance in pixels
const SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Smooth a pixel-space boundary
///
/// Returns `None` when the result has fewer than three vertices or no area.
pub fn smooth_polygon(polygon: &Polygon) -> Option<Polygon> {
    let points = polygon.points();
    if points.len() < 3 {
        return None;
    }
    let step = MAX_STEP.min(points.len() as f64 * 0.1);
    let dense = densify(points, step);
    let averaged = average3(&dense);
    let dense = densify(&averaged, step);
    let simplified = simplify_closed(&dense, SIMPLIFY_TOLERANCE);

    let result = Polygon::from_points(simplified);
    if result.len() < 3 || result.area() < 1e-9 {
        return None;
    }
    Some(result)
}

/// Insert vertices so no edge is longer than `step`
fn densify(points: &[(f64, f64)], step: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % n];
        out.push((x0, y0));
        let len = (x1 - x0).hypot(y1 - y0);
        let parts = (len / step).ceil() as usize;
        for k in 1..parts {
            let t = k as f64 / parts as f64;
            out.push((x0 + t * (x1 - x0), y0 + t * (y1 - y0)));
        }
    }
    out
}

fn average3(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (xa, ya) = points[(i + n - 1) % n];
            let (xb, yb) = points[i];
            let (xc, yc) = points[(i + 1) % n];
            ((xa + xb + xc) / 3.0, (ya + yb + yc) / 3.0)
        })
        .collect()
}

/// Douglas-Peucker on a closed ring, split at vertex 0 and the vertex
/// farthest from it
fn simplify_closed(points: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 4 {
        return points.to_vec();
    }
    let (x0, y0) = points[0];
    let far = (1..n)
        .max_by(|&a, &b| {
            let da = (points[a].0 - x0).hypot(points[a].1 - y0);
            let db = (points[b].0 - x0).hypot(points[b].1 - y0);
            da.total_cmp(&db)
        })
        .unwrap_or(n / 2);

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;
    let ring: Vec<(f64, f64)> = points.iter().copied().chain(std::iter::once(points[0])).collect();
    douglas_peucker(&ring, 0, far, tolerance, &mut keep);
    let mut tail = vec![false; n + 1];
    douglas_peucker(&ring, far, n, tolerance, &mut tail);
    for (k, t) in keep.iter_mut().zip(&tail) {
        *k |= *t;
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect()
}

fn douglas_peucker(points: &[(f64, f64)], first: usize, last: usize, tol: f64, keep: &mut [bool]) {
    let mut stack = vec![(first, last)];
    while let Some((a, b)) = stack.pop() {
        if b <= a + 1 {
            continue;
        }
        let mut worst = (0.0, a);
        for i in a + 1..b {
            let d = point_segment_distance(points[i], points[a], points[b]);
            if d > worst.0 {
                worst = (d, i);
            }
        }
        if worst.0 > tol {
            keep[worst.1] = true;
            stack.push((a, worst.1));
            stack.push((worst.1, b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_keeps_area() {
        let square = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        let smooth = smooth_polygon(&square).unwrap();
        assert!(smooth.len() >= 4);
        assert!((smooth.area() - 100.0).abs() < 3.0, "{}", smooth.area());
    }

    #[test]
    fn test_staircase_is_simplified() {
        // Pixel staircase along a diagonal
        let mut pts = vec![(0.0, 0.0)];
        for i in 0..10 {
            let i = i as f64;
            pts.push((i + 1.0, i));
            pts.push((i + 1.0, i + 1.0));
        }
        pts.push((0.0, 10.0));
        let stair = Polygon::from_points(pts);
        let smooth = smooth_polygon(&stair).unwrap();
        assert!(smooth.len() < stair.len());
        assert!((smooth.area() - stair.area()).abs() < 5.0);
    }

    #[test]
    fn test_degenerate() {
        assert!(smooth_polygon(&Polygon::from_points(vec![(0.0, 0.0), (1.0, 0.0)])).is_none());
        let flat = Polygon::from_points(vec![(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        assert!(smooth_polygon(&flat).is_none());
    }
}
