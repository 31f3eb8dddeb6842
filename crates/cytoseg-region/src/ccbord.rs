//! Border tracing for labeled regions
//!
//! Borders are traced along pixel edges ("cracks") rather than through
//! pixel centres, so a traced polygon encloses exactly the pixels of its
//! region. Vertices lie on the integer pixel grid: pixel `(x, y)` covers
//! the square `[x, x+1] x [y, y+1]`.
//!
//! Each boundary edge is directed so that the region lies on its right
//! (clockwise in image coordinates, y pointing down). Where two pixels of
//! the same label touch only at a corner, the trace turns right first and
//! keeps them apart, which matches 4-connected labeling.

use std::collections::HashMap;

use crate::label::get_component_bounds_from_labels;
use cytoseg_core::{LabelPix, Polygon, Rect};

type Vertex = (i32, i32);
type Dir = (i32, i32);

/// Trace the outer border of one label
///
/// # Arguments
///
/// * `labels` - Label raster
/// * `label` - Label to trace
/// * `bounds` - Optional bounding box of the label, to limit the scan
///
/// # Returns
///
/// The outer border as a clockwise polygon in raster coordinates with
/// collinear vertices removed, or `None` if the label has no pixels.
pub fn get_outer_border(labels: &LabelPix, label: u32, bounds: Option<&Rect>) -> Option<Polygon> {
    if label == 0 {
        return None;
    }
    let full = Rect::new_unchecked(0, 0, labels.width() as i32, labels.height() as i32);
    let area = bounds.and_then(|b| b.intersect(&full)).unwrap_or(full);

    let is_in = |x: i32, y: i32| x >= 0 && y >= 0 && labels.get(x as u32, y as u32) == label;

    // Directed boundary edges, keyed by start vertex
    let mut starts: Vec<(Vertex, Dir)> = Vec::new();
    let mut outgoing: HashMap<Vertex, Vec<usize>> = HashMap::new();
    let mut add = |from: Vertex, dir: Dir| {
        outgoing.entry(from).or_default().push(starts.len());
        starts.push((from, dir));
    };
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if !is_in(x, y) {
                continue;
            }
            if !is_in(x, y - 1) {
                add((x, y), (1, 0));
            }
            if !is_in(x + 1, y) {
                add((x + 1, y), (0, 1));
            }
            if !is_in(x, y + 1) {
                add((x + 1, y + 1), (-1, 0));
            }
            if !is_in(x - 1, y) {
                add((x, y + 1), (0, -1));
            }
        }
    }
    if starts.is_empty() {
        return None;
    }

    let successor = |e: usize| -> usize {
        let ((sx, sy), (dx, dy)) = starts[e];
        let end = (sx + dx, sy + dy);
        let out = outgoing.get(&end).map(Vec::as_slice).unwrap_or(&[]);
        let preference = [(-dy, dx), (dx, dy), (dy, -dx)];
        preference
            .iter()
            .find_map(|p| out.iter().copied().find(|&o| starts[o].1 == *p))
            // Every vertex of a closed crack boundary has an outgoing edge
            .unwrap_or(e)
    };

    let mut visited = vec![false; starts.len()];
    let mut best: Option<(f64, Vec<(f64, f64)>)> = None;
    for first in 0..starts.len() {
        if visited[first] {
            continue;
        }
        let mut loop_pts: Vec<(f64, f64)> = Vec::new();
        let mut e = first;
        loop {
            visited[e] = true;
            let ((x, y), _) = starts[e];
            loop_pts.push((x as f64, y as f64));
            e = successor(e);
            if e == first || visited[e] {
                break;
            }
        }
        let pts = remove_collinear(loop_pts);
        let signed = Polygon::from_points(pts.clone()).signed_area();
        if best.as_ref().is_none_or(|(a, _)| signed > *a) {
            best = Some((signed, pts));
        }
    }
    best.map(|(_, pts)| Polygon::from_points(pts))
}

/// Trace the outer border of every label, ordered by label
pub fn get_outer_borders(labels: &LabelPix) -> Vec<(u32, Polygon)> {
    get_component_bounds_from_labels(labels)
        .into_iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let label = i as u32 + 1;
            let bounds = b?;
            get_outer_border(labels, label, Some(&bounds)).map(|p| (label, p))
        })
        .collect()
}

/// Drop vertices that lie on the straight line between their neighbours
fn remove_collinear(points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    (0..n)
        .filter(|&i| {
            let (px, py) = points[(i + n - 1) % n];
            let (cx, cy) = points[i];
            let (nx, ny) = points[(i + 1) % n];
            (cx - px) * (ny - cy) - (cy - py) * (nx - cx) != 0.0
        })
        .map(|i| points[i])
        .collect()
}
