//! Connected component analysis
//!
//! This module provides functions for finding and labeling connected
//! components in binary masks. Components are labeled densely `1..=N` in
//! raster order of their first (top-most, then left-most) pixel.

use crate::error::RegionResult;
use cytoseg_core::{LabelPix, Mask, Rect};

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    #[default]
    FourWay,
    /// 8-way connectivity (includes diagonals)
    EightWay,
}

const OFFSETS_4: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const OFFSETS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl ConnectivityType {
    /// Neighbour offsets `(dx, dy)` in raster order
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::FourWay => &OFFSETS_4,
            Self::EightWay => &OFFSETS_8,
        }
    }
}

/// Iterate the in-bounds neighbours of `(x, y)` as linear indices
#[inline]
pub(crate) fn neighbors(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    connectivity: ConnectivityType,
) -> impl Iterator<Item = usize> {
    connectivity.offsets().iter().filter_map(move |&(dx, dy)| {
        let (nx, ny) = (x + dx, y + dy);
        (nx >= 0 && nx < w && ny >= 0 && ny < h).then_some((ny * w + nx) as usize)
    })
}

/// A connected component in a mask
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    /// Unique label for this component
    pub label: u32,
    /// Number of pixels in this component
    pub pixel_count: u32,
    /// Bounding box of this component
    pub bounds: Rect,
}

/// Label all connected components in a mask
///
/// Returns a label raster with labels `1..=N`; background is 0.
pub fn label_connected_components(
    mask: &Mask,
    connectivity: ConnectivityType,
) -> RegionResult<LabelPix> {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let mut labels = LabelPix::new(mask.width(), mask.height())?;
    let src = mask.data();
    let out = labels.data_mut();
    let mut stack: Vec<usize> = Vec::new();
    let mut next = 0u32;

    for start in 0..src.len() {
        if !src[start] || out[start] != 0 {
            continue;
        }
        next += 1;
        out[start] = next;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            let (x, y) = ((idx as i32) % w, (idx as i32) / w);
            for n in neighbors(x, y, w, h, connectivity) {
                if src[n] && out[n] == 0 {
                    out[n] = next;
                    stack.push(n);
                }
            }
        }
    }

    Ok(labels)
}

/// Find all connected components in a mask
///
/// Returns one entry per component, ordered by label.
pub fn find_connected_components(
    mask: &Mask,
    connectivity: ConnectivityType,
) -> RegionResult<Vec<ConnectedComponent>> {
    let labels = label_connected_components(mask, connectivity)?;
    let bounds = crate::label::get_component_bounds_from_labels(&labels);
    let sizes = labels.label_areas();
    Ok(bounds
        .into_iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let label = i as u32 + 1;
            b.map(|bounds| ConnectedComponent {
                label,
                pixel_count: sizes[label as usize],
                bounds,
            })
        })
        .collect())
}
