//! Watershed segmentation
//!
//! This module provides marker-controlled watershed flooding on float
//! rasters, regional maxima with a prominence tolerance to seed it, and a
//! distance-transform watershed that splits touching blobs in a mask.
//!
//! Flooding runs from high to low values: a surface is "filled" starting
//! at the brightest marker and spreading downhill, so bright blobs play
//! the role of catchment basins.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use crate::conncomp::{ConnectivityType, neighbors};
use crate::error::{RegionError, RegionResult};
use crate::seedfill::{BoundaryCondition, distance_function};
use cytoseg_core::{FPix, LabelPix, Mask};

/// Options for marker watershed
#[derive(Debug, Clone)]
pub struct WatershedOptions {
    /// Connectivity used for flooding
    pub connectivity: ConnectivityType,
    /// Leave one-pixel zero lines where two basins meet
    pub lines: bool,
    /// Pixels below this value are never flooded
    pub threshold: Option<f32>,
}

impl Default for WatershedOptions {
    fn default() -> Self {
        Self {
            connectivity: ConnectivityType::FourWay,
            lines: false,
            threshold: None,
        }
    }
}

impl WatershedOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: ConnectivityType) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Draw separating lines between basins
    pub fn with_lines(mut self, lines: bool) -> Self {
        self.lines = lines;
        self
    }

    /// Set the minimum flooded value
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Queue entry: higher values pop first, ties in insertion order
struct Entry {
    value: f32,
    seq: Reverse<u64>,
    index: usize,
    label: u32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

fn check_mask(fpix: &FPix, mask: Option<&Mask>) -> RegionResult<()> {
    if let Some(m) = mask
        && m.dimensions() != fpix.dimensions()
    {
        return Err(RegionError::InvalidParameters(format!(
            "mask {:?} does not match raster {:?}",
            m.dimensions(),
            fpix.dimensions()
        )));
    }
    Ok(())
}

/// Find regional maxima that stand out by more than `tolerance`
///
/// A candidate is a pixel with no strictly higher 8-neighbour. Candidates
/// are visited from the highest down; each floods the 8-connected area
/// with values `>= value - tolerance`. The candidate is accepted if the
/// flood neither reaches a strictly higher pixel nor an area already
/// claimed by an accepted maximum.
///
/// # Arguments
///
/// * `fpix` - Input raster; NaN pixels are ignored
/// * `mask` - Optional restriction to pixels set in the mask
/// * `tolerance` - Prominence a maximum must have over its surroundings
///
/// # Returns
///
/// A label raster with one pixel per accepted maximum, labeled `1..=N` in
/// raster order.
pub fn find_regional_maxima(
    fpix: &FPix,
    mask: Option<&Mask>,
    tolerance: f32,
) -> RegionResult<LabelPix> {
    check_mask(fpix, mask)?;
    let (w, h) = (fpix.width() as i32, fpix.height() as i32);
    let data = fpix.data();
    let eligible: Vec<bool> = data
        .iter()
        .enumerate()
        .map(|(i, v)| !v.is_nan() && mask.is_none_or(|m| m.data()[i]))
        .collect();

    let mut candidates: Vec<usize> = (0..data.len())
        .filter(|&i| {
            eligible[i]
                && neighbors(
                    i as i32 % w,
                    i as i32 / w,
                    w,
                    h,
                    ConnectivityType::EightWay,
                )
                .all(|n| !eligible[n] || data[n] <= data[i])
        })
        .collect();
    candidates.sort_by(|&a, &b| data[b].total_cmp(&data[a]).then(a.cmp(&b)));

    let tolerance = tolerance.max(0.0);
    // 0 = untouched, 1 = processed (rejected flood), 2 = claimed
    let mut state = vec![0u8; data.len()];
    let mut seeds: Vec<usize> = Vec::new();
    let mut flood: Vec<usize> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut visited = vec![false; data.len()];

    for &c in &candidates {
        if state[c] != 0 {
            continue;
        }
        let v = data[c];
        let floor = v - tolerance;
        flood.clear();
        queue.clear();
        queue.push_back(c);
        visited[c] = true;
        flood.push(c);
        let mut accepted = true;

        'flood: while let Some(i) = queue.pop_front() {
            for n in neighbors(i as i32 % w, i as i32 / w, w, h, ConnectivityType::EightWay) {
                if !eligible[n] || visited[n] || data[n] < floor {
                    continue;
                }
                if data[n] > v || state[n] == 2 {
                    accepted = false;
                    break 'flood;
                }
                visited[n] = true;
                flood.push(n);
                queue.push_back(n);
            }
        }

        let mark = if accepted { 2 } else { 1 };
        for &i in &flood {
            visited[i] = false;
            if state[i] != 2 {
                state[i] = mark;
            }
        }
        if accepted {
            seeds.push(c);
        }
    }

    seeds.sort_unstable();
    let mut labels = LabelPix::new(fpix.width(), fpix.height())?;
    let out = labels.data_mut();
    for (k, &i) in seeds.iter().enumerate() {
        out[i] = k as u32 + 1;
    }
    Ok(labels)
}

/// Marker-controlled watershed on a float surface
///
/// Flooding starts at the labeled marker pixels and proceeds from high to
/// low surface values; each flooded pixel takes the label of the
/// neighbour that reached it. Equal values are processed first-come,
/// first-served. A pixel is floodable when it lies in `mask` (if given),
/// is not NaN and is at least `options.threshold` (if given).
///
/// With `options.lines` set, a pixel that touches two different basins
/// when it is reached stays 0 and does not propagate.
///
/// # Errors
///
/// Returns an error if the marker or mask raster differs in size from the
/// surface.
pub fn marker_watershed(
    surface: &FPix,
    markers: &LabelPix,
    mask: Option<&Mask>,
    options: &WatershedOptions,
) -> RegionResult<LabelPix> {
    if markers.dimensions() != surface.dimensions() {
        return Err(RegionError::SegmentationError(format!(
            "markers {:?} do not match surface {:?}",
            markers.dimensions(),
            surface.dimensions()
        )));
    }
    check_mask(surface, mask)?;

    let (w, h) = (surface.width() as i32, surface.height() as i32);
    let data = surface.data();
    let eligible: Vec<bool> = data
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            !v.is_nan()
                && mask.is_none_or(|m| m.data()[i])
                && options.threshold.is_none_or(|t| v >= t)
        })
        .collect();

    let mut labels = LabelPix::new(surface.width(), surface.height())?;
    let out = labels.data_mut();
    let mut queued = vec![false; data.len()];
    for (i, &l) in markers.data().iter().enumerate() {
        if l != 0 && eligible[i] {
            out[i] = l;
            queued[i] = true;
        }
    }

    let mut heap: BinaryHeap<Entry> = BinaryHeap::new();
    let mut seq = 0u64;
    let mut push = |heap: &mut BinaryHeap<Entry>, index: usize, label: u32| {
        heap.push(Entry {
            value: data[index],
            seq: Reverse(seq),
            index,
            label,
        });
        seq += 1;
    };

    for i in 0..data.len() {
        if out[i] == 0 {
            continue;
        }
        for n in neighbors(i as i32 % w, i as i32 / w, w, h, options.connectivity) {
            if eligible[n] && !queued[n] {
                queued[n] = true;
                push(&mut heap, n, out[i]);
            }
        }
    }

    while let Some(Entry { index, label, .. }) = heap.pop() {
        let (x, y) = (index as i32 % w, index as i32 / w);
        if options.lines {
            let mut first = 0u32;
            let mut touches_other = false;
            for n in neighbors(x, y, w, h, options.connectivity) {
                let l = out[n];
                if l == 0 {
                    continue;
                }
                if first == 0 {
                    first = l;
                } else if l != first {
                    touches_other = true;
                    break;
                }
            }
            if touches_other {
                continue;
            }
        }
        out[index] = label;
        for n in neighbors(x, y, w, h, options.connectivity) {
            if eligible[n] && !queued[n] {
                queued[n] = true;
                push(&mut heap, n, label);
            }
        }
    }

    Ok(labels)
}

/// Split touching blobs in a mask along distance-transform ridges
///
/// Holes are filled by the caller if needed. The distance map (image edge
/// not counted as background) is seeded with maxima of prominence
/// `tolerance` and flooded with separating lines; the returned mask is the
/// input minus those lines. A mask without any background is returned
/// unchanged.
pub fn split_by_distance(mask: &Mask, tolerance: f32) -> RegionResult<Mask> {
    if mask.count() == mask.data().len() {
        return Ok(mask.clone());
    }
    let dist = distance_function(mask, BoundaryCondition::Foreground)?;
    let maxima = find_regional_maxima(&dist, Some(mask), tolerance)?;
    let basins = marker_watershed(
        &dist,
        &maxima,
        Some(mask),
        &WatershedOptions::new().with_lines(true),
    )?;
    Ok(basins.to_mask())
}
