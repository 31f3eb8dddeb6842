//! Per-label statistics
//!
//! Helpers that summarise a label raster: bounding boxes, pixel counts and
//! mean intensity of each label over a float raster.

use crate::error::{RegionError, RegionResult};
use cytoseg_core::{FPix, LabelPix, Rect};

/// Bounding box of every label `1..=max_label`, indexed by `label - 1`
///
/// Labels with no pixels (e.g. filtered out) are `None`.
pub fn get_component_bounds_from_labels(labels: &LabelPix) -> Vec<Option<Rect>> {
    let n = labels.max_label() as usize;
    // (min_x, min_y, max_x, max_y), inclusive
    let mut extents: Vec<Option<(u32, u32, u32, u32)>> = vec![None; n];
    let w = labels.width() as usize;
    for (i, &l) in labels.data().iter().enumerate() {
        if l == 0 {
            continue;
        }
        let (x, y) = ((i % w) as u32, (i / w) as u32);
        let e = &mut extents[l as usize - 1];
        *e = Some(match *e {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    extents
        .into_iter()
        .map(|e| {
            e.map(|(x0, y0, x1, y1)| {
                Rect::new_unchecked(
                    x0 as i32,
                    y0 as i32,
                    (x1 - x0 + 1) as i32,
                    (y1 - y0 + 1) as i32,
                )
            })
        })
        .collect()
}

/// Pixel count of every label, indexed by label (index 0 is background)
pub fn get_component_sizes(labels: &LabelPix) -> Vec<u32> {
    labels.label_areas()
}

/// Mean of `values` over each label, indexed by label (index 0 is background)
///
/// NaN pixels are skipped; labels without any finite pixel get NaN.
///
/// # Errors
///
/// Returns an error if the rasters differ in size.
pub fn label_means(labels: &LabelPix, values: &FPix) -> RegionResult<Vec<f64>> {
    if labels.dimensions() != values.dimensions() {
        return Err(RegionError::InvalidParameters(format!(
            "label raster {:?} and value raster {:?} differ in size",
            labels.dimensions(),
            values.dimensions()
        )));
    }
    let n = labels.max_label() as usize + 1;
    let mut sums = vec![0.0f64; n];
    let mut counts = vec![0u32; n];
    for (&l, &v) in labels.data().iter().zip(values.data()) {
        if v.is_nan() {
            continue;
        }
        sums[l as usize] += v as f64;
        counts[l as usize] += 1;
    }
    Ok(sums
        .into_iter()
        .zip(counts)
        .map(|(s, c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect())
}

/// Component statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStats {
    /// Component label
    pub label: u32,
    /// Bounding box
    pub bounds: Rect,
    /// Number of pixels
    pub pixel_count: u32,
    /// Mean value over the component
    pub mean: f64,
}

/// Statistics for every non-empty label, ordered by label
///
/// # Arguments
///
/// * `labels` - Label raster
/// * `values` - Raster the means are computed over
pub fn get_component_stats(labels: &LabelPix, values: &FPix) -> RegionResult<Vec<ComponentStats>> {
    let means = label_means(labels, values)?;
    let sizes = labels.label_areas();
    Ok(get_component_bounds_from_labels(labels)
        .into_iter()
        .enumerate()
        .filter_map(|(i, bounds)| {
            let label = i + 1;
            bounds.map(|bounds| ComponentStats {
                label: label as u32,
                bounds,
                pixel_count: sizes[label],
                mean: means[label],
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_skip_empty_labels() {
        let labels = LabelPix::from_data(4, 2, vec![1, 1, 0, 3, 0, 1, 0, 3]).unwrap();
        let bounds = get_component_bounds_from_labels(&labels);
        assert_eq!(bounds.len(), 3);
        assert_eq!(bounds[0], Some(Rect::new_unchecked(0, 0, 2, 2)));
        assert_eq!(bounds[1], None);
        assert_eq!(bounds[2], Some(Rect::new_unchecked(3, 0, 1, 2)));
    }

    #[test]
    fn test_label_means() {
        let labels = LabelPix::from_data(3, 1, vec![1, 1, 2]).unwrap();
        let values = FPix::from_data(3, 1, vec![2.0, 4.0, f32::NAN]).unwrap();
        let means = label_means(&labels, &values).unwrap();
        assert_eq!(means[1], 3.0);
        assert!(means[2].is_nan());
    }

    #[test]
    fn test_component_stats() {
        let labels = LabelPix::from_data(3, 1, vec![0, 1, 1]).unwrap();
        let values = FPix::from_data(3, 1, vec![9.0, 1.0, 2.0]).unwrap();
        let stats = get_component_stats(&labels, &values).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].pixel_count, 2);
        assert_eq!(stats[0].mean, 1.5);
    }
}
