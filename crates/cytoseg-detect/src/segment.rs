//! Nucleus segmentation
//!
//! The detection channel is background-corrected and enhanced with a
//! Laplacian-of-Gaussian. Regional maxima of the response seed a watershed
//! that deliberately oversegments touching nuclei into fragments. Dim
//! fragments are discarded, the rest are fused back inside the rough
//! `response >= 0` mask and, optionally, re-split along concavities with a
//! distance-transform watershed. The result is clipped to the ROI,
//! optionally refined at a small sigma, labeled and filtered by area and
//! intensity.
//!
//! # Seed cache
//!
//! Everything up to the fragment partition depends only on the input
//! rasters and a subset of the parameters. [`NucleusSegmenter`] keeps the
//! last partition keyed by a [`SeedKey`], so changing the threshold or the
//! area limits on the same tile skips the expensive filtering.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::background::estimate_background;
use crate::debug::{DebugRaster, DebugStage, DetectionContext};
use crate::error::{DetectError, DetectResult};
use crate::params::{DetectionParameters, ImagePlane};
use cytoseg_core::{FPix, LabelPix, Mask};
use cytoseg_filter::{gaussian_blur, laplacian_of_gaussian, median_filter};
use cytoseg_morph::{Sel, dilate, erode};
use cytoseg_region::{
    ConnectivityType, WatershedOptions, fill_holes, find_regional_maxima,
    label_connected_components, label_means, marker_watershed, split_by_distance,
};

/// Sigma of the boundary refinement pass
const REFINE_SIGMA: f32 = 1.0;
/// Refinement runs only above this sigma
const REFINE_ABOVE_SIGMA: f64 = 1.5;
/// Maxima prominence as a fraction of the response range
const PROMINENCE_FRACTION: f32 = 0.001;
/// Maxima prominence of the distance map when splitting fused nuclei
const SPLIT_PROMINENCE: f32 = 0.5;

/// Rasters a segmentation runs on
#[derive(Debug, Clone, Copy)]
pub struct SegmentationInput<'a> {
    /// Detection channel
    pub detection: &'a FPix,
    /// Membrane channel, used when membrane exclusion is enabled
    pub membrane: Option<&'a FPix>,
    /// Pixels inside the ROI
    pub roi: &'a Mask,
    /// Plane the rasters were read from
    pub plane: ImagePlane,
}

/// Cache key: the inputs that determine the fragment partition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeedKey {
    median_radius: u64,
    background_radius: u64,
    max_background: u64,
    background_by_reconstruction: bool,
    sigma: u64,
    exclude_membrane_channel: bool,
    plane: ImagePlane,
    fingerprint: u64,
}

impl SeedKey {
    pub fn new(input: &SegmentationInput<'_>, params: &DetectionParameters) -> Self {
        Self {
            median_radius: params.median_radius.to_bits(),
            background_radius: params.background_radius.to_bits(),
            max_background: params.max_background.to_bits(),
            background_by_reconstruction: params.background_by_reconstruction,
            sigma: params.sigma.to_bits(),
            exclude_membrane_channel: params.exclude_membrane_channel,
            plane: input.plane,
            fingerprint: fingerprint(input),
        }
    }
}

fn fingerprint(input: &SegmentationInput<'_>) -> u64 {
    let mut hasher = DefaultHasher::new();
    let hash_fpix = |fpix: &FPix, hasher: &mut DefaultHasher| {
        fpix.dimensions().hash(hasher);
        for v in fpix.data() {
            v.to_bits().hash(hasher);
        }
    };
    hash_fpix(input.detection, &mut hasher);
    match input.membrane {
        Some(m) => {
            1u8.hash(&mut hasher);
            hash_fpix(m, &mut hasher);
        }
        None => 0u8.hash(&mut hasher),
    }
    input.roi.dimensions().hash(&mut hasher);
    input.roi.data().hash(&mut hasher);
    hasher.finish()
}

/// Oversegmented partition of a tile, reusable across threshold changes
#[derive(Debug, Clone)]
pub struct SeedPartition {
    /// Watershed fragments of the rough mask
    pub fragments: LabelPix,
    /// `response >= 0`
    pub rough: Mask,
    /// Background-subtracted detection channel
    pub to_measure: FPix,
    /// Pixels excluded for bright background
    pub exclusion: Option<Mask>,
    /// Small-sigma foreground used to refine boundaries
    pub refined: Option<Mask>,
}

#[derive(Debug, Default)]
enum SeedCache {
    #[default]
    Empty,
    Complete {
        key: SeedKey,
        seeds: SeedPartition,
    },
    Incomplete,
}

/// Kept nuclei of one segmentation
#[derive(Debug, Clone)]
pub struct NucleusSegmentation {
    /// Nucleus labels; dropped labels are zeroed, not renumbered
    pub labels: LabelPix,
    /// Surviving labels, ascending
    pub kept: Vec<u32>,
    /// Pixel count per label (index 0 is background)
    pub areas: Vec<u32>,
    /// Mean background-subtracted intensity per label
    pub means: Vec<f64>,
}

/// Outcome of [`NucleusSegmenter::segment`]
#[derive(Debug, Clone)]
pub enum SegmentationRun {
    Completed(NucleusSegmentation),
    Cancelled,
}

/// Watershed nucleus segmenter with a seed cache
#[derive(Debug, Default)]
pub struct NucleusSegmenter {
    cache: SeedCache,
    reused: bool,
}

impl NucleusSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last run took its seeds from the cache
    pub fn last_run_reused_seeds(&self) -> bool {
        self.reused
    }

    /// Whether a complete partition is cached
    pub fn has_cached_seeds(&self) -> bool {
        matches!(self.cache, SeedCache::Complete { .. })
    }

    /// Segment nuclei
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidInput`] if the ROI mask is empty or
    /// does not match the detection channel, or if a raster differs in
    /// size, before any processing starts.
    pub fn segment(
        &mut self,
        input: &SegmentationInput<'_>,
        params: &DetectionParameters,
        ctx: &mut DetectionContext<'_>,
    ) -> DetectResult<SegmentationRun> {
        params.validate()?;
        validate_input(input)?;
        self.reused = false;

        if ctx.is_cancelled() {
            return Ok(self.cancelled());
        }

        let key = SeedKey::new(input, params);
        let cached = match &self.cache {
            SeedCache::Complete { key: k, .. } if *k == key => true,
            SeedCache::Complete { .. } => {
                log::debug!("seed parameters or pixels changed; recomputing seeds");
                false
            }
            SeedCache::Incomplete => {
                log::debug!("previous seed computation was interrupted; recomputing");
                false
            }
            SeedCache::Empty => false,
        };
        if cached {
            log::debug!("reusing cached seed partition");
            self.reused = true;
        } else {
            self.cache = SeedCache::Incomplete;
            match compute_seeds(input, params, ctx)? {
                Some(seeds) => self.cache = SeedCache::Complete { key, seeds },
                None => return Ok(self.cancelled()),
            }
        }
        let SeedCache::Complete { seeds, .. } = &self.cache else {
            return Ok(self.cancelled());
        };

        match finish(seeds, input.roi, params, ctx)? {
            Some(result) => Ok(SegmentationRun::Completed(result)),
            None => Ok(self.cancelled()),
        }
    }

    fn cancelled(&mut self) -> SegmentationRun {
        log::trace!("segmentation cancelled");
        self.cache = SeedCache::Incomplete;
        SegmentationRun::Cancelled
    }
}

fn validate_input(input: &SegmentationInput<'_>) -> DetectResult<()> {
    let dims = input.detection.dimensions();
    if input.roi.dimensions() != dims {
        return Err(DetectError::InvalidInput(format!(
            "ROI mask {:?} does not match detection channel {:?}",
            input.roi.dimensions(),
            dims
        )));
    }
    if input.roi.is_clear() {
        return Err(DetectError::InvalidInput("ROI covers no pixels".to_string()));
    }
    if let Some(m) = input.membrane
        && m.dimensions() != dims
    {
        return Err(DetectError::InvalidInput(format!(
            "membrane channel {:?} does not match detection channel {:?}",
            m.dimensions(),
            dims
        )));
    }
    Ok(())
}

/// Zero the detection channel where the membrane stain is at least as
/// strong as the nuclear stain
fn exclude_membrane(detection: &mut FPix, membrane: &FPix) -> DetectResult<()> {
    let nuclear = gaussian_blur(detection, 1.0)?;
    let membrane = gaussian_blur(membrane, 1.0)?;
    let dominant = Mask::greater_equal(&membrane, &nuclear)?;
    let dominant = dilate(&dominant, &Sel::create_square(3)?)?;
    dominant.fill_fpix(detection, 0.0)?;
    Ok(())
}

/// Steps up to the fragment partition; `None` when cancelled
fn compute_seeds(
    input: &SegmentationInput<'_>,
    params: &DetectionParameters,
    ctx: &mut DetectionContext<'_>,
) -> DetectResult<Option<SeedPartition>> {
    log::trace!("computing seeds");
    let mut detection = if params.median_radius > 0.0 {
        median_filter(input.detection, params.median_radius)?
    } else {
        input.detection.clone()
    };
    if params.exclude_membrane_channel
        && let Some(membrane) = input.membrane
    {
        exclude_membrane(&mut detection, membrane)?;
    }
    ctx.emit(DebugStage::DetectionChannel, DebugRaster::Float(&detection));

    let estimate = estimate_background(
        &detection,
        params.background_radius,
        params.max_background,
        params.background_by_reconstruction,
    )?;
    if let Some(bg) = &estimate.background {
        ctx.emit(DebugStage::Background, DebugRaster::Float(bg));
    }
    let to_measure = estimate.subtracted;
    ctx.emit(
        DebugStage::BackgroundSubtracted,
        DebugRaster::Float(&to_measure),
    );

    let mut filter_input = to_measure.clone();
    filter_input.replace_non_finite(0.0);
    let response = laplacian_of_gaussian(&filter_input, params.sigma as f32)?;
    ctx.emit(DebugStage::Laplacian, DebugRaster::Float(&response));
    let rough = Mask::from_fpix(&response, |v| v >= 0.0);
    ctx.emit(DebugStage::RoughMask, DebugRaster::Mask(&rough));

    if ctx.is_cancelled() {
        return Ok(None);
    }
    log::trace!("oversegmenting");
    let tolerance = response
        .finite_range()
        .map(|(lo, hi)| (hi - lo) * PROMINENCE_FRACTION)
        .unwrap_or(0.0)
        .max(f32::EPSILON);
    let maxima = find_regional_maxima(&response, Some(&rough), tolerance)?;
    let fragments = marker_watershed(
        &response,
        &maxima,
        Some(&rough),
        &WatershedOptions::new().with_threshold(0.0),
    )?;

    let refined = if params.sigma > REFINE_ABOVE_SIGMA {
        let fine = laplacian_of_gaussian(&filter_input, REFINE_SIGMA)?;
        Some(Mask::from_fpix(&fine, |v| v >= 0.0))
    } else {
        None
    };

    Ok(Some(SeedPartition {
        fragments,
        rough,
        to_measure,
        exclusion: estimate.exclusion,
        refined,
    }))
}

/// Fragment gating through filtering; `None` when cancelled
fn finish(
    seeds: &SeedPartition,
    roi: &Mask,
    params: &DetectionParameters,
    ctx: &mut DetectionContext<'_>,
) -> DetectResult<Option<NucleusSegmentation>> {
    log::trace!("gating fragments");
    let threshold = params.threshold;
    let means = label_means(&seeds.fragments, &seeds.to_measure)?;
    let mut rejected: Vec<bool> = means.iter().map(|&m| !(m > threshold)).collect();
    if let Some(exclusion) = &seeds.exclusion {
        for (&l, &e) in seeds.fragments.data().iter().zip(exclusion.data()) {
            if e {
                rejected[l as usize] = true;
            }
        }
    }
    let mut kept_fragments = seeds.fragments.clone();
    kept_fragments.clear_labels(&rejected);
    ctx.emit(DebugStage::Fragments, DebugRaster::Labels(&kept_fragments));

    if ctx.is_cancelled() {
        return Ok(None);
    }
    log::trace!("fusing fragments");
    let mut fused = dilate(&kept_fragments.to_mask(), &Sel::create_square(3)?)?;
    fused.and_with(&seeds.rough)?;
    if params.watershed_post_process {
        let filled = fill_holes(&fused, ConnectivityType::EightWay)?;
        fused = split_by_distance(&filled, SPLIT_PROMINENCE)?;
    }
    fused.and_with(roi)?;
    if let Some(refined) = &seeds.refined {
        let mut support = erode(&fused, &Sel::create_square(3)?)?;
        support.or_with(refined)?;
        fused.and_with(&support)?;
    }
    ctx.emit(DebugStage::FusedMask, DebugRaster::Mask(&fused));

    if ctx.is_cancelled() {
        return Ok(None);
    }
    log::trace!("labeling nuclei");
    let mut labels = label_connected_components(&fused, ConnectivityType::FourWay)?;
    let areas = labels.label_areas();
    let means = label_means(&labels, &seeds.to_measure)?;

    if ctx.is_cancelled() {
        return Ok(None);
    }
    let mut dropped = vec![false; areas.len()];
    let mut kept = Vec::new();
    for label in 1..areas.len() {
        let area = areas[label] as f64;
        let drop = !(means[label] > threshold)
            || area < params.min_area
            || (params.max_area > 0.0 && area > params.max_area);
        if drop {
            dropped[label] = true;
        } else {
            kept.push(label as u32);
        }
    }
    labels.clear_labels(&dropped);
    ctx.emit(DebugStage::Nuclei, DebugRaster::Labels(&labels));
    log::trace!(
        "kept {} of {} nuclei",
        kept.len(),
        areas.len().saturating_sub(1)
    );

    Ok(Some(NucleusSegmentation {
        labels,
        kept,
        areas,
        means,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;

    fn square_image() -> FPix {
        let mut fpix = FPix::new(30, 30).unwrap();
        for y in 10..20 {
            for x in 10..20 {
                fpix.set_pixel(x, y, 100.0).unwrap();
            }
        }
        fpix
    }

    fn params() -> DetectionParameters {
        DetectionParameters::new()
            .with_background_radius(0.0)
            .with_sigma(1.0)
            .with_threshold(10.0)
            .with_min_area(1.0)
            .with_max_area(1000.0)
    }

    #[test]
    fn test_single_square() {
        let fpix = square_image();
        let roi = Mask::new_with_value(30, 30, true).unwrap();
        let input = SegmentationInput {
            detection: &fpix,
            membrane: None,
            roi: &roi,
            plane: ImagePlane::default(),
        };
        let mut seg = NucleusSegmenter::new();
        let run = seg
            .segment(&input, &params(), &mut DetectionContext::new())
            .unwrap();
        let SegmentationRun::Completed(result) = run else {
            panic!("not cancelled");
        };
        assert_eq!(result.kept.len(), 1);
        let label = result.kept[0] as usize;
        assert_eq!(result.areas[label], 100);
        assert_eq!(result.means[label], 100.0);
    }

    #[test]
    fn test_cache_reuse_and_recompute() {
        let fpix = square_image();
        let roi = Mask::new_with_value(30, 30, true).unwrap();
        let input = SegmentationInput {
            detection: &fpix,
            membrane: None,
            roi: &roi,
            plane: ImagePlane::default(),
        };
        let mut seg = NucleusSegmenter::new();
        let mut ctx = DetectionContext::new();
        seg.segment(&input, &params(), &mut ctx).unwrap();
        assert!(!seg.last_run_reused_seeds());

        // Threshold is not seed-relevant
        seg.segment(&input, &params().with_threshold(50.0), &mut ctx)
            .unwrap();
        assert!(seg.last_run_reused_seeds());

        // Sigma is
        seg.segment(&input, &params().with_sigma(1.2), &mut ctx)
            .unwrap();
        assert!(!seg.last_run_reused_seeds());
    }

    #[test]
    fn test_cancel_marks_incomplete() {
        let fpix = square_image();
        let roi = Mask::new_with_value(30, 30, true).unwrap();
        let input = SegmentationInput {
            detection: &fpix,
            membrane: None,
            roi: &roi,
            plane: ImagePlane::default(),
        };
        let mut seg = NucleusSegmenter::new();
        seg.segment(&input, &params(), &mut DetectionContext::new())
            .unwrap();
        assert!(seg.has_cached_seeds());

        let token = CancellationToken::new();
        token.cancel();
        let mut ctx = DetectionContext::new().with_cancel(token);
        let run = seg.segment(&input, &params(), &mut ctx).unwrap();
        assert!(matches!(run, SegmentationRun::Cancelled));
        assert!(!seg.has_cached_seeds());

        seg.segment(&input, &params(), &mut DetectionContext::new())
            .unwrap();
        assert!(!seg.last_run_reused_seeds());
    }

    #[test]
    fn test_empty_roi_rejected() {
        let fpix = square_image();
        let roi = Mask::new(30, 30).unwrap();
        let input = SegmentationInput {
            detection: &fpix,
            membrane: None,
            roi: &roi,
            plane: ImagePlane::default(),
        };
        let err = NucleusSegmenter::new()
            .segment(&input, &params(), &mut DetectionContext::new())
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidInput(_)));
    }

    #[test]
    fn test_membrane_exclusion() {
        let fpix = square_image();
        let mut membrane = FPix::new(30, 30).unwrap();
        for y in 0..30 {
            for x in 10..20 {
                membrane.set_pixel(x, y, 500.0).unwrap();
            }
        }
        let roi = Mask::new_with_value(30, 30, true).unwrap();
        let input = SegmentationInput {
            detection: &fpix,
            membrane: Some(&membrane),
            roi: &roi,
            plane: ImagePlane::default(),
        };
        let mut seg = NucleusSegmenter::new();
        let off = seg
            .segment(&input, &params(), &mut DetectionContext::new())
            .unwrap();
        let on = seg
            .segment(
                &input,
                &params().with_exclude_membrane_channel(true),
                &mut DetectionContext::new(),
            )
            .unwrap();
        let count = |run: SegmentationRun| match run {
            SegmentationRun::Completed(r) => r.kept.len(),
            SegmentationRun::Cancelled => usize::MAX,
        };
        assert_eq!(count(off), 1);
        assert_eq!(count(on), 0);
    }
}
