//! Parallel detection over many ROIs
//!
//! Every ROI gets its own detector with an empty seed cache; detectors
//! share nothing but the read-only supplier, parameters and cancellation
//! token.

use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::debug::DetectionContext;
use crate::detector::{CellDetector, Detection, RegionSupplier};
use crate::error::DetectResult;
use crate::params::DetectionParameters;
use cytoseg_core::Polygon;

/// Run one detection per ROI on the rayon thread pool
///
/// Results are returned in ROI order. A failing ROI yields its error
/// without affecting the others.
pub fn detect_batch<S>(
    supplier: &S,
    rois: &[Polygon],
    template: &CellDetector,
    params: &DetectionParameters,
    cancel: &CancellationToken,
) -> Vec<DetectResult<Detection>>
where
    S: RegionSupplier + Sync + ?Sized,
{
    log::debug!("detecting in {} ROIs", rois.len());
    rois.par_iter()
        .map(|roi| {
            let mut detector = template.fork();
            let mut ctx = DetectionContext::new().with_cancel(cancel.clone());
            detector.detect(supplier, roi, params, &mut ctx)
        })
        .collect()
}
