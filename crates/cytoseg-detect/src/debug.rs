//! Intermediate raster inspection
//!
//! A [`DebugSink`] passed in the [`DetectionContext`] receives the rasters
//! the pipeline produces along the way. Nothing is materialised for
//! inspection unless a sink is supplied.

use crate::cancel::CancellationToken;
use cytoseg_core::{FPix, LabelPix, Mask};

/// Pipeline checkpoint at which a raster is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugStage {
    /// Detection channel after median filtering and membrane exclusion
    DetectionChannel,
    /// Background estimate
    Background,
    /// Detection channel minus background
    BackgroundSubtracted,
    /// Laplacian-of-Gaussian response
    Laplacian,
    /// Response `>= 0`
    RoughMask,
    /// Oversegmented fragments that passed gating
    Fragments,
    /// Fragments after fusion and optional splitting
    FusedMask,
    /// Final nucleus labels
    Nuclei,
    /// Expanded cell labels
    Cells,
}

/// A borrowed raster handed to a [`DebugSink`]
#[derive(Debug, Clone, Copy)]
pub enum DebugRaster<'a> {
    Float(&'a FPix),
    Mask(&'a Mask),
    Labels(&'a LabelPix),
}

/// Receiver for intermediate rasters
pub trait DebugSink {
    fn raster(&mut self, stage: DebugStage, raster: DebugRaster<'_>);
}

/// Per-call context threaded through every stage
#[derive(Default)]
pub struct DetectionContext<'a> {
    pub cancel: CancellationToken,
    pub debug: Option<&'a mut dyn DebugSink>,
}

impl<'a> DetectionContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_debug(mut self, sink: &'a mut dyn DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Report a raster to the sink, if any
    pub fn emit(&mut self, stage: DebugStage, raster: DebugRaster<'_>) {
        if let Some(sink) = self.debug.as_deref_mut() {
            sink.raster(stage, raster);
        }
    }
}
