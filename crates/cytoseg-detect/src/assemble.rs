//! Object assembly
//!
//! Turns kept nucleus labels (and their cells) into boundary polygons in
//! image coordinates with attached measurements.

use std::collections::HashMap;

use crate::channels::ChannelSet;
use crate::error::DetectResult;
use crate::expand::CellExpansion;
use crate::measure::{AREA_RATIO, Compartment, RunningStats, measure_labels, put_intensity};
use crate::object::{DetectedObject, MeasurementList, ObjectKind};
use crate::params::DetectionParameters;
use crate::segment::NucleusSegmentation;
use crate::shape::ShapeMeasurements;
use crate::smooth::smooth_polygon;
use cytoseg_core::{FPix, LabelPix, PixelCalibration, Polygon};
use cytoseg_region::get_outer_borders;

/// Where the processed region sits in the image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPlacement {
    /// Full-resolution x of the region's top-left corner
    pub origin_x: f64,
    /// Full-resolution y of the region's top-left corner
    pub origin_y: f64,
    pub downsample: f64,
    /// Full-resolution pixel size
    pub calibration: PixelCalibration,
}

impl RegionPlacement {
    /// A full-resolution region at the image origin
    pub fn identity() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            downsample: 1.0,
            calibration: PixelCalibration::Uncalibrated,
        }
    }

    fn to_image(&self, local: &Polygon) -> Polygon {
        local.to_image_space(self.origin_x, self.origin_y, self.downsample)
    }
}

struct ChannelStats {
    name: String,
    stats: Vec<RunningStats>,
}

fn measure_all(channels: &[(String, FPix)], labels: &LabelPix) -> DetectResult<Vec<ChannelStats>> {
    channels
        .iter()
        .map(|(name, fpix)| {
            Ok(ChannelStats {
                name: name.clone(),
                stats: measure_labels(fpix, labels)?,
            })
        })
        .collect()
}

fn put_all(list: &mut MeasurementList, compartment: Compartment, all: &[ChannelStats], label: u32) {
    let empty = RunningStats::new();
    for channel in all {
        let stats = channel.stats.get(label as usize).unwrap_or(&empty);
        put_intensity(list, compartment, &channel.name, stats);
    }
}

/// Boundary of one label in image coordinates; `None` when smoothing
/// leaves nothing
fn boundary(local: &Polygon, placement: &RegionPlacement, smooth: bool) -> Option<Polygon> {
    let local = if smooth {
        smooth_polygon(local)?
    } else {
        local.clone()
    };
    let image = placement.to_image(&local);
    (image.len() >= 3 && image.area() > 0.0).then_some(image)
}

/// Build the output objects
///
/// Objects are ordered by nucleus label. With `cells` present every
/// object is a cell; a nucleus whose cell has no boundary is dropped with
/// it.
pub fn assemble_objects(
    nuclei: &NucleusSegmentation,
    cells: Option<&CellExpansion>,
    channels: &ChannelSet,
    placement: &RegionPlacement,
    params: &DetectionParameters,
) -> DetectResult<Vec<DetectedObject>> {
    let measure = params.make_measurements;
    let nucleus_stats = if measure {
        measure_all(&channels.nucleus_channels, &nuclei.labels)?
    } else {
        Vec::new()
    };
    let (cell_stats, cytoplasm_stats) = match (measure, cells) {
        (true, Some(exp)) => (
            measure_all(&channels.cell_channels, &exp.cells)?,
            measure_all(&channels.cell_channels, &exp.cytoplasm)?,
        ),
        _ => (Vec::new(), Vec::new()),
    };
    let mut cell_borders: HashMap<u32, Polygon> = match cells {
        Some(exp) => get_outer_borders(&exp.cells).into_iter().collect(),
        None => HashMap::new(),
    };

    let mut objects = Vec::with_capacity(nuclei.kept.len());
    for (label, local) in get_outer_borders(&nuclei.labels) {
        let Some(nucleus_roi) = boundary(&local, placement, params.smooth_boundaries) else {
            log::warn!("dropping nucleus {label}: boundary vanished after smoothing");
            continue;
        };

        let mut measurements = MeasurementList::new();
        let nucleus_shape = ShapeMeasurements::of(&nucleus_roi.calibrated(&placement.calibration));
        if measure {
            nucleus_shape.put(&mut measurements, Compartment::Nucleus);
            put_all(&mut measurements, Compartment::Nucleus, &nucleus_stats, label);
        }

        if cells.is_none() {
            objects.push(DetectedObject {
                kind: ObjectKind::Nucleus,
                roi: nucleus_roi,
                nucleus: None,
                measurements,
                plane: params.plane,
            });
            continue;
        }

        let Some(cell_local) = cell_borders.remove(&label) else {
            log::debug!("dropping nucleus {label}: no cell pixels");
            continue;
        };
        let Some(cell_roi) = boundary(&cell_local, placement, params.smooth_boundaries) else {
            log::warn!("dropping cell {label}: boundary vanished after smoothing");
            continue;
        };

        let mut cell_measurements = if params.include_nuclei {
            measurements
        } else {
            MeasurementList::new()
        };
        if measure {
            let cell_shape = ShapeMeasurements::of(&cell_roi.calibrated(&placement.calibration));
            cell_shape.put(&mut cell_measurements, Compartment::Cell);
            put_all(&mut cell_measurements, Compartment::Cell, &cell_stats, label);
            put_all(
                &mut cell_measurements,
                Compartment::Cytoplasm,
                &cytoplasm_stats,
                label,
            );
            let ratio = if cell_shape.area > 0.0 {
                (nucleus_shape.area / cell_shape.area).clamp(0.0, 1.0)
            } else {
                f64::NAN
            };
            cell_measurements.put(AREA_RATIO, ratio);
        }

        objects.push(DetectedObject {
            kind: ObjectKind::Cell,
            roi: cell_roi,
            nucleus: params.include_nuclei.then_some(nucleus_roi),
            measurements: cell_measurements,
            plane: params.plane,
        });
    }
    Ok(objects)
}
