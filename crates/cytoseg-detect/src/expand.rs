//! Cell expansion
//!
//! Nuclei grow into cells by flooding the negated distance to the nearest
//! nucleus, seeded with the nucleus labels. Growth stops at the expansion
//! distance or where two cells meet.

use crate::error::DetectResult;
use cytoseg_core::LabelPix;
use cytoseg_region::{BoundaryCondition, WatershedOptions, distance_function, marker_watershed};

/// Cell and cytoplasm labels; each cell keeps its nucleus label
#[derive(Debug, Clone)]
pub struct CellExpansion {
    pub cells: LabelPix,
    /// Cells with nucleus pixels removed
    pub cytoplasm: LabelPix,
}

/// Grow `nuclei` by up to `expansion` pixels
///
/// Returns `None` when `expansion <= 0`.
pub fn expand_cells(nuclei: &LabelPix, expansion: f64) -> DetectResult<Option<CellExpansion>> {
    if !(expansion > 0.0) {
        return Ok(None);
    }
    let nucleus_mask = nuclei.to_mask();
    if nucleus_mask.is_clear() {
        return Ok(Some(CellExpansion {
            cells: nuclei.clone(),
            cytoplasm: nuclei.clone(),
        }));
    }

    let mut outside = nucleus_mask.clone();
    outside.invert();
    let mut surface = distance_function(&outside, BoundaryCondition::Foreground)?;
    surface.mul_constant(-1.0);

    let options = WatershedOptions::new().with_threshold(-(expansion as f32));
    let cells = marker_watershed(&surface, nuclei, None, &options)?;

    let mut cytoplasm = cells.clone();
    cytoplasm.clear_where(&nucleus_mask)?;
    Ok(Some(CellExpansion { cells, cytoplasm }))
}
