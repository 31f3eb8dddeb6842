//! Detected objects
//!
//! An object is plain composition: a boundary, an optional paired nucleus
//! boundary, a measurement list and the plane it came from. A cell owns the
//! only measurement list of the pair; the nucleus is reached through a
//! read-only [`NucleusView`] that borrows it.

use crate::params::ImagePlane;
use cytoseg_core::Polygon;

/// Insertion-ordered name to value list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementList {
    entries: Vec<(String, f64)>,
}

impl MeasurementList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a measurement, replacing an existing value in place
    pub fn put(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

/// What an object represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Nucleus,
    Cell,
}

/// A nucleus or cell in full-resolution image coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub kind: ObjectKind,
    /// Outer boundary
    pub roi: Polygon,
    /// Paired nucleus boundary of a cell
    pub nucleus: Option<Polygon>,
    pub measurements: MeasurementList,
    pub plane: ImagePlane,
}

/// Read-only projection of a cell's nucleus
#[derive(Debug, Clone, Copy)]
pub struct NucleusView<'a> {
    pub roi: &'a Polygon,
    /// The cell's list; nucleus and cell measurements share it
    pub measurements: &'a MeasurementList,
}

impl DetectedObject {
    pub fn is_cell(&self) -> bool {
        self.kind == ObjectKind::Cell
    }

    /// The nucleus of this object
    ///
    /// A nucleus object is its own nucleus; a cell yields its paired
    /// nucleus, if it has one.
    pub fn nucleus_view(&self) -> Option<NucleusView<'_>> {
        match self.kind {
            ObjectKind::Nucleus => Some(NucleusView {
                roi: &self.roi,
                measurements: &self.measurements,
            }),
            ObjectKind::Cell => self.nucleus.as_ref().map(|roi| NucleusView {
                roi,
                measurements: &self.measurements,
            }),
        }
    }
}
