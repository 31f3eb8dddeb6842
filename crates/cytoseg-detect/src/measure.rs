//! Per-label intensity statistics
//!
//! One streaming pass over a (channel, label) pair accumulates
//! [`RunningStats`] for every label; the final statistics are derived
//! afterwards.

use std::fmt;

use crate::error::{DetectError, DetectResult};
use crate::object::MeasurementList;
use cytoseg_core::{FPix, LabelPix};

/// Incremental accumulator for one label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        let n = self.count as f64;
        let variance = (self.sum_sq - self.sum * self.mean()) / n;
        variance.max(0.0).sqrt()
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.min }
    }

    pub fn max(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.max }
    }

    pub fn range(&self) -> f64 {
        self.max() - self.min()
    }

    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Mean => self.mean(),
            Statistic::Sum => {
                if self.count == 0 {
                    f64::NAN
                } else {
                    self.sum
                }
            }
            Statistic::StdDev => self.std_dev(),
            Statistic::Max => self.max(),
            Statistic::Min => self.min(),
            Statistic::Range => self.range(),
        }
    }
}

/// Statistic reported per channel and compartment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    Sum,
    StdDev,
    Max,
    Min,
    Range,
}

impl Statistic {
    /// Every statistic, in reporting order
    pub const ALL: [Statistic; 6] = [
        Statistic::Mean,
        Statistic::Sum,
        Statistic::StdDev,
        Statistic::Max,
        Statistic::Min,
        Statistic::Range,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Sum => "sum",
            Statistic::StdDev => "std dev",
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::Range => "range",
        }
    }
}

/// Part of a cell a measurement refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compartment {
    Nucleus,
    Cell,
    Cytoplasm,
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compartment::Nucleus => "Nucleus",
            Compartment::Cell => "Cell",
            Compartment::Cytoplasm => "Cytoplasm",
        };
        f.write_str(name)
    }
}

/// Name of the nucleus to cell area ratio measurement
pub const AREA_RATIO: &str = "Nucleus/Cell area ratio";

/// `"<Compartment>: <channel> <statistic>"`
pub fn intensity_name(compartment: Compartment, channel: &str, statistic: Statistic) -> String {
    format!("{compartment}: {channel} {}", statistic.name())
}

/// Accumulate statistics for every label of `labels` over `values`
///
/// The returned vector is indexed by label and has `max_label + 1`
/// entries; index 0 (background) is never updated.
///
/// # Errors
///
/// Returns [`DetectError::InvalidInput`] if the rasters differ in size.
pub fn measure_labels(values: &FPix, labels: &LabelPix) -> DetectResult<Vec<RunningStats>> {
    if values.dimensions() != labels.dimensions() {
        return Err(DetectError::InvalidInput(format!(
            "channel {:?} does not match labels {:?}",
            values.dimensions(),
            labels.dimensions()
        )));
    }
    let mut stats = vec![RunningStats::new(); labels.max_label() as usize + 1];
    for (&label, &v) in labels.data().iter().zip(values.data()) {
        if label != 0 {
            stats[label as usize].add(v as f64);
        }
    }
    Ok(stats)
}

/// Append every statistic of `stats` to `list`
pub fn put_intensity(
    list: &mut MeasurementList,
    compartment: Compartment,
    channel: &str,
    stats: &RunningStats,
) {
    for statistic in Statistic::ALL {
        list.put(
            intensity_name(compartment, channel, statistic),
            stats.get(statistic),
        );
    }
}
