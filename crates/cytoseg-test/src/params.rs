//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use cytoseg_core::{FPix, LabelPix, Mask};
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Generate golden files
    Generate,
    /// Compare with expected values (default)
    #[default]
    Compare,
    /// Display mode - also write intermediate rasters for inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from environment variable or string
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "segment")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    /// Test mode (generate, compare, or display)
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "segment")
    ///
    /// # Returns
    ///
    /// A new `RegParams` instance configured based on the `REGTEST_MODE`
    /// environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        // NaN never compares equal, but NaN == NaN is a valid expectation
        if expected.is_nan() && actual.is_nan() {
            return true;
        }
        if diff > delta || diff.is_nan() {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Record a boolean condition as a comparison
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if condition {
            true
        } else {
            let msg = format!(
                "Failure in {}_reg: check for index {} - {}",
                self.test_name, self.index, what
            );
            self.fail(msg)
        }
    }

    /// Compare two float rasters pixel by pixel
    ///
    /// # Returns
    ///
    /// `true` if dimensions match and every pixel differs by at most
    /// `delta`, `false` otherwise.
    pub fn compare_fpix(&mut self, expected: &FPix, actual: &FPix, delta: f32) -> bool {
        self.index += 1;
        if expected.dimensions() != actual.dimensions() {
            let msg = format!(
                "Failure in {}_reg: fpix comparison for index {} - dimension mismatch",
                self.test_name, self.index
            );
            return self.fail(msg);
        }
        let w = expected.width() as usize;
        for (i, (&a, &b)) in expected.data().iter().zip(actual.data()).enumerate() {
            let same = (a.is_nan() && b.is_nan()) || a == b || (a - b).abs() <= delta;
            if !same {
                let msg = format!(
                    "Failure in {}_reg: fpix comparison for index {} - pixel mismatch at ({}, {}): {} vs {}",
                    self.test_name,
                    self.index,
                    i % w,
                    i / w,
                    a,
                    b
                );
                return self.fail(msg);
            }
        }
        true
    }

    /// Compare two masks for exact equality
    pub fn compare_masks(&mut self, expected: &Mask, actual: &Mask) -> bool {
        self.index += 1;
        if expected != actual {
            let msg = format!(
                "Failure in {}_reg: mask comparison for index {} - {} vs {} foreground pixels",
                self.test_name,
                self.index,
                expected.count(),
                actual.count()
            );
            return self.fail(msg);
        }
        true
    }

    /// Compare two label rasters for exact equality
    pub fn compare_labels(&mut self, expected: &LabelPix, actual: &LabelPix) -> bool {
        self.index += 1;
        if expected.dimensions() != actual.dimensions() {
            let msg = format!(
                "Failure in {}_reg: label comparison for index {} - dimension mismatch",
                self.test_name, self.index
            );
            return self.fail(msg);
        }
        let w = expected.width() as usize;
        if let Some(i) = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| a != b)
        {
            let msg = format!(
                "Failure in {}_reg: label comparison for index {} - label mismatch at ({}, {})",
                self.test_name,
                self.index,
                i % w,
                i / w
            );
            return self.fail(msg);
        }
        true
    }

    /// Write a float raster as an 8-bit PGM, scaled to its finite range
    ///
    /// Only writes in generate (into the golden directory) and display
    /// (into the regout directory) modes; compare mode is a no-op.
    pub fn write_fpix(&mut self, name: &str, fpix: &FPix) -> TestResult<()> {
        let dir = match self.mode {
            RegTestMode::Compare => return Ok(()),
            RegTestMode::Generate => golden_dir(),
            RegTestMode::Display => regout_dir(),
        };
        fs::create_dir_all(&dir)?;
        let path = format!("{}/{}.{}.pgm", dir, self.test_name, name);

        let (lo, hi) = fpix.finite_range().unwrap_or((0.0, 0.0));
        let scale = if hi > lo { 255.0 / (hi - lo) } else { 0.0 };
        let mut bytes = format!("P5\n{} {}\n255\n", fpix.width(), fpix.height()).into_bytes();
        bytes.extend(fpix.data().iter().map(|&v| {
            if v.is_finite() {
                ((v - lo) * scale).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        }));
        fs::write(&path, bytes).map_err(|e| TestError::RasterWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_env() {
        let mode = RegTestMode::from_env();
        assert!(matches!(
            mode,
            RegTestMode::Compare | RegTestMode::Generate | RegTestMode::Display
        ));
    }

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.compare_values(f64::NAN, f64::NAN, 0.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.compare_values(1.0, f64::NAN, 10.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 2);
    }

    #[test]
    fn test_compare_fpix_mismatch() {
        let mut rp = RegParams::new("test");
        let a = FPix::from_data(2, 1, vec![1.0, 2.0]).unwrap();
        let b = FPix::from_data(2, 1, vec![1.0, 2.5]).unwrap();
        assert!(rp.compare_fpix(&a, &b, 0.5));
        assert!(!rp.compare_fpix(&a, &b, 0.1));
    }

    #[test]
    fn test_compare_labels() {
        let mut rp = RegParams::new("test");
        let a = LabelPix::from_data(2, 1, vec![1, 0]).unwrap();
        let b = LabelPix::from_data(2, 1, vec![1, 2]).unwrap();
        assert!(rp.compare_labels(&a, &a));
        assert!(!rp.compare_labels(&a, &b));
        assert_eq!(rp.index(), 2);
    }
}
