//! cytoseg-test - Regression test framework for cytoseg
//!
//! Regression tests run in one of three modes:
//!
//! - **Generate**: write outputs into the golden directory
//! - **Compare**: compare computed values against expectations (default)
//! - **Display**: also dump intermediate rasters as PGM files for viewing
//!
//! # Usage
//!
//! ```ignore
//! use cytoseg_test::{RegParams, synth};
//!
//! let mut rp = RegParams::new("segment");
//! rp.compare_values(2.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // cytoseg-test is at crates/cytoseg-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
