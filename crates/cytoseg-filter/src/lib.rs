//! cytoseg-filter - Float raster filtering
//!
//! This crate provides the linear and rank filters used by nucleus
//! detection:
//!
//! - Convolution with arbitrary and separable kernels
//! - Gaussian blur
//! - Laplacian and Laplacian-of-Gaussian edge enhancement
//! - Rank filtering over circular windows (median, min, max)
//!
//! All filters operate on [`FPix`](cytoseg_core::FPix) and use replicate
//! (clamp) border handling.

pub mod convolve;
pub mod edge;
mod error;
pub mod kernel;
pub mod rank;

pub use error::{FilterError, FilterResult};
pub use kernel::Kernel;

// Re-export commonly used functions
pub use convolve::{fpix_convolve, fpix_convolve_sep, gaussian_blur};
pub use edge::{laplacian, laplacian_of_gaussian};
pub use rank::{CircularWindow, max_filter, median_filter, min_filter, rank_filter};
