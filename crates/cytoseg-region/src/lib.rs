//! cytoseg-region - Region processing for cytoseg
//!
//! This crate provides region processing functionality including:
//!
//! - **Connected component analysis** - Finding and labeling connected regions
//! - **Seed fill operations** - Hole filling and grayscale reconstruction
//! - **Distance transform** - Exact Euclidean distance of mask pixels
//! - **Watershed segmentation** - Regional maxima and marker flooding
//! - **Border tracing** - Pixel-exact outer borders of labels as polygons
//!
//! # Examples
//!
//! ## Finding connected components
//!
//! ```
//! use cytoseg_core::Mask;
//! use cytoseg_region::{ConnectivityType, find_connected_components};
//!
//! let mut mask = Mask::new(100, 100).unwrap();
//! mask.set(10, 10, true).unwrap();
//! mask.set(11, 10, true).unwrap();
//! mask.set(50, 50, true).unwrap();
//!
//! let components = find_connected_components(&mask, ConnectivityType::FourWay).unwrap();
//! assert_eq!(components.len(), 2);
//! ```
//!
//! ## Watershed segmentation
//!
//! ```
//! use cytoseg_core::FPix;
//! use cytoseg_region::{WatershedOptions, find_regional_maxima, marker_watershed};
//!
//! let surface = FPix::from_data(5, 1, vec![5.0, 4.0, 1.0, 4.0, 6.0]).unwrap();
//! let markers = find_regional_maxima(&surface, None, 0.5).unwrap();
//! let basins = marker_watershed(&surface, &markers, None, &WatershedOptions::new()).unwrap();
//! assert_eq!(basins.max_label(), 2);
//! ```

pub mod ccbord;
pub mod conncomp;
pub mod error;
pub mod label;
pub mod seedfill;
pub mod watershed;

// Re-export core types
pub use cytoseg_core;

// Re-export error types
pub use error::{RegionError, RegionResult};

// Re-export conncomp types and functions
pub use conncomp::{
    ConnectedComponent, ConnectivityType, find_connected_components, label_connected_components,
};

// Re-export label types and functions
pub use label::{
    ComponentStats, get_component_bounds_from_labels, get_component_sizes, get_component_stats,
    label_means,
};

// Re-export seedfill types and functions
pub use seedfill::{BoundaryCondition, distance_function, fill_holes, seedfill_gray};

// Re-export watershed types and functions
pub use watershed::{WatershedOptions, find_regional_maxima, marker_watershed, split_by_distance};

// Re-export ccbord functions
pub use ccbord::{get_outer_border, get_outer_borders};
