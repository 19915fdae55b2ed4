//! Add-ons layered over the plot surface.

pub mod markers;

pub use markers::{MARKER_REGION_COLOR, MarkerCallback, MarkerRange, project_marker_regions};
