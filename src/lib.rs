//! runscope: aggregation and interactive charting engine for streaming runs.
//!
//! Per-run records are grouped and reduced with [`core::Frame`] and
//! [`core::FrameGroup`], turned into accessor-bound series, and projected by a
//! [`api::PlotSurface`] that owns the shared scales and the interaction state.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod runs;
pub mod telemetry;

pub use api::{PlotSurface, PlotSurfaceConfig};
pub use error::{PlotError, PlotResult};
