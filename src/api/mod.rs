mod axis_ticks;
mod draw_coordinator;
mod frame_builder;
mod interaction_controller;
mod json_contract;
mod marker_controller;
mod plot_snapshot;
mod series_projection;
mod snapshot_controller;
mod surface;
mod surface_config;
mod surface_init;
mod transition_controller;
mod zoom_controller;
mod zoom_factor_resolver;

pub use axis_ticks::{AxisPlacement, AxisTick, format_tick};
pub use draw_coordinator::DrawStatus;
pub use interaction_controller::{BrushOutcome, SelectionHit};
pub use json_contract::{PLOT_SNAPSHOT_JSON_SCHEMA_V1, PlotSnapshotJsonContractV1};
pub use plot_snapshot::{AxisSnapshot, PlotSnapshot, SeriesSnapshot};
pub use surface::PlotSurface;
pub use surface_config::PlotSurfaceConfig;
