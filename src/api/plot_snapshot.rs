use serde::{Deserialize, Serialize};

use crate::core::{Extent, PlotArea, SeriesKind, SeriesMeta, Viewport, XScale};
use crate::extensions::MarkerRange;
use crate::interaction::RulerState;

use super::{AxisPlacement, AxisTick, DrawStatus};

/// Serializable plot state used by host "export" actions and regression tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSnapshot {
    pub viewport: Viewport,
    pub plot_area: PlotArea,
    pub status: Option<DrawStatus>,
    /// Merged X extent after padding; empty before a successful draw.
    pub x_extent: Extent,
    pub x_scale: Option<XScale>,
    pub x_ticks: Vec<AxisTick>,
    pub axes: Vec<AxisSnapshot>,
    pub series: Vec<SeriesSnapshot>,
    pub markers: Vec<MarkerRange>,
    pub selected_log_range: Option<MarkerRange>,
    pub ruler: RulerState,
    pub zoomed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub axis_index: i32,
    pub placement: AxisPlacement,
    pub domain: (f64, f64),
    pub range: (f64, f64),
    /// Domain interval currently inside the plot height.
    pub visible_domain: (f64, f64),
    pub ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub index: usize,
    pub kind: SeriesKind,
    pub meta: SeriesMeta,
    pub x_extent: Extent,
    pub y_extent: Extent,
    pub group_count: usize,
    pub shape_count: usize,
}
