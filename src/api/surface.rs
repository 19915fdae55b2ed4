use std::collections::BTreeMap;

use crate::core::{Extent, LinearScale, PlotArea, SeriesList, XScale};
use crate::extensions::{MarkerCallback, MarkerRange};
use crate::interaction::InteractionState;
use crate::render::{FrameTransition, RectPrimitive, RenderFrame, RenderLayer, Renderer};

use super::{DrawStatus, PlotSurfaceConfig};

/// Interactive multi-series plot bound to one viewport.
///
/// `PlotSurface` owns the shared X scale and one Y scale per axis index,
/// projects the retained shapes of its series, and turns pointer gestures into
/// zooms, marker ranges and selections. All rendering goes through `R`.
pub struct PlotSurface<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: PlotSurfaceConfig,
    pub(super) plot_area: PlotArea,
    pub(super) series: SeriesList,
    pub(super) status: Option<DrawStatus>,
    pub(super) draw_state: Option<DrawState>,
    pub(super) interaction: InteractionState,
    pub(super) marker_callback: Option<MarkerCallback>,
    pub(super) markers: Vec<MarkerRange>,
    pub(super) selected_range: Option<MarkerRange>,
    pub(super) transition: Option<ActiveTransition>,
    pub(super) current_frame: Option<RenderFrame>,
}

/// Scales and cached projections of the last completed draw pass.
#[derive(Debug, Clone)]
pub(super) struct DrawState {
    /// Merged X extent after padding.
    pub(super) x_extent: Extent,
    pub(super) x_scale: XScale,
    pub(super) axes: BTreeMap<i32, AxisState>,
    /// Projection of fixed series taken at draw time, by series index.
    pub(super) fixed: BTreeMap<usize, ProjectedSeries>,
    /// Clickable rectangles of the current frame, in drawing order.
    pub(super) hit_regions: Vec<HitRegion>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct AxisState {
    pub(super) extent: (f64, f64),
    pub(super) scale: LinearScale,
}

#[derive(Debug, Clone, Default)]
pub(super) struct ProjectedSeries {
    pub(super) layer: RenderLayer,
    pub(super) hits: Vec<HitRegion>,
}

/// Viewport rectangle drawn for one record of a selectable series.
#[derive(Debug, Clone, Copy)]
pub(super) struct HitRegion {
    pub(super) series_index: usize,
    pub(super) group_index: usize,
    pub(super) row_index: usize,
    pub(super) rect: RectPrimitive,
}

#[derive(Debug, Clone)]
pub(super) struct ActiveTransition {
    pub(super) transition: FrameTransition,
    pub(super) elapsed_ms: f64,
}
