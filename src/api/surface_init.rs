use tracing::debug;

use crate::core::{LinearScale, PlotArea, Series, SeriesList, Viewport, XScale};
use crate::error::{PlotError, PlotResult};
use crate::interaction::InteractionState;
use crate::render::Renderer;

use super::{DrawStatus, PlotSurface, PlotSurfaceConfig};

impl<R: Renderer> PlotSurface<R> {
    pub fn new(renderer: R, config: PlotSurfaceConfig) -> PlotResult<Self> {
        let config = config.validate()?;
        let plot_area = PlotArea::from_viewport(config.viewport, config.margins)?;
        Ok(Self {
            renderer,
            config,
            plot_area,
            series: SeriesList::new(),
            status: None,
            draw_state: None,
            interaction: InteractionState::default(),
            marker_callback: None,
            markers: Vec::new(),
            selected_range: None,
            transition: None,
            current_frame: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> PlotSurfaceConfig {
        self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    #[must_use]
    pub fn plot_area(&self) -> PlotArea {
        self.plot_area
    }

    /// Outcome of the last draw pass, `None` before the first one.
    #[must_use]
    pub fn status(&self) -> Option<&DrawStatus> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn is_drawn(&self) -> bool {
        self.draw_state.is_some()
    }

    #[must_use]
    pub fn series(&self) -> &[Box<dyn Series>] {
        &self.series
    }

    /// Series list the `FrameGroup::plot_*` builders append to.
    ///
    /// Changes take effect on the next [`PlotSurface::draw`].
    pub fn series_list_mut(&mut self) -> &mut SeriesList {
        &mut self.series
    }

    pub fn set_series(&mut self, series: SeriesList) {
        self.series = series;
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    /// Shared X scale of the last completed draw pass.
    #[must_use]
    pub fn x_scale(&self) -> Option<&XScale> {
        self.draw_state.as_ref().map(|state| &state.x_scale)
    }

    /// Y scale bound to `axis_index` in the last completed draw pass.
    #[must_use]
    pub fn y_scale(&self, axis_index: i32) -> Option<LinearScale> {
        self.draw_state
            .as_ref()
            .and_then(|state| state.axes.get(&axis_index))
            .map(|axis| axis.scale)
    }

    /// Axis indices in use, ascending.
    #[must_use]
    pub fn axis_indices(&self) -> Vec<i32> {
        self.draw_state
            .as_ref()
            .map(|state| state.axes.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Applies a new viewport and redraws when a draw pass already happened.
    pub fn resize(&mut self, viewport: Viewport) -> PlotResult<()> {
        let config = PlotSurfaceConfig {
            viewport,
            ..self.config
        }
        .validate()?;
        let plot_area = PlotArea::from_viewport(viewport, config.margins)?;
        debug!(width = viewport.width, height = viewport.height, "plot surface resized");
        self.config = config;
        self.plot_area = plot_area;
        if self.status.is_some() {
            self.draw()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub(super) fn require_drawn(&self) -> PlotResult<()> {
        if self.draw_state.is_none() {
            return Err(PlotError::NotDrawn);
        }
        Ok(())
    }
}
