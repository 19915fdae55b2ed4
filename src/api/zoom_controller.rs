use tracing::debug;

use crate::error::{PlotError, PlotResult};
use crate::render::Renderer;

use super::PlotSurface;
use super::zoom_factor_resolver::{remap_range, resolve_wheel_zoom_factor, scale_range_around};

impl<R: Renderer> PlotSurface<R> {
    /// Zooms so the inner pixel rectangle `[x0, x1] x [y0, y1]` fills the plot.
    ///
    /// Only scale ranges change. Non-fixed series move to their new position
    /// through a transition.
    pub fn zoom_to_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> PlotResult<()> {
        self.zoom_axes(Some((x0, x1)), Some((y0, y1)))
    }

    /// Zooms the X range only so `[x0, x1]` fills the plot width.
    pub fn zoom_x(&mut self, x0: f64, x1: f64) -> PlotResult<()> {
        self.zoom_axes(Some((x0, x1)), None)
    }

    /// Zooms every Y range only so `[y0, y1]` fills the plot height.
    pub fn zoom_y(&mut self, y0: f64, y1: f64) -> PlotResult<()> {
        self.zoom_axes(None, Some((y0, y1)))
    }

    pub(super) fn zoom_axes(
        &mut self,
        x: Option<(f64, f64)>,
        y: Option<(f64, f64)>,
    ) -> PlotResult<()> {
        self.require_drawn()?;
        for (a, b) in x.iter().chain(y.iter()) {
            if !a.is_finite() || !b.is_finite() {
                return Err(PlotError::InvalidData(
                    "zoom rectangle must be finite".to_owned(),
                ));
            }
        }
        let x = x.map(|(a, b)| (a.min(b), a.max(b)));
        let y = y.map(|(a, b)| (a.min(b), a.max(b)));
        if x.is_some_and(|(a, b)| a == b) || y.is_some_and(|(a, b)| a == b) {
            debug!("zoom rectangle has no area, ignored");
            return Ok(());
        }

        let width = self.plot_area.width;
        let height = self.plot_area.height;
        let Some(state) = self.draw_state.as_mut() else {
            return Err(PlotError::NotDrawn);
        };
        if let Some((x0, x1)) = x {
            let range = remap_range(state.x_scale.range(), x0, x1, width);
            state.x_scale.set_range(range)?;
        }
        if let Some((y0, y1)) = y {
            for axis in state.axes.values_mut() {
                let range = remap_range(axis.scale.range(), y0, y1, height);
                axis.scale.set_range(range)?;
            }
        }
        debug!(x = ?x, y = ?y, "zoomed to rectangle");
        self.refresh_animated()
    }

    /// Restores X to `[0, width]` and every Y range to `[height, 0]`.
    pub fn reset_zoom(&mut self) -> PlotResult<()> {
        let width = self.plot_area.width;
        let height = self.plot_area.height;
        let Some(state) = self.draw_state.as_mut() else {
            return Err(PlotError::NotDrawn);
        };
        state.x_scale.set_range((0.0, width))?;
        for axis in state.axes.values_mut() {
            axis.scale.set_range((height, 0.0))?;
        }
        debug!("zoom reset");
        self.refresh_animated()
    }

    /// Cursor-centered zoom.
    ///
    /// Conventions:
    /// - `wheel_delta < 0` zooms in by `wheel_zoom_in_factor`
    /// - `wheel_delta > 0` zooms out by `wheel_zoom_out_factor`
    /// - `(x, y)` are viewport pixels
    ///
    /// Returns the applied factor, `None` for a zero delta.
    pub fn wheel_zoom(&mut self, wheel_delta: f64, x: f64, y: f64) -> PlotResult<Option<f64>> {
        self.require_drawn()?;
        let Some(factor) = resolve_wheel_zoom_factor(
            wheel_delta,
            self.config.wheel_zoom_in_factor,
            self.config.wheel_zoom_out_factor,
        )?
        else {
            return Ok(None);
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(PlotError::InvalidData(
                "wheel anchor must be finite".to_owned(),
            ));
        }
        let (anchor_x, anchor_y) = self.plot_area.to_inner(x, y);
        let Some(state) = self.draw_state.as_mut() else {
            return Err(PlotError::NotDrawn);
        };
        let range = scale_range_around(state.x_scale.range(), anchor_x, factor);
        state.x_scale.set_range(range)?;
        for axis in state.axes.values_mut() {
            let range = scale_range_around(axis.scale.range(), anchor_y, factor);
            axis.scale.set_range(range)?;
        }
        debug!(factor, anchor_x, anchor_y, "wheel zoom");
        self.refresh_animated()?;
        Ok(Some(factor))
    }

    /// Whether any scale range differs from its unzoomed pixel extent.
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        let Some(state) = self.draw_state.as_ref() else {
            return false;
        };
        state.x_scale.range() != (0.0, self.plot_area.width)
            || state
                .axes
                .values()
                .any(|axis| axis.scale.range() != (self.plot_area.height, 0.0))
    }

    fn refresh_animated(&mut self) -> PlotResult<()> {
        let from = self
            .transition
            .as_ref()
            .zip(self.current_frame.as_ref())
            .map(|(_, target)| self.displayed_frame(target))
            .or_else(|| self.current_frame.clone());
        self.refresh(from)
    }
}
