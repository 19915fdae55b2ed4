use tracing::{debug, warn};

use crate::error::{PlotError, PlotResult};
use crate::extensions::MarkerRange;
use crate::render::Renderer;

use super::PlotSurface;

impl<R: Renderer> PlotSurface<R> {
    /// Registers the host hook called after every marker brush.
    pub fn set_marker_callback(&mut self, callback: impl FnMut(&[MarkerRange]) + 'static) {
        self.marker_callback = Some(Box::new(callback));
    }

    pub fn clear_marker_callback(&mut self) {
        self.marker_callback = None;
    }

    /// Marker ranges whose regions are drawn, oldest first.
    #[must_use]
    pub fn markers(&self) -> &[MarkerRange] {
        &self.markers
    }

    /// Last marker range, kept for log lookups after the region is cleared.
    #[must_use]
    pub fn selected_log_range(&self) -> Option<MarkerRange> {
        self.selected_range
    }

    /// Removes the drawn marker regions.
    pub fn clear_markers(&mut self) -> PlotResult<()> {
        self.markers.clear();
        if self.draw_state.is_none() {
            return Ok(());
        }
        self.refresh_chrome()
    }

    /// Marks the inner pixel interval `[x0, x1]` as if brushed.
    pub fn mark_range(&mut self, x0: f64, x1: f64) -> PlotResult<Option<MarkerRange>> {
        self.require_drawn()?;
        if !x0.is_finite() || !x1.is_finite() {
            return Err(PlotError::InvalidData(
                "marker pixels must be finite".to_owned(),
            ));
        }
        self.apply_marker_brush(x0, x1)
    }

    pub(super) fn apply_marker_brush(
        &mut self,
        x0: f64,
        x1: f64,
    ) -> PlotResult<Option<MarkerRange>> {
        let Some(state) = self.draw_state.as_ref() else {
            return Err(PlotError::NotDrawn);
        };
        let Some(range) = MarkerRange::from_pixels(&state.x_scale, x0, x1)? else {
            warn!("marker brush needs a continuous x scale");
            return Ok(None);
        };
        debug!(start = range.start, end = range.end, "marker range selected");
        self.markers.push(range);
        self.selected_range = Some(range);
        if let Some(callback) = self.marker_callback.as_mut() {
            callback(&[range]);
        }
        self.refresh_chrome()?;
        Ok(Some(range))
    }
}
