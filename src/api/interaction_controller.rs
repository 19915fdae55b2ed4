use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::GroupKey;
use crate::error::{PlotError, PlotResult};
use crate::extensions::MarkerRange;
use crate::interaction::{BrushKind, InteractionMode, RulerState};
use crate::render::Renderer;

use super::PlotSurface;
use super::surface::HitRegion;

/// Record reported by a click on a selectable series.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionHit {
    pub series_index: usize,
    pub group: GroupKey,
    pub group_index: usize,
    pub row_index: usize,
}

/// Effect of releasing a brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushOutcome {
    Zoomed,
    Marked(MarkerRange),
    /// No brush was active, or it had no usable extent.
    Ignored,
}

impl<R: Renderer> PlotSurface<R> {
    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    #[must_use]
    pub fn ruler(&self) -> &RulerState {
        self.interaction.ruler()
    }

    /// Handles pointer movement in viewport pixels.
    ///
    /// Updates the active brush and the hover ruler. Before the first draw
    /// pass only the cursor is recorded.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> PlotResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(PlotError::InvalidData(
                "pointer position must be finite".to_owned(),
            ));
        }
        let (inner_x, inner_y) = self.plot_area.to_inner(x, y);
        let (clamped_x, clamped_y) = self.clamp_inner(inner_x, inner_y);
        self.interaction.on_pointer_move(clamped_x, clamped_y);

        let Some(state) = self.draw_state.as_ref() else {
            return Ok(());
        };
        if self.plot_area.contains_inner(inner_x, inner_y) {
            let value = state.x_scale.invert(inner_x);
            let label = value.map(|value| format!("{value:.*}", self.config.ruler_decimals));
            self.interaction.show_ruler(inner_x, value, label);
        } else {
            self.interaction.hide_ruler();
        }
        self.refresh_chrome()
    }

    pub fn pointer_leave(&mut self) -> PlotResult<()> {
        self.interaction.hide_ruler();
        if self.draw_state.is_none() {
            return Ok(());
        }
        self.refresh_chrome()
    }

    /// Arms a brush; the next `pointer_down` starts it.
    pub fn arm_brush(&mut self, kind: BrushKind) -> PlotResult<()> {
        self.require_drawn()?;
        self.interaction.arm(kind);
        Ok(())
    }

    /// Starts the armed brush. Returns false when no brush is armed.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> PlotResult<bool> {
        self.require_drawn()?;
        let (inner_x, inner_y) = self.plot_area.to_inner(x, y);
        let (inner_x, inner_y) = self.clamp_inner(inner_x, inner_y);
        if !self.interaction.begin_brush(inner_x, inner_y) {
            return Ok(false);
        }
        trace!(inner_x, inner_y, "brush started");
        self.refresh_chrome()?;
        Ok(true)
    }

    /// Finishes the active brush at `(x, y)` and applies it.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> PlotResult<BrushOutcome> {
        self.require_drawn()?;
        let (inner_x, inner_y) = self.plot_area.to_inner(x, y);
        let (inner_x, inner_y) = self.clamp_inner(inner_x, inner_y);
        self.interaction.on_pointer_move(inner_x, inner_y);
        let Some(brush) = self.interaction.finish_brush() else {
            return Ok(BrushOutcome::Ignored);
        };
        debug!(kind = ?brush.kind, "brush finished");

        let zoomed = |surface: &mut Self, x: Option<(f64, f64)>, y: Option<(f64, f64)>| {
            let before = surface.zoom_ranges();
            surface.zoom_axes(x, y)?;
            Ok::<_, PlotError>(if surface.zoom_ranges() == before {
                BrushOutcome::Ignored
            } else {
                BrushOutcome::Zoomed
            })
        };
        let x_span = (brush.anchor_x, brush.current_x);
        let y_span = (brush.anchor_y, brush.current_y);
        let outcome = match brush.kind {
            BrushKind::ZoomXY => zoomed(self, Some(x_span), Some(y_span))?,
            BrushKind::ZoomX => zoomed(self, Some(x_span), None)?,
            BrushKind::ZoomY => zoomed(self, None, Some(y_span))?,
            BrushKind::Marker => {
                let (x0, x1) = brush.x_extent();
                match self.apply_marker_brush(x0, x1)? {
                    Some(range) => BrushOutcome::Marked(range),
                    None => BrushOutcome::Ignored,
                }
            }
        };
        if outcome == BrushOutcome::Ignored {
            self.refresh_chrome()?;
        }
        Ok(outcome)
    }

    /// Drops the active or armed brush without applying it.
    pub fn cancel_brush(&mut self) -> PlotResult<()> {
        self.interaction.cancel();
        if self.draw_state.is_none() {
            return Ok(());
        }
        self.refresh_chrome()
    }

    /// Reports the topmost selectable rectangle under `(x, y)` to its series.
    pub fn click(&mut self, x: f64, y: f64) -> PlotResult<Option<SelectionHit>> {
        let Some(state) = self.draw_state.as_ref() else {
            return Err(PlotError::NotDrawn);
        };
        let candidates: SmallVec<[HitRegion; 4]> = state
            .hit_regions
            .iter()
            .rev()
            .filter(|region| region.rect.contains(x, y))
            .copied()
            .collect();
        for region in candidates {
            let Some(series) = self.series.get_mut(region.series_index) else {
                continue;
            };
            if let Some(group) = series.select(region.group_index, region.row_index) {
                debug!(
                    series_index = region.series_index,
                    group = %group,
                    row_index = region.row_index,
                    "record selected"
                );
                return Ok(Some(SelectionHit {
                    series_index: region.series_index,
                    group,
                    group_index: region.group_index,
                    row_index: region.row_index,
                }));
            }
        }
        Ok(None)
    }

    fn clamp_inner(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.clamp(0.0, self.plot_area.width),
            y.clamp(0.0, self.plot_area.height),
        )
    }

    fn zoom_ranges(&self) -> Vec<(f64, f64)> {
        self.draw_state
            .as_ref()
            .map(|state| {
                std::iter::once(state.x_scale.range())
                    .chain(state.axes.values().map(|axis| axis.scale.range()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
