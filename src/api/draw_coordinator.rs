use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{DrawContext, Extent, LinearScale, XScale};
use crate::error::{PlotError, PlotResult};
use crate::render::Renderer;

use super::series_projection::project_series;
use super::surface::{AxisState, DrawState};
use super::PlotSurface;

/// Outcome of a draw pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DrawStatus {
    Drawn,
    /// No scale could be built; the host should show an empty state.
    NothingToPlot(String),
}

impl DrawStatus {
    #[must_use]
    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn)
    }
}

impl<R: Renderer> PlotSurface<R> {
    /// Full pass: merges domains, rebuilds every scale, draws every series.
    ///
    /// Interaction state, the pending transition and zoom are reset. Marker
    /// ranges survive since they live in domain units.
    pub fn draw(&mut self) -> PlotResult<DrawStatus> {
        self.interaction.cancel();
        self.transition = None;

        let status = match self.build_draw_state()? {
            Ok(state) => {
                debug!(
                    series = self.series.len(),
                    axes = state.axes.len(),
                    "plot surface drawn"
                );
                self.draw_state = Some(state);
                DrawStatus::Drawn
            }
            Err(reason) => {
                warn!(reason = %reason, "nothing to plot");
                self.draw_state = None;
                DrawStatus::NothingToPlot(reason)
            }
        };
        self.status = Some(status.clone());
        self.refresh(None)?;
        Ok(status)
    }

    /// Outer error is a hard failure, inner error a "nothing to plot" reason.
    fn build_draw_state(&mut self) -> PlotResult<Result<DrawState, String>> {
        if self.series.is_empty() {
            return Ok(Err("no series to plot".to_owned()));
        }

        let raw_x = Extent::merge_all(
            self.series
                .iter()
                .map(|series| series.x_extent())
                .collect::<PlotResult<Vec<_>>>()?,
        )?;
        if let Some(reason) = raw_x.degeneracy() {
            return Ok(Err(format!("x {reason}")));
        }
        let x_extent = raw_x.padded_from_zero(self.config.x_padding);
        let x_scale = XScale::from_extent(&x_extent, (0.0, self.plot_area.width))?;

        let mut y_extents: BTreeMap<i32, Extent> = BTreeMap::new();
        for series in &self.series {
            let extent = series.y_extent()?;
            let slot = y_extents.entry(series.axis_index()).or_default();
            *slot = std::mem::take(slot).merge(extent)?;
        }

        let mut axes = BTreeMap::new();
        for (axis_index, extent) in y_extents {
            let (min, max) = y_bounds(axis_index, extent, self.config.y_padding)?;
            let scale = LinearScale::new((min, max), (self.plot_area.height, 0.0))?;
            axes.insert(
                axis_index,
                AxisState {
                    extent: (min, max),
                    scale,
                },
            );
        }

        let mut fixed = BTreeMap::new();
        for (series_index, series) in self.series.iter_mut().enumerate() {
            let Some(axis) = axes.get(&series.axis_index()) else {
                continue;
            };
            series.draw(&DrawContext {
                x_scale: &x_scale,
                y_scale: &axis.scale,
            })?;
            if series.is_fixed() {
                fixed.insert(
                    series_index,
                    project_series(
                        series_index,
                        series.as_ref(),
                        &x_scale,
                        &axis.scale,
                        self.plot_area,
                        self.config.tick_font_size_px,
                    ),
                );
            }
        }

        Ok(Ok(DrawState {
            x_extent,
            x_scale,
            axes,
            fixed,
            hit_regions: Vec::new(),
        }))
    }
}

/// Padded, zero-floored Y bounds that a linear scale can invert.
fn y_bounds(axis_index: i32, extent: Extent, padding: f64) -> PlotResult<(f64, f64)> {
    let extent = match extent {
        Extent::Empty => Extent::numeric(0.0, 0.0),
        Extent::Categorical(_) => {
            return Err(PlotError::InvalidData(format!(
                "y axis {axis_index} has a categorical domain"
            )));
        }
        numeric => numeric,
    };
    let (min, max) = extent
        .padded_from_zero(padding)
        .bounds()
        .unwrap_or((0.0, 1.0));
    if min < max {
        Ok((min, max))
    } else {
        Ok((min, min + 1.0))
    }
}
