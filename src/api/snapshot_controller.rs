use indexmap::IndexMap;

use crate::core::{Extent, Value};
use crate::error::{PlotError, PlotResult};
use crate::render::{Renderer, frame_to_svg};

use super::axis_ticks::{x_axis_ticks, y_axis_ticks};
use super::{AxisPlacement, AxisSnapshot, PlotSnapshot, PlotSurface, SeriesSnapshot};

impl<R: Renderer> PlotSurface<R> {
    /// Captures scales, axes, series extents and marker state.
    pub fn snapshot(&self) -> PlotResult<PlotSnapshot> {
        let area = self.plot_area;
        let series = self
            .series
            .iter()
            .enumerate()
            .map(|(index, series)| {
                Ok(SeriesSnapshot {
                    index,
                    kind: series.kind(),
                    meta: series.meta().clone(),
                    x_extent: series.x_extent()?,
                    y_extent: series.y_extent()?,
                    group_count: series.group_count(),
                    shape_count: series.shapes().len(),
                })
            })
            .collect::<PlotResult<Vec<_>>>()?;

        let (x_extent, x_scale, x_ticks, axes) = match self.draw_state.as_ref() {
            Some(state) => {
                let axes = state
                    .axes
                    .iter()
                    .map(|(axis_index, axis)| {
                        let placement = AxisPlacement::for_axis(
                            *axis_index,
                            area.width,
                            self.config.axis_offset_px,
                        );
                        Ok(AxisSnapshot {
                            axis_index: *axis_index,
                            placement,
                            domain: axis.extent,
                            range: axis.scale.range(),
                            visible_domain: axis.scale.visible_domain(0.0, area.height)?,
                            ticks: y_axis_ticks(axis.scale, area.height, self.config.tick_count),
                        })
                    })
                    .collect::<PlotResult<Vec<_>>>()?;
                (
                    state.x_extent.clone(),
                    Some(state.x_scale.clone()),
                    x_axis_ticks(&state.x_scale, area.width, self.config.tick_count),
                    axes,
                )
            }
            None => (Extent::Empty, None, Vec::new(), Vec::new()),
        };

        Ok(PlotSnapshot {
            viewport: self.config.viewport,
            plot_area: area,
            status: self.status.clone(),
            x_extent,
            x_scale,
            x_ticks,
            axes,
            series,
            markers: self.markers.clone(),
            selected_log_range: self.selected_range,
            ruler: self.interaction.ruler().clone(),
            zoomed: self.is_zoomed(),
        })
    }

    /// SVG markup of the current target frame.
    pub fn export_svg(&self) -> PlotResult<String> {
        self.current_frame
            .as_ref()
            .map(frame_to_svg)
            .ok_or(PlotError::NotDrawn)
    }

    /// Resolved channels of one series, pivoted by X.
    #[must_use]
    pub fn export_series_columns(&self, index: usize) -> Option<IndexMap<String, Vec<Value>>> {
        self.series.get(index).map(|series| series.export_columns())
    }
}
