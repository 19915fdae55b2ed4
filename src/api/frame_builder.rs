use crate::error::PlotResult;
use crate::extensions::project_marker_regions;
use crate::interaction::BrushKind;
use crate::render::{
    Color, FrameTransition, LinePrimitive, RectPrimitive, RenderFrame, RenderLayer, Renderer,
    TextHAlign, TextPrimitive,
};

use super::PlotSurface;
use super::axis_ticks::{
    AxisLayerInput, AxisPlacement, build_axis_layer, x_axis_ticks, y_axis_ticks,
};
use super::series_projection::project_series;
use super::surface::{ActiveTransition, DrawState};

const BRUSH_COLOR: Color = Color::rgba(0.4, 0.4, 0.4, 0.15);
const RULER_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.5);
const RULER_STROKE_WIDTH: f64 = 1.0;
const RULER_INSET_PX: f64 = 2.0;

impl<R: Renderer> PlotSurface<R> {
    /// Rebuilds the target frame and renders it.
    ///
    /// With `animate_from`, a transition from that frame to the new target is
    /// started and its first step is rendered instead.
    pub(super) fn refresh(&mut self, animate_from: Option<RenderFrame>) -> PlotResult<()> {
        let target = self.compose_frame();
        if let Some(from) = animate_from {
            self.transition = (self.config.transition_ms > 0.0).then(|| ActiveTransition {
                transition: FrameTransition::new(from, target.clone(), self.config.transition_ms),
                elapsed_ms: 0.0,
            });
        }
        let shown = self.displayed_frame(&target);
        self.renderer.render(&shown)?;
        self.current_frame = Some(target);
        Ok(())
    }

    /// Re-renders with a rebuilt chrome layer over the retained plot layer.
    ///
    /// Series are not re-projected, so hit regions stay as last drawn.
    pub(super) fn refresh_chrome(&mut self) -> PlotResult<()> {
        let Some(mut target) = self.current_frame.take() else {
            return self.refresh(None);
        };
        target.chrome = self.compose_chrome();
        let shown = self.displayed_frame(&target);
        let rendered = self.renderer.render(&shown);
        self.current_frame = Some(target);
        rendered
    }

    /// Frame on screen: the transition step when one runs, with live chrome.
    pub(super) fn displayed_frame(&self, target: &RenderFrame) -> RenderFrame {
        match &self.transition {
            Some(active) => {
                let mut frame = active.transition.frame_at(active.elapsed_ms);
                frame.chrome = target.chrome.clone();
                frame
            }
            None => target.clone(),
        }
    }

    fn compose_frame(&mut self) -> RenderFrame {
        let area = self.plot_area;
        let mut frame = RenderFrame::new(self.config.viewport, area);
        let Some(state) = self.draw_state.as_mut() else {
            return frame;
        };

        let mut hits = Vec::new();
        for (series_index, series) in self.series.iter().enumerate() {
            let projected = match state.fixed.get(&series_index) {
                Some(fixed) => fixed.clone(),
                None => {
                    let Some(axis) = state.axes.get(&series.axis_index()) else {
                        continue;
                    };
                    project_series(
                        series_index,
                        series.as_ref(),
                        &state.x_scale,
                        &axis.scale,
                        area,
                        self.config.tick_font_size_px,
                    )
                }
            };
            frame.plot.extend(projected.layer);
            hits.extend(projected.hits);
        }
        state.hit_regions = hits;
        frame.chrome = self.compose_chrome();
        frame
    }

    /// Markers, brush overlay, axes and ruler over the current scales.
    fn compose_chrome(&self) -> RenderLayer {
        let area = self.plot_area;
        let mut chrome = RenderLayer::default();
        let Some(state) = self.draw_state.as_ref() else {
            return chrome;
        };

        chrome.rects.extend(project_marker_regions(
            &self.markers,
            &state.x_scale,
            area,
        ));
        if let Some(brush) = self.interaction.brush() {
            let (x0, x1) = match brush.kind {
                BrushKind::ZoomY => (0.0, area.width),
                _ => brush.x_extent(),
            };
            let (y0, y1) = if brush.kind.brushes_y() {
                brush.y_extent()
            } else {
                (0.0, area.height)
            };
            chrome.rects.push(RectPrimitive::new(
                area.left + x0,
                area.top + y0,
                x1 - x0,
                y1 - y0,
                BRUSH_COLOR,
            ));
        }

        chrome.extend(self.axis_layer(state));
        chrome.extend(self.ruler_layer());
        chrome
    }

    fn axis_layer(&self, state: &DrawState) -> RenderLayer {
        let area = self.plot_area;
        let x_ticks = x_axis_ticks(&state.x_scale, area.width, self.config.tick_count);
        let x_label = self
            .series
            .iter()
            .find_map(|series| series.meta().x_label.as_deref());
        let y_axes: Vec<_> = state
            .axes
            .iter()
            .map(|(axis_index, axis)| {
                let placement =
                    AxisPlacement::for_axis(*axis_index, area.width, self.config.axis_offset_px);
                let ticks = match placement {
                    AxisPlacement::Hidden => Vec::new(),
                    _ => y_axis_ticks(axis.scale, area.height, self.config.tick_count),
                };
                let label = self
                    .series
                    .iter()
                    .filter(|series| series.axis_index() == *axis_index)
                    .find_map(|series| series.meta().y_label.clone());
                (placement, ticks, label)
            })
            .collect();
        build_axis_layer(
            &AxisLayerInput {
                x_ticks: &x_ticks,
                x_label,
                y_axes: &y_axes,
            },
            area,
            &self.config,
        )
    }

    fn ruler_layer(&self) -> RenderLayer {
        let mut layer = RenderLayer::default();
        let ruler = self.interaction.ruler();
        if !ruler.visible {
            return layer;
        }
        let area = self.plot_area;
        let x = area.left + ruler.x - RULER_INSET_PX;
        let bottom = area.top + area.height + self.config.ruler_overhang_px;
        layer.lines.push(LinePrimitive::new(
            x,
            area.top,
            x,
            bottom,
            RULER_STROKE_WIDTH,
            RULER_COLOR,
        ));
        if let Some(label) = ruler.label.as_deref().filter(|label| !label.is_empty()) {
            layer.texts.push(TextPrimitive::new(
                label,
                x,
                bottom + self.config.tick_font_size_px,
                self.config.tick_font_size_px,
                RULER_COLOR,
                TextHAlign::Center,
            ));
        }
        layer
    }
}
