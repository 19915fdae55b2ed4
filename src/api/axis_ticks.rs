use serde::{Deserialize, Serialize};

use crate::core::ticks::{axis_tick_count, nice_ticks};
use crate::core::{LinearScale, PlotArea, XScale};
use crate::render::{Color, LinePrimitive, RenderLayer, TextHAlign, TextPrimitive};

use super::PlotSurfaceConfig;

const AXIS_COLOR: Color = Color::rgb(0.0, 0.0, 0.0);
const AXIS_STROKE_WIDTH: f64 = 1.0;
const LABEL_GAP_PX: f64 = 3.0;
const AXIS_TITLE_GAP_PX: f64 = 36.0;

/// Where the axis of a Y scale is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "side", content = "x_px", rename_all = "snake_case")]
pub enum AxisPlacement {
    Left,
    /// Right-side axis at this inner X position.
    Right(f64),
    /// Own scale, no rendered axis.
    Hidden,
}

impl AxisPlacement {
    /// Axis 0 on the left, `k > 0` stacked outwards on the right.
    #[must_use]
    pub fn for_axis(axis_index: i32, inner_width: f64, axis_offset_px: f64) -> Self {
        match axis_index {
            0 => Self::Left,
            k if k > 0 => Self::Right(inner_width + f64::from(k - 1) * axis_offset_px),
            _ => Self::Hidden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Pixel position along the axis, in inner plot coordinates.
    pub position_px: f64,
    pub label: String,
}

/// Ticks over the part of the X domain visible in `[0, width]`.
pub(super) fn x_axis_ticks(x_scale: &XScale, width: f64, default_count: usize) -> Vec<AxisTick> {
    match x_scale {
        XScale::Linear(scale) => linear_ticks(*scale, 0.0, width, default_count),
        XScale::Band(scale) => {
            let half = scale.step() / 2.0;
            scale
                .categories()
                .iter()
                .filter_map(|category| {
                    let position_px = scale.position(category)? + half;
                    (0.0..=width).contains(&position_px).then(|| AxisTick {
                        position_px,
                        label: category.clone(),
                    })
                })
                .collect()
        }
    }
}

/// Ticks over the part of the Y domain visible in `[0, height]`.
pub(super) fn y_axis_ticks(scale: LinearScale, height: f64, default_count: usize) -> Vec<AxisTick> {
    linear_ticks(scale, 0.0, height, default_count)
}

fn linear_ticks(scale: LinearScale, from_px: f64, to_px: f64, default_count: usize) -> Vec<AxisTick> {
    let Ok((low, high)) = scale.visible_domain(from_px, to_px) else {
        return Vec::new();
    };
    let count = axis_tick_count(low, high, default_count);
    nice_ticks(low, high, count)
        .into_iter()
        .filter_map(|value| {
            let position_px = scale.to_pixel(value).ok()?;
            Some(AxisTick {
                position_px,
                label: format_tick(value),
            })
        })
        .collect()
}

/// Shortest decimal rendering of a tick value.
#[must_use]
pub fn format_tick(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let text = format!("{value:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

pub(super) struct AxisLayerInput<'a> {
    pub(super) x_ticks: &'a [AxisTick],
    pub(super) x_label: Option<&'a str>,
    pub(super) y_axes: &'a [(AxisPlacement, Vec<AxisTick>, Option<String>)],
}

/// Axis lines, tick marks and labels in viewport pixels.
pub(super) fn build_axis_layer(
    input: &AxisLayerInput<'_>,
    area: PlotArea,
    config: &PlotSurfaceConfig,
) -> RenderLayer {
    let mut layer = RenderLayer::default();
    let tick = config.tick_size_px;
    let font = config.tick_font_size_px;
    let bottom = area.top + area.height;

    layer.lines.push(LinePrimitive::new(
        area.left,
        bottom,
        area.left + area.width,
        bottom,
        AXIS_STROKE_WIDTH,
        AXIS_COLOR,
    ));
    for x_tick in input.x_ticks {
        let x = area.left + x_tick.position_px;
        layer.lines.push(LinePrimitive::new(
            x,
            bottom,
            x,
            bottom + tick,
            AXIS_STROKE_WIDTH,
            AXIS_COLOR,
        ));
        layer.texts.push(TextPrimitive::new(
            x_tick.label.clone(),
            x,
            bottom + tick + LABEL_GAP_PX + font,
            font,
            AXIS_COLOR,
            TextHAlign::Center,
        ));
    }
    if let Some(label) = input.x_label.filter(|label| !label.is_empty()) {
        layer.texts.push(TextPrimitive::new(
            label,
            area.left + area.width / 2.0,
            bottom + AXIS_TITLE_GAP_PX,
            font,
            AXIS_COLOR,
            TextHAlign::Center,
        ));
    }

    for (placement, ticks, label) in input.y_axes {
        let (axis_x, direction, align) = match placement {
            AxisPlacement::Left => (area.left, -1.0, TextHAlign::Right),
            AxisPlacement::Right(x) => (area.left + x, 1.0, TextHAlign::Left),
            AxisPlacement::Hidden => continue,
        };
        layer.lines.push(LinePrimitive::new(
            axis_x,
            area.top,
            axis_x,
            bottom,
            AXIS_STROKE_WIDTH,
            AXIS_COLOR,
        ));
        for y_tick in ticks {
            let y = area.top + y_tick.position_px;
            layer.lines.push(LinePrimitive::new(
                axis_x,
                y,
                axis_x + direction * tick,
                y,
                AXIS_STROKE_WIDTH,
                AXIS_COLOR,
            ));
            layer.texts.push(TextPrimitive::new(
                y_tick.label.clone(),
                axis_x + direction * (tick + LABEL_GAP_PX),
                y + font / 3.0,
                font,
                AXIS_COLOR,
                align,
            ));
        }
        if let Some(label) = label.as_deref().filter(|label| !label.is_empty()) {
            layer.texts.push(TextPrimitive::new(
                label,
                axis_x,
                area.top - font,
                font,
                AXIS_COLOR,
                TextHAlign::Center,
            ));
        }
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::{AxisPlacement, format_tick};

    #[test]
    fn axes_stack_outwards_on_the_right() {
        assert_eq!(AxisPlacement::for_axis(0, 500.0, 20.0), AxisPlacement::Left);
        assert_eq!(AxisPlacement::for_axis(1, 500.0, 20.0), AxisPlacement::Right(500.0));
        assert_eq!(AxisPlacement::for_axis(3, 500.0, 20.0), AxisPlacement::Right(540.0));
        assert_eq!(AxisPlacement::for_axis(-1, 500.0, 20.0), AxisPlacement::Hidden);
    }

    #[test]
    fn tick_labels_drop_trailing_zeros() {
        assert_eq!(format_tick(4.0), "4");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-1.5), "-1.5");
    }
}
