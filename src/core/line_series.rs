use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::accessor::{Accessor, ValueAccessor};
use crate::core::extent::Extent;
use crate::core::frame_group::FrameGroup;
use crate::core::palette::Palette;
use crate::core::series::{
    Channels, DrawContext, LineShape, Series, SeriesKind, SeriesMeta, SeriesShape, TextShape,
    extent_over, pivot_channels, resolve_color,
};
use crate::core::value::{Record, Value};
use crate::error::PlotResult;
use crate::render::{Color, TextHAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    /// Only the point markers are drawn.
    None,
}

pub struct LineOptions<T> {
    /// Defaults to the group's index accessor.
    pub x: Option<ValueAccessor<T>>,
    /// Defaults to the active column.
    pub y: Option<ValueAccessor<T>>,
    pub colors: Option<Palette>,
    pub color: Option<Accessor<T, Color>>,
    pub opacity: Accessor<T, f64>,
    /// Marker label drawn at every point.
    pub text: Option<Accessor<T, String>>,
    pub line_style: LineStyle,
    pub stroke_width: f64,
    pub meta: SeriesMeta,
}

impl<T> Default for LineOptions<T> {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            colors: None,
            color: None,
            opacity: Accessor::Constant(1.0),
            text: None,
            line_style: LineStyle::Solid,
            stroke_width: 1.5,
            meta: SeriesMeta::default(),
        }
    }
}

/// One polyline per group, optionally decorated with text markers.
pub struct LineSeries<T> {
    group: Arc<FrameGroup<T>>,
    x: ValueAccessor<T>,
    y: ValueAccessor<T>,
    palette: Palette,
    color: Option<Accessor<T, Color>>,
    opacity: Accessor<T, f64>,
    text: Option<Accessor<T, String>>,
    line_style: LineStyle,
    stroke_width: f64,
    meta: SeriesMeta,
    shapes: Vec<SeriesShape>,
}

impl<T: Record + 'static> LineSeries<T> {
    pub fn new(group: Arc<FrameGroup<T>>, options: LineOptions<T>) -> PlotResult<Self> {
        let x = options.x.unwrap_or_else(|| group.index_accessor());
        let y = Channels::value_or_active(options.y, &group, "y")?;
        let palette = Channels::palette(options.colors, &group);
        Ok(Self {
            group,
            x,
            y,
            palette,
            color: options.color,
            opacity: options.opacity,
            text: options.text,
            line_style: options.line_style,
            stroke_width: options.stroke_width,
            meta: options.meta,
            shapes: Vec::new(),
        })
    }
}

impl<T: Record + 'static> Series for LineSeries<T> {
    fn kind(&self) -> SeriesKind {
        SeriesKind::Line
    }

    fn meta(&self) -> &SeriesMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SeriesMeta {
        &mut self.meta
    }

    fn set_axis_index(&mut self, axis_index: i32) -> &mut dyn Series {
        self.meta.axis_index = axis_index;
        self
    }

    fn x_extent(&self) -> PlotResult<Extent> {
        extent_over(&self.group, |row, index| self.x.resolve(row, index))
    }

    fn y_extent(&self) -> PlotResult<Extent> {
        extent_over(&self.group, |row, index| self.y.resolve(row, index))
    }

    fn draw(&mut self, _ctx: &DrawContext<'_>) -> PlotResult<()> {
        let mut shapes = Vec::new();
        let mut skipped = 0_usize;
        for (group_index, (_, frame)) in self.group.iter().enumerate() {
            let group_color = self.palette.color_for(group_index);
            let mut points = Vec::with_capacity(frame.len());
            let mut line_color = None;
            for (index, row) in frame.iter().enumerate() {
                let x = self.x.resolve(row, index);
                let Some(y) = self.y.resolve(row, index).as_number() else {
                    skipped += 1;
                    continue;
                };
                if x.is_na() {
                    skipped += 1;
                    continue;
                }
                let color = resolve_color(
                    self.color.as_ref(),
                    &self.opacity,
                    group_color,
                    row,
                    index,
                );
                line_color.get_or_insert(color);
                if let Some(text) = &self.text {
                    let label = text.resolve(row, index);
                    if !label.is_empty() {
                        shapes.push(SeriesShape::Text(TextShape {
                            group_index,
                            x: x.clone(),
                            x_offset: 0.0,
                            y,
                            y_offset: 0.0,
                            text: label,
                            color,
                            h_align: TextHAlign::Center,
                        }));
                    }
                }
                points.push((x, y));
            }
            if self.line_style == LineStyle::Solid && points.len() >= 2 {
                shapes.push(SeriesShape::Line(LineShape {
                    group_index,
                    points,
                    stroke_width: self.stroke_width,
                    color: line_color.unwrap_or(group_color),
                }));
            }
        }
        if skipped > 0 {
            trace!(skipped, "line series skipped NA points");
        }
        self.shapes = shapes;
        Ok(())
    }

    fn shapes(&self) -> &[SeriesShape] {
        &self.shapes
    }

    fn group_count(&self) -> usize {
        self.group.len()
    }

    fn export_columns(&self) -> IndexMap<String, Vec<Value>> {
        pivot_channels(&self.group, &self.x, &self.y)
    }
}
