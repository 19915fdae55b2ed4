use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::core::accessor::{Accessor, ValueAccessor};
use crate::core::bar_series::BAR_BAND_FILL;
use crate::core::extent::Extent;
use crate::core::frame_group::FrameGroup;
use crate::core::palette::Palette;
use crate::core::series::{
    DrawContext, GridLineShape, RectShape, SelectCallback, Series, SeriesKind, SeriesMeta,
    SeriesShape, TextShape, dispatch_select, extent_over, pivot_channels, resolve_color,
};
use crate::core::value::{GroupKey, Record, Value};
use crate::error::PlotResult;
use crate::render::{Color, TextHAlign};

const GRID_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.1);
const LABEL_COLOR: Color = Color::rgb(0.0, 0.0, 0.0);

pub struct BarhOptions<T> {
    /// Span start. Ignored without `span`: the bar then starts at 0.
    pub x: Option<ValueAccessor<T>>,
    /// Span length. Falls back to `x`, then to the index accessor.
    pub span: Option<ValueAccessor<T>>,
    /// Lane row. Defaults to the row position.
    pub y: Option<ValueAccessor<T>>,
    pub colors: Option<Palette>,
    pub color: Option<Accessor<T, Color>>,
    pub opacity: Accessor<T, f64>,
    /// Label drawn at the span end.
    pub text: Option<Accessor<T, String>>,
    /// Horizontal guides at every integer lane.
    pub grid_y: bool,
    pub on_select: Option<SelectCallback<T>>,
    pub meta: SeriesMeta,
}

impl<T> Default for BarhOptions<T> {
    fn default() -> Self {
        Self {
            x: None,
            span: None,
            y: None,
            colors: None,
            color: None,
            opacity: Accessor::Constant(1.0),
            text: None,
            grid_y: false,
            on_select: None,
            meta: SeriesMeta::default(),
        }
    }
}

/// Horizontal spans stacked in one lane per group.
pub struct BarhSeries<T> {
    group: Arc<FrameGroup<T>>,
    x: ValueAccessor<T>,
    span: ValueAccessor<T>,
    y: ValueAccessor<T>,
    palette: Palette,
    color: Option<Accessor<T, Color>>,
    opacity: Accessor<T, f64>,
    text: Option<Accessor<T, String>>,
    grid_y: bool,
    on_select: Option<SelectCallback<T>>,
    meta: SeriesMeta,
    shapes: Vec<SeriesShape>,
}

impl<T: Record + 'static> BarhSeries<T> {
    pub fn new(group: Arc<FrameGroup<T>>, options: BarhOptions<T>) -> PlotResult<Self> {
        let (x, span) = match (options.span, options.x) {
            (Some(span), x) => (x.unwrap_or_else(|| group.index_accessor()), span),
            (None, Some(x)) => (Accessor::from(0.0), x),
            (None, None) => (Accessor::from(0.0), group.index_accessor()),
        };
        let y = options
            .y
            .unwrap_or_else(|| ValueAccessor::derived(|_: &T, index| Value::from(index)));
        let palette = options.colors.unwrap_or_else(|| group.palette().clone());
        Ok(Self {
            group,
            x,
            span,
            y,
            palette,
            color: options.color,
            opacity: options.opacity,
            text: options.text,
            grid_y: options.grid_y,
            on_select: options.on_select,
            meta: options.meta,
            shapes: Vec::new(),
        })
    }

    /// Lane height in Y units.
    #[must_use]
    pub fn lane_height(&self) -> f64 {
        BAR_BAND_FILL / self.group.len().max(1) as f64
    }
}

impl<T: Record + 'static> Series for BarhSeries<T> {
    fn kind(&self) -> SeriesKind {
        SeriesKind::Barh
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
        let end = self.x.sum(&self.span);
        extent_over(&self.group, |row, index| self.x.resolve(row, index))?
            .merge(extent_over(&self.group, |row, index| end.resolve(row, index))?)
    }

    fn y_extent(&self) -> PlotResult<Extent> {
        let top = self.y.sum(&Accessor::from(BAR_BAND_FILL));
        extent_over(&self.group, |row, index| self.y.resolve(row, index))?
            .merge(extent_over(&self.group, |row, index| top.resolve(row, index))?)
    }

    fn draw(&mut self, ctx: &DrawContext<'_>) -> PlotResult<()> {
        let lane = self.lane_height();
        let mut shapes = Vec::new();
        if self.grid_y {
            let (d0, d1) = ctx.y_scale.domain();
            let (low, high) = (d0.min(d1), d0.max(d1));
            let mut level = low.floor() + 1.0;
            while level < high {
                shapes.push(SeriesShape::GridLine(GridLineShape {
                    y: level,
                    color: GRID_COLOR,
                }));
                level += 1.0;
            }
        }

        let mut skipped = 0_usize;
        for (group_index, (_, frame)) in self.group.iter().enumerate() {
            let group_color = self.palette.color_for(group_index);
            let lane_offset = lane * group_index as f64;
            for (row_index, row) in frame.iter().enumerate() {
                let x = self.x.resolve(row, row_index);
                let span = self.span.resolve(row, row_index).as_number();
                let y = self.y.resolve(row, row_index).as_number();
                let (Some(span), Some(y), false) = (span, y, x.is_na()) else {
                    skipped += 1;
                    continue;
                };
                let color = resolve_color(
                    self.color.as_ref(),
                    &self.opacity,
                    group_color,
                    row,
                    row_index,
                );
                if let Some(text) = &self.text {
                    let label = text.resolve(row, row_index);
                    if !label.is_empty() {
                        shapes.push(SeriesShape::Text(TextShape {
                            group_index,
                            x: x.clone(),
                            x_offset: span,
                            y,
                            y_offset: lane_offset,
                            text: label,
                            color: LABEL_COLOR,
                            h_align: TextHAlign::Left,
                        }));
                    }
                }
                shapes.push(SeriesShape::Rect(RectShape {
                    group_index,
                    row_index,
                    x,
                    x_offset: 0.0,
                    width: span,
                    y,
                    y_offset: lane_offset + lane,
                    height: lane,
                    color,
                }));
            }
        }
        if skipped > 0 {
            trace!(skipped, "barh series skipped NA rows");
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

    fn is_selectable(&self) -> bool {
        self.on_select.is_some()
    }

    fn select(&mut self, group_index: usize, row_index: usize) -> Option<GroupKey> {
        dispatch_select(&self.group, self.on_select.as_mut(), group_index, row_index)
    }
}
