use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::core::accessor::{Accessor, ValueAccessor};
use crate::core::extent::Extent;
use crate::core::frame_group::FrameGroup;
use crate::core::palette::Palette;
use crate::core::series::{
    Channels, DrawContext, RectShape, SelectCallback, Series, SeriesKind, SeriesMeta,
    SeriesShape, dispatch_select, extent_over, pivot_channels, resolve_color,
};
use crate::core::value::{GroupKey, Record, Value};
use crate::error::PlotResult;
use crate::render::Color;

pub struct RectOptions<T> {
    /// Left edge. Defaults to the group's index accessor.
    pub x: Option<ValueAccessor<T>>,
    /// Top edge in Y units.
    pub y: Option<ValueAccessor<T>>,
    pub width: Option<ValueAccessor<T>>,
    /// Extends downwards from `y`.
    pub height: Option<ValueAccessor<T>>,
    pub colors: Option<Palette>,
    pub color: Option<Accessor<T, Color>>,
    pub opacity: Accessor<T, f64>,
    pub on_select: Option<SelectCallback<T>>,
    pub meta: SeriesMeta,
}

impl<T> Default for RectOptions<T> {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            width: None,
            height: None,
            colors: None,
            color: None,
            opacity: Accessor::Constant(1.0),
            on_select: None,
            meta: SeriesMeta::default(),
        }
    }
}

/// Free rectangles with independently driven position and size.
pub struct RectSeries<T> {
    group: Arc<FrameGroup<T>>,
    x: ValueAccessor<T>,
    y: ValueAccessor<T>,
    width: ValueAccessor<T>,
    height: ValueAccessor<T>,
    palette: Palette,
    color: Option<Accessor<T, Color>>,
    opacity: Accessor<T, f64>,
    on_select: Option<SelectCallback<T>>,
    meta: SeriesMeta,
    shapes: Vec<SeriesShape>,
}

impl<T: Record + 'static> RectSeries<T> {
    pub fn new(group: Arc<FrameGroup<T>>, options: RectOptions<T>) -> PlotResult<Self> {
        let x = options.x.unwrap_or_else(|| group.index_accessor());
        let y = Channels::required(options.y, "y")?;
        let width = Channels::required(options.width, "width")?;
        let height = Channels::required(options.height, "height")?;
        let palette = Channels::palette(options.colors, &group);
        Ok(Self {
            group,
            x,
            y,
            width,
            height,
            palette,
            color: options.color,
            opacity: options.opacity,
            on_select: options.on_select,
            meta: options.meta,
            shapes: Vec::new(),
        })
    }
}

impl<T: Record + 'static> Series for RectSeries<T> {
    fn kind(&self) -> SeriesKind {
        SeriesKind::Rect
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
        let right = self.x.sum(&self.width);
        extent_over(&self.group, |row, index| self.x.resolve(row, index))?
            .merge(extent_over(&self.group, |row, index| right.resolve(row, index))?)
    }

    fn y_extent(&self) -> PlotResult<Extent> {
        let bottom = self.y.subtract(&self.height);
        extent_over(&self.group, |row, index| self.y.resolve(row, index))?
            .merge(extent_over(&self.group, |row, index| bottom.resolve(row, index))?)?
            .merge(Extent::numeric(0.0, 0.0))
    }

    fn draw(&mut self, _ctx: &DrawContext<'_>) -> PlotResult<()> {
        let mut shapes = Vec::new();
        let mut skipped = 0_usize;
        for (group_index, (_, frame)) in self.group.iter().enumerate() {
            let group_color = self.palette.color_for(group_index);
            for (row_index, row) in frame.iter().enumerate() {
                let x = self.x.resolve(row, row_index);
                let y = self.y.resolve(row, row_index).as_number();
                let width = self.width.resolve(row, row_index).as_number();
                let height = self.height.resolve(row, row_index).as_number();
                let (Some(y), Some(width), Some(height), false) = (y, width, height, x.is_na())
                else {
                    skipped += 1;
                    continue;
                };
                shapes.push(SeriesShape::Rect(RectShape {
                    group_index,
                    row_index,
                    x,
                    x_offset: 0.0,
                    width,
                    y,
                    y_offset: 0.0,
                    height,
                    color: resolve_color(
                        self.color.as_ref(),
                        &self.opacity,
                        group_color,
                        row,
                        row_index,
                    ),
                }));
            }
        }
        if skipped > 0 {
            trace!(skipped, "rect series skipped NA rows");
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
