use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::core::accessor::{Accessor, ValueAccessor};
use crate::core::extent::Extent;
use crate::core::frame_group::FrameGroup;
use crate::core::palette::Palette;
use crate::core::series::{
    Channels, DrawContext, RectShape, SelectCallback, Series, SeriesKind, SeriesMeta,
    SeriesShape, TextShape, dispatch_select, extent_over, pivot_channels, resolve_color,
};
use crate::core::value::{GroupKey, Record, Value};
use crate::error::PlotResult;
use crate::render::{Color, TextHAlign};

/// Share of one X unit filled by the bars of all groups together.
pub const BAR_BAND_FILL: f64 = 0.8;

pub struct BarOptions<T> {
    /// Defaults to the group's index accessor.
    pub x: Option<ValueAccessor<T>>,
    /// Defaults to the active column.
    pub y: Option<ValueAccessor<T>>,
    pub colors: Option<Palette>,
    pub color: Option<Accessor<T, Color>>,
    pub opacity: Accessor<T, f64>,
    /// Label drawn at the bar top, left-aligned on the bar; empty strings are skipped.
    pub text: Option<Accessor<T, String>>,
    pub on_select: Option<SelectCallback<T>>,
    pub meta: SeriesMeta,
}

impl<T> Default for BarOptions<T> {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            colors: None,
            color: None,
            opacity: Accessor::Constant(1.0),
            text: None,
            on_select: None,
            meta: SeriesMeta::default(),
        }
    }
}

/// Side-by-side vertical bars anchored at y = 0, one sub-bar per group.
pub struct BarSeries<T> {
    group: Arc<FrameGroup<T>>,
    x: ValueAccessor<T>,
    y: ValueAccessor<T>,
    palette: Palette,
    color: Option<Accessor<T, Color>>,
    opacity: Accessor<T, f64>,
    text: Option<Accessor<T, String>>,
    on_select: Option<SelectCallback<T>>,
    meta: SeriesMeta,
    shapes: Vec<SeriesShape>,
}

impl<T: Record + 'static> BarSeries<T> {
    pub fn new(group: Arc<FrameGroup<T>>, options: BarOptions<T>) -> PlotResult<Self> {
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
            on_select: options.on_select,
            meta: options.meta,
            shapes: Vec::new(),
        })
    }

    /// Width of one group's bar in X units.
    #[must_use]
    pub fn bar_width(&self) -> f64 {
        BAR_BAND_FILL / self.group.len().max(1) as f64
    }
}

impl<T: Record + 'static> Series for BarSeries<T> {
    fn kind(&self) -> SeriesKind {
        SeriesKind::Bar
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
        extent_over(&self.group, |row, index| self.y.resolve(row, index))?
            .merge(Extent::numeric(0.0, 0.0))
    }

    fn draw(&mut self, _ctx: &DrawContext<'_>) -> PlotResult<()> {
        let width = self.bar_width();
        let mut shapes = Vec::new();
        let mut skipped = 0_usize;
        for (group_index, (_, frame)) in self.group.iter().enumerate() {
            let group_color = self.palette.color_for(group_index);
            for (row_index, row) in frame.iter().enumerate() {
                let x = self.x.resolve(row, row_index);
                let y = self.y.resolve(row, row_index).as_number();
                let (Some(y), false) = (y, x.is_na()) else {
                    skipped += 1;
                    continue;
                };
                let x_offset = width * group_index as f64;
                if let Some(text) = &self.text {
                    let label = text.resolve(row, row_index);
                    if !label.is_empty() {
                        shapes.push(SeriesShape::Text(TextShape {
                            group_index,
                            x: x.clone(),
                            x_offset,
                            y,
                            y_offset: 0.0,
                            text: label,
                            color: group_color,
                            h_align: TextHAlign::Left,
                        }));
                    }
                }
                shapes.push(SeriesShape::Rect(RectShape {
                    group_index,
                    row_index,
                    x,
                    x_offset,
                    width,
                    y,
                    y_offset: 0.0,
                    height: y,
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
            trace!(skipped, "bar series skipped NA rows");
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
