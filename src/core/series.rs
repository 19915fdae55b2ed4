use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::accessor::{Accessor, ValueAccessor};
use crate::core::extent::Extent;
use crate::core::frame_group::FrameGroup;
use crate::core::palette::Palette;
use crate::core::scale::{LinearScale, XScale};
use crate::core::value::{GroupKey, Record, Value};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, TextHAlign};

/// Host callback invoked with the owning group and the original record.
pub type SelectCallback<T> = Box<dyn FnMut(&GroupKey, &T)>;

/// Series composed into one plot, in drawing order.
pub type SeriesList = Vec<Box<dyn Series>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Line,
    Bar,
    Barh,
    Rect,
}

/// Settings shared by every series kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesMeta {
    /// Y scale shared with other series; negative values get an own scale
    /// without a rendered axis.
    pub axis_index: i32,
    /// Keeps the drawn projection when the surface zooms.
    pub fixed: bool,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

/// Scales a series draws against.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub x_scale: &'a XScale,
    pub y_scale: &'a LinearScale,
}

/// Rectangle in data space.
///
/// Offsets and sizes are expressed in domain units and turned into pixels
/// with the scale unit at projection time, so a range change never needs the
/// accessors again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub group_index: usize,
    pub row_index: usize,
    pub x: Value,
    pub x_offset: f64,
    pub width: f64,
    pub y: f64,
    pub y_offset: f64,
    pub height: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineShape {
    pub group_index: usize,
    pub points: Vec<(Value, f64)>,
    pub stroke_width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShape {
    pub group_index: usize,
    pub x: Value,
    pub x_offset: f64,
    pub y: f64,
    pub y_offset: f64,
    pub text: String,
    pub color: Color,
    pub h_align: TextHAlign,
}

/// Horizontal guide across the plotting area at a Y domain value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLineShape {
    pub y: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesShape {
    Rect(RectShape),
    Line(LineShape),
    Text(TextShape),
    GridLine(GridLineShape),
}

/// Accessor-bound view over a frame group.
///
/// `draw` resolves accessors once into data-space shapes that stay retained;
/// the plot surface projects them whenever scale ranges change.
pub trait Series {
    fn kind(&self) -> SeriesKind;
    fn meta(&self) -> &SeriesMeta;
    fn meta_mut(&mut self) -> &mut SeriesMeta;

    fn x_extent(&self) -> PlotResult<Extent>;
    fn y_extent(&self) -> PlotResult<Extent>;
    fn draw(&mut self, ctx: &DrawContext<'_>) -> PlotResult<()>;
    fn shapes(&self) -> &[SeriesShape];
    fn group_count(&self) -> usize;

    /// Resolved X/Y channels pivoted into columns: `x` followed by one column
    /// per group, NA where a group has no row at that X.
    fn export_columns(&self) -> IndexMap<String, Vec<Value>>;

    /// Whether clicks on this series' rectangles are reported.
    fn is_selectable(&self) -> bool {
        false
    }

    /// Reports the record behind a drawn rectangle to the selection callback.
    fn select(&mut self, _group_index: usize, _row_index: usize) -> Option<GroupKey> {
        None
    }

    fn axis_index(&self) -> i32 {
        self.meta().axis_index
    }

    fn set_axis_index(&mut self, axis_index: i32) -> &mut dyn Series;

    fn is_fixed(&self) -> bool {
        self.meta().fixed
    }

    fn set_fixed(&mut self, fixed: bool) {
        self.meta_mut().fixed = fixed;
    }
}

/// Appends `series` and hands back a mutable handle for chained tweaks.
pub fn push_series(list: &mut SeriesList, series: Box<dyn Series>) -> &mut dyn Series {
    list.push(series);
    let last = list.len() - 1;
    list[last].as_mut()
}

/// Channel defaults shared by the series constructors.
pub(crate) struct Channels;

impl Channels {
    /// Explicit accessor, else the active column of the first group.
    pub(crate) fn value_or_active<T: Record + 'static>(
        explicit: Option<ValueAccessor<T>>,
        group: &FrameGroup<T>,
        channel: &str,
    ) -> PlotResult<ValueAccessor<T>> {
        if let Some(accessor) = explicit {
            return Ok(accessor);
        }
        group
            .iter()
            .find_map(|(_, frame)| frame.active_column().map(ValueAccessor::field))
            .ok_or_else(|| {
                PlotError::InvalidData(format!(
                    "`{channel}` accessor is required when no active column is set"
                ))
            })
    }

    pub(crate) fn required<T>(
        explicit: Option<ValueAccessor<T>>,
        channel: &str,
    ) -> PlotResult<ValueAccessor<T>> {
        explicit.ok_or_else(|| PlotError::InvalidData(format!("`{channel}` accessor is required")))
    }

    pub(crate) fn palette<T>(explicit: Option<Palette>, group: &FrameGroup<T>) -> Palette {
        explicit.unwrap_or_else(|| group.palette().clone())
    }
}

/// Per-row color: explicit accessor, else the group color, then opacity.
pub(crate) fn resolve_color<T>(
    color: Option<&Accessor<T, Color>>,
    opacity: &Accessor<T, f64>,
    group_color: Color,
    row: &T,
    index: usize,
) -> Color {
    color
        .map_or(group_color, |accessor| accessor.resolve(row, index))
        .with_opacity(opacity.resolve(row, index))
}

/// Extent of values produced row by row from the group.
pub(crate) fn extent_over<T>(
    group: &FrameGroup<T>,
    mut value: impl FnMut(&T, usize) -> Value,
) -> PlotResult<Extent> {
    let mut extent = Extent::Empty;
    for (_, frame) in group {
        let values = frame
            .iter()
            .enumerate()
            .map(|(index, row)| value(row, index));
        extent = extent.merge(Extent::from_values(values.collect::<Vec<_>>())?)?;
    }
    Ok(extent)
}

/// Invokes the selection callback for `(group_index, row_index)`.
pub(crate) fn dispatch_select<T>(
    group: &FrameGroup<T>,
    callback: Option<&mut SelectCallback<T>>,
    group_index: usize,
    row_index: usize,
) -> Option<GroupKey> {
    let callback = callback?;
    let (key, frame) = group.get_index(group_index)?;
    let row = frame.rows().get(row_index)?;
    callback(key, row);
    Some(key.clone())
}

/// Pivots two resolved channels by X value across groups.
pub(crate) fn pivot_channels<T>(
    group: &FrameGroup<T>,
    x: &ValueAccessor<T>,
    y: &ValueAccessor<T>,
) -> IndexMap<String, Vec<Value>> {
    let mut slots: IndexMap<GroupKey, Value> = IndexMap::new();
    let mut per_group: Vec<IndexMap<GroupKey, Value>> = Vec::with_capacity(group.len());
    for (_, frame) in group {
        let mut values = IndexMap::new();
        for (index, row) in frame.iter().enumerate() {
            let x_value = x.resolve(row, index);
            if x_value.is_na() {
                continue;
            }
            let key = GroupKey::from(x_value.clone());
            slots.entry(key.clone()).or_insert(x_value);
            values.insert(key, y.resolve(row, index));
        }
        per_group.push(values);
    }

    let mut columns = IndexMap::new();
    columns.insert("x".to_owned(), slots.values().cloned().collect());
    for ((key, _), values) in group.iter().zip(&per_group) {
        let column = slots
            .keys()
            .map(|slot| values.get(slot).cloned().unwrap_or(Value::Missing))
            .collect();
        columns.insert(key.to_string(), column);
    }
    columns
}
