use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::accessor::ValueAccessor;
use crate::core::bar_series::{BarOptions, BarSeries};
use crate::core::barh_series::{BarhOptions, BarhSeries};
use crate::core::extent::Extent;
use crate::core::frame::Frame;
use crate::core::line_series::{LineOptions, LineSeries};
use crate::core::palette::Palette;
use crate::core::rect_series::{RectOptions, RectSeries};
use crate::core::series::{Series, SeriesList, push_series};
use crate::core::value::{GroupKey, Record, Row, Value};
use crate::error::{PlotError, PlotResult};
use crate::render::Color;

/// Result of grouping every frame of a [`FrameGroup`] once more.
pub type NestedFrameGroup<T> = IndexMap<GroupKey, FrameGroup<T>>;

/// Named frames sharing an index field, one palette color per group.
///
/// Groups iterate in insertion order, and a group's color is picked by its
/// position, so per-group transforms that keep the key set keep the colors.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGroup<T> {
    groups: IndexMap<GroupKey, Frame<T>>,
    palette: Palette,
    index_field: Option<String>,
}

impl<T> FrameGroup<T> {
    #[must_use]
    pub fn from_frames(groups: IndexMap<GroupKey, Frame<T>>, index_field: Option<String>) -> Self {
        let mut group = Self {
            groups,
            palette: Palette::default(),
            index_field: None,
        };
        group.set_index_field(index_field);
        group
    }

    /// Builds groups from named row vectors sharing `index_field`.
    pub fn from_groups<K, I>(groups: I, index_field: impl Into<String>) -> Self
    where
        K: Into<GroupKey>,
        I: IntoIterator<Item = (K, Vec<T>)>,
    {
        let index_field = index_field.into();
        let groups = groups
            .into_iter()
            .map(|(key, rows)| (key.into(), Frame::with_index(rows, index_field.clone())))
            .collect();
        Self::from_frames(groups, Some(index_field))
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Replaces the palette with explicit per-group colors.
    pub fn with_colors(self, colors: Vec<Color>) -> PlotResult<Self> {
        Ok(self.with_palette(Palette::new(colors)?))
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn color_for(&self, group_index: usize) -> Color {
        self.palette.color_for(group_index)
    }

    #[must_use]
    pub fn index_field(&self) -> Option<&str> {
        self.index_field.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&Frame<T>> {
        self.groups.get(key)
    }

    #[must_use]
    pub fn get_index(&self, group_index: usize) -> Option<(&GroupKey, &Frame<T>)> {
        self.groups.get_index(group_index)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.keys()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, GroupKey, Frame<T>> {
        self.groups.iter()
    }

    /// Visits every group in order with its position.
    pub fn for_each(&self, mut f: impl FnMut(&GroupKey, &Frame<T>, usize)) {
        for (group_index, (key, frame)) in self.groups.iter().enumerate() {
            f(key, frame, group_index);
        }
    }

    /// Transforms each frame independently, keeping keys, order and palette.
    pub fn map_groups<U>(&self, mut f: impl FnMut(&GroupKey, &Frame<T>) -> Frame<U>) -> FrameGroup<U> {
        FrameGroup {
            groups: self
                .groups
                .iter()
                .map(|(key, frame)| (key.clone(), f(key, frame)))
                .collect(),
            palette: self.palette.clone(),
            index_field: self.index_field.clone(),
        }
    }

    #[must_use]
    pub fn col(self, field: &str) -> Self {
        self.map_owned(|frame| frame.col(field))
    }

    fn map_owned(self, mut f: impl FnMut(Frame<T>) -> Frame<T>) -> Self {
        Self {
            groups: self
                .groups
                .into_iter()
                .map(|(key, frame)| (key, f(frame)))
                .collect(),
            palette: self.palette,
            index_field: self.index_field,
        }
    }

    fn set_index_field(&mut self, index_field: Option<String>) {
        for frame in self.groups.values_mut() {
            frame.set_index_field(index_field.clone());
        }
        self.index_field = index_field;
    }
}

impl<T: Clone> FrameGroup<T> {
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        self.map_groups(|_, frame| frame.filter(&mut predicate))
    }

    /// Re-groups every inner frame by `key_fn`.
    pub fn group_by<K: Into<GroupKey>>(
        &self,
        mut key_fn: impl FnMut(&T) -> K,
    ) -> NestedFrameGroup<T> {
        self.groups
            .iter()
            .map(|(key, frame)| {
                let inner = frame
                    .group_by(&mut key_fn)
                    .with_palette(self.palette.clone());
                (key.clone(), inner)
            })
            .collect()
    }
}

impl<T: Record> FrameGroup<T> {
    /// [`Frame::reduce`] applied to every group.
    pub fn reduce<U>(
        &self,
        index_field: &str,
        mut aggregator: impl FnMut(&GroupKey, &Frame<T>) -> U,
    ) -> FrameGroup<U> {
        let mut reduced = self.map_groups(|_, frame| frame.reduce(index_field, &mut aggregator));
        reduced.set_index_field(Some(index_field.to_owned()));
        reduced
    }

    /// Folds every group into one record; the result is indexed by `index_field`.
    pub fn collapse<U>(
        &self,
        index_field: &str,
        mut aggregator: impl FnMut(&GroupKey, &Frame<T>) -> U,
    ) -> Frame<U> {
        let rows = self
            .groups
            .iter()
            .map(|(key, frame)| aggregator(key, frame))
            .collect();
        Frame::with_index(rows, index_field)
    }

    pub fn drop_na(&self, field: Option<&str>) -> Self {
        self.map_groups(|_, frame| frame.drop_na(field))
    }

    pub fn to_step(&self, time_field: &str) -> Self {
        self.map_groups(|_, frame| frame.to_step(time_field))
    }

    #[must_use]
    pub fn sort_numerical(self, field: &str) -> Self {
        self.map_owned(|frame| frame.sort_numerical(field))
    }

    pub fn extend<S>(&self, fields: &[(S, ValueAccessor<T>)]) -> Self
    where
        S: AsRef<str>,
    {
        self.map_groups(|_, frame| {
            frame.extend(
                fields
                    .iter()
                    .map(|(name, accessor)| (name.as_ref(), accessor.clone())),
            )
        })
    }

    /// Largest numeric value of `field` over every group, 0 when there is none.
    #[must_use]
    pub fn max(&self, field: &str) -> f64 {
        self.groups
            .values()
            .filter_map(|frame| frame.max(field))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Extent of the accessor over every row of every group.
    ///
    /// Derived accessors see the row position inside its own group.
    pub fn get_extent(&self, accessor: &ValueAccessor<T>) -> PlotResult<Extent> {
        Extent::merge_all(
            self.groups
                .values()
                .map(|frame| frame.extent(accessor))
                .collect::<PlotResult<Vec<_>>>()?,
        )
    }

    /// Accessor reading the shared index field, or the row position when unset.
    #[must_use]
    pub fn index_accessor(&self) -> ValueAccessor<T>
    where
        T: 'static,
    {
        match &self.index_field {
            Some(field) => ValueAccessor::field(field.clone()),
            None => ValueAccessor::derived(|_: &T, index| Value::from(index)),
        }
    }

    /// One row per distinct index value with one column per group.
    ///
    /// Cells are read from each group's active column and left NA where a
    /// group has no row for that index value.
    pub fn to_pivot(&self) -> PlotResult<Vec<Row>> {
        let index_field = self.index_field.as_deref().ok_or_else(|| {
            PlotError::InvalidData("pivot export requires an index field".to_owned())
        })?;
        let columns: Vec<String> = self.groups.keys().map(ToString::to_string).collect();
        let mut table: IndexMap<GroupKey, Row> = IndexMap::new();
        for (group_index, frame) in self.groups.values().enumerate() {
            let column = frame.active_column().ok_or_else(|| {
                PlotError::InvalidData(format!(
                    "group `{}` has no active column",
                    columns[group_index]
                ))
            })?;
            for row in frame {
                let index_value = row.field(index_field);
                let entry = table
                    .entry(GroupKey::from(index_value.clone()))
                    .or_insert_with(|| {
                        columns.iter().fold(
                            Row::new().with(index_field, index_value),
                            |pivot, name| pivot.with(name.clone(), Value::Missing),
                        )
                    });
                entry.insert(columns[group_index].clone(), row.field(column));
            }
        }
        debug!(
            rows = table.len(),
            groups = columns.len(),
            "pivoted frame group"
        );
        Ok(table.into_values().collect())
    }

    /// Column-oriented form of [`FrameGroup::to_pivot`].
    pub fn to_columns(&self) -> PlotResult<IndexMap<String, Vec<Value>>> {
        let rows = self.to_pivot()?;
        let mut columns: IndexMap<String, Vec<Value>> = IndexMap::new();
        if let Some(index_field) = self.index_field.as_deref() {
            columns.insert(index_field.to_owned(), Vec::with_capacity(rows.len()));
        }
        for key in self.groups.keys() {
            columns.insert(key.to_string(), Vec::with_capacity(rows.len()));
        }
        for row in &rows {
            for (name, values) in &mut columns {
                values.push(row.field(name));
            }
        }
        Ok(columns)
    }
}

impl<T: Record + 'static> FrameGroup<T> {
    pub fn plot_bar<'a>(
        &self,
        list: &'a mut SeriesList,
        options: BarOptions<T>,
    ) -> PlotResult<&'a mut dyn Series> {
        let series = BarSeries::new(Arc::new(self.clone()), options)?;
        Ok(push_series(list, Box::new(series)))
    }

    pub fn plot_barh<'a>(
        &self,
        list: &'a mut SeriesList,
        options: BarhOptions<T>,
    ) -> PlotResult<&'a mut dyn Series> {
        let series = BarhSeries::new(Arc::new(self.clone()), options)?;
        Ok(push_series(list, Box::new(series)))
    }

    pub fn plot_line<'a>(
        &self,
        list: &'a mut SeriesList,
        options: LineOptions<T>,
    ) -> PlotResult<&'a mut dyn Series> {
        let series = LineSeries::new(Arc::new(self.clone()), options)?;
        Ok(push_series(list, Box::new(series)))
    }

    pub fn plot_rect<'a>(
        &self,
        list: &'a mut SeriesList,
        options: RectOptions<T>,
    ) -> PlotResult<&'a mut dyn Series> {
        let series = RectSeries::new(Arc::new(self.clone()), options)?;
        Ok(push_series(list, Box::new(series)))
    }
}

impl<T> Default for FrameGroup<T> {
    fn default() -> Self {
        Self {
            groups: IndexMap::new(),
            palette: Palette::default(),
            index_field: None,
        }
    }
}

impl<'a, T> IntoIterator for &'a FrameGroup<T> {
    type Item = (&'a GroupKey, &'a Frame<T>);
    type IntoIter = indexmap::map::Iter<'a, GroupKey, Frame<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
