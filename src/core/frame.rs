use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::accessor::ValueAccessor;
use crate::core::extent::Extent;
use crate::core::frame_group::FrameGroup;
use crate::core::value::{GroupKey, Record, Value};
use crate::error::PlotResult;

/// Ordered collection of records with an optional index field.
///
/// Operations never mutate stored records. Borrowing operations build a new
/// frame from clones; builder-style operations (`col`, `push_row`,
/// `sort_numerical`) consume the frame and hand it back.
#[derive(Clone, PartialEq)]
pub struct Frame<T> {
    rows: Vec<T>,
    index_field: Option<String>,
    active_column: Option<String>,
}

impl<T> Frame<T> {
    #[must_use]
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            index_field: None,
            active_column: None,
        }
    }

    #[must_use]
    pub fn with_index(rows: Vec<T>, index_field: impl Into<String>) -> Self {
        Self {
            rows,
            index_field: Some(index_field.into()),
            active_column: None,
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn index_field(&self) -> Option<&str> {
        self.index_field.as_deref()
    }

    #[must_use]
    pub fn active_column(&self) -> Option<&str> {
        self.active_column.as_deref()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Maps every record, keeping order, index field and active column.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Frame<U> {
        Frame {
            rows: self.rows.iter().map(f).collect(),
            index_field: self.index_field.clone(),
            active_column: self.active_column.clone(),
        }
    }

    /// Maps every record and declares `index_field` on the result.
    pub fn map_reindexed<U>(&self, f: impl FnMut(&T) -> U, index_field: &str) -> Frame<U> {
        Frame {
            rows: self.rows.iter().map(f).collect(),
            index_field: Some(index_field.to_owned()),
            active_column: self.active_column.clone(),
        }
    }

    /// Marks `field` as the column later series factories read.
    #[must_use]
    pub fn col(mut self, field: &str) -> Self {
        self.active_column = Some(field.to_owned());
        self
    }

    #[must_use]
    pub fn push_row(mut self, row: T) -> Self {
        self.rows.push(row);
        self
    }

    pub(crate) fn with_rows<U>(&self, rows: Vec<U>) -> Frame<U> {
        Frame {
            rows,
            index_field: self.index_field.clone(),
            active_column: self.active_column.clone(),
        }
    }

    pub(crate) fn set_index_field(&mut self, index_field: Option<String>) {
        self.index_field = index_field;
    }
}

impl<T: Clone> Frame<T> {
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        self.with_rows(
            self.rows
                .iter()
                .filter(|row| predicate(row))
                .cloned()
                .collect(),
        )
    }

    /// Partitions rows by `key_fn`.
    ///
    /// Groups appear in first-seen order and keep the relative order of their
    /// rows.
    pub fn group_by<K: Into<GroupKey>>(&self, mut key_fn: impl FnMut(&T) -> K) -> FrameGroup<T> {
        let mut buckets: IndexMap<GroupKey, Vec<T>> = IndexMap::new();
        for row in &self.rows {
            buckets
                .entry(key_fn(row).into())
                .or_default()
                .push(row.clone());
        }
        let groups = buckets
            .into_iter()
            .map(|(key, rows)| (key, self.with_rows(rows)))
            .collect();
        FrameGroup::from_frames(groups, self.index_field.clone())
    }
}

impl<T: Record> Frame<T> {
    /// Groups rows by the value of `index_field` and folds each group.
    ///
    /// `aggregator` runs once per distinct key in first-seen order and the
    /// results form a frame indexed by `index_field`. Equivalent to
    /// `group_by(|r| r.field(index_field)).collapse(index_field, aggregator)`.
    pub fn reduce<U>(
        &self,
        index_field: &str,
        aggregator: impl FnMut(&GroupKey, &Frame<T>) -> U,
    ) -> Frame<U> {
        self.group_by(|row| row.field(index_field))
            .collapse(index_field, aggregator)
    }

    /// Mean of the resolved accessor over non-NA rows, 0 when there are none.
    #[must_use]
    pub fn avg_field(&self, accessor: &ValueAccessor<T>) -> f64 {
        let values = self.numbers(accessor);
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Population standard deviation over non-NA rows, 0 for fewer than two.
    #[must_use]
    pub fn std(&self, accessor: &ValueAccessor<T>) -> f64 {
        let values = self.numbers(accessor);
        if values.len() <= 1 {
            return 0.0;
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count;
        variance.sqrt()
    }

    #[must_use]
    pub fn max(&self, field: &str) -> Option<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.field(field).as_f64())
            .reduce(f64::max)
    }

    #[must_use]
    pub fn min(&self, field: &str) -> Option<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.field(field).as_f64())
            .reduce(f64::min)
    }

    pub fn extent(&self, accessor: &ValueAccessor<T>) -> PlotResult<Extent> {
        Extent::from_values(
            self.rows
                .iter()
                .enumerate()
                .map(|(index, row)| accessor.resolve(row, index)),
        )
    }

    /// Stable numeric sort on `field`.
    ///
    /// Rows whose value coerces to a number come first in ascending order;
    /// the others follow in their previous relative order.
    #[must_use]
    pub fn sort_numerical(mut self, field: &str) -> Self {
        let mut numeric = Vec::with_capacity(self.rows.len());
        let mut other = Vec::new();
        for row in self.rows.drain(..) {
            match row.field(field).as_f64() {
                Some(key) => numeric.push((key, row)),
                None => other.push(row),
            }
        }
        numeric.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        self.rows = numeric.into_iter().map(|(_, row)| row).chain(other).collect();
        self
    }

    /// Adds or overwrites fields computed from each original row.
    pub fn extend<S, I>(&self, fields: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, ValueAccessor<T>)>,
    {
        let fields: Vec<(S, ValueAccessor<T>)> = fields.into_iter().collect();
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let mut extended = row.clone();
                for (name, accessor) in &fields {
                    extended.set_field(name.as_ref(), accessor.resolve(row, index));
                }
                extended
            })
            .collect();
        self.with_rows(rows)
    }

    /// Drops rows whose `field` is NA, defaulting to the active column.
    ///
    /// Without either field name the frame is returned unchanged.
    pub fn drop_na(&self, field: Option<&str>) -> Self {
        let Some(field) = field.or(self.active_column.as_deref()) else {
            return self.clone();
        };
        self.filter(|row| !row.field(field).is_na())
    }

    /// Converts point samples into a held-value stairstep.
    ///
    /// Between two consecutive samples a copy of the earlier row is inserted
    /// with its time moved onto the later timestamp. Rows with an NA time are
    /// dropped.
    pub fn to_step(&self, time_field: &str) -> Self {
        let mut rows = Vec::with_capacity(self.rows.len() * 2);
        let mut previous: Option<&T> = None;
        let mut skipped = 0_usize;
        for row in &self.rows {
            let time = row.field(time_field);
            if time.is_na() {
                skipped += 1;
                continue;
            }
            if let Some(held) = previous {
                let mut held = held.clone();
                held.set_field(time_field, time);
                rows.push(held);
            }
            rows.push(row.clone());
            previous = Some(row);
        }
        if skipped > 0 {
            trace!(skipped, time_field, "step conversion skipped rows without time");
        }
        self.with_rows(rows)
    }

    /// Value of `value_field` held at time `t`: the last row with time <= `t`.
    #[must_use]
    pub fn sample_step(&self, time_field: &str, value_field: &str, t: f64) -> Value {
        self.rows
            .iter()
            .filter(|row| row.field(time_field).as_f64().is_some_and(|time| time <= t))
            .last()
            .map(|row| row.field(value_field))
            .unwrap_or_default()
    }

    /// Accessor reading the index field, or the row position when unset.
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

    fn numbers(&self, accessor: &ValueAccessor<T>) -> Vec<f64> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| accessor.resolve(row, index).as_f64())
            .collect()
    }
}

impl<T: fmt::Debug> Frame<T> {
    /// Dumps the rows through `tracing` at debug level.
    pub fn print(&self) {
        debug!(
            rows = self.rows.len(),
            index_field = self.index_field.as_deref().unwrap_or(""),
            active_column = self.active_column.as_deref().unwrap_or(""),
            "frame"
        );
        for (index, row) in self.rows.iter().enumerate() {
            debug!(index, row = ?row, "frame row");
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Frame<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("index_field", &self.index_field)
            .field("active_column", &self.active_column)
            .field("rows", &self.rows)
            .finish()
    }
}

impl<T> Default for Frame<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> From<Vec<T>> for Frame<T> {
    fn from(rows: Vec<T>) -> Self {
        Self::new(rows)
    }
}

impl<T> FromIterator<T> for Frame<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a Frame<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
