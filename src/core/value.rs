use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Field value of a record.
///
/// `Missing` and non-finite numbers (`NaN`, `±inf`) are treated as NA: they
/// contribute nothing to extents and aggregates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Value {
    #[must_use]
    pub fn is_na(&self) -> bool {
        match self {
            Self::Number(value) => !value.is_finite(),
            Self::Text(_) => false,
            Self::Missing => true,
        }
    }

    /// Strict numeric view: only finite numbers.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// Numeric coercion: numbers and numeric-looking strings.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Identifier of one group inside a [`crate::core::FrameGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Number(OrderedFloat<f64>),
    Text(String),
    Missing,
}

impl GroupKey {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(value) => Value::Number(value.into_inner()),
            Self::Text(text) => Value::Text(text.clone()),
            Self::Missing => Value::Missing,
        }
    }

    /// Numeric coercion of the key, accepting numeric-looking text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.to_value().as_f64()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.into_inner()),
            Self::Text(text) => f.write_str(text),
            Self::Missing => f.write_str("NA"),
        }
    }
}

impl From<Value> for GroupKey {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) if number.is_finite() => Self::Number(OrderedFloat(number)),
            Value::Text(text) => Self::Text(text),
            _ => Self::Missing,
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for GroupKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for GroupKey {
    fn from(value: f64) -> Self {
        Value::Number(value).into()
    }
}

impl From<usize> for GroupKey {
    fn from(value: usize) -> Self {
        Self::Number(OrderedFloat(value as f64))
    }
}

impl From<i64> for GroupKey {
    fn from(value: i64) -> Self {
        Self::Number(OrderedFloat(value as f64))
    }
}

/// Record type stored in frames.
///
/// Engine operations never mutate a stored record: `set_field` is only called
/// on clones while building a new frame.
pub trait Record: Clone {
    fn field(&self, name: &str) -> Value;
    fn set_field(&mut self, name: &str, value: Value);
}

/// Dynamic record with ordered named fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, Value>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Record for Row {
    fn field(&self, name: &str) -> Value {
        self.0.get(name).cloned().unwrap_or_default()
    }

    fn set_field(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_owned(), value);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
