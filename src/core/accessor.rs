use std::fmt;
use std::sync::Arc;

use crate::core::value::{Record, Value};

pub type AccessorFn<T, V> = Arc<dyn Fn(&T, usize) -> V + Send + Sync + 'static>;

/// Visual-channel value: a literal or a per-row derivation.
///
/// Every channel (x, y, width, height, color, opacity, text) is resolved
/// through [`Accessor::resolve`], so call sites never inspect the variant.
pub enum Accessor<T, V> {
    Constant(V),
    Derived(AccessorFn<T, V>),
}

/// Accessor producing record values (coordinates and sizes).
pub type ValueAccessor<T> = Accessor<T, Value>;

impl<T, V> Accessor<T, V> {
    #[must_use]
    pub fn constant(value: V) -> Self {
        Self::Constant(value)
    }

    #[must_use]
    pub fn derived(derive: impl Fn(&T, usize) -> V + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(derive))
    }

    /// Resolves the accessor against the record at `index`.
    pub fn resolve(&self, row: &T, index: usize) -> V
    where
        V: Clone,
    {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Derived(derive) => derive(row, index),
        }
    }
}

impl<T: Record + 'static> Accessor<T, Value> {
    /// Reads a named field from each record.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::derived(move |row: &T, _| row.field(&name))
    }

    /// Shorthand for a derivation returning a number.
    #[must_use]
    pub fn number(derive: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        Self::derived(move |row: &T, _| Value::Number(derive(row)))
    }
}

impl<T: 'static> Accessor<T, Value> {
    /// Numeric sum of two accessors; NA when either side is not numeric.
    #[must_use]
    pub fn sum(&self, other: &Self) -> Self {
        combine(self, other, |left, right| left + right)
    }

    /// Numeric difference `self - other`; NA when either side is not numeric.
    #[must_use]
    pub fn subtract(&self, other: &Self) -> Self {
        combine(self, other, |left, right| left - right)
    }
}

fn combine<T: 'static>(
    left: &Accessor<T, Value>,
    right: &Accessor<T, Value>,
    op: fn(f64, f64) -> f64,
) -> Accessor<T, Value> {
    if let (Accessor::Constant(a), Accessor::Constant(b)) = (left, right) {
        return Accessor::Constant(match (a.as_number(), b.as_number()) {
            (Some(a), Some(b)) => Value::Number(op(a, b)),
            _ => Value::Missing,
        });
    }
    let left = left.clone();
    let right = right.clone();
    Accessor::derived(move |row: &T, index| {
        match (
            left.resolve(row, index).as_number(),
            right.resolve(row, index).as_number(),
        ) {
            (Some(a), Some(b)) => Value::Number(op(a, b)),
            _ => Value::Missing,
        }
    })
}

impl<T, V: Clone> Clone for Accessor<T, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Derived(derive) => Self::Derived(Arc::clone(derive)),
        }
    }
}

impl<T, V: fmt::Debug> fmt::Debug for Accessor<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl<T> From<f64> for Accessor<T, Value> {
    fn from(value: f64) -> Self {
        Self::Constant(Value::Number(value))
    }
}

impl<T> From<&str> for Accessor<T, Value> {
    fn from(value: &str) -> Self {
        Self::Constant(Value::from(value))
    }
}

impl<T> From<f64> for Accessor<T, f64> {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl<T> From<&str> for Accessor<T, String> {
    fn from(value: &str) -> Self {
        Self::Constant(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::Accessor;
    use crate::core::{Row, Value};

    #[test]
    fn constant_resolves_to_itself_for_every_row() {
        let accessor: Accessor<Row, Value> = Accessor::from(4.0);
        let row = Row::new().with("x", 1.0);
        assert_eq!(accessor.resolve(&row, 0), Value::Number(4.0));
        assert_eq!(accessor.resolve(&row, 9), Value::Number(4.0));
    }

    #[test]
    fn derived_receives_row_and_position() {
        let accessor: Accessor<Row, Value> = Accessor::derived(|row: &Row, index| {
            Value::Number(row.get("x").and_then(Value::as_number).unwrap_or(0.0) + index as f64)
        });
        let row = Row::new().with("x", 10.0);
        assert_eq!(accessor.resolve(&row, 3), Value::Number(13.0));
    }

    #[test]
    fn sum_propagates_na() {
        let x: Accessor<Row, Value> = Accessor::field("x");
        let span: Accessor<Row, Value> = Accessor::field("span");
        let end = x.sum(&span);
        let full = Row::new().with("x", 2.0).with("span", 3.0);
        let partial = Row::new().with("x", 2.0);
        assert_eq!(end.resolve(&full, 0), Value::Number(5.0));
        assert!(end.resolve(&partial, 0).is_na());
    }

    #[test]
    fn constant_difference_folds_eagerly() {
        let a: Accessor<Row, Value> = Accessor::from(7.0);
        let b: Accessor<Row, Value> = Accessor::from(2.0);
        assert!(matches!(a.subtract(&b), Accessor::Constant(Value::Number(v)) if v == 5.0));
    }
}
