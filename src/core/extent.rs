use serde::{Deserialize, Serialize};

use crate::core::value::Value;
use crate::error::{PlotError, PlotResult};

/// Domain descriptor contributed by a series or computed over a frame group.
///
/// `Empty` is the identity of [`Extent::merge`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extent {
    #[default]
    Empty,
    Numeric { min: f64, max: f64 },
    Categorical(Vec<String>),
}

impl Extent {
    #[must_use]
    pub fn numeric(a: f64, b: f64) -> Self {
        Self::Numeric {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Builds an extent from resolved values, skipping NA.
    ///
    /// A mix of numbers and strings is rejected the same way a merge is.
    pub fn from_values<I>(values: I) -> PlotResult<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut extent = Self::Empty;
        for value in values {
            let piece = match value {
                Value::Number(number) if number.is_finite() => Self::numeric(number, number),
                Value::Text(text) => Self::Categorical(vec![text]),
                _ => continue,
            };
            extent = extent.merge(piece)?;
        }
        Ok(extent)
    }

    /// Merges two extents.
    ///
    /// Numeric ranges take the outer bounds. Categorical sets take the ordered
    /// union with `self` first. Mixing both kinds fails with
    /// [`PlotError::MixedExtent`].
    pub fn merge(self, other: Self) -> PlotResult<Self> {
        match (self, other) {
            (Self::Empty, other) => Ok(other),
            (this, Self::Empty) => Ok(this),
            (
                Self::Numeric { min: a0, max: a1 },
                Self::Numeric { min: b0, max: b1 },
            ) => Ok(Self::Numeric {
                min: a0.min(b0),
                max: a1.max(b1),
            }),
            (Self::Categorical(mut left), Self::Categorical(right)) => {
                for category in right {
                    if !left.contains(&category) {
                        left.push(category);
                    }
                }
                Ok(Self::Categorical(left))
            }
            _ => Err(PlotError::MixedExtent),
        }
    }

    pub fn merge_all<I>(extents: I) -> PlotResult<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        extents
            .into_iter()
            .try_fold(Self::Empty, |acc, extent| acc.merge(extent))
    }

    /// Pads the upper bound of a numeric extent and floors it at zero.
    ///
    /// Categorical and empty extents pass through untouched.
    #[must_use]
    pub fn padded_from_zero(self, padding: f64) -> Self {
        match self {
            Self::Numeric { min, max } => Self::Numeric {
                min: min.min(0.0),
                max: (max + padding).max(0.0),
            },
            other => other,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }

    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::Numeric { min, max } => Some((*min, *max)),
            _ => None,
        }
    }

    #[must_use]
    pub fn categories(&self) -> Option<&[String]> {
        match self {
            Self::Categorical(categories) => Some(categories),
            _ => None,
        }
    }

    /// Reason the extent cannot back an invertible scale, if any.
    #[must_use]
    pub fn degeneracy(&self) -> Option<&'static str> {
        match self {
            Self::Empty => Some("empty domain"),
            Self::Numeric { min, max } if min >= max => Some("single-value numeric domain"),
            Self::Categorical(categories) if categories.len() <= 1 => {
                Some("single-category domain")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Extent;
    use crate::core::Value;
    use crate::error::PlotError;

    #[test]
    fn empty_is_merge_identity() {
        let numeric = Extent::numeric(1.0, 4.0);
        assert_eq!(
            Extent::Empty.merge(numeric.clone()).expect("merge"),
            numeric
        );
        assert_eq!(numeric.clone().merge(Extent::Empty).expect("merge"), numeric);
    }

    #[test]
    fn mixed_values_fail_fast() {
        let err = Extent::from_values([Value::from(1.0), Value::from("a")])
            .expect_err("mixed must fail");
        assert!(matches!(err, PlotError::MixedExtent));
    }

    #[test]
    fn padding_keeps_negative_lower_bound() {
        let padded = Extent::numeric(-3.0, 5.0).padded_from_zero(2.0);
        assert_eq!(padded, Extent::numeric(-3.0, 7.0));
        let lifted = Extent::numeric(4.0, 5.0).padded_from_zero(2.0);
        assert_eq!(lifted, Extent::numeric(0.0, 7.0));
    }

    #[test]
    fn degeneracy_reports_single_points() {
        assert!(Extent::numeric(2.0, 2.0).degeneracy().is_some());
        assert!(Extent::Categorical(vec!["a".into()]).degeneracy().is_some());
        assert!(Extent::numeric(0.0, 1.0).degeneracy().is_none());
    }
}
