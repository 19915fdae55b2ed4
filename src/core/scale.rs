use serde::{Deserialize, Serialize};

use crate::core::extent::Extent;
use crate::core::ticks::nice_ticks;
use crate::core::value::Value;
use crate::error::{PlotError, PlotResult};

/// Continuous scale mapping a numeric domain onto a pixel range.
///
/// Zoom only ever changes the range; the domain is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> PlotResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(PlotError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        validate_range(range)?;
        Ok(Self { domain, range })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    pub fn set_range(&mut self, range: (f64, f64)) -> PlotResult<()> {
        validate_range(range)?;
        self.range = range;
        Ok(())
    }

    pub fn to_pixel(self, value: f64) -> PlotResult<f64> {
        if !value.is_finite() {
            return Err(PlotError::InvalidData("value must be finite".to_owned()));
        }
        let normalized = (value - self.domain.0) / (self.domain.1 - self.domain.0);
        Ok(self.range.0 + normalized * (self.range.1 - self.range.0))
    }

    pub fn to_domain(self, pixel: f64) -> PlotResult<f64> {
        if !pixel.is_finite() {
            return Err(PlotError::InvalidData("pixel must be finite".to_owned()));
        }
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return Err(PlotError::InvalidData(
                "scale range must be non-zero to invert".to_owned(),
            ));
        }
        let normalized = (pixel - self.range.0) / span;
        Ok(self.domain.0 + normalized * (self.domain.1 - self.domain.0))
    }

    /// Pixels per domain unit, always positive.
    #[must_use]
    pub fn unit(self) -> f64 {
        ((self.range.1 - self.range.0) / (self.domain.1 - self.domain.0)).abs()
    }

    /// Domain interval currently mapped onto the pixel window `[a, b]`.
    pub fn visible_domain(self, a: f64, b: f64) -> PlotResult<(f64, f64)> {
        let start = self.to_domain(a)?;
        let end = self.to_domain(b)?;
        Ok((start.min(end), start.max(end)))
    }

    /// Nice ticks over the whole domain.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Categorical scale splitting the range into equal bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    categories: Vec<String>,
    range: (f64, f64),
}

impl BandScale {
    pub fn new(categories: Vec<String>, range: (f64, f64)) -> PlotResult<Self> {
        if categories.is_empty() {
            return Err(PlotError::InvalidData(
                "band scale requires at least one category".to_owned(),
            ));
        }
        validate_range(range)?;
        Ok(Self { categories, range })
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn set_range(&mut self, range: (f64, f64)) -> PlotResult<()> {
        validate_range(range)?;
        self.range = range;
        Ok(())
    }

    /// Band width in pixels; also the pixel size of one domain unit.
    #[must_use]
    pub fn step(&self) -> f64 {
        (self.range.1 - self.range.0) / self.categories.len() as f64
    }

    /// Start pixel of the band holding `category`.
    #[must_use]
    pub fn position(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .position(|candidate| candidate == category)
            .map(|index| self.range.0 + index as f64 * self.step())
    }

    /// Category whose band contains `pixel`.
    #[must_use]
    pub fn category_at(&self, pixel: f64) -> Option<&str> {
        let step = self.step();
        if step == 0.0 || !pixel.is_finite() {
            return None;
        }
        let index = ((pixel - self.range.0) / step).floor();
        if index < 0.0 {
            return None;
        }
        self.categories.get(index as usize).map(String::as_str)
    }
}

/// Shared X scale: continuous for numeric domains, banded for categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XScale {
    Linear(LinearScale),
    Band(BandScale),
}

impl XScale {
    /// Chooses the scale kind from a merged, non-empty extent.
    pub fn from_extent(extent: &Extent, range: (f64, f64)) -> PlotResult<Self> {
        match extent {
            Extent::Numeric { min, max } => Ok(Self::Linear(LinearScale::new((*min, *max), range)?)),
            Extent::Categorical(categories) => {
                Ok(Self::Band(BandScale::new(categories.clone(), range)?))
            }
            Extent::Empty => Err(PlotError::InvalidData(
                "cannot build an x scale over an empty extent".to_owned(),
            )),
        }
    }

    /// Pixel position of a data value; `None` for NA or a value of the wrong kind.
    #[must_use]
    pub fn position(&self, value: &Value) -> Option<f64> {
        match (self, value) {
            (Self::Linear(scale), Value::Number(number)) => scale.to_pixel(*number).ok(),
            (Self::Band(scale), Value::Text(text)) => scale.position(text),
            (Self::Band(scale), Value::Number(number)) if !number.is_nan() => {
                scale.position(&number.to_string())
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn unit(&self) -> f64 {
        match self {
            Self::Linear(scale) => scale.unit(),
            Self::Band(scale) => scale.step().abs(),
        }
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Linear(scale) => scale.range(),
            Self::Band(scale) => scale.range(),
        }
    }

    pub fn set_range(&mut self, range: (f64, f64)) -> PlotResult<()> {
        match self {
            Self::Linear(scale) => scale.set_range(range),
            Self::Band(scale) => scale.set_range(range),
        }
    }

    /// Numeric domain value at `pixel`; only continuous scales invert.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> Option<f64> {
        match self {
            Self::Linear(scale) => scale.to_domain(pixel).ok(),
            Self::Band(_) => None,
        }
    }

    #[must_use]
    pub fn as_linear(&self) -> Option<LinearScale> {
        match self {
            Self::Linear(scale) => Some(*scale),
            Self::Band(_) => None,
        }
    }
}

fn validate_range(range: (f64, f64)) -> PlotResult<()> {
    if !range.0.is_finite() || !range.1.is_finite() {
        return Err(PlotError::InvalidData(
            "scale range must be finite".to_owned(),
        ));
    }
    Ok(())
}
