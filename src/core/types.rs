use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Outer pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Pixel margins between the viewport edge and the plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn validate(self) -> PlotResult<Self> {
        for (value, name) in [
            (self.top, "top"),
            (self.right, "right"),
            (self.bottom, "bottom"),
            (self.left, "left"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "margin `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(70.0, 80.0, 70.0, 80.0)
    }
}

/// Inner plotting rectangle in viewport pixels.
///
/// Series primitives are clipped to this rectangle. Pointer input is accepted
/// in viewport pixels and translated with [`PlotArea::to_inner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn from_viewport(viewport: Viewport, margins: Margins) -> PlotResult<Self> {
        if !viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let margins = margins.validate()?;
        let width = f64::from(viewport.width) - margins.left - margins.right;
        let height = f64::from(viewport.height) - margins.top - margins.bottom;
        if width <= 0.0 || height <= 0.0 {
            return Err(PlotError::InvalidData(format!(
                "margins leave no plotting area: inner={width}x{height}"
            )));
        }
        Ok(Self {
            left: margins.left,
            top: margins.top,
            width,
            height,
        })
    }

    /// Converts viewport coordinates into plot-area coordinates.
    #[must_use]
    pub fn to_inner(self, x: f64, y: f64) -> (f64, f64) {
        (x - self.left, y - self.top)
    }

    /// Converts plot-area coordinates back into viewport coordinates.
    #[must_use]
    pub fn to_outer(self, x: f64, y: f64) -> (f64, f64) {
        (x + self.left, y + self.top)
    }

    #[must_use]
    pub fn contains_inner(self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}
