use serde::{Deserialize, Serialize};

use crate::core::{PlotArea, XScale};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, RectPrimitive};

/// Fill of the temporary region shown for a marker brush.
pub const MARKER_REGION_COLOR: Color = Color::rgba(0.5, 0.5, 0.5, 0.2);

/// X interval selected with the marker brush, in domain units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerRange {
    pub start: f64,
    pub end: f64,
}

impl MarkerRange {
    /// Builds a range from two domain values in any order.
    pub fn new(a: f64, b: f64) -> PlotResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(PlotError::InvalidData(
                "marker bounds must be finite".to_owned(),
            ));
        }
        Ok(Self {
            start: a.min(b),
            end: a.max(b),
        })
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }

    /// Inverts a brushed pixel interval through a linear X scale.
    ///
    /// Returns `None` over a categorical scale.
    pub fn from_pixels(x_scale: &XScale, x0: f64, x1: f64) -> PlotResult<Option<Self>> {
        let (Some(a), Some(b)) = (x_scale.invert(x0), x_scale.invert(x1)) else {
            return Ok(None);
        };
        Self::new(a, b).map(Some)
    }
}

/// Host hook receiving the marker list after every marker brush.
pub type MarkerCallback = Box<dyn FnMut(&[MarkerRange])>;

/// Full-height regions for `markers` under the current X projection, in
/// viewport pixels. Markers outside the visible range are dropped.
#[must_use]
pub fn project_marker_regions(
    markers: &[MarkerRange],
    x_scale: &XScale,
    plot_area: PlotArea,
) -> Vec<RectPrimitive> {
    let Some(linear) = x_scale.as_linear() else {
        return Vec::new();
    };
    markers
        .iter()
        .filter_map(|marker| {
            let x0 = linear.to_pixel(marker.start).ok()?;
            let x1 = linear.to_pixel(marker.end).ok()?;
            let left = x0.min(x1).max(0.0);
            let right = x0.max(x1).min(plot_area.width);
            if right <= left {
                return None;
            }
            Some(RectPrimitive::new(
                plot_area.left + left,
                plot_area.top,
                right - left,
                plot_area.height,
                MARKER_REGION_COLOR,
            ))
        })
        .collect()
}
