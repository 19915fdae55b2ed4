use serde::{Deserialize, Serialize};

use crate::core::{Margins, Viewport};
use crate::error::{PlotError, PlotResult};

/// Public plot surface bootstrap configuration.
///
/// Serializable so hosts can persist plot setup next to their run selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotSurfaceConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub margins: Margins,
    /// Added to the upper bound of the merged X domain.
    #[serde(default = "default_x_padding")]
    pub x_padding: f64,
    /// Added to the upper bound of every merged Y domain.
    #[serde(default = "default_y_padding")]
    pub y_padding: f64,
    /// Horizontal distance between consecutive right-side axes.
    #[serde(default = "default_axis_offset_px")]
    pub axis_offset_px: f64,
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
    #[serde(default = "default_tick_font_size_px")]
    pub tick_font_size_px: f64,
    #[serde(default = "default_tick_size_px")]
    pub tick_size_px: f64,
    #[serde(default = "default_transition_ms")]
    pub transition_ms: f64,
    /// Range factor applied for a negative wheel delta.
    #[serde(default = "default_wheel_zoom_in_factor")]
    pub wheel_zoom_in_factor: f64,
    /// Range factor applied for a positive wheel delta.
    #[serde(default = "default_wheel_zoom_out_factor")]
    pub wheel_zoom_out_factor: f64,
    #[serde(default = "default_ruler_decimals")]
    pub ruler_decimals: usize,
    /// Ruler length below the plot area, reaching into the X axis.
    #[serde(default = "default_ruler_overhang_px")]
    pub ruler_overhang_px: f64,
}

impl PlotSurfaceConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margins: Margins::default(),
            x_padding: default_x_padding(),
            y_padding: default_y_padding(),
            axis_offset_px: default_axis_offset_px(),
            tick_count: default_tick_count(),
            tick_font_size_px: default_tick_font_size_px(),
            tick_size_px: default_tick_size_px(),
            transition_ms: default_transition_ms(),
            wheel_zoom_in_factor: default_wheel_zoom_in_factor(),
            wheel_zoom_out_factor: default_wheel_zoom_out_factor(),
            ruler_decimals: default_ruler_decimals(),
            ruler_overhang_px: default_ruler_overhang_px(),
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Sets the duration of zoom transitions; `0` applies zooms immediately.
    #[must_use]
    pub fn with_transition_ms(mut self, transition_ms: f64) -> Self {
        self.transition_ms = transition_ms;
        self
    }

    pub fn validate(self) -> PlotResult<Self> {
        if !self.viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.margins.validate()?;
        for (value, name) in [
            (self.x_padding, "x_padding"),
            (self.y_padding, "y_padding"),
            (self.axis_offset_px, "axis_offset_px"),
            (self.tick_size_px, "tick_size_px"),
            (self.transition_ms, "transition_ms"),
            (self.ruler_overhang_px, "ruler_overhang_px"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "surface config `{name}` must be finite and >= 0"
                )));
            }
        }
        for (value, name) in [
            (self.tick_font_size_px, "tick_font_size_px"),
            (self.wheel_zoom_in_factor, "wheel_zoom_in_factor"),
            (self.wheel_zoom_out_factor, "wheel_zoom_out_factor"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "surface config `{name}` must be finite and > 0"
                )));
            }
        }
        if self.tick_count == 0 {
            return Err(PlotError::InvalidData(
                "surface config `tick_count` must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

fn default_x_padding() -> f64 {
    2.0
}

fn default_y_padding() -> f64 {
    2.0
}

fn default_axis_offset_px() -> f64 {
    20.0
}

fn default_tick_count() -> usize {
    10
}

fn default_tick_font_size_px() -> f64 {
    10.0
}

fn default_tick_size_px() -> f64 {
    6.0
}

fn default_transition_ms() -> f64 {
    1000.0
}

fn default_wheel_zoom_in_factor() -> f64 {
    1.2
}

fn default_wheel_zoom_out_factor() -> f64 {
    0.8
}

fn default_ruler_decimals() -> usize {
    3
}

fn default_ruler_overhang_px() -> f64 {
    25.0
}
