use serde::{Deserialize, Serialize};

use crate::core::{PlotArea, Viewport};
use crate::error::{PlotError, PlotResult};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

/// Primitives of one layer, in viewport pixels and drawing order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderLayer {
    pub rects: Vec<RectPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderLayer {
    pub fn validate(&self) -> PlotResult<()> {
        for rect in &self.rects {
            rect.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.rects.is_empty() && self.texts.is_empty()
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.rects.len() + self.texts.len()
    }

    pub fn extend(&mut self, other: RenderLayer) {
        self.rects.extend(other.rects);
        self.lines.extend(other.lines);
        self.texts.extend(other.texts);
    }
}

/// Backend-agnostic scene for one plot draw pass.
///
/// `plot` holds series primitives clipped to `plot_area`; `chrome` holds axes,
/// the hover ruler and marker regions, drawn unclipped on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub plot_area: PlotArea,
    pub plot: RenderLayer,
    pub chrome: RenderLayer,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport, plot_area: PlotArea) -> Self {
        Self {
            viewport,
            plot_area,
            plot: RenderLayer::default(),
            chrome: RenderLayer::default(),
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        if !self.viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        self.plot.validate()?;
        self.chrome.validate()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plot.is_empty() && self.chrome.is_empty()
    }
}
