use std::fmt::Write as _;

use crate::error::PlotResult;
use crate::render::{RenderFrame, RenderLayer, Renderer, TextHAlign};

const FONT_FAMILY: &str = "Inter, Segoe UI, sans-serif";
const CLIP_ID: &str = "plot-area";

/// Renderer keeping the SVG markup of the last frame.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    last_markup: String,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn markup(&self) -> &str {
        &self.last_markup
    }

    #[must_use]
    pub fn into_markup(self) -> String {
        self.last_markup
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        self.last_markup = frame_to_svg(frame);
        Ok(())
    }
}

/// Serializes a frame into standalone SVG markup.
///
/// Plot primitives are clipped to the plot area; chrome is drawn on top.
#[must_use]
pub fn frame_to_svg(frame: &RenderFrame) -> String {
    let width = frame.viewport.width;
    let height = frame.viewport.height;
    let area = frame.plot_area;
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{width}' height='{height}' viewBox='0 0 {width} {height}'>"
    );
    let _ = writeln!(svg, "  <defs>");
    let _ = writeln!(
        svg,
        "    <clipPath id='{CLIP_ID}'><rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}'/></clipPath>",
        area.left, area.top, area.width, area.height
    );
    let _ = writeln!(svg, "  </defs>");
    let _ = writeln!(
        svg,
        "  <rect width='{width}' height='{height}' fill='#ffffff'/>"
    );

    let _ = writeln!(svg, "  <g clip-path='url(#{CLIP_ID})'>");
    write_layer(&mut svg, &frame.plot, "    ");
    let _ = writeln!(svg, "  </g>");
    let _ = writeln!(svg, "  <g>");
    write_layer(&mut svg, &frame.chrome, "    ");
    let _ = writeln!(svg, "  </g>");
    let _ = writeln!(svg, "</svg>");
    svg
}

fn write_layer(svg: &mut String, layer: &RenderLayer, indent: &str) {
    for rect in &layer.rects {
        let _ = writeln!(
            svg,
            "{indent}<rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='{}'/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            rect.fill_color.css()
        );
    }
    for line in &layer.lines {
        let _ = writeln!(
            svg,
            "{indent}<line x1='{:.2}' y1='{:.2}' x2='{:.2}' y2='{:.2}' stroke='{}' stroke-width='{:.2}'/>",
            line.x1,
            line.y1,
            line.x2,
            line.y2,
            line.color.css(),
            line.stroke_width
        );
    }
    for text in &layer.texts {
        let anchor = match text.h_align {
            TextHAlign::Left => "start",
            TextHAlign::Center => "middle",
            TextHAlign::Right => "end",
        };
        let _ = writeln!(
            svg,
            "{indent}<text x='{:.2}' y='{:.2}' text-anchor='{anchor}' fill='{}' font-family='{FONT_FAMILY}' font-size='{:.1}'>{}</text>",
            text.x,
            text.y,
            text.color.css(),
            text.font_size_px,
            escape_text(&text.text)
        );
    }
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
