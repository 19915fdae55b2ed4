use crate::error::PlotResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content so invalid geometry surfaces as an error.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames_rendered: usize,
    pub last_line_count: usize,
    pub last_rect_count: usize,
    pub last_text_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_line_count = frame.plot.lines.len() + frame.chrome.lines.len();
        self.last_rect_count = frame.plot.rects.len() + frame.chrome.rects.len();
        self.last_text_count = frame.plot.texts.len() + frame.chrome.texts.len();
        Ok(())
    }
}
