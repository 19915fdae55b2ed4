use crate::error::PlotResult;
use crate::render::{RenderFrame, Renderer};

use super::PlotSurface;

impl<R: Renderer> PlotSurface<R> {
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Target frame of the current state, without any transition applied.
    #[must_use]
    pub fn current_frame(&self) -> Option<&RenderFrame> {
        self.current_frame.as_ref()
    }

    /// Advances the running transition by `delta_ms` and renders the step.
    ///
    /// Returns whether the transition is still running afterwards.
    pub fn advance_transition(&mut self, delta_ms: f64) -> PlotResult<bool> {
        let Some(active) = self.transition.as_mut() else {
            return Ok(false);
        };
        if delta_ms.is_finite() && delta_ms > 0.0 {
            active.elapsed_ms += delta_ms;
        }
        let finished = active.transition.is_finished(active.elapsed_ms);
        let Some(target) = self.current_frame.clone() else {
            self.transition = None;
            return Ok(false);
        };
        let shown = self.displayed_frame(&target);
        if finished {
            self.transition = None;
        }
        self.renderer.render(&shown)?;
        Ok(!finished)
    }

    /// Jumps to the end of the running transition.
    pub fn finish_transition(&mut self) -> PlotResult<()> {
        if self.transition.take().is_none() {
            return Ok(());
        }
        if let Some(target) = self.current_frame.as_ref() {
            self.renderer.render(target)?;
        }
        Ok(())
    }
}
