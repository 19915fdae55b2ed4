use crate::render::{Color, LinePrimitive, RectPrimitive, RenderFrame, RenderLayer, TextPrimitive};

/// Cubic ease-in-out on `t` in `[0, 1]`.
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Timed move of series primitives between two frames of the same scene.
///
/// Only the plot layer is interpolated, pairwise by position. Chrome (axes,
/// ruler, markers) switches to the target frame immediately. When the layers
/// do not line up the transition snaps to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransition {
    from: RenderFrame,
    to: RenderFrame,
    duration_ms: f64,
}

impl FrameTransition {
    #[must_use]
    pub fn new(from: RenderFrame, to: RenderFrame, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms,
        }
    }

    #[must_use]
    pub fn target(&self) -> &RenderFrame {
        &self.to
    }

    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    #[must_use]
    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        self.duration_ms <= 0.0 || elapsed_ms >= self.duration_ms
    }

    /// Frame shown `elapsed_ms` after the transition started.
    #[must_use]
    pub fn frame_at(&self, elapsed_ms: f64) -> RenderFrame {
        if self.is_finished(elapsed_ms) || !layers_align(&self.from.plot, &self.to.plot) {
            return self.to.clone();
        }
        let t = ease_cubic_in_out(elapsed_ms.max(0.0) / self.duration_ms);
        let mut frame = self.to.clone();
        frame.plot = interpolate_layer(&self.from.plot, &self.to.plot, t);
        frame
    }
}

fn layers_align(a: &RenderLayer, b: &RenderLayer) -> bool {
    a.rects.len() == b.rects.len() && a.lines.len() == b.lines.len() && a.texts.len() == b.texts.len()
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    Color::rgba(
        lerp(a.red, b.red, t),
        lerp(a.green, b.green, t),
        lerp(a.blue, b.blue, t),
        lerp(a.alpha, b.alpha, t),
    )
}

fn interpolate_layer(from: &RenderLayer, to: &RenderLayer, t: f64) -> RenderLayer {
    RenderLayer {
        rects: from
            .rects
            .iter()
            .zip(&to.rects)
            .map(|(a, b)| {
                RectPrimitive::new(
                    lerp(a.x, b.x, t),
                    lerp(a.y, b.y, t),
                    lerp(a.width, b.width, t),
                    lerp(a.height, b.height, t),
                    lerp_color(a.fill_color, b.fill_color, t),
                )
            })
            .collect(),
        lines: from
            .lines
            .iter()
            .zip(&to.lines)
            .map(|(a, b)| {
                LinePrimitive::new(
                    lerp(a.x1, b.x1, t),
                    lerp(a.y1, b.y1, t),
                    lerp(a.x2, b.x2, t),
                    lerp(a.y2, b.y2, t),
                    lerp(a.stroke_width, b.stroke_width, t),
                    lerp_color(a.color, b.color, t),
                )
            })
            .collect(),
        texts: from
            .texts
            .iter()
            .zip(&to.texts)
            .map(|(a, b)| TextPrimitive {
                x: lerp(a.x, b.x, t),
                y: lerp(a.y, b.y, t),
                ..b.clone()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::ease_cubic_in_out;

    #[test]
    fn easing_is_anchored_and_symmetric() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() <= 1e-12);
        assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() <= 1e-12);
    }
}
