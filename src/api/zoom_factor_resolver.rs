use crate::error::{PlotError, PlotResult};

/// Range factor for one wheel event: `zoom_in` for a negative delta,
/// `zoom_out` for a positive one, `None` for zero.
pub(super) fn resolve_wheel_zoom_factor(
    wheel_delta: f64,
    zoom_in: f64,
    zoom_out: f64,
) -> PlotResult<Option<f64>> {
    if !wheel_delta.is_finite() {
        return Err(PlotError::InvalidData(
            "wheel delta must be finite".to_owned(),
        ));
    }
    if wheel_delta == 0.0 {
        return Ok(None);
    }
    let factor = if wheel_delta < 0.0 { zoom_in } else { zoom_out };
    if !factor.is_finite() || factor <= 0.0 {
        return Err(PlotError::InvalidData(
            "wheel zoom factor must be finite and > 0".to_owned(),
        ));
    }
    Ok(Some(factor))
}

/// Affine map sending pixel `from` to `0` and pixel `to` to `span`.
pub(super) fn remap_range(range: (f64, f64), from: f64, to: f64, span: f64) -> (f64, f64) {
    let scale = span / (to - from);
    ((range.0 - from) * scale, (range.1 - from) * scale)
}

/// Scales both ends of `range` around `anchor`.
pub(super) fn scale_range_around(range: (f64, f64), anchor: f64, factor: f64) -> (f64, f64) {
    (
        anchor + (range.0 - anchor) * factor,
        anchor + (range.1 - anchor) * factor,
    )
}
