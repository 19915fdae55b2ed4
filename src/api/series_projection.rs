use tracing::trace;

use crate::core::{LinearScale, PlotArea, Series, SeriesShape, XScale};
use crate::render::{LinePrimitive, RectPrimitive, TextPrimitive};

use super::surface::{HitRegion, ProjectedSeries};

const GRID_STROKE_WIDTH: f64 = 1.0;

/// Projects the retained shapes of one series into viewport pixels.
///
/// Offsets and sizes are in domain units and scale with the pixel size of one
/// unit, so zoomed projections keep lanes and bar widths proportional.
pub(super) fn project_series(
    series_index: usize,
    series: &dyn Series,
    x_scale: &XScale,
    y_scale: &LinearScale,
    area: PlotArea,
    font_size_px: f64,
) -> ProjectedSeries {
    let x_unit = x_scale.unit();
    let y_unit = y_scale.unit();
    let selectable = series.is_selectable();
    let mut projected = ProjectedSeries::default();
    let mut skipped = 0_usize;

    for shape in series.shapes() {
        match shape {
            SeriesShape::Rect(rect) => {
                let (Some(x), Ok(y)) = (x_scale.position(&rect.x), y_scale.to_pixel(rect.y))
                else {
                    skipped += 1;
                    continue;
                };
                let primitive = RectPrimitive::from_corners(
                    area.left + x + x_unit * rect.x_offset,
                    area.top + y - y_unit * rect.y_offset,
                    rect.width * x_unit,
                    rect.height * y_unit,
                    rect.color,
                );
                if !primitive.x.is_finite() || !primitive.width.is_finite() {
                    skipped += 1;
                    continue;
                }
                projected.layer.rects.push(primitive);
                if selectable {
                    projected.hits.push(HitRegion {
                        series_index,
                        group_index: rect.group_index,
                        row_index: rect.row_index,
                        rect: primitive,
                    });
                }
            }
            SeriesShape::Line(line) => {
                let points: Vec<(f64, f64)> = line
                    .points
                    .iter()
                    .filter_map(|(x, y)| {
                        Some((
                            area.left + x_scale.position(x)?,
                            area.top + y_scale.to_pixel(*y).ok()?,
                        ))
                    })
                    .collect();
                projected
                    .layer
                    .lines
                    .extend(points.windows(2).map(|pair| {
                        LinePrimitive::new(
                            pair[0].0,
                            pair[0].1,
                            pair[1].0,
                            pair[1].1,
                            line.stroke_width,
                            line.color,
                        )
                    }));
            }
            SeriesShape::Text(text) => {
                let (Some(x), Ok(y)) = (x_scale.position(&text.x), y_scale.to_pixel(text.y))
                else {
                    skipped += 1;
                    continue;
                };
                projected.layer.texts.push(TextPrimitive::new(
                    text.text.clone(),
                    area.left + x + x_unit * text.x_offset,
                    area.top + y - y_unit * text.y_offset,
                    font_size_px,
                    text.color,
                    text.h_align,
                ));
            }
            SeriesShape::GridLine(grid) => {
                let Ok(y) = y_scale.to_pixel(grid.y) else {
                    skipped += 1;
                    continue;
                };
                projected.layer.lines.push(LinePrimitive::new(
                    area.left,
                    area.top + y,
                    area.left + area.width,
                    area.top + y,
                    GRID_STROKE_WIDTH,
                    grid.color,
                ));
            }
        }
    }

    if skipped > 0 {
        trace!(series_index, skipped, "series shapes skipped during projection");
    }
    projected
}
