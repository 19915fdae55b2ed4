use runscope::api::{DrawStatus, PLOT_SNAPSHOT_JSON_SCHEMA_V1, PlotSnapshot, PlotSurface, PlotSurfaceConfig};
use runscope::core::{Extent, FrameGroup, LineOptions, Row, SeriesKind, Value, Viewport};
use runscope::error::PlotError;
use runscope::render::{NullRenderer, SvgRenderer};

fn buffer_rows() -> Vec<Row> {
    [(0.0, 1.5), (2.0, 3.0), (4.0, 2.0), (6.0, 4.5)]
        .into_iter()
        .map(|(t, level)| Row::new().with("t", t).with("buffer_level", level))
        .collect()
}

fn drawn<R: runscope::render::Renderer>(renderer: R) -> PlotSurface<R> {
    let config = PlotSurfaceConfig::new(Viewport::new(800, 600)).with_transition_ms(0.0);
    let mut surface = PlotSurface::new(renderer, config).expect("surface");
    FrameGroup::from_groups([("run-1", buffer_rows())], "t")
        .col("buffer_level")
        .plot_line(surface.series_list_mut(), LineOptions::default())
        .expect("line");
    surface.draw().expect("draw");
    surface
}

#[test]
fn snapshot_describes_scales_and_series() {
    let surface = drawn(NullRenderer::default());
    let snapshot = surface.snapshot().expect("snapshot");

    assert_eq!(snapshot.status, Some(DrawStatus::Drawn));
    assert_eq!(snapshot.x_extent, Extent::numeric(0.0, 8.0));
    assert!(!snapshot.x_ticks.is_empty());
    assert_eq!(snapshot.axes.len(), 1);
    assert_eq!(snapshot.axes[0].domain, (0.0, 6.5));
    assert!(!snapshot.axes[0].ticks.is_empty());
    assert_eq!(snapshot.series.len(), 1);
    assert_eq!(snapshot.series[0].kind, SeriesKind::Line);
    assert_eq!(snapshot.series[0].group_count, 1);
    assert_eq!(snapshot.series[0].shape_count, 1);
    assert!(!snapshot.zoomed);
    assert!(snapshot.markers.is_empty());
}

#[test]
fn snapshot_before_draw_has_no_scales() {
    let surface = PlotSurface::new(
        NullRenderer::default(),
        PlotSurfaceConfig::new(Viewport::new(640, 480)),
    )
    .expect("surface");
    let snapshot = surface.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, None);
    assert_eq!(snapshot.x_extent, Extent::Empty);
    assert!(snapshot.x_scale.is_none());
    assert!(snapshot.axes.is_empty());
}

#[test]
fn json_contract_is_versioned_and_parses_back() {
    let mut surface = drawn(NullRenderer::default());
    surface.zoom_x(0.0, 320.0).expect("zoom");
    surface.mark_range(64.0, 128.0).expect("mark");

    let json = surface.snapshot_json_contract_v1_pretty().expect("json");
    let payload: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(payload["schema_version"], PLOT_SNAPSHOT_JSON_SCHEMA_V1);
    assert_eq!(payload["snapshot"]["zoomed"], true);

    let parsed = PlotSnapshot::from_json_compat_str(&json).expect("contract");
    assert!(parsed.zoomed);
    assert_eq!(parsed.markers.len(), 1);
    assert_eq!(parsed.series.len(), 1);
    assert_eq!(parsed.axes[0].axis_index, 0);

    let bare = surface.snapshot().expect("snapshot").to_json_pretty().expect("bare");
    let parsed_bare = PlotSnapshot::from_json_compat_str(&bare).expect("bare snapshot");
    assert_eq!(parsed_bare.viewport, Viewport::new(800, 600));
}

#[test]
fn unknown_schema_version_is_rejected() {
    let surface = drawn(NullRenderer::default());
    let json = surface.snapshot_json_contract_v1_pretty().expect("json");
    let mut payload: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    payload["schema_version"] = serde_json::json!(7);
    let err = PlotSnapshot::from_json_compat_str(&payload.to_string()).expect_err("version");
    assert!(matches!(err, PlotError::InvalidData(message) if message.contains('7')));
}

#[test]
fn svg_export_clips_the_plot_layer() {
    let surface = drawn(NullRenderer::default());
    let svg = surface.export_svg().expect("svg");
    assert!(svg.starts_with("<svg xmlns="));
    assert!(svg.contains("<clipPath id='plot-area'>"));
    assert!(svg.contains("clip-path='url(#plot-area)'"));
    assert!(svg.contains("<line "));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn svg_renderer_keeps_the_last_frame() {
    let surface = drawn(SvgRenderer::new());
    let exported = surface.export_svg().expect("svg");
    assert_eq!(surface.renderer().markup(), exported);
    assert_eq!(surface.into_renderer().into_markup(), exported);
}

#[test]
fn svg_export_needs_a_draw_pass() {
    let mut surface = PlotSurface::new(
        NullRenderer::default(),
        PlotSurfaceConfig::new(Viewport::new(800, 600)),
    )
    .expect("surface");
    assert!(matches!(surface.export_svg(), Err(PlotError::NotDrawn)));

    surface.draw().expect("empty draw");
    let svg = surface.export_svg().expect("empty frame");
    assert!(!svg.contains("<line "));
}

#[test]
fn series_columns_are_exported_by_index() {
    let surface = drawn(NullRenderer::default());
    let columns = surface.export_series_columns(0).expect("columns");
    assert_eq!(columns["x"][3], Value::from(6.0));
    assert_eq!(columns["run-1"][0], Value::from(1.5));
    assert!(surface.export_series_columns(4).is_none());
}
