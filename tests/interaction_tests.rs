use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use runscope::api::{BrushOutcome, PlotSurface, PlotSurfaceConfig, SelectionHit};
use runscope::core::{BarOptions, FrameGroup, GroupKey, LineOptions, Row, Viewport};
use runscope::error::PlotError;
use runscope::extensions::MarkerRange;
use runscope::interaction::{BrushKind, InteractionMode};
use runscope::render::NullRenderer;

fn new_surface() -> PlotSurface<NullRenderer> {
    let config = PlotSurfaceConfig::new(Viewport::new(800, 600)).with_transition_ms(0.0);
    PlotSurface::new(NullRenderer::default(), config).expect("surface")
}

/// Line over t = 0..=8: padded X domain [0, 10], 64 px per second.
fn timeline() -> PlotSurface<NullRenderer> {
    let mut surface = new_surface();
    let rows = (0..=8)
        .map(|t| Row::new().with("t", f64::from(t)).with("buffer", 2.0))
        .collect::<Vec<_>>();
    FrameGroup::from_groups([("run", rows)], "t")
        .col("buffer")
        .plot_line(surface.series_list_mut(), LineOptions::default())
        .expect("line");
    surface.draw().expect("draw");
    surface
}

fn outer(surface: &PlotSurface<NullRenderer>, x: f64, y: f64) -> (f64, f64) {
    surface.plot_area().to_outer(x, y)
}

#[test]
fn pointer_before_a_draw_only_records_the_cursor() {
    let mut surface = new_surface();
    surface.pointer_move(100.0, 100.0).expect("move");
    surface.pointer_leave().expect("leave");
    assert!(!surface.ruler().visible);
    assert!(matches!(surface.arm_brush(BrushKind::ZoomX), Err(PlotError::NotDrawn)));
    assert!(matches!(surface.pointer_down(1.0, 1.0), Err(PlotError::NotDrawn)));
    assert!(matches!(surface.click(1.0, 1.0), Err(PlotError::NotDrawn)));
}

#[test]
fn ruler_reads_the_domain_under_the_pointer() {
    let mut surface = timeline();
    let (x, y) = outer(&surface, 320.0, 100.0);
    surface.pointer_move(x, y).expect("move");
    let ruler = surface.ruler();
    assert!(ruler.visible);
    assert_eq!(ruler.label.as_deref(), Some("5.000"));
    assert_relative_eq!(ruler.value.expect("value"), 5.0);

    surface.pointer_move(5.0, y).expect("outside");
    assert!(!surface.ruler().visible);
}

#[test]
fn hover_rebuilds_chrome_over_the_retained_plot_layer() {
    let mut surface = timeline();
    let plot_before = surface.current_frame().expect("frame").plot.clone();
    let chrome_lines = surface.current_frame().expect("frame").chrome.lines.len();
    assert!(!plot_before.lines.is_empty());

    // Series edits only show up on the next draw; hover must not re-project.
    surface.clear_series();
    let (x, y) = outer(&surface, 320.0, 100.0);
    surface.pointer_move(x, y).expect("move");

    let frame = surface.current_frame().expect("frame");
    assert_eq!(frame.plot, plot_before);
    assert_eq!(frame.chrome.lines.len(), chrome_lines + 1);
    assert_eq!(surface.renderer().frames_rendered, 2);

    surface.pointer_leave().expect("leave");
    let frame = surface.current_frame().expect("frame");
    assert_eq!(frame.plot, plot_before);
    assert_eq!(frame.chrome.lines.len(), chrome_lines);
}

#[test]
fn zoom_brush_applies_on_release() {
    let mut surface = timeline();
    surface.arm_brush(BrushKind::ZoomX).expect("arm");
    assert_eq!(surface.interaction_mode(), InteractionMode::Armed(BrushKind::ZoomX));

    let (x0, y0) = outer(&surface, 64.0, 100.0);
    let (x1, y1) = outer(&surface, 192.0, 300.0);
    assert!(surface.pointer_down(x0, y0).expect("down"));
    surface.pointer_move(x1, y1).expect("move");
    assert_eq!(
        surface.interaction_mode(),
        InteractionMode::Brushing(BrushKind::ZoomX)
    );
    let outcome = surface.pointer_up(x1, y1).expect("up");

    assert_eq!(outcome, BrushOutcome::Zoomed);
    assert_eq!(surface.interaction_mode(), InteractionMode::Idle);
    assert_eq!(surface.x_scale().expect("x").range(), (-320.0, 2880.0));
    assert_eq!(surface.y_scale(0).expect("y").range(), (460.0, 0.0));
}

#[test]
fn brush_positions_are_clamped_to_the_plot_area() {
    let mut surface = timeline();
    surface.arm_brush(BrushKind::ZoomX).expect("arm");
    let (x0, y0) = outer(&surface, 320.0, 100.0);
    surface.pointer_down(x0, y0).expect("down");
    let outcome = surface.pointer_up(5_000.0, y0).expect("up");
    assert_eq!(outcome, BrushOutcome::Zoomed);
    assert_eq!(surface.x_scale().expect("x").range(), (-640.0, 640.0));
}

#[test]
fn click_without_drag_does_not_zoom() {
    let mut surface = timeline();
    surface.arm_brush(BrushKind::ZoomXY).expect("arm");
    let (x, y) = outer(&surface, 200.0, 200.0);
    surface.pointer_down(x, y).expect("down");
    assert_eq!(surface.pointer_up(x, y).expect("up"), BrushOutcome::Ignored);
    assert!(!surface.is_zoomed());
}

#[test]
fn pointer_down_needs_an_armed_brush() {
    let mut surface = timeline();
    assert!(!surface.pointer_down(200.0, 200.0).expect("down"));
    assert_eq!(surface.pointer_up(300.0, 300.0).expect("up"), BrushOutcome::Ignored);

    surface.arm_brush(BrushKind::ZoomY).expect("arm");
    surface.cancel_brush().expect("cancel");
    assert_eq!(surface.interaction_mode(), InteractionMode::Idle);
    assert!(!surface.pointer_down(200.0, 200.0).expect("down"));
}

#[test]
fn marker_brush_reports_the_domain_range() {
    let mut surface = timeline();
    let reported: Rc<RefCell<Vec<MarkerRange>>> = Rc::default();
    let sink = Rc::clone(&reported);
    surface.set_marker_callback(move |ranges| sink.borrow_mut().extend_from_slice(ranges));

    surface.arm_brush(BrushKind::Marker).expect("arm");
    let (x0, y) = outer(&surface, 128.0, 200.0);
    let (x1, _) = outer(&surface, 64.0, 200.0);
    surface.pointer_down(x0, y).expect("down");
    let BrushOutcome::Marked(range) = surface.pointer_up(x1, y).expect("up") else {
        panic!("expected a marker range");
    };

    assert_relative_eq!(range.start, 1.0, epsilon = 1e-12);
    assert_relative_eq!(range.end, 2.0, epsilon = 1e-12);
    assert_eq!(*reported.borrow(), [range]);
    assert_eq!(surface.markers(), [range]);
    assert_eq!(surface.selected_log_range(), Some(range));
    assert!(!surface.is_zoomed());

    let region = surface
        .current_frame()
        .expect("frame")
        .chrome
        .rects
        .iter()
        .find(|rect| rect.fill_color == runscope::extensions::MARKER_REGION_COLOR)
        .copied()
        .expect("marker region");
    assert_relative_eq!(region.x, 80.0 + 64.0, epsilon = 1e-9);
    assert_relative_eq!(region.width, 64.0, epsilon = 1e-9);
    assert_relative_eq!(region.height, 460.0);
}

#[test]
fn markers_survive_a_redraw_until_cleared() {
    let mut surface = timeline();
    let range = surface.mark_range(64.0, 128.0).expect("mark").expect("range");
    surface.draw().expect("redraw");
    assert_eq!(surface.markers(), [range]);

    surface.clear_markers().expect("clear");
    assert!(surface.markers().is_empty());
    assert_eq!(surface.selected_log_range(), Some(range));
}

#[test]
fn marker_brush_on_categories_is_ignored() {
    let mut surface = new_surface();
    let rows = vec![
        Row::new().with("video", "bbb").with("stall", 1.0),
        Row::new().with("video", "tos").with("stall", 2.0),
    ];
    FrameGroup::from_groups([("beta", rows)], "video")
        .col("stall")
        .plot_bar(surface.series_list_mut(), BarOptions::default())
        .expect("bar");
    surface.draw().expect("draw");

    assert_eq!(surface.mark_range(10.0, 200.0).expect("mark"), None);
    assert!(surface.markers().is_empty());

    let (x, y) = outer(&surface, 300.0, 100.0);
    surface.pointer_move(x, y).expect("move");
    assert!(surface.ruler().visible);
    assert_eq!(surface.ruler().value, None);
}

#[test]
fn click_selects_the_record_under_the_pointer() {
    let mut surface = new_surface();
    let clicked: Rc<RefCell<Vec<(GroupKey, f64)>>> = Rc::default();
    let sink = Rc::clone(&clicked);
    let rows = (0..4)
        .map(|slot| Row::new().with("slot", f64::from(slot)).with("stall", 10.0))
        .collect::<Vec<_>>();
    FrameGroup::from_groups([("beta", rows)], "slot")
        .col("stall")
        .plot_bar(
            surface.series_list_mut(),
            BarOptions {
                on_select: Some(Box::new(move |key: &GroupKey, row: &Row| {
                    let slot = row.get("slot").and_then(|value| value.as_f64()).unwrap_or(-1.0);
                    sink.borrow_mut().push((key.clone(), slot));
                })),
                ..BarOptions::default()
            },
        )
        .expect("bar");
    surface.draw().expect("draw");

    // X domain [0, 5] over 640 px: 128 px per slot, bars 102.4 px wide.
    let (x, y) = outer(&surface, 2.0 * 128.0 + 50.0, 440.0);
    let hit = surface.click(x, y).expect("click");
    assert_eq!(
        hit,
        Some(SelectionHit {
            series_index: 0,
            group: GroupKey::from("beta"),
            group_index: 0,
            row_index: 2,
        })
    );
    assert_eq!(*clicked.borrow(), [(GroupKey::from("beta"), 2.0)]);

    let (gap_x, gap_y) = outer(&surface, 240.0, 440.0);
    assert_eq!(surface.click(gap_x, gap_y).expect("click"), None);
    assert_eq!(clicked.borrow().len(), 1);
}

#[test]
fn click_ignores_series_without_a_callback() {
    let mut surface = timeline();
    let (x, y) = outer(&surface, 64.0, 230.0);
    assert_eq!(surface.click(x, y).expect("click"), None);
}
