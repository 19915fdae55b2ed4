use std::cell::RefCell;
use std::rc::Rc;

use runscope::api::{DrawStatus, PlotSurface};
use runscope::core::{Extent, GroupKey, Palette, SeriesKind, SeriesList, SeriesShape, Viewport};
use runscope::error::PlotError;
use runscope::render::NullRenderer;
use runscope::runs::{PlaybackPlotConfig, RunData, RunSegment, build_playback_series};
use serde_json::json;

fn segment(index: u32, start: f64, first_byte: f64, stop: f64, last_byte: f64) -> serde_json::Value {
    json!({
        "index": index,
        "start_time": start,
        "first_byte_at": first_byte,
        "stop_time": stop,
        "last_byte_at": last_byte,
        "quality": 3 + index,
        "bitrate": 1000 * (index + 1),
        "total_bytes": 100,
        "stopped_bytes": 100,
        "received_bytes": 100,
        "duration": 2.0,
    })
}

/// Run "alpha" on a relative clock with one flushed segment, run "bravo" on
/// an absolute clock starting at 200000 s.
fn two_runs() -> Vec<RunData> {
    let mut flushed = segment(1, 2.0, 2.2, 3.0, 3.5);
    flushed["stopped_bytes"] = json!(50);
    flushed["received_bytes"] = json!(60);
    let runs = json!([
        {
            "run_id": "alpha",
            "run_config": {"run_id": "res/alpha", "input": "https://server:443/bbb.mpd"},
            "segments": [segment(0, 0.0, 0.5, 2.0, 2.0), flushed],
            "stalls": [{"time_start": 3.0, "time_end": 3.5}],
            "vmaf": {"frames": [
                {"frameNum": 0, "metrics": {"vmaf": 90.0}},
                {"frameNum": 24, "metrics": {"vmaf": 80.0}}
            ]},
            "states": [{"time": 0.0, "position": 0.0, "state": "playing"}, {"time": 4.0, "position": 4.0, "state": "playing"}],
            "buffer_level": [{"time": 0.0, "level": 0.0}, {"time": 2.0, "level": 1.5}],
            "bandwidth_actual": [{"time": 0.0, "bw": 4000.0}, {"time": 1.0, "bw": 300.0}],
            "bandwidth_estimate": [{"time": 0.5, "bandwidth": 3500.0}, {"time": 2.0, "bandwidth": 2500.0}],
            "tc_stats": [
                {"time": 0.0, "qdiscs": {"1:": {"backlog": 10, "dropped": 0, "type": "tbf"}}},
                {"time": 1.0, "qdiscs": {"2:": {"backlog": 5, "dropped": 1, "type": "netem"}}},
                {"time": 2.0, "qdiscs": {"1:": {"backlog": 30, "dropped": 2, "type": "tbf"}}}
            ]
        },
        {
            "run_id": "bravo",
            "run_config": {"run_id": "res/bravo", "input": "https://server:443/bbb.mpd"},
            "playback_start_time": 200000.0,
            "segments": [
                segment(0, 200000.5, 200001.0, 200002.0, 200002.0),
                segment(1, 200002.0, 200002.5, 200004.0, 200004.0)
            ]
        }
    ]);
    RunData::parse_many(&runs.to_string()).expect("runs")
}

#[test]
fn default_layers_build_downloads_stalls_quality_and_vmaf() {
    let runs = two_runs();
    let mut list = SeriesList::new();
    let plot = build_playback_series(&runs, &PlaybackPlotConfig::default(), &mut list, None)
        .expect("playback");

    assert_eq!(plot.run_ids, ["alpha", "bravo"]);
    assert_eq!(plot.segment_lanes, 2.0);
    assert_eq!(plot.series_count, 8);
    let kinds: Vec<SeriesKind> = list.iter().map(|series| series.kind()).collect();
    assert_eq!(
        kinds,
        [
            SeriesKind::Barh,
            SeriesKind::Barh,
            SeriesKind::Barh,
            SeriesKind::Barh,
            SeriesKind::Barh,
            SeriesKind::Rect,
            SeriesKind::Bar,
            SeriesKind::Line,
        ]
    );
    assert_eq!(list[5].y_extent().expect("stall y"), Extent::numeric(0.0, 2.0));
    assert_eq!(list[5].x_extent().expect("stall x"), Extent::numeric(3.0, 3.5));
    assert_eq!(list[6].y_extent().expect("quality y"), Extent::numeric(0.0, 4.0));
    assert_eq!(list[7].axis_index(), 1);
    assert_eq!(list[7].x_extent().expect("vmaf x"), Extent::numeric(0.0, 1.0));
    assert!(list[4].is_selectable());
}

#[test]
fn absolute_segment_times_are_shifted_to_playback_start() {
    let runs = two_runs();
    let mut list = SeriesList::new();
    let config = PlaybackPlotConfig {
        runs: vec!["bravo".to_owned()],
        plot_stalls: false,
        plot_quality_levels: false,
        plot_vmaf: false,
        ..PlaybackPlotConfig::default()
    };
    let plot = build_playback_series(&runs, &config, &mut list, None).expect("playback");

    assert_eq!(plot.run_ids, ["bravo"]);
    assert_eq!(plot.colors, [Palette::default().color_for(1)]);
    assert_eq!(list.len(), 5);
    // Waiting bars span start_time..first_byte_at.
    assert_eq!(list[0].x_extent().expect("waiting"), Extent::numeric(0.5, 2.5));
    assert_eq!(list[4].x_extent().expect("overlay"), Extent::numeric(0.5, 4.0));
}

#[test]
fn flushed_segments_get_a_ratio_label() {
    let runs = two_runs();
    let mut surface = PlotSurface::new(
        NullRenderer::default(),
        PlaybackPlotConfig::surface_config(Viewport::new(1000, 700)),
    )
    .expect("surface");
    let config = PlaybackPlotConfig {
        runs: vec!["alpha".to_owned()],
        ..PlaybackPlotConfig::default()
    };
    build_playback_series(&runs, &config, surface.series_list_mut(), None).expect("playback");
    assert_eq!(surface.draw().expect("draw"), DrawStatus::Drawn);

    let flushed_bars = surface.series()[2]
        .shapes()
        .iter()
        .filter(|shape| matches!(shape, SeriesShape::Rect(_)))
        .count();
    assert_eq!(flushed_bars, 1);
    let labels: Vec<&str> = surface.series()[3]
        .shapes()
        .iter()
        .filter_map(|shape| match shape {
            SeriesShape::Text(text) if !text.text.is_empty() => Some(text.text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, ["0.50,0.60"]);
}

#[test]
fn clicking_a_download_reports_the_segment() {
    let runs = two_runs();
    let clicked: Rc<RefCell<Vec<(GroupKey, Option<f64>)>>> = Rc::default();
    let sink = Rc::clone(&clicked);
    let mut list = SeriesList::new();
    build_playback_series(
        &runs,
        &PlaybackPlotConfig::default(),
        &mut list,
        Some(Box::new(move |run: &GroupKey, segment: &RunSegment| {
            sink.borrow_mut().push((run.clone(), segment.start_time));
        })),
    )
    .expect("playback");

    assert_eq!(list[4].select(1, 1), Some(GroupKey::from(1usize)));
    assert_eq!(*clicked.borrow(), [(GroupKey::from(1usize), Some(2.0))]);
}

#[test]
fn every_optional_layer_lands_on_its_axis() {
    let runs = two_runs();
    let mut surface = PlotSurface::new(
        NullRenderer::default(),
        PlaybackPlotConfig::surface_config(Viewport::new(1000, 700)),
    )
    .expect("surface");
    let config = PlaybackPlotConfig {
        plot_total_segment_size: true,
        plot_position: true,
        plot_buffer_level: true,
        plot_dropped: true,
        plot_backlog: true,
        plot_actual_bw: true,
        plot_estimated_bw: true,
        dropped_qdisc: "1:".to_owned(),
        runs: vec!["alpha".to_owned()],
        ..PlaybackPlotConfig::default()
    };
    let plot = build_playback_series(&runs, &config, surface.series_list_mut(), None)
        .expect("playback");
    assert_eq!(plot.series_count, 16);
    assert_eq!(surface.draw().expect("draw"), DrawStatus::Drawn);
    assert_eq!(surface.axis_indices(), [-1, 0, 1, 2]);
}

#[test]
fn run_selection_is_bounded() {
    let many: Vec<RunData> = (0..7)
        .map(|index| RunData {
            run_id: format!("run-{index}"),
            ..RunData::default()
        })
        .collect();
    let mut list = SeriesList::new();
    let err = build_playback_series(&many, &PlaybackPlotConfig::default(), &mut list, None)
        .expect_err("too many");
    assert!(matches!(err, PlotError::RunSelection(_)));

    let config = PlaybackPlotConfig {
        runs: vec!["missing".to_owned()],
        ..PlaybackPlotConfig::default()
    };
    let err = build_playback_series(&many, &config, &mut list, None).expect_err("none");
    assert!(matches!(err, PlotError::RunSelection(_)));
    assert!(list.is_empty());
}

#[test]
fn qdisc_handles_are_validated() {
    let config = PlaybackPlotConfig {
        backlog_qdisc: "9:".to_owned(),
        ..PlaybackPlotConfig::default()
    };
    assert!(matches!(config.validate(), Err(PlotError::InvalidData(_))));
    assert!(PlaybackPlotConfig::default().validate().is_ok());

    let parsed: PlaybackPlotConfig = serde_json::from_str(r#"{"plot_backlog": true}"#).expect("config");
    assert!(parsed.plot_backlog);
    assert!(parsed.plot_downloads);
    assert_eq!(parsed.backlog_qdisc, "1:");
}
