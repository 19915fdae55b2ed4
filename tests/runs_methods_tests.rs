use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use runscope::api::{DrawStatus, PlotSurface, PlotSurfaceConfig};
use runscope::core::{GroupKey, Record, Row, SeriesKind, SeriesList, Value, Viewport};
use runscope::error::PlotError;
use runscope::runs::{
    MethodsPlotConfig, MethodsPlotType, RunData, TABLE_COLUMNS, build_methods_series,
    export_method_table, method_groups, summarize_runs,
};
use runscope::render::NullRenderer;
use serde_json::json;

const BBB: &str = "https://server:443/videos/bbb_2000ms_60s_iss_crf20/manifest.mpd";
const TOS: &str = "https://server:443/videos/tos_4000ms_60s_s_crf20/manifest.mpd";

fn run(id: &str, input: &str, beta: &str, window: f64, dur_stall: f64) -> serde_json::Value {
    json!({
        "run_id": id,
        "run_config": {
            "run_id": format!("res1/{id}"),
            "input": input,
            "mod_beta": beta,
            "mod_downloader": "segment",
            "K_MAXIMUM_WINDOW": window,
            "_selections": {"buffer": "short"}
        },
        "num_stall": 2,
        "dur_stall": dur_stall,
        "num_quality_switches": 1,
        "segments": [
            {"index": 0, "quality": 2, "bitrate": 1000, "duration": 2.0},
            {"index": 1, "quality": 4, "bitrate": 3000, "duration": 2.0}
        ],
        "micro_stalls": {"groups": [0.25, 0.5]},
        "vmaf": {"pooled_metrics": {"vmaf": {"mean": 91.5, "min": 70.0}}}
    })
}

fn runs() -> Vec<RunData> {
    let payload = json!([
        run("exp_bbb_beta_a", BBB, "beta", 10.0, 1.0),
        run("exp_bbb_beta_b", BBB, "beta", 5.0, 2.0),
        run("exp_bbb_dash_a", BBB, "dash", 5.0, 4.0),
        run("exp_tos_beta_a", TOS, "beta", 5.7, 3.0),
    ]);
    RunData::parse_many(&payload.to_string()).expect("runs")
}

fn text(value: Value) -> String {
    value.as_str().map(str::to_owned).unwrap_or_default()
}

#[test]
fn summary_has_one_row_per_run() {
    let summary = summarize_runs(&runs());
    assert_eq!(summary.len(), 4);
    assert_eq!(summary.index_field(), Some("name"));

    let first = &summary.rows()[0];
    assert_eq!(text(first.field("name")), "bbb_beta_a");
    assert_eq!(text(first.field("resultId")), "res1");
    assert_eq!(text(first.field("method")), "BETA_segment");
    assert_eq!(
        text(first.field("video")),
        "videos/bbb_2000ms_60s_iss_crf20/manifest.mpd"
    );
    assert_eq!(text(first.field("bufferSelection")), "short");
    assert_eq!(first.field("segLength"), Value::from(2.0));
    assert_eq!(first.field("K_MAXIMUM_WINDOW"), Value::from(10.0));
    assert_eq!(first.field("quality"), Value::from(3.0));
    assert_eq!(first.field("quality_std"), Value::from(1.0));
    assert_eq!(first.field("bitrate"), Value::from(2000.0));
    assert_eq!(first.field("vmaf"), Value::from(91.5));
    assert_eq!(first.field("numMicroStall"), Value::from(2usize));
    assert_relative_eq!(first.field("durMicroStall").as_f64().expect("micro"), 0.75);
    assert_eq!(text(first.field("videoName")), "bbb");
    assert_eq!(text(first.field("segmentTypeDur")), "iss/2000ms");
    assert_eq!(text(first.field("crf")), "");

    let dash = &summary.rows()[2];
    assert_eq!(text(dash.field("method")), "DASH_segment");
    let tos = &summary.rows()[3];
    assert_eq!(text(tos.field("segmentTypeDur")), "s/4000ms");
    assert_eq!(tos.field("K_MAXIMUM_WINDOW"), Value::from(5.0));
}

#[test]
fn methods_average_the_y_field_per_x_value() {
    let summary = summarize_runs(&runs());
    let groups = method_groups(&summary, &MethodsPlotConfig::default());

    let keys: Vec<&GroupKey> = groups.keys().collect();
    assert_eq!(keys, [&GroupKey::from("BETA_segment"), &GroupKey::from("DASH_segment")]);
    assert_eq!(groups.index_field(), Some("video"));

    let (_, beta) = groups.get_index(0).expect("beta");
    assert_eq!(beta.active_column(), Some("durBuffStall"));
    let averages: Vec<Value> = beta.iter().map(|row| row.field("durBuffStall")).collect();
    assert_eq!(averages, [Value::from(1.5), Value::from(3.0)]);
    assert_eq!(
        text(beta.rows()[0].field("method")),
        "BETA_segment"
    );
}

#[test]
fn numeric_x_values_are_truncated_and_sorted() {
    let summary = summarize_runs(&runs());
    let config = MethodsPlotConfig {
        x_axis: "K_MAXIMUM_WINDOW".to_owned(),
        ..MethodsPlotConfig::default()
    };
    let groups = method_groups(&summary, &config);
    let (_, beta) = groups.get_index(0).expect("beta");
    let rows: Vec<(Value, Value)> = beta
        .iter()
        .map(|row| (row.field("K_MAXIMUM_WINDOW"), row.field("durBuffStall")))
        .collect();
    assert_eq!(
        rows,
        [
            (Value::from(5.0), Value::from(2.5)),
            (Value::from(10.0), Value::from(1.0)),
        ]
    );
}

#[test]
fn table_export_averages_every_column() {
    let summary = summarize_runs(&runs());
    let table = export_method_table(&summary, "video");
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].len(), TABLE_COLUMNS.len() + 1);
    assert_relative_eq!(
        table[0].field("durBuffStall").as_f64().expect("avg"),
        7.0 / 3.0,
        epsilon = 1e-12
    );
    assert_eq!(table[1].field("durBuffStall"), Value::from(3.0));
    assert_eq!(table[1].field("numSwitches"), Value::from(1.0));
}

#[test]
fn line_plot_draws_over_categories() {
    let mut surface = PlotSurface::new(
        NullRenderer::default(),
        PlotSurfaceConfig::new(Viewport::new(900, 500)),
    )
    .expect("surface");
    let groups = build_methods_series(
        &runs(),
        &MethodsPlotConfig::default(),
        surface.series_list_mut(),
        None,
    )
    .expect("methods");
    assert_eq!(groups.len(), 2);
    assert_eq!(surface.series()[0].kind(), SeriesKind::Line);
    assert_eq!(surface.draw().expect("draw"), DrawStatus::Drawn);
    assert!(surface.x_scale().expect("x").as_linear().is_none());
}

#[test]
fn bar_plot_reports_the_selected_method_row() {
    let picked: Rc<RefCell<Vec<Row>>> = Rc::default();
    let sink = Rc::clone(&picked);
    let mut list = SeriesList::new();
    build_methods_series(
        &runs(),
        &MethodsPlotConfig {
            plot_type: MethodsPlotType::Bar,
            ..MethodsPlotConfig::default()
        },
        &mut list,
        Some(Box::new(move |_: &GroupKey, row: &Row| sink.borrow_mut().push(row.clone()))),
    )
    .expect("methods");

    assert_eq!(list[0].kind(), SeriesKind::Bar);
    assert_eq!(list[0].select(1, 0), Some(GroupKey::from("DASH_segment")));
    assert_eq!(picked.borrow()[0].field("durBuffStall"), Value::from(4.0));
}

#[test]
fn invalid_method_requests_are_rejected() {
    let mut list = SeriesList::new();
    let err = build_methods_series(&[], &MethodsPlotConfig::default(), &mut list, None)
        .expect_err("no runs");
    assert!(matches!(err, PlotError::RunSelection(_)));

    let blank = MethodsPlotConfig {
        y_axis: " ".to_owned(),
        ..MethodsPlotConfig::default()
    };
    assert!(matches!(
        build_methods_series(&runs(), &blank, &mut list, None),
        Err(PlotError::InvalidData(_))
    ));
    assert!(list.is_empty());

    let parsed: MethodsPlotConfig = serde_json::from_str(r#"{"plot_type": "bar"}"#).expect("config");
    assert_eq!(parsed.plot_type, MethodsPlotType::Bar);
    assert_eq!(parsed.y_axis, "durBuffStall");
}
