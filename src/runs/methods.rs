use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    Accessor, BarOptions, Frame, FrameGroup, GroupKey, LineOptions, Record, Row, SelectCallback,
    SeriesList, SeriesMeta, Value, ValueAccessor,
};
use crate::error::{PlotError, PlotResult};

use super::model::RunData;

const SERVER_PREFIX: &str = "https://server:443/";

/// Columns averaged per X value by [`export_method_table`].
pub const TABLE_COLUMNS: [&str; 12] = [
    "durBuffStall",
    "durMicroStall",
    "durStall",
    "durStallPerc",
    "numBuffStall",
    "numSwitches",
    "vmaf",
    "vmafLoss",
    "quality",
    "quality_std",
    "bitrate",
    "bitrate_std",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodsPlotType {
    #[default]
    Line,
    Bar,
}

/// Field choices of the method comparison plot; names are summary columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodsPlotConfig {
    #[serde(default)]
    pub plot_type: MethodsPlotType,
    #[serde(default = "default_x_axis")]
    pub x_axis: String,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default = "default_y_axis")]
    pub y_axis: String,
}

fn default_x_axis() -> String {
    "video".to_owned()
}

fn default_group() -> String {
    "method".to_owned()
}

fn default_y_axis() -> String {
    "durBuffStall".to_owned()
}

impl Default for MethodsPlotConfig {
    fn default() -> Self {
        Self {
            plot_type: MethodsPlotType::default(),
            x_axis: default_x_axis(),
            group: default_group(),
            y_axis: default_y_axis(),
        }
    }
}

impl MethodsPlotConfig {
    pub fn validate(&self) -> PlotResult<()> {
        for (name, field) in [
            ("x_axis", &self.x_axis),
            ("group", &self.group),
            ("y_axis", &self.y_axis),
        ] {
            if field.trim().is_empty() {
                return Err(PlotError::InvalidData(format!("`{name}` must not be empty")));
            }
        }
        Ok(())
    }
}

/// One summary row per run, indexed by `name`.
///
/// `name` keeps only the `_`-separated tokens where run ids differ, so runs
/// of one experiment are labelled by what distinguishes them.
#[must_use]
pub fn summarize_runs(runs: &[RunData]) -> Frame<Row> {
    let names: Vec<Vec<String>> = runs
        .iter()
        .map(|run| {
            run.run_config
                .run_id
                .replace('/', "_")
                .split('_')
                .map(str::to_owned)
                .collect()
        })
        .collect();
    let (start, end) = differing_token_span(&names);
    let rows = runs
        .iter()
        .zip(&names)
        .map(|(run, tokens)| summarize_run(run, short_name(tokens, start, end)))
        .collect();
    Frame::with_index(rows, "name")
}

fn summarize_run(run: &RunData, name: String) -> Row {
    let config = &run.run_config;
    let method = format!(
        "{}_{}",
        if config.mod_beta.as_deref() == Some("beta") {
            "BETA"
        } else {
            "DASH"
        },
        config.mod_downloader.as_deref().unwrap_or_default()
    );
    let video = config
        .input
        .strip_prefix(SERVER_PREFIX)
        .unwrap_or(&config.input)
        .to_owned();
    let buffer_selection = config
        .selections
        .buffer
        .clone()
        .or_else(|| config.buffer_duration.as_ref().map(json_text));
    let segments = Frame::new(run.segments.clone());
    let quality = ValueAccessor::field("quality");
    let bitrate = ValueAccessor::field("bitrate");
    let micro_stalls = run
        .micro_stalls
        .as_ref()
        .map(|stalls| stalls.groups.as_slice())
        .unwrap_or_default();
    let tokens = VideoTokens::parse(&config.input);

    Row::new()
        .with("name", name)
        .with(
            "resultId",
            config.run_id.split('/').next().unwrap_or_default(),
        )
        .with("video", video)
        .with("bufferSelection", buffer_selection)
        .with("segLength", run.segment_length())
        .with("method", method)
        .with("numBuffStall", run.num_stall)
        .with("durBuffStall", run.dur_stall.map(round3))
        .with("durIdle", run.dur_idle.map(round3))
        .with("vmaf", run.vmaf.as_ref().and_then(|vmaf| vmaf.pooled_mean()))
        .with("vmafMin", run.vmaf.as_ref().and_then(|vmaf| vmaf.pooled_min()))
        .with("numSwitches", run.num_quality_switches)
        .with("quality", segments.avg_field(&quality))
        .with("quality_std", segments.std(&quality))
        .with("bitrate", segments.avg_field(&bitrate))
        .with("bitrate_std", segments.std(&bitrate))
        .with(
            "K_MAXIMUM_WINDOW",
            config.k_maximum_window.as_ref().and_then(json_integer),
        )
        .with("networkSelection", config.selections.network.clone())
        .with(
            "numMicroStall",
            run.micro_stalls.as_ref().map(|stalls| stalls.groups.len()),
        )
        .with("durMicroStall", micro_stalls.iter().sum::<f64>())
        .with("avgDurMicroStall", mean(micro_stalls))
        .with("crf", crf_of(&config.run_id))
        .with("videoName", tokens.name.clone())
        .with("segDuration", tokens.segment_ms.clone())
        .with("segmentType", tokens.segment_type.clone())
        .with(
            "segmentTypeDur",
            tokens
                .segment_type
                .as_ref()
                .zip(tokens.segment_ms.as_ref())
                .map(|(kind, ms)| format!("{kind}/{ms}ms")),
        )
}

/// Groups the summary by `group`, then averages `y_axis` per `x_axis` value.
///
/// Each group is indexed by `x_axis`, sorted numerically and has `y_axis` as
/// its active column.
#[must_use]
pub fn method_groups(summary: &Frame<Row>, config: &MethodsPlotConfig) -> FrameGroup<Row> {
    let x = config.x_axis.as_str();
    let y = config.y_axis.as_str();
    let y_accessor = ValueAccessor::field(y);
    let groups: IndexMap<GroupKey, Frame<Row>> = summary
        .group_by(|row| row.field(&config.group))
        .iter()
        .map(|(group_id, frame)| {
            let reduced = frame
                .reduce(x, |x_value, bucket| {
                    Row::new()
                        .with(config.group.as_str(), group_id.to_value())
                        .with(x, integer_like(x_value))
                        .with(y, bucket.avg_field(&y_accessor))
                })
                .sort_numerical(x)
                .col(y);
            (group_id.clone(), reduced)
        })
        .collect();
    FrameGroup::from_frames(groups, Some(x.to_owned()))
}

/// Appends the method comparison series and returns the plotted groups.
pub fn build_methods_series(
    runs: &[RunData],
    config: &MethodsPlotConfig,
    list: &mut SeriesList,
    on_select: Option<SelectCallback<Row>>,
) -> PlotResult<FrameGroup<Row>> {
    config.validate()?;
    if runs.is_empty() {
        return Err(PlotError::RunSelection(
            "select at least 1 run to plot".to_owned(),
        ));
    }
    let groups = method_groups(&summarize_runs(runs), config);
    let meta = SeriesMeta {
        x_label: Some(config.x_axis.clone()),
        y_label: Some(config.y_axis.clone()),
        ..SeriesMeta::default()
    };
    match config.plot_type {
        MethodsPlotType::Bar => {
            groups.plot_bar(
                list,
                BarOptions {
                    on_select,
                    meta,
                    ..BarOptions::default()
                },
            )?;
        }
        MethodsPlotType::Line => {
            groups.plot_line(
                list,
                LineOptions {
                    text: Some(Accessor::from("+")),
                    meta,
                    ..LineOptions::default()
                },
            )?;
        }
    }
    debug!(
        runs = runs.len(),
        groups = groups.len(),
        x = config.x_axis.as_str(),
        y = config.y_axis.as_str(),
        "methods series built"
    );
    Ok(groups)
}

/// Every [`TABLE_COLUMNS`] entry averaged per `x_axis` value.
#[must_use]
pub fn export_method_table(summary: &Frame<Row>, x_axis: &str) -> Vec<Row> {
    summary
        .reduce(x_axis, |x_value, bucket| {
            TABLE_COLUMNS.iter().fold(
                Row::new().with(x_axis, integer_like(x_value)),
                |row, column| row.with(*column, bucket.avg_field(&ValueAccessor::field(*column))),
            )
        })
        .into_rows()
}

/// Token positions `[start, end)` where at least two names differ.
///
/// Names are compared position by position up to the shortest one.
fn differing_token_span(names: &[Vec<String>]) -> (usize, usize) {
    let shortest = names.iter().map(Vec::len).min().unwrap_or(0);
    let differs = |position: usize| {
        names
            .iter()
            .any(|tokens| tokens[position] != names[0][position])
    };
    let start = (0..shortest).find(|&position| differs(position)).unwrap_or(shortest);
    let end = (0..shortest)
        .rev()
        .find(|&position| differs(position))
        .map_or(shortest, |position| position + 1);
    (start, end)
}

/// Joined tokens in `[start, end)`, or the whole name when that is empty.
fn short_name(tokens: &[String], start: usize, end: usize) -> String {
    if start < end {
        tokens[start..end].join("_")
    } else {
        tokens.join("_")
    }
}

static CRF: LazyLock<Regex> = LazyLock::new(|| compile(r"crf(\d+)"));
static VIDEO_NAME: LazyLock<Regex> = LazyLock::new(|| compile(r"/([a-z]+)_(\d+)ms"));
static SEGMENT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"/[a-z]+_\d+ms_\d+s_((?:i|s)+)_"));
static LEADING_INTEGER: LazyLock<Regex> = LazyLock::new(|| compile(r"^[+-]?\d+"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

/// Tokens of dataset inputs shaped like `/<name>_<ms>ms_<s>s_<type>_...`.
#[derive(Debug, Clone, Default, PartialEq)]
struct VideoTokens {
    name: Option<String>,
    segment_ms: Option<String>,
    segment_type: Option<String>,
}

impl VideoTokens {
    fn parse(input: &str) -> Self {
        let (name, segment_ms) = VIDEO_NAME
            .captures(input)
            .map(|caps| (Some(caps[1].to_owned()), Some(caps[2].to_owned())))
            .unwrap_or_default();
        Self {
            name,
            segment_ms,
            segment_type: SEGMENT_TYPE
                .captures(input)
                .map(|caps| caps[1].to_owned()),
        }
    }
}

/// CRF digits encoded in a run id (`..._crf28_...`).
fn crf_of(run_id: &str) -> Option<String> {
    CRF.captures(run_id).map(|caps| caps[1].to_owned())
}

/// Group values that read as numbers become integers, the rest stay as is.
fn integer_like(key: &GroupKey) -> Value {
    let value = key.to_value();
    match value.as_f64() {
        Some(number) => Value::Number(number.trunc()),
        None => value,
    }
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn json_integer(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64().map(f64::trunc),
        serde_json::Value::String(text) => {
            LEADING_INTEGER
                .find(text.trim_start())
                .and_then(|digits| digits.as_str().parse::<f64>().ok())
        }
        _ => None,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::{VideoTokens, crf_of, differing_token_span, json_integer, short_name};

    fn tokens(name: &str) -> Vec<String> {
        name.split('_').map(str::to_owned).collect()
    }

    #[test]
    fn token_span_keeps_only_differing_positions() {
        let names = vec![tokens("exp_bbb_crf20_beta"), tokens("exp_bbb_crf30_dash")];
        let (start, end) = differing_token_span(&names);
        assert_eq!((start, end), (2, 4));
        assert_eq!(short_name(&names[0], start, end), "crf20_beta");
    }

    #[test]
    fn identical_names_fall_back_to_the_full_name() {
        let names = vec![tokens("exp_bbb")];
        let (start, end) = differing_token_span(&names);
        assert_eq!(short_name(&names[0], start, end), "exp_bbb");
    }

    #[test]
    fn video_tokens_follow_the_dataset_layout() {
        let parsed = VideoTokens::parse("https://server:443/videos/bbb_2000ms_60s_iss_crf20/manifest.mpd");
        assert_eq!(parsed.name.as_deref(), Some("bbb"));
        assert_eq!(parsed.segment_ms.as_deref(), Some("2000"));
        assert_eq!(parsed.segment_type.as_deref(), Some("iss"));

        let plain = VideoTokens::parse("https://server:443/videos/manifest.mpd");
        assert_eq!(plain, VideoTokens::default());

        let untyped = VideoTokens::parse("https://server:443/tos_4000ms_60s_x_crf20/manifest.mpd");
        assert_eq!(untyped.name.as_deref(), Some("tos"));
        assert_eq!(untyped.segment_ms.as_deref(), Some("4000"));
        assert_eq!(untyped.segment_type, None);
    }

    #[test]
    fn crf_digits_and_integer_windows() {
        assert_eq!(crf_of("r1/run_crf28_x").as_deref(), Some("28"));
        assert_eq!(crf_of("r1/run_crfx_crf3").as_deref(), Some("3"));
        assert_eq!(crf_of("r1/run_x"), None);
        assert_eq!(json_integer(&serde_json::json!("1500bytes")), Some(1500.0));
        assert_eq!(json_integer(&serde_json::json!(12.7)), Some(12.0));
        assert_eq!(json_integer(&serde_json::json!(" -4.9s")), Some(-4.0));
        assert_eq!(json_integer(&serde_json::json!("fast")), None);
    }
}
