use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::PlotSurfaceConfig;
use crate::core::{
    Accessor, BarOptions, BarhOptions, Frame, FrameGroup, GroupKey, LineOptions, LineStyle,
    Margins, Palette, RectOptions, Record, Row, SelectCallback, SeriesList, SeriesMeta,
    ValueAccessor, Viewport,
};
use crate::error::{PlotError, PlotResult};
use crate::render::Color;

use super::model::{BandwidthActual, RunData, RunSegment, RunStall, RunState};

/// Qdisc handles offered for the backlog and dropped-packet lines.
pub const QDISC_HANDLES: [&str; 7] = ["1:", "1:1", "1:2", "1:3", "2:", "2:1", "3:"];

/// Frame rate used to place per-frame VMAF scores on the time axis.
pub const VMAF_FPS: f64 = 24.0;

/// Largest number of runs compared in one timeline.
pub const MAX_COMPARED_RUNS: usize = 6;

pub const PLAYBACK_MARGINS: Margins = Margins::new(20.0, 70.0, 60.0, 60.0);

/// Segment timestamps at or above this value are absolute and get shifted by
/// the playback start time.
const ABSOLUTE_TIME_THRESHOLD: f64 = 100_000.0;
/// Emulator bandwidth samples below this are plotted as 0.
const ACTUAL_BW_FLOOR: f64 = 500.0;
/// Segments with less than this share of their bytes delivered count as flushed.
const FLUSHED_RATIO: f64 = 0.99;
/// Highest quality index; quality bars grow upwards as quality improves.
const QUALITY_LEVELS: f64 = 7.0;

const WAITING_OPACITY: f64 = 0.5;
const QUALITY_OPACITY: f64 = 0.5;
const STALL_OPACITY: f64 = 0.1;
const FLUSHED_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.45);
const TAIL_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.15);

/// Layers of the playback timeline. Defaults match the dashboard's toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackPlotConfig {
    #[serde(default = "enabled")]
    pub plot_downloads: bool,
    #[serde(default)]
    pub plot_total_segment_size: bool,
    #[serde(default = "enabled")]
    pub plot_quality_levels: bool,
    #[serde(default)]
    pub plot_position: bool,
    #[serde(default)]
    pub plot_buffer_level: bool,
    #[serde(default = "enabled")]
    pub plot_stalls: bool,
    #[serde(default)]
    pub plot_dropped: bool,
    #[serde(default)]
    pub plot_backlog: bool,
    #[serde(default)]
    pub plot_actual_bw: bool,
    #[serde(default)]
    pub plot_estimated_bw: bool,
    #[serde(default = "enabled")]
    pub plot_vmaf: bool,
    #[serde(default = "default_backlog_qdisc")]
    pub backlog_qdisc: String,
    /// Empty disables the dropped-packet line.
    #[serde(default)]
    pub dropped_qdisc: String,
    /// Run ids to compare; empty selects every run.
    #[serde(default)]
    pub runs: Vec<String>,
}

fn enabled() -> bool {
    true
}

fn default_backlog_qdisc() -> String {
    "1:".to_owned()
}

impl Default for PlaybackPlotConfig {
    fn default() -> Self {
        Self {
            plot_downloads: true,
            plot_total_segment_size: false,
            plot_quality_levels: true,
            plot_position: false,
            plot_buffer_level: false,
            plot_stalls: true,
            plot_dropped: false,
            plot_backlog: false,
            plot_actual_bw: false,
            plot_estimated_bw: false,
            plot_vmaf: true,
            backlog_qdisc: default_backlog_qdisc(),
            dropped_qdisc: String::new(),
            runs: Vec::new(),
        }
    }
}

impl PlaybackPlotConfig {
    pub fn validate(&self) -> PlotResult<()> {
        for (name, handle) in [
            ("backlog_qdisc", &self.backlog_qdisc),
            ("dropped_qdisc", &self.dropped_qdisc),
        ] {
            if !handle.is_empty() && !QDISC_HANDLES.contains(&handle.as_str()) {
                return Err(PlotError::InvalidData(format!(
                    "`{name}` must be one of {QDISC_HANDLES:?}, got `{handle}`"
                )));
            }
        }
        Ok(())
    }

    /// Surface configuration with the playback plot margins.
    #[must_use]
    pub fn surface_config(viewport: Viewport) -> PlotSurfaceConfig {
        PlotSurfaceConfig::new(viewport).with_margins(PLAYBACK_MARGINS)
    }
}

/// What a playback build put on the series list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackPlot {
    /// Plotted runs; the group key of a run is its position here.
    pub run_ids: Vec<String>,
    pub colors: Vec<Color>,
    /// Segment lanes covered by the stall rectangles.
    pub segment_lanes: f64,
    pub series_count: usize,
}

/// Appends the playback timeline of the selected runs to `list`.
///
/// Every run keeps the color of its position among all `runs`, so toggling
/// the selection never recolors a run. `on_segment_select` receives the
/// segment behind a clicked download bar.
pub fn build_playback_series(
    runs: &[RunData],
    config: &PlaybackPlotConfig,
    list: &mut SeriesList,
    on_segment_select: Option<SelectCallback<RunSegment>>,
) -> PlotResult<PlaybackPlot> {
    config.validate()?;
    let selected = select_runs(runs, &config.runs)?;
    let base = Palette::default();
    let colors: Vec<Color> = selected
        .iter()
        .map(|(position, _)| base.color_for(*position))
        .collect();
    let palette = Palette::new(colors.clone())?;
    let runs: Vec<&RunData> = selected.into_iter().map(|(_, run)| run).collect();
    let before = list.len();

    let segments = group_runs(&runs, "start_time", &palette, normalized_segments);
    let segment_lanes = segments.max("index") + 1.0;

    if config.plot_downloads {
        plot_downloads(&segments, list, on_segment_select)?;
    }

    if config.plot_buffer_level {
        group_runs(&runs, "time", &palette, |run| {
            Frame::new(run.buffer_level.clone())
        })
        .plot_line(
            list,
            LineOptions {
                y: Some(ValueAccessor::field("level")),
                ..LineOptions::default()
            },
        )?;
    }

    if config.plot_position {
        let states = group_runs(&runs, "time", &palette, |run| {
            Frame::new(run.states.clone()).extend([(
                "segment_length",
                ValueAccessor::constant(run.segment_length().into()),
            )])
        });
        states.plot_line(
            list,
            LineOptions {
                y: Some(ValueAccessor::number(|state: &RunState| {
                    let length = state.field("segment_length").as_f64().unwrap_or(1.0);
                    state.position.map_or(f64::NAN, |position| position / length)
                })),
                ..LineOptions::default()
            },
        )?;
    }

    if config.plot_stalls {
        let stalls = group_runs(&runs, "time_start", &palette, |run| {
            Frame::new(run.stalls.clone())
        });
        stalls.plot_rect(
            list,
            RectOptions {
                x: Some(ValueAccessor::field("time_start")),
                y: Some(Accessor::from(segment_lanes)),
                width: Some(
                    ValueAccessor::<RunStall>::field("time_end")
                        .subtract(&ValueAccessor::field("time_start")),
                ),
                height: Some(Accessor::from(segment_lanes)),
                opacity: Accessor::from(STALL_OPACITY),
                ..RectOptions::default()
            },
        )?;
    }

    if config.plot_quality_levels {
        segments.plot_bar(
            list,
            BarOptions {
                x: Some(ValueAccessor::field("start_time")),
                y: Some(
                    ValueAccessor::<RunSegment>::from(QUALITY_LEVELS)
                        .subtract(&ValueAccessor::field("quality")),
                ),
                opacity: Accessor::from(QUALITY_OPACITY),
                ..BarOptions::default()
            },
        )?;
    }

    if config.plot_vmaf {
        let vmaf = group_runs(&runs, "time", &palette, vmaf_frames);
        vmaf.plot_line(
            list,
            LineOptions {
                y: Some(ValueAccessor::field("vmaf")),
                meta: on_axis(1),
                ..LineOptions::default()
            },
        )?;
    }

    if config.plot_total_segment_size {
        segments.plot_bar(
            list,
            BarOptions {
                x: Some(ValueAccessor::field("start_time")),
                y: Some(ValueAccessor::field("total_bytes")),
                meta: on_axis(2),
                ..BarOptions::default()
            },
        )?;
    }

    if config.plot_actual_bw {
        let end = segments.max("last_byte_at");
        group_runs(&runs, "time", &palette, floored_actual_bandwidth)
            .col("bw")
            .to_step("time")
            .map_groups(|_, frame| {
                let last = frame.rows().last().and_then(|row| row.bw).unwrap_or(0.0);
                frame.clone().push_row(BandwidthActual {
                    time: Some(end),
                    bw: Some(last),
                    ..BandwidthActual::default()
                })
            })
            .col("bw")
            .plot_line(
                list,
                LineOptions {
                    meta: on_axis(-1),
                    ..LineOptions::default()
                },
            )?;
    }

    if config.plot_estimated_bw {
        let estimate = group_runs(&runs, "time", &palette, |run| {
            Frame::new(run.bandwidth_estimate.clone())
        })
        .col("bandwidth");
        estimate.to_step("time").plot_line(
            list,
            LineOptions {
                meta: on_axis(1),
                ..LineOptions::default()
            },
        )?;
        estimate.plot_line(
            list,
            LineOptions {
                line_style: LineStyle::None,
                text: Some(Accessor::from("+")),
                meta: on_axis(1),
                ..LineOptions::default()
            },
        )?;
    }

    for (active, handle, column) in [
        (config.plot_backlog, &config.backlog_qdisc, "backlog"),
        (config.plot_dropped, &config.dropped_qdisc, "dropped"),
    ] {
        if !active || handle.is_empty() {
            continue;
        }
        group_runs(&runs, "time", &palette, |run| qdisc_rows(run, handle))
            .col(column)
            .drop_na(None)
            .col(column)
            .plot_line(
                list,
                LineOptions {
                    meta: on_axis(1),
                    ..LineOptions::default()
                },
            )?;
    }

    let series_count = list.len() - before;
    debug!(
        runs = runs.len(),
        series = series_count,
        segment_lanes,
        "playback series built"
    );
    Ok(PlaybackPlot {
        run_ids: runs.iter().map(|run| run.run_id.clone()).collect(),
        colors,
        segment_lanes,
        series_count,
    })
}

/// Waiting, downloading, flushed and tail bars plus a transparent click target.
fn plot_downloads(
    segments: &FrameGroup<RunSegment>,
    list: &mut SeriesList,
    on_segment_select: Option<SelectCallback<RunSegment>>,
) -> PlotResult<()> {
    let field = ValueAccessor::<RunSegment>::field;
    let lane = || Some(field("index"));

    segments.plot_barh(
        list,
        BarhOptions {
            x: Some(field("start_time")),
            span: Some(field("first_byte_at").subtract(&field("start_time"))),
            y: lane(),
            opacity: Accessor::from(WAITING_OPACITY),
            ..BarhOptions::default()
        },
    )?;

    segments.plot_barh(
        list,
        BarhOptions {
            x: Some(field("first_byte_at")),
            span: Some(field("stop_time").subtract(&field("first_byte_at"))),
            y: lane(),
            grid_y: true,
            meta: SeriesMeta {
                x_label: Some("Time (s)".to_owned()),
                y_label: Some("Segment index".to_owned()),
                ..SeriesMeta::default()
            },
            ..BarhOptions::default()
        },
    )?;

    segments
        .filter(|segment| is_flushed(segment))
        .plot_barh(
            list,
            BarhOptions {
                x: Some(field("first_byte_at")),
                span: Some(field("stop_time").subtract(&field("first_byte_at"))),
                y: lane(),
                colors: Some(Palette::uniform(FLUSHED_COLOR)),
                ..BarhOptions::default()
            },
        )?;

    segments.plot_barh(
        list,
        BarhOptions {
            x: Some(field("stop_time")),
            span: Some(field("last_byte_at").subtract(&field("stop_time"))),
            y: lane(),
            colors: Some(Palette::uniform(TAIL_COLOR)),
            text: Some(Accessor::derived(|segment: &RunSegment, _| flush_label(segment))),
            ..BarhOptions::default()
        },
    )?;

    segments.plot_barh(
        list,
        BarhOptions {
            x: Some(field("start_time")),
            span: Some(field("last_byte_at").subtract(&field("start_time"))),
            y: lane(),
            opacity: Accessor::from(0.0),
            on_select: on_segment_select,
            ..BarhOptions::default()
        },
    )?;
    Ok(())
}

/// Runs listed in `ids` (every run when empty) with their position in `runs`.
fn select_runs<'a>(runs: &'a [RunData], ids: &[String]) -> PlotResult<Vec<(usize, &'a RunData)>> {
    let selected: Vec<(usize, &RunData)> = runs
        .iter()
        .enumerate()
        .filter(|(_, run)| ids.is_empty() || ids.contains(&run.run_id))
        .collect();
    if selected.len() > MAX_COMPARED_RUNS {
        return Err(PlotError::RunSelection(format!(
            "select at max {MAX_COMPARED_RUNS} runs to compare"
        )));
    }
    if selected.is_empty() {
        return Err(PlotError::RunSelection(
            "select at least 1 run to plot".to_owned(),
        ));
    }
    Ok(selected)
}

fn on_axis(axis_index: i32) -> SeriesMeta {
    SeriesMeta {
        axis_index,
        ..SeriesMeta::default()
    }
}

/// One group per run keyed by its position, indexed by `index_field`.
fn group_runs<T>(
    runs: &[&RunData],
    index_field: &str,
    palette: &Palette,
    mut frame_of: impl FnMut(&RunData) -> Frame<T>,
) -> FrameGroup<T> {
    let groups: IndexMap<GroupKey, Frame<T>> = runs
        .iter()
        .enumerate()
        .map(|(position, run)| (GroupKey::from(position), frame_of(run)))
        .collect();
    FrameGroup::from_frames(groups, Some(index_field.to_owned())).with_palette(palette.clone())
}

/// Segments on a playback-relative clock.
fn normalized_segments(run: &RunData) -> Frame<RunSegment> {
    let frame = Frame::new(run.segments.clone());
    let absolute = run
        .segments
        .first()
        .and_then(|segment| segment.start_time)
        .is_some_and(|start| start >= ABSOLUTE_TIME_THRESHOLD);
    if !absolute {
        return frame;
    }
    let zero = run.playback_start_time.unwrap_or(0.0);
    frame.map(|segment| segment.shifted(zero))
}

fn vmaf_frames(run: &RunData) -> Frame<Row> {
    run.vmaf
        .iter()
        .flat_map(|vmaf| vmaf.frames.iter())
        .map(|frame| {
            Row::new()
                .with("time", frame.frame_num.map(|number| number / VMAF_FPS))
                .with("vmaf", frame.metrics.vmaf)
                .with("psnr", frame.metrics.psnr_y)
                .with("ssim", frame.metrics.float_ssim)
        })
        .collect()
}

fn floored_actual_bandwidth(run: &RunData) -> Frame<BandwidthActual> {
    Frame::new(run.bandwidth_actual.clone()).map(|sample| BandwidthActual {
        bw: sample
            .bw
            .map(|bw| if bw < ACTUAL_BW_FLOOR { 0.0 } else { bw }),
        ..sample.clone()
    })
}

fn qdisc_rows(run: &RunData, handle: &str) -> Frame<Row> {
    run.tc_stats
        .iter()
        .map(|stat| stat.qdisc_row(handle))
        .collect()
}

fn is_flushed(segment: &RunSegment) -> bool {
    segment
        .stopped_ratio()
        .is_some_and(|ratio| ratio < FLUSHED_RATIO)
}

/// `stopped[,received]` byte ratios of a flushed segment, empty otherwise.
fn flush_label(segment: &RunSegment) -> String {
    let Some(stopped) = segment.stopped_ratio().filter(|ratio| *ratio < FLUSHED_RATIO) else {
        return String::new();
    };
    match segment.received_ratio() {
        Some(received) if received != stopped => format!("{stopped:.2},{received:.2}"),
        _ => format!("{stopped:.2}"),
    }
}
