use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{Record, Row, Value};
use crate::error::{PlotError, PlotResult};

/// Implements [`Record`] for a run struct with optional numeric fields, text
/// fields and a `derived` row holding fields added by `extend`.
macro_rules! impl_run_record {
    ($ty:ty { numbers: [$($num:ident),* $(,)?], texts: [$($text:ident),* $(,)?] }) => {
        impl Record for $ty {
            fn field(&self, name: &str) -> Value {
                match name {
                    $(stringify!($num) => Value::from(self.$num),)*
                    $(stringify!($text) => Value::Text(self.$text.clone()),)*
                    _ => self.derived.field(name),
                }
            }

            fn set_field(&mut self, name: &str, value: Value) {
                match name {
                    $(stringify!($num) => self.$num = value.as_f64(),)*
                    $(stringify!($text) => self.$text = value.as_str().unwrap_or_default().to_owned(),)*
                    _ => self.derived.set_field(name, value),
                }
            }
        }
    };
}

/// One downloaded media segment. Times are seconds, sizes bytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSegment {
    pub adap_set_id: Option<f64>,
    pub adaptation_throughput: Option<f64>,
    pub bitrate: Option<f64>,
    pub first_byte_at: Option<f64>,
    pub index: Option<f64>,
    pub last_byte_at: Option<f64>,
    pub quality: Option<f64>,
    pub received_bytes: Option<f64>,
    pub repr_id: Option<f64>,
    pub segment_throughput: Option<f64>,
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub stopped_bytes: Option<f64>,
    pub total_bytes: Option<f64>,
    pub url: String,
    pub init_url: String,
    pub duration: Option<f64>,
    #[serde(skip)]
    pub derived: Row,
}

impl_run_record!(RunSegment {
    numbers: [
        adap_set_id,
        adaptation_throughput,
        bitrate,
        first_byte_at,
        index,
        last_byte_at,
        quality,
        received_bytes,
        repr_id,
        segment_throughput,
        start_time,
        stop_time,
        stopped_bytes,
        total_bytes,
        duration,
    ],
    texts: [url, init_url]
});

impl RunSegment {
    /// Share of the segment delivered before the download was stopped.
    #[must_use]
    pub fn stopped_ratio(&self) -> Option<f64> {
        ratio(self.stopped_bytes, self.total_bytes)
    }

    #[must_use]
    pub fn received_ratio(&self) -> Option<f64> {
        ratio(self.received_bytes, self.total_bytes)
    }

    /// Copy with every timestamp moved back by `zero`.
    #[must_use]
    pub fn shifted(&self, zero: f64) -> Self {
        let shift = |time: Option<f64>| time.map(|time| time - zero);
        Self {
            start_time: shift(self.start_time),
            stop_time: shift(self.stop_time),
            first_byte_at: shift(self.first_byte_at),
            last_byte_at: shift(self.last_byte_at),
            ..self.clone()
        }
    }
}

fn ratio(part: Option<f64>, total: Option<f64>) -> Option<f64> {
    match (part, total) {
        (Some(part), Some(total)) if total != 0.0 => Some(part / total),
        _ => None,
    }
}

/// Player state transition with the playback position at that time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    pub position: Option<f64>,
    pub state: String,
    pub time: Option<f64>,
    #[serde(skip)]
    pub derived: Row,
}

impl_run_record!(RunState {
    numbers: [position, time],
    texts: [state]
});

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferLevel {
    pub level: Option<f64>,
    pub time: Option<f64>,
    #[serde(skip)]
    pub derived: Row,
}

impl_run_record!(BufferLevel {
    numbers: [level, time],
    texts: []
});

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStall {
    pub time_start: Option<f64>,
    pub time_end: Option<f64>,
    #[serde(skip)]
    pub derived: Row,
}

impl_run_record!(RunStall {
    numbers: [time_start, time_end],
    texts: []
});

/// Bandwidth enforced by the network emulator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BandwidthActual {
    pub bw: Option<f64>,
    pub drop: Option<f64>,
    pub latency: Option<f64>,
    pub time: Option<f64>,
    #[serde(skip)]
    pub derived: Row,
}

impl_run_record!(BandwidthActual {
    numbers: [bw, drop, latency, time],
    texts: []
});

/// Bandwidth estimated by the player's ABR logic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BandwidthEstimate {
    pub bandwidth: Option<f64>,
    pub time: Option<f64>,
    #[serde(skip)]
    pub derived: Row,
}

impl_run_record!(BandwidthEstimate {
    numbers: [bandwidth, time],
    texts: []
});

/// Traffic-control counters sampled at one instant, keyed by qdisc handle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TcStat {
    pub time: Option<f64>,
    pub qdiscs: IndexMap<String, QdiscStat>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QdiscStat {
    pub backlog: Option<f64>,
    pub dropped: Option<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub variant: String,
}

impl TcStat {
    /// Flat `{time, backlog, dropped, type, variant}` row for one qdisc handle.
    ///
    /// Counters are NA when the handle was not sampled at this instant.
    #[must_use]
    pub fn qdisc_row(&self, handle: &str) -> Row {
        let row = Row::new().with("time", self.time);
        match self.qdiscs.get(handle) {
            Some(qdisc) => row
                .with("backlog", qdisc.backlog)
                .with("dropped", qdisc.dropped)
                .with("type", qdisc.kind.as_str())
                .with("variant", qdisc.variant.as_str()),
            None => row
                .with("backlog", Value::Missing)
                .with("dropped", Value::Missing),
        }
    }
}

/// Per-frame and pooled quality scores of a run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunVmaf {
    pub mean: Option<f64>,
    pub segments: Vec<f64>,
    pub frames: Vec<VmafFrame>,
    pub pooled_metrics: Option<PooledMetrics>,
}

impl RunVmaf {
    /// Pooled mean, falling back to the plain `mean` field.
    #[must_use]
    pub fn pooled_mean(&self) -> Option<f64> {
        self.pooled_metrics
            .as_ref()
            .and_then(|pooled| pooled.vmaf.as_ref())
            .and_then(|summary| summary.mean)
            .or(self.mean)
    }

    #[must_use]
    pub fn pooled_min(&self) -> Option<f64> {
        self.pooled_metrics
            .as_ref()
            .and_then(|pooled| pooled.vmaf.as_ref())
            .and_then(|summary| summary.min)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VmafFrame {
    #[serde(rename = "frameNum")]
    pub frame_num: Option<f64>,
    pub metrics: VmafMetrics,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VmafMetrics {
    pub vmaf: Option<f64>,
    pub psnr_y: Option<f64>,
    pub float_ssim: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PooledMetrics {
    pub vmaf: Option<MetricSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub harmonic_mean: Option<f64>,
}

/// Short rendering interruptions, one duration per group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroStalls {
    pub groups: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSelections {
    pub buffer: Option<String>,
    pub network: Option<String>,
}

/// Job configuration a run was executed with.
///
/// Keys not modelled here are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub run_id: String,
    pub input: String,
    pub mod_beta: Option<String>,
    pub mod_downloader: Option<String>,
    pub buffer_duration: Option<serde_json::Value>,
    #[serde(rename = "K_MAXIMUM_WINDOW")]
    pub k_maximum_window: Option<serde_json::Value>,
    #[serde(rename = "_selections")]
    pub selections: RunSelections,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Everything recorded for one headless-player run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunData {
    pub run_id: String,
    pub run_config: RunConfig,
    pub num_stall: Option<f64>,
    pub num_quality_switches: Option<f64>,
    pub dur_stall: Option<f64>,
    pub dur_idle: Option<f64>,
    pub playback_start_time: Option<f64>,
    pub states: Vec<RunState>,
    pub buffer_level: Vec<BufferLevel>,
    pub tc_stats: Vec<TcStat>,
    pub stalls: Vec<RunStall>,
    pub segments: Vec<RunSegment>,
    pub bandwidth_actual: Vec<BandwidthActual>,
    pub bandwidth_estimate: Vec<BandwidthEstimate>,
    pub vmaf: Option<RunVmaf>,
    pub micro_stalls: Option<MicroStalls>,
}

impl RunData {
    /// Parses either a JSON array of runs or a single run object.
    pub fn parse_many(input: &str) -> PlotResult<Vec<Self>> {
        let value: serde_json::Value = serde_json::from_str(input)
            .map_err(|e| PlotError::InvalidData(format!("failed to parse run json: {e}")))?;
        let runs: Result<Vec<Self>, _> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value),
            other => serde_json::from_value::<Self>(other).map(|run| vec![run]),
        };
        runs.map_err(|e| PlotError::InvalidData(format!("invalid run data: {e}")))
    }

    /// Duration of the first segment, used to convert positions into segments.
    #[must_use]
    pub fn segment_length(&self) -> f64 {
        self.segments
            .first()
            .and_then(|segment| segment.duration)
            .filter(|duration| *duration != 0.0 && duration.is_finite())
            .unwrap_or(1.0)
    }
}
