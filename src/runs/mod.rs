//! Run records of the headless player and the two dashboard plots built on them.
//!
//! [`playback`] lays out the per-segment download timeline of up to six runs;
//! [`methods`] summarizes runs into one row each and compares methods across
//! a chosen X field.

pub mod methods;
pub mod model;
pub mod playback;

pub use methods::{
    MethodsPlotConfig, MethodsPlotType, TABLE_COLUMNS, build_methods_series, export_method_table,
    method_groups, summarize_runs,
};
pub use model::{
    BandwidthActual, BandwidthEstimate, BufferLevel, MetricSummary, MicroStalls, PooledMetrics,
    QdiscStat, RunConfig, RunData, RunSegment, RunSelections, RunStall, RunState, RunVmaf, TcStat,
    VmafFrame, VmafMetrics,
};
pub use playback::{
    MAX_COMPARED_RUNS, PLAYBACK_MARGINS, PlaybackPlot, PlaybackPlotConfig, QDISC_HANDLES,
    VMAF_FPS, build_playback_series,
};
