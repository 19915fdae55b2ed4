use std::fs;
use std::path::{Path, PathBuf};

use runscope::api::{PlotSurface, PlotSurfaceConfig};
use runscope::core::{Row, Viewport};
use runscope::render::SvgRenderer;
use runscope::runs::{
    MethodsPlotConfig, PlaybackPlotConfig, RunData, build_methods_series, build_playback_series,
    export_method_table, summarize_runs,
};
use serde::de::DeserializeOwned;

const USAGE: &str = "usage: plot_runs <playback|methods> --input <runs.json> --output <path> [--config <config.json>] [--format svg|json|table] [--width <px>] [--height <px>]";
const DEFAULT_WIDTH: u32 = 1600;
const DEFAULT_HEIGHT: u32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Playback,
    Methods,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Svg,
    Json,
    /// Per-X averages of the method summary; `methods` only.
    Table,
}

#[derive(Debug)]
struct CliArgs {
    command: CommandKind,
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    format: OutputFormat,
    viewport: Viewport,
}

fn main() {
    let _ = runscope::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read `{}`: {err}", args.input.display()))?;
    let runs = RunData::parse_many(&raw).map_err(|err| err.to_string())?;

    let mut surface = match args.command {
        CommandKind::Playback => {
            if args.format == OutputFormat::Table {
                return Err("--format table is only supported by `methods`".to_owned());
            }
            let config: PlaybackPlotConfig = read_config(args.config.as_deref())?;
            let mut surface = new_surface(PlaybackPlotConfig::surface_config(args.viewport))?;
            build_playback_series(&runs, &config, surface.series_list_mut(), None)
                .map_err(|err| err.to_string())?;
            surface
        }
        CommandKind::Methods => {
            let config: MethodsPlotConfig = read_config(args.config.as_deref())?;
            if args.format == OutputFormat::Table {
                let table = export_method_table(&summarize_runs(&runs), &config.x_axis);
                return write_json(&args.output, &table);
            }
            let mut surface = new_surface(PlotSurfaceConfig::new(args.viewport))?;
            build_methods_series(&runs, &config, surface.series_list_mut(), None)
                .map_err(|err| err.to_string())?;
            surface
        }
    };

    let status = surface.draw().map_err(|err| err.to_string())?;
    if !status.is_drawn() {
        eprintln!("warning: {status:?}");
    }
    let payload = match args.format {
        OutputFormat::Json => surface.snapshot_json_contract_v1_pretty(),
        OutputFormat::Svg | OutputFormat::Table => surface.export_svg(),
    }
    .map_err(|err| err.to_string())?;
    fs::write(&args.output, payload)
        .map_err(|err| format!("failed to write `{}`: {err}", args.output.display()))
}

fn new_surface(config: PlotSurfaceConfig) -> Result<PlotSurface<SvgRenderer>, String> {
    PlotSurface::new(SvgRenderer::new(), config).map_err(|err| err.to_string())
}

fn read_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, String> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("invalid config json: {err}"))
}

fn write_json(path: &Path, rows: &[Row]) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(rows)
        .map_err(|err| format!("failed to serialize json: {err}"))?;
    fs::write(path, payload).map_err(|err| format!("failed to write `{}`: {err}", path.display()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref() {
        Some("playback") => CommandKind::Playback,
        Some("methods") => CommandKind::Methods,
        _ => return Err(USAGE.to_owned()),
    };

    let mut input = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut config = None::<PathBuf>;
    let mut format = OutputFormat::Svg;
    let mut width = DEFAULT_WIDTH;
    let mut height = DEFAULT_HEIGHT;

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--input" => input = Some(PathBuf::from(value()?)),
            "--output" => output = Some(PathBuf::from(value()?)),
            "--config" => config = Some(PathBuf::from(value()?)),
            "--format" => {
                format = match value()?.as_str() {
                    "svg" => OutputFormat::Svg,
                    "json" => OutputFormat::Json,
                    "table" => OutputFormat::Table,
                    other => return Err(format!("unknown format `{other}`")),
                };
            }
            "--width" => width = parse_px(&value()?)?,
            "--height" => height = parse_px(&value()?)?,
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    let input = input.ok_or_else(|| "missing --input".to_owned())?;
    let output = output.ok_or_else(|| "missing --output".to_owned())?;
    Ok(CliArgs {
        command,
        input,
        output,
        config,
        format,
        viewport: Viewport::new(width, height),
    })
}

fn parse_px(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|err| format!("invalid pixel size `{value}`: {err}"))
}
