use chart_join::api::{
    BarChartLayout, BarLabelLayout, ChartConfig, ChartLayout, RenderTarget,
    StreamDrivenRedrawLoop, TimerSource,
};
use chart_join::core::Record;
use chart_join::render::{MemorySurface, SurfaceSnapshot};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "usage: stream_replay [--emissions <n>] [--period-ms <ms>] [--frame-ms <ms>] [--config <path>] [--output <path>]";

#[derive(Debug)]
struct CliArgs {
    emissions: u64,
    period_ms: f64,
    frame_ms: f64,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn main() {
    let _ = chart_join::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            ChartConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => ChartConfig::default(),
    };

    let mut bars = replay_loop(BarChartLayout::keyed(), config, args.period_ms)?;
    let mut labels = replay_loop(BarLabelLayout::keyed(), config, args.period_ms)?;

    let mut frames = Vec::new();
    let mut now_ms = 0.0;
    // Run one full period past the last emission so its transitions settle.
    let end_ms = args.period_ms * args.emissions as f64;
    while now_ms <= end_ms {
        let accepting = bars.emissions() < args.emissions;
        if !accepting {
            bars.unsubscribe();
            labels.unsubscribe();
        }

        let bar_step = bars.advance(now_ms).map_err(|err| err.to_string())?;
        labels.advance(now_ms).map_err(|err| err.to_string())?;
        if bar_step.redraw.is_some() || !bar_step.tick.removed.is_empty() {
            frames.push(frame(now_ms, &bars, &labels)?);
        }
        now_ms += args.frame_ms;
    }
    frames.push(frame(now_ms, &bars, &labels)?);

    let document = json!({ "config": config, "frames": frames });
    let text = serde_json::to_string_pretty(&document)
        .map_err(|err| format!("failed to serialize replay: {err}"))?;
    match &args.output {
        Some(path) => fs::write(path, text)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

type ReplayLoop<L> =
    StreamDrivenRedrawLoop<RenderTarget<L, MemorySurface>, TimerSource<fn(u64) -> Vec<Record>>>;

fn replay_loop<L: ChartLayout>(
    layout: L,
    config: ChartConfig,
    period_ms: f64,
) -> Result<ReplayLoop<L>, String> {
    let target =
        RenderTarget::new(layout, MemorySurface::new(), config).map_err(|err| err.to_string())?;
    let source = TimerSource::new(period_ms, synthetic_snapshot as fn(u64) -> Vec<Record>);
    Ok(StreamDrivenRedrawLoop::new(target, source))
}

/// Deterministic `{key, value}` snapshot alternating between 25 and 30 bars.
fn synthetic_snapshot(sequence: u64) -> Vec<Record> {
    let len = if sequence % 2 == 0 { 25 } else { 30 };
    (0..len)
        .map(|index| {
            let mixed = (sequence * 7 + index * 13 + (index * index) % 11) % 30;
            Record::Keyed {
                key: (index + 1) as f64,
                value: mixed as f64,
            }
        })
        .collect()
}

fn frame(
    now_ms: f64,
    bars: &ReplayLoop<BarChartLayout>,
    labels: &ReplayLoop<BarLabelLayout>,
) -> Result<Value, String> {
    let to_value = |snapshot: SurfaceSnapshot| {
        serde_json::to_value(snapshot).map_err(|err| format!("failed to serialize snapshot: {err}"))
    };
    Ok(json!({
        "now_ms": now_ms,
        "bars": to_value(bars.target().surface().snapshot())?,
        "labels": to_value(labels.target().surface().snapshot())?,
    }))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs {
        emissions: 4,
        period_ms: 3000.0,
        frame_ms: 250.0,
        config: None,
        output: None,
    };

    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("missing value for {name}"))
        };
        match flag.as_str() {
            "--emissions" => {
                parsed.emissions = value("--emissions")?
                    .parse()
                    .map_err(|err| format!("invalid --emissions: {err}"))?;
            }
            "--period-ms" => {
                parsed.period_ms = parse_positive(&value("--period-ms")?, "--period-ms")?;
            }
            "--frame-ms" => {
                parsed.frame_ms = parse_positive(&value("--frame-ms")?, "--frame-ms")?;
            }
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--output" => parsed.output = Some(PathBuf::from(value("--output")?)),
            "--help" | "-h" => return Err(USAGE.to_owned()),
            other => return Err(format!("unknown flag `{other}`\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn parse_positive(raw: &str, name: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|err| format!("invalid {name}: {err}"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{name} must be finite and > 0"));
    }
    Ok(value)
}
