#![deny(unsafe_code)]
//! CLI binary for the ripple wave surface.
//!
//! Subcommands:
//! - `render`: run the CPU simulation headless with scripted pointer drops
//!   and write a PNG (or the static fallback with `--fallback`)
//! - `governor`: replay an FPS trace through the quality governor
//! - `themes`: list themes and their tints
//! - `config`: print the effective config and its schema

mod error;
mod settings;

use clap::{Parser, Subcommand};
use error::CliError;
use ripple_core::{RippleConfig, Theme, Xorshift64};
use ripple_runtime::snapshot::write_png;
use ripple_runtime::{
    field_frame, run_probe, GovernorDecision, GovernorState, QualityGovernor, RippleController,
    SimulatedProbe, StaticBackdrop, TickOutcome,
};
use ripple_wave::WaveEngine;
use serde_json::{json, Value};
use settings::Settings;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ripple", about = "Interactive wave surface CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON file with config overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Config overrides as a JSON string (applied after --config).
    #[arg(long, global = true, default_value = "{}")]
    params: String,

    /// Theme name (orange, blue).
    #[arg(long, global = true)]
    theme: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation for N frames and write a PNG snapshot.
    Render {
        /// Viewport width in pixels.
        #[arg(short = 'W', long, default_value_t = 256)]
        width: usize,

        /// Viewport height in pixels.
        #[arg(short = 'H', long, default_value_t = 256)]
        height: usize,

        /// Number of frames to tick.
        #[arg(short, long, default_value_t = 240)]
        frames: usize,

        /// Simulated frame time in milliseconds.
        #[arg(long, default_value_t = 16.0)]
        frame_ms: f64,

        /// Number of scripted pointer drops.
        #[arg(short, long, default_value_t = 6)]
        drops: usize,

        /// PRNG seed for drop placement and the fallback pattern.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Simulated per-clear cost for the capability probe, in milliseconds.
        #[arg(long)]
        probe_ms: Option<f64>,

        /// Write the static fallback backdrop instead of simulating.
        #[arg(long)]
        fallback: bool,

        /// Output file path.
        #[arg(short, long, default_value = "ripple.png")]
        output: PathBuf,
    },
    /// Replay an FPS trace through the quality governor.
    Governor {
        /// Comma-separated FPS samples (e.g. 28,46,28,46).
        #[arg(long, value_delimiter = ',', conflicts_with = "trace")]
        fps: Vec<f64>,

        /// File of FPS samples separated by commas or whitespace.
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Simulated per-clear cost for the capability probe, in milliseconds.
        #[arg(long)]
        probe_ms: Option<f64>,
    },
    /// List available themes.
    Themes,
    /// Print the effective config and the parameter schema.
    Config,
}

/// A scripted pointer press at a viewport position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PointerDrop {
    frame: usize,
    x: f64,
    y: f64,
}

/// Deterministic drop schedule, sorted by frame.
fn plan_drops(seed: u64, count: usize, frames: usize, width: usize, height: usize) -> Vec<PointerDrop> {
    let mut rng = Xorshift64::new(seed);
    let mut drops: Vec<PointerDrop> = (0..count)
        .map(|_| PointerDrop {
            frame: rng.next_usize(frames),
            x: rng.next_range(0.0, width as f64),
            y: rng.next_range(0.0, height as f64),
        })
        .collect();
    drops.sort_by_key(|d| d.frame);
    drops
}

fn make_governor(config: &RippleConfig, probe_ms: Option<f64>) -> QualityGovernor {
    match probe_ms {
        Some(ms) => {
            let mut probe = SimulatedProbe::new(true, ms);
            QualityGovernor::from_probe(config, run_probe(&mut probe, config))
        }
        None => QualityGovernor::new(config),
    }
}

fn state_name(governor: &QualityGovernor) -> &'static str {
    match governor.state() {
        GovernorState::Active => "active",
        GovernorState::Disabled => "disabled",
    }
}

fn decision_json(decision: GovernorDecision) -> Value {
    match decision {
        GovernorDecision::Hold => json!("hold"),
        GovernorDecision::Rescale(scale) => json!({ "rescale": scale }),
        GovernorDecision::Disable => json!("disable"),
    }
}

fn backdrop_seed(seed: u64) -> u32 {
    (seed & u64::from(u32::MAX)) as u32
}

#[allow(clippy::too_many_arguments)]
fn render(
    settings: Settings,
    width: usize,
    height: usize,
    frames: usize,
    frame_ms: f64,
    drops: usize,
    seed: u64,
    probe_ms: Option<f64>,
    fallback: bool,
) -> Result<(ripple_runtime::Frame, Value), CliError> {
    let Settings { config, theme } = settings;
    let backdrop = StaticBackdrop::new(backdrop_seed(seed));
    if width == 0 || height == 0 {
        return Err(CliError::Engine(ripple_core::EngineError::InvalidDimensions));
    }
    if fallback {
        let frame = backdrop.render(width, height, theme)?;
        return Ok((frame, json!({ "mode": "fallback" })));
    }

    let governor = make_governor(&config, probe_ms);
    let mut controller = RippleController::new(config, theme)?;
    controller.init(WaveEngine::new(1, 1, config)?, width, height, governor);

    let schedule = plan_drops(seed, drops, frames, width, height);
    let mut next_drop = schedule.iter().peekable();
    let mut ticked = 0;
    for frame in 0..frames {
        let mut pressed = false;
        while let Some(drop) = next_drop.next_if(|d| d.frame == frame) {
            controller.pointer_down(drop.x, drop.y);
            pressed = true;
        }
        let outcome = controller.tick(frame_ms);
        if pressed {
            controller.pointer_up();
        }
        match outcome {
            TickOutcome::Stepped { rescaled } => {
                ticked += 1;
                if let Some(scale) = rescaled {
                    debug!(frame, scale, "render: rescaled");
                }
            }
            TickOutcome::Disabled | TickOutcome::Stopped => break,
        }
    }

    let governor = controller.governor();
    let summary = json!({
        "mode": "simulation",
        "frames": ticked,
        "drops": schedule.len(),
        "state": governor.map_or("disabled", state_name),
        "disable_reason": governor.and_then(|g| g.disable_reason()).map(|r| r.as_str()),
        "resolution_scale": governor.map(|g| g.resolution_scale()),
    });
    let frame = match controller.engine() {
        Some(engine) => field_frame(engine.grid(), theme),
        None => {
            info!("render: simulation disabled, writing fallback");
            backdrop.render(width, height, theme)?
        }
    };
    controller.dispose();
    Ok((frame, summary))
}

fn replay(config: &RippleConfig, trace: &[f64], probe_ms: Option<f64>) -> Vec<Value> {
    let mut governor = make_governor(config, probe_ms);
    trace
        .iter()
        .enumerate()
        .map(|(i, &fps)| {
            let decision = governor.observe_fps(fps);
            json!({
                "frame": i + 1,
                "fps": fps,
                "decision": decision_json(decision),
                "scale": governor.resolution_scale(),
                "state": state_name(&governor),
            })
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = settings::load(cli.config.as_deref(), &cli.params, cli.theme.as_deref())?;

    match cli.command {
        Command::Themes => {
            let mut themes = Vec::new();
            for name in Theme::list_names() {
                let theme = Theme::from_name(name)?;
                themes.push(json!({ "name": name, "tint": theme.colors().tint.to_hex() }));
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&themes)?);
            } else {
                println!("Themes:");
                for t in &themes {
                    let name = t["name"].as_str().unwrap_or_default();
                    let tint = t["tint"].as_str().unwrap_or_default();
                    println!("  {name:<8} {tint}");
                }
            }
        }
        Command::Config => {
            let info = json!({
                "theme": settings.theme.name(),
                "config": settings.config.to_json(),
                "schema": RippleConfig::schema(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Governor {
            fps,
            trace,
            probe_ms,
        } => {
            let samples = match trace {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .map_err(|e| CliError::Io(format!("reading {}: {e}", path.display())))?;
                    settings::parse_fps_trace(&text)?
                }
                None => fps,
            };
            if samples.is_empty() {
                return Err(CliError::Input("no FPS samples given (--fps or --trace)".into()));
            }
            let rows = replay(&settings.config, &samples, probe_ms);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!(
                        "{:>5}  fps {:>7.2}  scale {:.2}  {:<8}  {}",
                        row["frame"],
                        row["fps"].as_f64().unwrap_or(0.0),
                        row["scale"].as_f64().unwrap_or(0.0),
                        row["state"].as_str().unwrap_or(""),
                        row["decision"],
                    );
                }
            }
        }
        Command::Render {
            width,
            height,
            frames,
            frame_ms,
            drops,
            seed,
            probe_ms,
            fallback,
            output,
        } => {
            let theme = settings.theme;
            let (frame, mut summary) = render(
                settings, width, height, frames, frame_ms, drops, seed, probe_ms, fallback,
            )?;
            write_png(&frame, &output)?;

            if let Some(map) = summary.as_object_mut() {
                map.insert("theme".into(), json!(theme.name()));
                map.insert("width".into(), json!(frame.width));
                map.insert("height".into(), json!(frame.height));
                map.insert("seed".into(), json!(seed));
                map.insert("output".into(), json!(output.display().to_string()));
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, theme {}, seed {seed}) -> {}",
                    summary["mode"].as_str().unwrap_or("simulation"),
                    frame.width,
                    frame.height,
                    theme.name(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // An already-installed subscriber wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn defaults() -> Settings {
        Settings {
            config: RippleConfig::default(),
            theme: Theme::Blue,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_governor_fps_list() {
        let cli = Cli::try_parse_from(["ripple", "governor", "--fps", "28,46,28"]).unwrap();
        match cli.command {
            Command::Governor { fps, .. } => assert_eq!(fps, vec![28.0, 46.0, 28.0]),
            _ => panic!("expected governor"),
        }
    }

    #[test]
    fn drop_plan_is_deterministic_and_in_range() {
        let a = plan_drops(7, 20, 100, 64, 32);
        let b = plan_drops(7, 20, 100, 64, 32);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0].frame <= w[1].frame));
        assert!(a
            .iter()
            .all(|d| d.frame < 100 && (0.0..64.0).contains(&d.x) && (0.0..32.0).contains(&d.y)));
    }

    #[test]
    fn alternating_trace_never_rescales() {
        let trace: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 28.0 } else { 46.0 }).collect();
        let rows = replay(&RippleConfig::default(), &trace, None);
        assert!(rows.iter().all(|r| r["decision"] == json!("hold")));
        assert!(rows.iter().all(|r| r["scale"] == json!(1.0)));
    }

    #[test]
    fn low_trace_disables_at_window() {
        let rows = replay(&RippleConfig::default(), &[20.0; 12], None);
        assert_eq!(rows[9]["decision"], json!("disable"));
        assert_eq!(rows[11]["state"], json!("disabled"));
    }

    #[test]
    fn slow_probe_starts_disabled() {
        let rows = replay(&RippleConfig::default(), &[60.0], Some(5.0));
        assert_eq!(rows[0]["state"], json!("disabled"));
    }

    #[test]
    fn render_simulation_produces_viewport_frame() {
        let (frame, summary) = render(defaults(), 48, 32, 30, 16.0, 4, 1, None, false).unwrap();
        assert_eq!((frame.width, frame.height), (48, 32));
        assert_eq!(summary["mode"], json!("simulation"));
        assert_eq!(summary["frames"], json!(30));
        assert_eq!(summary["state"], json!("active"));
    }

    #[test]
    fn render_fallback_when_probe_fails() {
        let (frame, summary) = render(defaults(), 16, 16, 10, 16.0, 2, 1, Some(10.0), false).unwrap();
        assert_eq!((frame.width, frame.height), (16, 16));
        assert_eq!(summary["state"], json!("disabled"));
        assert_eq!(summary["frames"], json!(0));
    }

    #[test]
    fn render_fallback_flag_skips_simulation() {
        let (frame, summary) = render(defaults(), 8, 8, 10, 16.0, 2, 3, None, true).unwrap();
        assert_eq!(frame.rgba.len(), 8 * 8 * 4);
        assert_eq!(summary["mode"], json!("fallback"));
    }

    #[test]
    fn render_rejects_zero_viewport() {
        let err = render(defaults(), 0, 8, 10, 16.0, 0, 3, None, false).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn backdrop_seed_truncates() {
        assert_eq!(backdrop_seed(42), 42);
        assert_eq!(backdrop_seed(u64::from(u32::MAX) + 5), 4);
    }
}
