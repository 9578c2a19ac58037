#![deny(unsafe_code)]
//! CLI binary for the saddle-trap simulation.
//!
//! Subcommands:
//! - `run`: step the ball until the final angle (or a frame limit) and report
//! - `surface`: summarize the precomputed height field and gradient
//! - `schema`: print the engine parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use saddle_core::{BoundsPolicy, Engine, RunSpec, StepStatus};
use saddle_trap::{BallState, SaddleTrap};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "saddle-trap", about = "Saddle potential trap simulation")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Step the ball until the phase passes the final angle.
    Run {
        /// Run configuration file (JSON); flags below override it.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Engine parameters as a JSON object, merged over the config's params.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Bounds policy for cells outside the grid (strict, clamp, wrap).
        #[arg(short, long)]
        bounds: Option<String>,

        /// Stop after this many steps even if the run has not finished.
        #[arg(short, long)]
        frames: Option<usize>,

        /// Print every K-th frame of the trajectory.
        #[arg(short, long)]
        every: Option<usize>,

        /// Print the trajectory, not just the final summary.
        #[arg(short, long)]
        trajectory: bool,
    },
    /// Summarize the height field and gradient.
    Surface {
        /// Engine parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Print the parameter schema.
    Schema,
}

fn parse_params(text: &str) -> Result<Value, CliError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !value.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    Ok(value)
}

/// Layers command-line overrides on top of an optional config file.
fn resolve_run_spec(
    config: Option<&PathBuf>,
    params: &str,
    bounds: Option<&str>,
    frames: Option<usize>,
    every: Option<usize>,
) -> Result<RunSpec, CliError> {
    let mut spec = match config {
        Some(path) => RunSpec::load(path)?,
        None => RunSpec::default(),
    };

    let overrides = parse_params(params)?;
    if let (Some(base), Some(extra)) = (spec.params.as_object_mut(), overrides.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    if let Some(name) = bounds {
        let policy: BoundsPolicy = name.parse()?;
        spec.params["bounds"] = json!(policy.name());
    }
    if frames.is_some() {
        spec.frames = frames;
    }
    if let Some(every) = every {
        spec.every = every;
    }
    spec.validate()?;
    Ok(spec)
}

fn print_frame(ball: &BallState, json_mode: bool) -> Result<(), CliError> {
    if json_mode {
        println!("{}", serde_json::to_string(ball)?);
    } else {
        let p = ball.position;
        let v = ball.velocity;
        println!(
            "frame {:>4}  phase {:>8.4}  r {:>7.4}  pos ({:>9.4}, {:>9.4}, {:>9.4})  vel ({:>8.4}, {:>8.4})",
            ball.frame, ball.phase, ball.amplitude, p.x, p.y, p.z, v.x, v.z
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => {
            let engine = SaddleTrap::from_json(&json!({}))?;
            println!("{}", serde_json::to_string_pretty(&engine.param_schema())?);
        }
        Command::Surface { params } => {
            let engine = SaddleTrap::from_json(&parse_params(&params)?)?;
            let surface = engine.surface();
            let n = surface.half_extent() as isize;
            let start = engine.ball().cell();
            let probes = [(-n, -n), (-n, 0), (0, 0), (0, -n), (n - 1, n - 1), start];

            let mut samples = Vec::with_capacity(probes.len());
            for (i, j) in probes.into_iter().filter(|&(i, j)| surface.height().contains(i, j)) {
                let h = surface.height().get(i, j)?;
                let g = surface.gradient().get(i, j)?;
                samples.push(json!({"i": i, "j": j, "height": h, "gradient": [g.x, g.y]}));
            }

            if cli.json {
                let info = json!({
                    "half_extent": surface.half_extent(),
                    "side": surface.height().side(),
                    "max_height": surface.max_height(),
                    "samples": samples,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "surface: {0}x{0} cells, coordinates [-{1}, {1}), max height {2}",
                    surface.height().side(),
                    surface.half_extent(),
                    surface.max_height()
                );
                for s in &samples {
                    println!(
                        "  h({:>4}, {:>4}) = {:>10.4}  grad = {}",
                        s["i"], s["j"], s["height"].as_f64().unwrap_or(f64::NAN), s["gradient"]
                    );
                }
            }
        }
        Command::Run {
            config,
            params,
            bounds,
            frames,
            every,
            trajectory,
        } => {
            let spec = resolve_run_spec(
                config.as_ref(),
                &params,
                bounds.as_deref(),
                frames,
                every,
            )?;
            let mut engine = SaddleTrap::from_json(&spec.params)?;
            log::debug!("run configuration: {}", spec.params);

            let json_mode = cli.json;
            let mut printed = Ok(());
            let summary = engine.run_with(spec.frames, |ball, status| {
                if trajectory
                    && printed.is_ok()
                    && status == StepStatus::Running
                    && ball.frame % spec.every as u64 == 0
                {
                    printed = print_frame(ball, json_mode);
                }
            })?;
            printed?;

            if json_mode {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let end = if summary.finished {
                    "reached final angle"
                } else {
                    "stopped at frame limit"
                };
                eprintln!(
                    "{end} after {} steps ({} frames), phase {:.4}, bounds {}",
                    summary.steps,
                    summary.state.frame,
                    summary.state.phase,
                    engine.trap_params().bounds
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
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
