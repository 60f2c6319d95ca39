mod cli;
mod error_fmt;
mod replay;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use repcount_config::{Config, Logging};
use repcount_core::{DetectorConfig, Limb};
use repcount_traits::MonotonicClock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{format_error_json, humanize};
use crate::replay::{ReplayOpts, build_session, print_summary, run_replay};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        tracing::debug!(error = ?err, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let (cfg, from_file) = load_config(&cli.config)?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    if from_file {
        tracing::debug!(path = %cli.config.display(), "config loaded");
    } else {
        tracing::info!(path = %cli.config.display(), "config not found; using built-in profiles");
    }

    match cli.cmd {
        Commands::Replay {
            input,
            exercise,
            limb,
            frame_ms,
            events,
            realtime,
        } => {
            let opts =
                ReplayOpts::resolve(&cfg, exercise, limb.as_deref(), frame_ms, events, realtime)?;
            let shutdown = Arc::new(AtomicBool::new(false));
            if opts.realtime {
                let flag = Arc::clone(&shutdown);
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("failed to install Ctrl-C handler")?;
            }
            let outcome = run_replay(&cfg, &input, &opts, cli.json, shutdown)?;
            print_summary(&outcome, cli.json);
        }
        Commands::Profiles => print_profiles(&cfg, cli.json),
        Commands::SelfCheck => {
            let limb: Limb = cfg.session.limb.parse()?;
            let session = build_session(&cfg, &cfg.session.exercise, limb, MonotonicClock::new())?;
            let count = session.exercise_names().count();
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "ok",
                        "profiles": count,
                        "exercise": session.active_exercise(),
                        "limb": limb.as_str(),
                    })
                );
            } else {
                println!(
                    "OK: {count} exercise profiles, active '{}' ({limb})",
                    session.active_exercise()
                );
            }
        }
    }
    Ok(())
}

/// Read and validate the config. A missing file means "use defaults".
fn load_config(path: &Path) -> eyre::Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), false));
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let cfg: Config = toml::from_str(&text)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok((cfg, true))
}

fn init_tracing(json: bool, level: &str, logging: &Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid --log-level '{level}'"))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file '{file}' has no file name"))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);

        let file_level = logging.level.as_deref().unwrap_or("info");
        let file_filter = EnvFilter::try_new(file_level)
            .wrap_err_with(|| format!("invalid logging.level '{file_level}'"))?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;
    Ok(())
}

fn print_profiles(cfg: &Config, json: bool) {
    let active = cfg.session.exercise.as_str();
    let profiles: Vec<DetectorConfig> = cfg.profiles().iter().map(DetectorConfig::from).collect();

    if json {
        let list: Vec<_> = profiles
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.exercise,
                    "active": p.exercise == active,
                    "joint": p.joint.as_str(),
                    "min_angle": p.min_angle_threshold,
                    "max_angle": p.max_angle_threshold,
                    "start_threshold": p.start_threshold(),
                    "rest_threshold": p.rest_threshold(),
                    "min_range_of_motion": p.min_range_of_motion,
                    "min_phase_ms": p.min_phase_duration.as_millis() as u64,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(list));
        return;
    }

    for p in &profiles {
        let marker = if p.exercise == active { '*' } else { ' ' };
        println!(
            "{marker} {:<20} joint={:<8} range={:.1}..{:.1}°  start>{:.1}°  rest<={:.1}°  min ROM {:.1}°  dwell {}ms",
            p.exercise,
            p.joint.as_str(),
            p.min_angle_threshold,
            p.max_angle_threshold,
            p.start_threshold(),
            p.rest_threshold(),
            p.min_range_of_motion,
            p.min_phase_duration.as_millis()
        );
    }
}
