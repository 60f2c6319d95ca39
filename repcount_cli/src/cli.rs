//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "repcount",
    version,
    about = "Count exercise repetitions from recorded joint angles"
)]
pub struct Cli {
    /// Path to config TOML (built-in profiles are used when the file is missing)
    #[arg(long, value_name = "FILE", default_value = "etc/repcount.toml")]
    pub config: PathBuf,

    /// Print results and errors as JSON, and log as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded angle stream through the rep detector
    Replay {
        /// Recording to replay (.csv with a t_ms column, or pose recorder .json)
        #[arg(long, short, value_name = "FILE")]
        input: PathBuf,
        /// Exercise profile to count (defaults to session.exercise)
        #[arg(long, value_name = "NAME")]
        exercise: Option<String>,
        /// Limb to track: left or right (defaults to session.limb)
        #[arg(long, value_name = "LIMB")]
        limb: Option<String>,
        /// Frame spacing for recordings without timestamps (defaults to session.frame_ms)
        #[arg(long, value_name = "MS")]
        frame_ms: Option<u64>,
        /// Print each rep event as it happens
        #[arg(long, action = ArgAction::SetTrue)]
        events: bool,
        /// Pace frames at their recorded timestamps; Ctrl-C stops early
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Replay at recorded speed using the wall clock.\n\nWithout this flag the replay runs as fast as possible on a simulated clock, which makes results reproducible. With it, frames are delivered at their recorded timestamps and Ctrl-C stops the replay early; statistics for the frames seen so far are still reported."
        )]
        realtime: bool,
    },
    /// List the effective exercise profiles
    Profiles,
    /// Load and validate the config, then build every detector
    SelfCheck,
}
