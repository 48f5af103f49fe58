//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "airmon", version, about = "Air-quality monitor")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/airmon.toml")]
    pub config: PathBuf,

    /// Log and render as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample, render, and report until Ctrl-C
    Run {
        /// Stop after this many loop ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Dispatch on a background worker thread (overrides sampling.background_dispatch)
        #[arg(long, action = ArgAction::SetTrue)]
        background: bool,
    },
    /// Blink the dust LED and take one reading of every channel
    SelfCheck,
    /// Validate the configuration and exit
    Health,
}
