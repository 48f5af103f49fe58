mod cli;
mod error_fmt;
mod monitor;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use airmon_core::{AirmonError, RunStats};
use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = airmon_config::load_file(&cli.config)
        .map_err(|e| eyre::Report::new(AirmonError::Config(format!("{e:#}"))))?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), mode = ?cfg.transport.mode, "config loaded");

    match cli.cmd {
        Commands::Health => {
            println!("ok");
            Ok(())
        }
        Commands::SelfCheck => monitor::self_check(&cfg, cli.json),
        Commands::Run { ticks, background } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;

            let background = background || cfg.sampling.background_dispatch;
            let stats = monitor::run_monitor(&cfg, ticks, background, cli.json, &shutdown)?;
            print_summary(&stats, cli.json);
            Ok(())
        }
    }
}

fn print_summary(stats: &RunStats, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "kind": "summary", "stats": stats }));
    } else {
        println!(
            "run complete: ticks={} dispatches={} uploads_ok={} link_down_cycles={} channel_faults={}",
            stats.ticks,
            stats.dispatches,
            stats.uploads_ok,
            stats.link_down_cycles,
            stats.channel_faults
        );
    }
}

/// Console logs go to stderr so stdout stays free for frames.
/// RUST_LOG wins over --log-level; the optional file layer has its own level.
fn init_tracing(json: bool, level: &str, logging: &airmon_config::Logging) -> eyre::Result<()> {
    let console_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let pretty = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(console_filter())
    });
    let structured = json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter())
    });

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name"))?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(EnvFilter::new(logging.level.as_deref().unwrap_or("info"))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(pretty)
        .with(structured)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))
}
