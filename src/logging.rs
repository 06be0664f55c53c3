// Internal logging for the diagnostics facility itself.
//
// The per-thread sink files are the facility's product; this subscriber only
// records what the facility does (sweeps, sink failures, release summaries).

use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Options for the internal `tracing` subscriber
#[derive(Debug, Clone, Copy)]
pub struct LoggingOptions<'a> {
    /// Directory for the internal log files
    pub log_dir: &'a Utf8Path,

    /// File prefix of the daily-rotated log (e.g. "thread-diagnostics")
    pub log_prefix: &'a str,

    /// `debug` level instead of `info`
    pub debug_mode: bool,

    /// Also emit to stderr with ANSI colors
    pub console_output: bool,
}

/// Install the global subscriber with a daily rotating file appender.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(options: LoggingOptions<'_>) -> Result<WorkerGuard> {
    if !options.log_dir.exists() {
        fs::create_dir_all(options.log_dir).with_context(|| {
            format!("Failed to create log directory: {}", options.log_dir)
        })?;
    }

    let file_appender = rolling::daily(options.log_dir, options.log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if options.debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    // Stderr keeps the internal log apart from the stdout console mirror
    let console_layer = options.console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logging subscriber: {}", e))?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        options.log_dir,
        options.log_prefix,
        options.debug_mode,
        options.console_output
    );

    Ok(guard)
}
