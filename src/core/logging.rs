//! Logging Module
//!
//! Sets up `tracing` with:
//! - stdout output, pretty or JSON, through a non-blocking writer
//! - optional daily-rolling JSON files
//! - the `log` facade bridged into `tracing`

use std::fs;
use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// File name prefix for rolled log files.
pub const LOG_FILE_NAME: &str = "suggestor.log";

/// Build the filter: `RUST_LOG` wins, then the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|e| {
            eprintln!("Invalid log level {:?} ({}), falling back to info", config.level, e);
            EnvFilter::new("info")
        })
    })
}

/// Initialize the logging system.
///
/// Returns the `WorkerGuard`s that must be kept alive for the duration of
/// the application so buffered logs are flushed on shutdown.
pub fn init(config: &LoggingConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();
    let filter = env_filter(config);

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(io::stdout());
    guards.push(stdout_guard);

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .with_writer(stdout_writer)
            .json()
            .with_target(true)
            .with_filter(filter.clone())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(stdout_writer)
            .pretty()
            .with_filter(filter.clone())
            .boxed()
    };

    let file_layer = config.directory.as_ref().and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create logs directory {}: {}", dir.display(), e);
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_filter(filter)
                .boxed(),
        )
    });

    let has_file = file_layer.is_some();

    let subscriber = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }

    // Redirect standard `log` macros to `tracing`
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    match (&config.directory, has_file) {
        (Some(dir), true) => log::info!(
            "Logging initialized. Writing to: {:?} (daily rolling)",
            dir.join(LOG_FILE_NAME)
        ),
        _ => log::info!("Logging initialized (stdout only)"),
    }

    guards
}
