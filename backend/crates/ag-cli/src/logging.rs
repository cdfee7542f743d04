//! Logging setup with file rotation.

use ag_config::LoggingConfig;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, prelude::__tracing_subscriber_SubscriberExt,
};

const MAX_LOG_FILES: usize = 7;
const WORKSPACE_TARGETS: [&str; 6] = [
    "ag_cli", "ag_config", "ag_process", "ag_store", "ag_switch", "agsw",
];

/// Filter directive used when `RUST_LOG` is unset: the configured level for
/// our crates, warnings for dependencies.
pub fn default_directive(config: &LoggingConfig) -> String {
    let level = config.level.as_directive();
    let mut directive = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

/// Console threshold; the file always gets everything the filter lets through.
pub fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    }
}

/// Setup logging with console and rotating file output.
///
/// # Log Layers
/// - Console: human readable, stderr so command output stays clean
/// - File: daily rotation, 7 files kept
///
/// The returned guard flushes the file writer and must live until exit.
pub fn setup_logging(
    logs_dir: &Path,
    config: &LoggingConfig,
    verbose: bool,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(logs_dir)?;

    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_filter(console_level(verbose));

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(config.file_prefix.as_str())
        .filename_suffix("log")
        .build(logs_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(file_writer);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge `log` records (config crate) into tracing
    tracing_log::LogTracer::init().ok();

    Ok(guard)
}
