use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize logging: console plus optional rolling file appender, driven by
/// the config file. An explicit `logging.level` wins over `RUST_LOG`; with
/// neither set the filter falls back to "info".
pub fn init_with_config(cfg: &LoggingConfig) {
    let filter = match cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // A missing writer simply leaves the file layer out (`Option<Layer>` is
    // itself a layer); only the format split needs two arms because the json
    // and text layer types differ.
    let file = rolling_file_writer(cfg);
    let registry = tracing_subscriber::registry().with(filter);
    match cfg.format {
        LogFormat::Json => {
            let console = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339());
            let file = file.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer)
            });
            let _ = registry.with(console).with(file).try_init();
        }
        LogFormat::Text => {
            let console = tracing_subscriber::fmt::layer().with_timer(UtcTime::rfc_3339());
            let file = file.map(|writer| {
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_timer(UtcTime::rfc_3339())
                    .with_writer(writer)
            });
            let _ = registry.with(console).with(file).try_init();
        }
    }
}

/// Non-blocking rolling file writer per the config, or `None` when file
/// logging is disabled or the log directory cannot be created.
fn rolling_file_writer(cfg: &LoggingConfig) -> Option<tracing_appender::non_blocking::NonBlocking> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    if !cfg.enable_file_logging {
        return None;
    }
    if let Err(err) = std::fs::create_dir_all(&cfg.dir) {
        eprintln!(
            "Failed to create log directory '{}': {err}; continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let rotation = match cfg.rotation.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    };
    let appender = RollingFileAppender::new(rotation, &cfg.dir, &cfg.filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The guard flushes on drop; it must live as long as the process does.
    std::mem::forget(guard);

    Some(writer)
}
