//! Tracing subscriber setup: stdout (json or plain) plus optional daily log files.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "info,product_api_server=debug";

/// Install the global subscriber. `RUST_LOG` wins over `logging.filter`.
///
/// The returned guard flushes the file writer on drop, so keep it alive in `main`.
pub fn init_telemetry(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let default_filter = config
        .filter
        .clone()
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&default_filter))?;

    let (file_writer, guard) = match &config.directory {
        Some(directory) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("product-api")
                .filename_suffix("log")
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    if config.json {
        // JSON untuk production
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .with(file_writer.map(|writer| fmt::layer().json().with_writer(writer).with_target(true)))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false) // No colors in file
            }))
            .try_init()?;
    }

    Ok(guard)
}
