// src/utils/logging.rs
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::utils::{
    config::LoggingConfig,
    error::{BiometricError, Result},
};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// With `logging.directory` set, output also goes to a daily rolling file;
/// the returned guard must be held until shutdown to flush it.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| BiometricError::Config(format!("Invalid log level {:?}: {}", config.level, e)))?;

    let stdout = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true);

    let (file, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "biomatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .try_init()
        .map_err(|e| BiometricError::Config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}
