//! Tracing subscriber setup.
//!
//! Logs go to stderr so that CLI subcommands can print JSON on stdout. When
//! `logging.log_dir` is set, the same events are also appended without ANSI
//! colours to `doccontrol.log` in that directory.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// File name used inside `log_dir`.
pub const LOG_FILE_NAME: &str = "doccontrol.log";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; `verbose` forces
/// `debug`. The returned guard must be kept alive for the file writer to
/// flush.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to build log filter")?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(rolling::never(dir, LOG_FILE_NAME));
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
