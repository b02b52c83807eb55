//! Console and optional file logging.
//!
//! Logs always go to stderr; stdout carries the hub protocol.

use eyre::{Result, WrapErr};
use garage_config::{Logging, Rotation};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::FILE_GUARD;

/// Filter precedence: `RUST_LOG`, then `--log-level`, then `[logging] level`,
/// then `info`.
fn filter(cli_level: Option<&str>, cfg_level: Option<&str>) -> EnvFilter {
    if let Ok(f) = EnvFilter::try_from_default_env() {
        return f;
    }
    let level = cli_level.or(cfg_level).unwrap_or("info");
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(json: bool, cli_level: Option<&str>, logging: &Logging) -> Result<()> {
    let console = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file = match &logging.file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("log file path has no file name: {}", path.display()))?;
            let appender = match logging.rotation {
                Rotation::Never => tracing_appender::rolling::never(dir, name),
                Rotation::Daily => tracing_appender::rolling::daily(dir, name),
                Rotation::Hourly => tracing_appender::rolling::hourly(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter(cli_level, logging.level.as_deref()))
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")
}
