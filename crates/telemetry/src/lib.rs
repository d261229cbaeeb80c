//! Logging and tracing bootstrap.
//!
//! Installs a global subscriber with two sinks: stdout (pretty or JSON, per
//! settings) and a JSON log file inside the configured log directory, which
//! is created when missing.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Create the log directory if needed and open the log file for appending.
pub fn prepare_log_file(settings: &TelemetrySettings) -> anyhow::Result<(PathBuf, File)> {
    std::fs::create_dir_all(&settings.log_dir).with_context(|| {
        format!(
            "failed to create log directory {}",
            settings.log_dir.display()
        )
    })?;

    let path = settings.log_dir.join(&settings.log_file);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    Ok((path, file))
}

/// Build the level filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .with_context(|| format!("invalid log level '{}'", settings.log_level)),
    }
}

/// Initialize the global tracing pipeline.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let (path, file) = prepare_log_file(settings)?;
    let filter = env_filter(settings)?;

    let stdout = match settings.log_format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
    };
    let file_sink = fmt::layer()
        .json()
        .flatten_event(true)
        .with_ansi(false)
        .with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file_sink)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(
        target: "bookshelf-telemetry",
        log_file = %path.display(),
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn log_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let settings = TelemetrySettings {
            log_dir: dir.path().join("Book-Collection-Server-Logs"),
            ..TelemetrySettings::default()
        };

        let (path, _file) = prepare_log_file(&settings).unwrap();
        assert!(settings.log_dir.is_dir());
        assert_eq!(path, settings.log_dir.join("bookshelf.log"));
        assert!(path.is_file());

        // Reopening appends instead of failing.
        prepare_log_file(&settings).unwrap();
    }

    #[test]
    fn bad_level_is_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let settings = TelemetrySettings {
            log_level: "bookshelf=loud".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(env_filter(&settings).is_err());
    }
}
