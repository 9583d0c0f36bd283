// Tracing subscriber setup for the command-line front end.

use std::fs::{self, File};
use std::path::Path;

use anyhow::Context;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crickbase_core::config::LoggingConfig;

/// Build the filter from `RUST_LOG`, falling back to the configured directive.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber. Logs go to `config.file` when set
/// (appending, no ANSI colours) and to stderr otherwise, so stdout stays
/// clean for JSON output.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .with_line_number(true);

    match config.file.as_deref() {
        Some(path) => {
            let file = open_log_file(Path::new(path))?;
            let subscriber = builder.with_writer(file).with_ansi(false).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_log_file_creates_parent_directories() {
        let dir = std::env::temp_dir().join("crickbase_logging_test");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("crickbase.log");

        open_log_file(&path).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "crickbase=debug".into(),
            file: None,
        };
        assert_eq!(env_filter(&config).to_string(), "crickbase=debug");
    }
}
