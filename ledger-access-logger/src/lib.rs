//! Logging setup shared by the ledger access binaries.
//!
//! The level comes from [`LogConfig::level`] unless `RUST_LOG` is set, in which
//! case its directives take precedence.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::File, str::FromStr, sync::Arc};
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, writer::BoxMakeWriter},
    prelude::*,
    EnvFilter, Registry,
};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogOutput {
    #[default]
    Stdout,
    File,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct LogConfig {
    /// Log level, e.g. "info", "debug", "trace".
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Path to the log file, required if output is "file".
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            output: LogOutput::Stdout,
            file_path: None,
        }
    }
}

impl LogConfig {
    /// The configured level, falling back to `INFO` for unknown names.
    pub fn level_filter(&self) -> LevelFilter {
        Level::from_str(&self.level)
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::INFO)
    }

    fn writer(&self) -> Result<BoxMakeWriter> {
        match self.output {
            LogOutput::Stdout => Ok(BoxMakeWriter::new(std::io::stdout)),
            LogOutput::File => {
                let file_path = self
                    .file_path
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("Log output is 'file' but 'file-path' is not specified"))?;
                let log_file = File::create(file_path)
                    .with_context(|| format!("Failed to create log file '{file_path}'"))?;
                Ok(BoxMakeWriter::new(Arc::new(log_file)))
            }
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Fails if the log file cannot be created or a subscriber is already set.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level_filter().into())
        .from_env_lossy();
    let writer = config.writer()?;
    let subscriber = Registry::default().with(filter);

    match config.format {
        LogFormat::Json => subscriber
            .with(fmt::layer().with_writer(writer).json())
            .try_init(),
        LogFormat::Plain => subscriber
            .with(fmt::layer().with_writer(writer).with_target(false))
            .try_init(),
    }
    .context("Failed to install the global tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: LogConfig = serde_json::from_str(r#"{ "format": "json" }"#).unwrap();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stdout);
        assert!(config.file_path.is_none());
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let mut config = LogConfig::default();
        config.level = "debug".to_string();
        assert_eq!(config.level_filter(), LevelFilter::DEBUG);

        config.level = "chatty".to_string();
        assert_eq!(config.level_filter(), LevelFilter::INFO);
    }

    #[test]
    fn file_output_requires_a_path() {
        let config = LogConfig {
            output: LogOutput::File,
            ..Default::default()
        };
        let err = config.writer().unwrap_err();
        assert!(err.to_string().contains("file-path"));
    }

    #[test]
    fn file_output_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.log");
        let config = LogConfig {
            output: LogOutput::File,
            file_path: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        config.writer().unwrap();
        assert!(path.exists());
    }
}
