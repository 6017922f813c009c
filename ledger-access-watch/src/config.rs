use anyhow::{Context, Result};
use ledger_access_client::config::ClientConfig;
use ledger_access_client::model::{EventFilter, Identifier};
use ledger_access_logger::LogConfig;
use serde::Deserialize;

/// The top-level configuration for the watcher.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct WatchConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub watch: WatchSettings,
}

/// Contains settings that are unique to the watcher binary.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct WatchSettings {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Which stream to follow.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StreamKind {
    #[default]
    Events,
    ExecutionData,
}

/// Where the subscription starts and, for events, what it delivers.
///
/// With neither `start-height` nor `start-block-id` set, the stream starts at
/// the latest sealed block.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct StreamConfig {
    pub kind: StreamKind,
    pub start_height: u64,
    /// Hex encoded block id, optionally `0x` prefixed.
    pub start_block_id: Option<String>,
    pub event_types: Vec<String>,
    pub addresses: Vec<String>,
    pub contracts: Vec<String>,
}

impl StreamConfig {
    pub fn start_block_id(&self) -> Result<Identifier> {
        match self.start_block_id.as_deref() {
            None | Some("") => Ok(Identifier::EMPTY),
            Some(hex) => Identifier::from_hex(hex)
                .with_context(|| format!("Invalid watch.stream.start-block-id '{hex}'")),
        }
    }

    pub fn filter(&self) -> EventFilter {
        EventFilter {
            event_types: self.event_types.clone(),
            addresses: self.addresses.clone(),
            contracts: self.contracts.clone(),
        }
    }
}

/// Loads the watcher configuration from a TOML file, with `LEDGER_ACCESS__`
/// environment variables taking precedence (e.g.
/// `LEDGER_ACCESS__WATCH__LOG__LEVEL=debug`).
pub fn load_config(path: &str) -> Result<WatchConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("LEDGER_ACCESS").separator("__"));

    let settings: WatchConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", path))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
