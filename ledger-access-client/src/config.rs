use crate::error::{AccessError, Result};
use crate::payload::EventEncodingVersion;
use crate::subscription::SubscribeOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The top-level configuration for the `ledger-access-client` library.
///
/// It aggregates the access node endpoints, the subscription defaults and the
/// REST client settings. It is typically deserialized from a configuration
/// file and handed to [`crate::grpc::GrpcClient::from_config`] or
/// [`crate::http::HttpClient::from_config`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    #[serde(default)]
    pub access: AccessEndpoints,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Network locations of the access node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccessEndpoints {
    /// The gRPC endpoint serving the access API.
    pub grpc_url: String,
    /// The gRPC endpoint serving the execution data API. `None` reuses `grpc_url`.
    pub execution_data_url: Option<String>,
    /// The base URL of the REST API.
    pub rest_url: String,
}

/// Defaults applied to every subscription opened through the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubscriptionConfig {
    /// Capacity of the value channel handed to consumers.
    pub channel_capacity: usize,
    /// Heartbeat interval, in blocks, sent with event subscriptions.
    pub heartbeat_interval: u64,
    /// Event payload encoding: `ccf-v0` or `json-cdc-v0`.
    pub event_encoding: String,
}

/// Settings for the REST client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AccessEndpoints {
    fn default() -> Self {
        Self {
            grpc_url: "http://127.0.0.1:3569".to_string(),
            execution_data_url: None,
            rest_url: "http://127.0.0.1:8888".to_string(),
        }
    }
}

impl AccessEndpoints {
    /// The endpoint to use for execution data calls.
    pub fn execution_data_url(&self) -> &str {
        self.execution_data_url.as_deref().unwrap_or(&self.grpc_url)
    }
}

impl SubscriptionConfig {
    /// The subscribe options these defaults describe.
    pub fn options(&self) -> Result<SubscribeOptions> {
        let encoding: EventEncodingVersion = self
            .event_encoding
            .parse()
            .map_err(|e| AccessError::InvalidArgument(format!("subscription.event-encoding: {e}")))?;
        Ok(SubscribeOptions::default()
            .with_channel_capacity(self.channel_capacity)
            .with_heartbeat_interval(self.heartbeat_interval)
            .with_event_encoding(encoding))
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 20,
            heartbeat_interval: 100,
            event_encoding: "ccf-v0".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{ "access": { "grpc-url": "http://node:9000", "rest-url": "http://node:8080" } }"#,
        )
        .unwrap();

        assert_eq!(config.access.grpc_url, "http://node:9000");
        assert_eq!(config.access.execution_data_url(), "http://node:9000");
        assert_eq!(config.subscription.channel_capacity, 20);
        assert_eq!(config.subscription.heartbeat_interval, 100);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn subscription_options_parse_the_encoding() {
        let mut subscription = SubscriptionConfig::default();
        let options = subscription.options().unwrap();
        assert_eq!(options.event_encoding, EventEncodingVersion::CcfV0);
        assert_eq!(options.heartbeat_interval, 100);

        subscription.event_encoding = "JSON_CDC_V0".to_string();
        subscription.channel_capacity = 5;
        let options = subscription.options().unwrap();
        assert_eq!(options.event_encoding, EventEncodingVersion::JsonCdcV0);
        assert_eq!(options.channel_capacity, 5);

        subscription.event_encoding = "protobuf".to_string();
        assert!(matches!(
            subscription.options(),
            Err(AccessError::InvalidArgument(_))
        ));
    }
}
