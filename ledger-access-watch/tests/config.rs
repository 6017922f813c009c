use ledger_access_client::model::Identifier;
use ledger_access_logger::{LogFormat, LogOutput};
use ledger_access_watch::config::{load_config, StreamKind, WatchConfig};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() -> anyhow::Result<()> {
    let file = write_config(
        r#"
[client.access]
grpc-url = "http://access.example:9000"
execution-data-url = "http://execution.example:9000"
rest-url = "http://access.example:8070"

[client.subscription]
channel-capacity = 64
heartbeat-interval = 10
event-encoding = "json-cdc-v0"

[client.http]
timeout-secs = 5

[watch.log]
level = "debug"
format = "json"
output = "file"
file-path = "/tmp/watch.log"

[watch.stream]
kind = "execution-data"
start-block-id = "0x2c8f2a1d3a6b4e1b51e7d9c0e4b6f02c4b2d5f8a9e0c1d2e3f405162738495a6"
"#,
    );

    let config = load_config(file.path().to_str().unwrap())?;

    assert_eq!(config.client.access.grpc_url, "http://access.example:9000");
    assert_eq!(config.client.access.execution_data_url(), "http://execution.example:9000");
    assert_eq!(config.client.subscription.channel_capacity, 64);
    assert_eq!(config.client.http.timeout_secs, 5);

    let options = config.client.subscription.options()?;
    assert_eq!(options.heartbeat_interval, 10);

    assert_eq!(config.watch.log.level, "debug");
    assert_eq!(config.watch.log.format, LogFormat::Json);
    assert_eq!(config.watch.log.output, LogOutput::File);
    assert_eq!(config.watch.log.file_path.as_deref(), Some("/tmp/watch.log"));

    let stream = &config.watch.stream;
    assert_eq!(stream.kind, StreamKind::ExecutionData);
    assert_eq!(stream.start_height, 0);
    assert!(!stream.start_block_id()?.is_empty());
    Ok(())
}

#[test]
fn test_missing_sections_use_defaults() -> anyhow::Result<()> {
    let file = write_config(
        r#"
[watch.stream]
start-height = 1200
event-types = ["A.0000000000000001.Token.Minted"]
"#,
    );

    let config = load_config(file.path().to_str().unwrap())?;
    let defaults = WatchConfig::default();

    assert_eq!(config.client.access.grpc_url, defaults.client.access.grpc_url);
    assert_eq!(config.client.subscription.heartbeat_interval, 100);
    assert_eq!(config.watch.log, defaults.watch.log);

    let stream = &config.watch.stream;
    assert_eq!(stream.kind, StreamKind::Events);
    assert_eq!(stream.start_height, 1200);
    assert_eq!(stream.start_block_id()?, Identifier::EMPTY);

    let filter = stream.filter();
    assert_eq!(filter.event_types, vec!["A.0000000000000001.Token.Minted"]);
    assert!(filter.addresses.is_empty());
    assert!(filter.contracts.is_empty());
    Ok(())
}

#[test]
fn test_invalid_start_block_id_is_reported() {
    let file = write_config(
        r#"
[watch.stream]
start-block-id = "not-hex"
"#,
    );

    let config = load_config(file.path().to_str().unwrap()).unwrap();
    let err = config.watch.stream.start_block_id().unwrap_err();
    assert!(err.to_string().contains("not-hex"));
}

#[test]
fn test_missing_file_fails() {
    let err = load_config("/nonexistent/ledger-access-watch.toml").unwrap_err();
    assert!(err.to_string().contains("Failed to build configuration"));
}
