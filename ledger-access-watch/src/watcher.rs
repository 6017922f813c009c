//! Follows one subscription and logs what it delivers.

use crate::config::{StreamConfig, StreamKind};
use anyhow::{Context, Result};
use ledger_access_client::model::{BlockEvents, ExecutionDataStreamResponse};
use ledger_access_client::{CancelToken, GrpcClient, Subscription};

/// What a finished watch saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub values: u64,
    pub last_height: Option<u64>,
}

/// Subscribes as described by `stream` and logs every value until the session
/// ends, either because `cancel` fired or because the node closed the stream.
///
/// A session that ends with an error returns it, with the progress made so far
/// as context.
pub async fn watch(
    client: &GrpcClient,
    stream: &StreamConfig,
    cancel: &CancelToken,
) -> Result<WatchSummary> {
    let start_block_id = stream.start_block_id()?;
    match stream.kind {
        StreamKind::Events => {
            let sub = client
                .subscribe_events_with_defaults(
                    cancel,
                    start_block_id,
                    stream.start_height,
                    stream.filter(),
                )
                .await
                .context("Failed to subscribe to events")?;
            drain(sub, log_events).await
        }
        StreamKind::ExecutionData => {
            let sub = client
                .subscribe_execution_data_with_defaults(cancel, start_block_id, stream.start_height)
                .await
                .context("Failed to subscribe to execution data")?;
            drain(sub, log_execution_data).await
        }
    }
}

async fn drain<V>(mut sub: Subscription<V>, log: fn(&V) -> u64) -> Result<WatchSummary> {
    let mut summary = WatchSummary::default();
    while let Some(next) = sub.next().await {
        match next {
            Ok(value) => {
                summary.values += 1;
                summary.last_height = Some(log(&value));
            }
            Err(err) => {
                if err.is_conversion() {
                    tracing::warn!(error = %err, "Received a frame that could not be converted");
                } else {
                    tracing::error!(error = %err, "Subscription stream failed");
                }
                let progress = match summary.last_height {
                    Some(height) => format!("after {} values, last height {height}", summary.values),
                    None => "before any value".to_string(),
                };
                return Err(anyhow::Error::new(err).context(format!("Subscription ended {progress}")));
            }
        }
    }
    tracing::info!(values = summary.values, "Subscription closed");
    Ok(summary)
}

fn log_events(block: &BlockEvents) -> u64 {
    if block.events.is_empty() {
        tracing::debug!(height = block.height, "Heartbeat");
    } else {
        tracing::info!(
            height = block.height,
            block_id = %block.block_id,
            events = block.events.len(),
            "Block events"
        );
    }
    for event in &block.events {
        tracing::debug!(
            event_type = %event.event_type,
            transaction_id = %event.transaction_id,
            event_index = event.event_index,
            "{:?}",
            event.value
        );
    }
    block.height
}

fn log_execution_data(response: &ExecutionDataStreamResponse) -> u64 {
    let data = &response.execution_data;
    tracing::info!(
        height = response.height,
        block_id = %data.block_id,
        chunks = data.chunk_execution_data.len(),
        timestamp = %response.block_timestamp,
        "Execution data"
    );
    response.height
}
