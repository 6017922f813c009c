use async_trait::async_trait;
use ledger_access_client::error::Result;
use ledger_access_client::grpc::{proto, AccessRpc, ExecutionDataRpc, FrameStream, GrpcClient};
use ledger_access_client::subscription::FrameSource;
use ledger_access_client::CancelToken;
use ledger_access_watch::config::{StreamConfig, StreamKind};
use ledger_access_watch::watcher::{watch, WatchSummary};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tonic::Status;

const WAIT: Duration = Duration::from_secs(5);

/// Yields its frames, then either ends the stream or waits for cancellation.
struct ScriptedStream<T> {
    frames: VecDeque<T>,
    then: Option<Status>,
    cancel: CancelToken,
}

#[async_trait]
impl<T: Send + 'static> FrameSource for ScriptedStream<T> {
    type Frame = T;

    async fn recv(&mut self) -> Result<Option<T>> {
        if let Some(frame) = self.frames.pop_front() {
            return Ok(Some(frame));
        }
        if let Some(status) = self.then.take() {
            return Err(ledger_access_client::AccessError::Stream(status));
        }
        self.cancel.cancelled().await;
        Ok(None)
    }
}

struct NoAccess;

impl AccessRpc for NoAccess {}

#[derive(Default)]
struct MockExecutionData {
    cancel: CancelToken,
    fail_with: Option<Status>,
    event_heights: Vec<u64>,
    execution_heights: Vec<u64>,
    event_requests: Mutex<Vec<proto::SubscribeEventsRequest>>,
}

#[async_trait]
impl ExecutionDataRpc for MockExecutionData {
    async fn subscribe_execution_data(
        &self,
        _request: proto::SubscribeExecutionDataRequest,
    ) -> std::result::Result<FrameStream<proto::SubscribeExecutionDataResponse>, Status> {
        let frames = self
            .execution_heights
            .iter()
            .map(|&height| proto::SubscribeExecutionDataResponse {
                block_height: height,
                block_execution_data: Some(proto::BlockExecutionData {
                    block_id: vec![height as u8; 32],
                    chunk_execution_data: vec![],
                }),
                block_timestamp: None,
            })
            .collect();
        Ok(Box::new(ScriptedStream {
            frames,
            then: self.fail_with.clone(),
            cancel: self.cancel.clone(),
        }))
    }

    async fn subscribe_events(
        &self,
        request: proto::SubscribeEventsRequest,
    ) -> std::result::Result<FrameStream<proto::SubscribeEventsResponse>, Status> {
        self.event_requests.lock().unwrap().push(request);
        let frames = self
            .event_heights
            .iter()
            .map(|&height| proto::SubscribeEventsResponse {
                block_id: vec![height as u8; 32],
                block_height: height,
                ..Default::default()
            })
            .collect();
        Ok(Box::new(ScriptedStream {
            frames,
            then: self.fail_with.clone(),
            cancel: self.cancel.clone(),
        }))
    }
}

fn client(mock: Arc<MockExecutionData>) -> GrpcClient {
    GrpcClient::from_rpc(Arc::new(NoAccess), mock)
}

#[tokio::test]
async fn test_watch_events_until_cancelled() -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let mock = Arc::new(MockExecutionData {
        cancel: cancel.clone(),
        event_heights: vec![100, 101, 102],
        ..Default::default()
    });
    let client = client(mock.clone());
    let stream = StreamConfig {
        start_height: 100,
        contracts: vec!["A.0000000000000001.Token".to_string()],
        ..Default::default()
    };

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let summary = timeout(WAIT, watch(&client, &stream, &cancel)).await??;
    assert_eq!(
        summary,
        WatchSummary {
            values: 3,
            last_height: Some(102)
        }
    );

    let requests = mock.event_requests.lock().unwrap();
    assert_eq!(requests[0].start_block_height, 100);
    assert_eq!(requests[0].heartbeat_interval, 100);
    assert_eq!(
        requests[0].filter.as_ref().unwrap().contract,
        vec!["A.0000000000000001.Token".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_watch_execution_data_reports_stream_failure() {
    let mock = Arc::new(MockExecutionData {
        execution_heights: vec![7, 8],
        fail_with: Some(Status::unavailable("node restarted")),
        ..Default::default()
    });
    let client = client(mock);
    let stream = StreamConfig {
        kind: StreamKind::ExecutionData,
        start_height: 7,
        ..Default::default()
    };

    let err = timeout(WAIT, watch(&client, &stream, &CancelToken::new()))
        .await
        .unwrap()
        .unwrap_err();
    assert!(err.to_string().contains("after 2 values, last height 8"));
    assert!(format!("{err:#}").contains("node restarted"));
}

#[tokio::test]
async fn test_watch_rejects_conflicting_start() {
    let client = client(Arc::new(MockExecutionData::default()));
    let stream = StreamConfig {
        start_height: 5,
        start_block_id: Some(hex_id()),
        ..Default::default()
    };

    let err = watch(&client, &stream, &CancelToken::new()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to subscribe to events"));
}

fn hex_id() -> String {
    "0x2c8f2a1d3a6b4e1b51e7d9c0e4b6f02c4b2d5f8a9e0c1d2e3f405162738495a6".to_string()
}
