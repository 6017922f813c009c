use async_trait::async_trait;
use ciborium::value::{Integer, Value as Cbor};
use ledger_access_client::error::{AccessError, Result};
use ledger_access_client::grpc::{proto, AccessRpc, ExecutionDataRpc, FrameStream, GrpcClient};
use ledger_access_client::model::{Address, BlockStatus, EventFilter, Identifier};
use ledger_access_client::payload::{EventEncodingVersion, Value};
use ledger_access_client::subscription::{CancelToken, FrameSource, SubscribeOptions};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tonic::{Code, Status};

const WAIT: Duration = Duration::from_secs(5);

/// A server stream that yields its frames and then stays open until the
/// session is cancelled, at which point it reports end-of-stream.
struct MockStream<T> {
    frames: VecDeque<T>,
    cancel: CancelToken,
}

#[async_trait]
impl<T: Send + 'static> FrameSource for MockStream<T> {
    type Frame = T;

    async fn recv(&mut self) -> Result<Option<T>> {
        if let Some(frame) = self.frames.pop_front() {
            return Ok(Some(frame));
        }
        self.cancel.cancelled().await;
        Ok(None)
    }
}

// A mock execution data API serving scripted frames and recording requests.
#[derive(Default)]
struct MockExecutionData {
    cancel: CancelToken,
    open_error: Option<Status>,
    execution_frames: Mutex<Vec<proto::SubscribeExecutionDataResponse>>,
    event_frames: Mutex<Vec<proto::SubscribeEventsResponse>>,
    execution_requests: Mutex<Vec<proto::SubscribeExecutionDataRequest>>,
    event_requests: Mutex<Vec<proto::SubscribeEventsRequest>>,
}

#[async_trait]
impl ExecutionDataRpc for MockExecutionData {
    async fn get_execution_data_by_block_id(
        &self,
        request: proto::GetExecutionDataByBlockIdRequest,
    ) -> std::result::Result<proto::GetExecutionDataByBlockIdResponse, Status> {
        Ok(proto::GetExecutionDataByBlockIdResponse {
            block_execution_data: Some(proto::BlockExecutionData {
                block_id: request.block_id,
                chunk_execution_data: vec![],
            }),
        })
    }

    async fn subscribe_execution_data(
        &self,
        request: proto::SubscribeExecutionDataRequest,
    ) -> std::result::Result<FrameStream<proto::SubscribeExecutionDataResponse>, Status> {
        self.execution_requests.lock().unwrap().push(request);
        if let Some(status) = &self.open_error {
            return Err(status.clone());
        }
        let frames = std::mem::take(&mut *self.execution_frames.lock().unwrap());
        Ok(Box::new(MockStream {
            frames: frames.into(),
            cancel: self.cancel.clone(),
        }))
    }

    async fn subscribe_events(
        &self,
        request: proto::SubscribeEventsRequest,
    ) -> std::result::Result<FrameStream<proto::SubscribeEventsResponse>, Status> {
        self.event_requests.lock().unwrap().push(request);
        if let Some(status) = &self.open_error {
            return Err(status.clone());
        }
        let frames = std::mem::take(&mut *self.event_frames.lock().unwrap());
        Ok(Box::new(MockStream {
            frames: frames.into(),
            cancel: self.cancel.clone(),
        }))
    }
}

// A mock access API answering a few unary calls.
struct MockAccess {
    header: proto::BlockHeader,
}

#[async_trait]
impl AccessRpc for MockAccess {
    async fn ping(
        &self,
        _request: proto::PingRequest,
    ) -> std::result::Result<proto::PingResponse, Status> {
        Ok(proto::PingResponse {})
    }

    async fn get_latest_block_header(
        &self,
        request: proto::GetLatestBlockHeaderRequest,
    ) -> std::result::Result<proto::BlockHeaderResponse, Status> {
        let status = if request.is_sealed {
            proto::BlockStatus::BlockSealed
        } else {
            proto::BlockStatus::BlockFinalized
        };
        Ok(proto::BlockHeaderResponse {
            block: Some(self.header.clone()),
            block_status: status as i32,
        })
    }

    async fn get_block_header_by_height(
        &self,
        _request: proto::GetBlockHeaderByHeightRequest,
    ) -> std::result::Result<proto::BlockHeaderResponse, Status> {
        Ok(proto::BlockHeaderResponse {
            block: None,
            block_status: 0,
        })
    }

    async fn get_account_at_latest_block(
        &self,
        request: proto::GetAccountAtLatestBlockRequest,
    ) -> std::result::Result<proto::AccountResponse, Status> {
        Ok(proto::AccountResponse {
            account: Some(proto::Account {
                address: request.address,
                balance: 1_000,
                keys: vec![proto::AccountKey {
                    index: 0,
                    public_key: vec![0xaa; 64],
                    sign_algo: 2,
                    hash_algo: 3,
                    weight: 1000,
                    sequence_number: 9,
                    revoked: false,
                }],
                contracts: Default::default(),
            }),
        })
    }

    async fn execute_script_at_latest_block(
        &self,
        _request: proto::ExecuteScriptAtLatestBlockRequest,
    ) -> std::result::Result<proto::ExecuteScriptResponse, Status> {
        Ok(proto::ExecuteScriptResponse {
            value: br#"{"type":"UInt64","value":"42"}"#.to_vec(),
        })
    }

    async fn get_events_for_height_range(
        &self,
        request: proto::GetEventsForHeightRangeRequest,
    ) -> std::result::Result<proto::EventsResponse, Status> {
        let encoding = if request.event_encoding_version == proto::EventEncodingVersion::CcfV0 as i32 {
            EventEncodingVersion::CcfV0
        } else {
            EventEncodingVersion::JsonCdcV0
        };
        Ok(proto::EventsResponse {
            results: (request.start_height..=request.end_height)
                .map(|height| proto::EventsResult {
                    block_id: random_id().to_vec(),
                    block_height: height,
                    events: vec![event(&request.r#type, 0, payload_for(encoding, height))],
                    block_timestamp: None,
                })
                .collect(),
        })
    }
}

fn random_id() -> Identifier {
    Identifier::new(rand::random())
}

fn tag(tag: u64, content: Cbor) -> Cbor {
    Cbor::Tag(tag, Box::new(content))
}

/// A CCF encoded `A.0000000000000001.Token.Minted(amount: UFix64)` event.
fn ccf_event(amount: u64) -> Vec<u8> {
    let type_ref = Cbor::Bytes(vec![0]);
    let typedef = tag(
        162,
        Cbor::Array(vec![
            type_ref.clone(),
            Cbor::Text("A.0000000000000001.Token.Minted".to_string()),
            Cbor::Array(vec![Cbor::Array(vec![
                Cbor::Text("amount".to_string()),
                tag(137, Cbor::Integer(Integer::from(23u64))),
            ])]),
        ]),
    );
    let message = tag(
        129,
        Cbor::Array(vec![
            Cbor::Array(vec![typedef]),
            Cbor::Array(vec![
                tag(136, type_ref),
                Cbor::Array(vec![Cbor::Integer(Integer::from(amount))]),
            ]),
        ]),
    );
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&message, &mut bytes).unwrap();
    bytes
}

fn json_event(amount: u64) -> Vec<u8> {
    format!(
        r#"{{"type":"Event","value":{{"id":"A.0000000000000001.Token.Minted","fields":[{{"name":"amount","value":{{"type":"UFix64","value":"{}.00000000"}}}}]}}}}"#,
        amount
    )
    .into_bytes()
}

fn payload_for(encoding: EventEncodingVersion, amount: u64) -> Vec<u8> {
    match encoding {
        EventEncodingVersion::CcfV0 => ccf_event(amount * 100_000_000),
        EventEncodingVersion::JsonCdcV0 => json_event(amount),
    }
}

fn event(event_type: &str, index: u32, payload: Vec<u8>) -> proto::Event {
    proto::Event {
        r#type: event_type.to_string(),
        transaction_id: random_id().to_vec(),
        transaction_index: 0,
        event_index: index,
        payload,
    }
}

fn execution_frame(height: u64) -> proto::SubscribeExecutionDataResponse {
    proto::SubscribeExecutionDataResponse {
        block_height: height,
        block_execution_data: Some(proto::BlockExecutionData {
            block_id: random_id().to_vec(),
            chunk_execution_data: vec![proto::ChunkExecutionData::default()],
        }),
        block_timestamp: Some(prost_types::Timestamp {
            seconds: 1_700_000_000 + height as i64,
            nanos: 0,
        }),
    }
}

fn client_with(execution_data: Arc<MockExecutionData>) -> GrpcClient {
    let access = Arc::new(MockAccess {
        header: proto::BlockHeader {
            id: random_id().to_vec(),
            parent_id: random_id().to_vec(),
            height: 77,
            ..Default::default()
        },
    });
    GrpcClient::from_rpc(access, execution_data)
}

#[tokio::test]
async fn test_subscribe_execution_data_streams_in_order() -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let mock = Arc::new(MockExecutionData {
        cancel: cancel.clone(),
        execution_frames: Mutex::new((10..1010).map(execution_frame).collect()),
        ..Default::default()
    });
    let client = client_with(mock.clone());

    let mut sub = client
        .subscribe_execution_data(&cancel, Identifier::EMPTY, 10, SubscribeOptions::default())
        .await?;

    for expected in 10..1010u64 {
        let response = timeout(WAIT, sub.recv()).await?.expect("value");
        assert_eq!(response.height, expected);
        assert_eq!(response.execution_data.chunk_execution_data.len(), 1);
        assert_eq!(response.block_timestamp.timestamp(), 1_700_000_000 + expected as i64);
    }
    cancel.cancel();
    assert!(timeout(WAIT, sub.recv()).await?.is_none());
    assert!(sub.recv_error().await.is_none());

    let requests = mock.execution_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start_block_height, 10);
    assert!(requests[0].start_block_id.is_empty());
    assert_eq!(
        requests[0].event_encoding_version,
        proto::EventEncodingVersion::CcfV0 as i32
    );
    Ok(())
}

#[tokio::test]
async fn test_conflicting_anchor_fails_before_opening() {
    let mock = Arc::new(MockExecutionData::default());
    let client = client_with(mock.clone());
    let cancel = CancelToken::new();

    let err = client
        .subscribe_execution_data(&cancel, random_id(), 10, SubscribeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::InvalidArgument(_)));

    let err = client
        .subscribe_events(
            &cancel,
            random_id(),
            10,
            EventFilter::default(),
            SubscribeOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::InvalidArgument(_)));

    assert!(mock.execution_requests.lock().unwrap().is_empty());
    assert!(mock.event_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_filter_fails_before_opening() {
    let mock = Arc::new(MockExecutionData::default());
    let client = client_with(mock.clone());

    let filter = EventFilter {
        addresses: vec!["zz-not-hex".to_string()],
        ..Default::default()
    };
    let err = client
        .subscribe_events(
            &CancelToken::new(),
            Identifier::EMPTY,
            0,
            filter,
            SubscribeOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::InvalidArgument(_)));
    assert!(mock.event_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_open_failure_is_returned_synchronously() {
    let mock = Arc::new(MockExecutionData {
        open_error: Some(Status::unavailable("connection refused")),
        ..Default::default()
    });
    let client = client_with(mock);

    let err = client
        .subscribe_execution_data(&CancelToken::new(), Identifier::EMPTY, 0, SubscribeOptions::default())
        .await
        .unwrap_err();
    match err {
        AccessError::Open(status) => assert_eq!(status.code(), Code::Unavailable),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_execution_frame_without_data_is_one_conversion_error() -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let mut empty = execution_frame(10);
    empty.block_execution_data = None;
    let mock = Arc::new(MockExecutionData {
        cancel: cancel.clone(),
        execution_frames: Mutex::new(vec![empty, execution_frame(11)]),
        ..Default::default()
    });
    let client = client_with(mock);

    let mut sub = client
        .subscribe_execution_data(&cancel, Identifier::EMPTY, 10, SubscribeOptions::default())
        .await?;

    assert!(timeout(WAIT, sub.recv()).await?.is_none());
    let err = sub.recv_error().await.expect("one error");
    assert!(err.is_conversion());
    assert!(matches!(err, AccessError::MalformedFrame(_)));
    assert!(sub.recv_error().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_subscribe_events_sends_defaults_and_decodes_ccf() -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let block_id = random_id();
    let mock = Arc::new(MockExecutionData {
        cancel: cancel.clone(),
        event_frames: Mutex::new(vec![
            proto::SubscribeEventsResponse {
                block_id: block_id.to_vec(),
                block_height: 20,
                events: vec![
                    event("A.0000000000000001.Token.Minted", 0, ccf_event(150_000_000)),
                    event("A.0000000000000001.Token.Minted", 1, ccf_event(50_000_000)),
                ],
                ..Default::default()
            },
            // A heartbeat.
            proto::SubscribeEventsResponse {
                block_id: random_id().to_vec(),
                block_height: 120,
                ..Default::default()
            },
        ]),
        ..Default::default()
    });
    let client = client_with(mock.clone());

    let mut sub = client
        .subscribe_events(
            &cancel,
            Identifier::EMPTY,
            20,
            EventFilter::default(),
            SubscribeOptions::default(),
        )
        .await?;

    let first = timeout(WAIT, sub.recv()).await?.expect("value");
    assert_eq!(first.block_id, block_id);
    assert_eq!(first.height, 20);
    assert_eq!(first.events.len(), 2);
    let minted = first.events[0].value.as_composite().expect("composite");
    assert_eq!(minted.type_id, "A.0000000000000001.Token.Minted");
    assert_eq!(minted.field("amount"), Some(&Value::UFix64(150_000_000)));
    assert_eq!(first.events[1].event_index, 1);

    let heartbeat = timeout(WAIT, sub.recv()).await?.expect("value");
    assert_eq!(heartbeat.height, 120);
    assert!(heartbeat.events.is_empty());

    cancel.cancel();
    assert!(timeout(WAIT, sub.recv()).await?.is_none());
    assert!(sub.recv_error().await.is_none());

    let requests = mock.event_requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.heartbeat_interval, 100);
    assert_eq!(request.start_block_height, 20);
    assert_eq!(
        request.event_encoding_version,
        proto::EventEncodingVersion::CcfV0 as i32
    );
    let filter = request.filter.as_ref().expect("filter is always sent");
    assert!(filter.event_type.is_empty());
    assert!(filter.address.is_empty());
    assert!(filter.contract.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_subscribe_events_with_custom_options() -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let start = random_id();
    let mock = Arc::new(MockExecutionData {
        cancel: cancel.clone(),
        event_frames: Mutex::new(vec![proto::SubscribeEventsResponse {
            block_id: start.to_vec(),
            block_height: 5,
            events: vec![event("A.0000000000000001.Token.Minted", 0, json_event(3))],
            ..Default::default()
        }]),
        ..Default::default()
    });
    let client = client_with(mock.clone());

    let filter = EventFilter {
        event_types: vec!["A.0000000000000001.Token.Minted".to_string()],
        addresses: vec!["0000000000000001".to_string()],
        contracts: vec!["A.0000000000000001.Token".to_string()],
    };
    let options = SubscribeOptions::default()
        .with_heartbeat_interval(1234)
        .with_event_encoding(EventEncodingVersion::JsonCdcV0);

    let mut sub = client
        .subscribe_events(&cancel, start, 0, filter.clone(), options)
        .await?;
    let events = timeout(WAIT, sub.recv()).await?.expect("value");
    assert_eq!(
        events.events[0].value.as_composite().unwrap().field("amount"),
        Some(&Value::UFix64(300_000_000))
    );
    cancel.cancel();

    let requests = mock.event_requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.start_block_id, start.to_vec());
    assert_eq!(request.start_block_height, 0);
    assert_eq!(request.heartbeat_interval, 1234);
    assert_eq!(
        request.event_encoding_version,
        proto::EventEncodingVersion::JsonCdcV0 as i32
    );
    let sent = request.filter.as_ref().unwrap();
    assert_eq!(sent.event_type, filter.event_types);
    assert_eq!(sent.address, filter.addresses);
    assert_eq!(sent.contract, filter.contracts);
    Ok(())
}

#[tokio::test]
async fn test_corrupted_event_payload_rejects_the_frame() -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let mut corrupted = ccf_event(1);
    corrupted[0] = b'x';
    let mock = Arc::new(MockExecutionData {
        cancel: cancel.clone(),
        event_frames: Mutex::new(vec![proto::SubscribeEventsResponse {
            block_id: random_id().to_vec(),
            block_height: 7,
            events: vec![
                event("A.0000000000000001.Token.Minted", 0, ccf_event(1)),
                event("A.0000000000000001.Token.Minted", 1, corrupted),
                event("A.0000000000000001.Token.Minted", 2, ccf_event(2)),
            ],
            ..Default::default()
        }]),
        ..Default::default()
    });
    let client = client_with(mock);

    let mut sub = client
        .subscribe_events(
            &cancel,
            Identifier::EMPTY,
            0,
            EventFilter::default(),
            SubscribeOptions::default(),
        )
        .await?;

    assert!(timeout(WAIT, sub.recv()).await?.is_none());
    let err = sub.recv_error().await.expect("one error");
    assert!(matches!(err, AccessError::Payload(_)));
    assert!(err.is_conversion());
    Ok(())
}

#[tokio::test]
async fn test_unary_calls() -> anyhow::Result<()> {
    let client = client_with(Arc::new(MockExecutionData::default()));

    client.ping().await?;

    let header = client.get_latest_block_header(true).await?;
    assert_eq!(header.height, 77);
    assert_eq!(header.status, BlockStatus::Sealed);
    let header = client.get_latest_block_header(false).await?;
    assert_eq!(header.status, BlockStatus::Finalized);

    let address = Address::from_hex("0x01")?;
    let account = client.get_account(&address).await?;
    assert_eq!(account.address, address);
    assert_eq!(account.balance, 1_000);
    assert_eq!(account.keys[0].sequence_number, 9);

    let value = client.execute_script_at_latest_block(b"main()", vec![]).await?;
    assert_eq!(
        value,
        Value::Integer {
            ty: ledger_access_client::payload::IntegerType::UInt64,
            value: "42".to_string()
        }
    );

    let events = client
        .get_events_for_height_range("A.0000000000000001.Token.Minted", 3, 5)
        .await?;
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].height, 5);
    assert_eq!(
        events[0].events[0].value.as_composite().unwrap().field("amount"),
        Some(&Value::UFix64(300_000_000))
    );

    let block_id = random_id();
    let data = client.get_execution_data_by_block_id(&block_id).await?;
    assert_eq!(data.block_id, block_id);
    Ok(())
}

#[tokio::test]
async fn test_unary_failures() {
    let client = client_with(Arc::new(MockExecutionData::default()));

    let err = client.get_block_header_by_height(3).await.unwrap_err();
    assert!(matches!(err, AccessError::MalformedFrame(_)));

    let err = client.get_network_parameters().await.unwrap_err();
    assert_eq!(err.status().map(Status::code), Some(Code::Unimplemented));
    assert!(matches!(err, AccessError::Rpc(_)));
}
