//! # gRPC Client
//!
//! Talks to an access node over its two gRPC services: the access API (blocks,
//! transactions, accounts, scripts, events) and the execution data API (which
//! also carries the two streaming subscriptions).
//!
//! ## Architecture
//!
//! The raw calls sit behind two traits, [`AccessRpc`] and [`ExecutionDataRpc`].
//! [`AccessApiClient`] and [`ExecutionDataApiClient`] implement them over a
//! tonic channel, and tests plug in their own implementations. [`GrpcClient`]
//! wraps both and exposes the domain-level API: requests are built from domain
//! types, responses are converted back, and subscriptions are handed to the
//! [subscription engine](crate::subscription).

pub mod proto;

pub(crate) mod convert;
mod stub;

pub use stub::{AccessApiClient, ExecutionDataApiClient};

use crate::config::ClientConfig;
use crate::error::{AccessError, Result};
use crate::model::{
    Account, Address, Block, BlockEvents, BlockHeader, Collection, EventFilter, ExecutionData,
    ExecutionDataStreamResponse, ExecutionResult, Identifier, NetworkParameters, Transaction,
    TransactionResult,
};
use crate::payload::{self, EventEncodingVersion, Value};
use crate::subscription::{
    self, CancelToken, EventsConverter, EventsRequest, ExecutionDataConverter,
    ExecutionDataRequest, FrameSource, SubscribeOptions, Subscription,
};
use async_trait::async_trait;
use std::sync::Arc;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

/// An open server stream, as handed to the subscription engine.
pub type FrameStream<T> = Box<dyn FrameSource<Frame = T>>;

fn not_served<T>(method: &str) -> Result<T, Status> {
    Err(Status::unimplemented(format!("{method} is not implemented")))
}

/// The unary calls of the access API.
///
/// Every method has a default body answering `UNIMPLEMENTED`, so partial
/// implementations only override what they serve.
#[async_trait]
pub trait AccessRpc: Send + Sync {
    async fn ping(&self, _request: proto::PingRequest) -> Result<proto::PingResponse, Status> {
        not_served("Ping")
    }

    async fn get_network_parameters(
        &self,
        _request: proto::GetNetworkParametersRequest,
    ) -> Result<proto::GetNetworkParametersResponse, Status> {
        not_served("GetNetworkParameters")
    }

    async fn get_latest_block_header(
        &self,
        _request: proto::GetLatestBlockHeaderRequest,
    ) -> Result<proto::BlockHeaderResponse, Status> {
        not_served("GetLatestBlockHeader")
    }

    async fn get_block_header_by_id(
        &self,
        _request: proto::GetBlockHeaderByIdRequest,
    ) -> Result<proto::BlockHeaderResponse, Status> {
        not_served("GetBlockHeaderByID")
    }

    async fn get_block_header_by_height(
        &self,
        _request: proto::GetBlockHeaderByHeightRequest,
    ) -> Result<proto::BlockHeaderResponse, Status> {
        not_served("GetBlockHeaderByHeight")
    }

    async fn get_latest_block(
        &self,
        _request: proto::GetLatestBlockRequest,
    ) -> Result<proto::BlockResponse, Status> {
        not_served("GetLatestBlock")
    }

    async fn get_block_by_id(
        &self,
        _request: proto::GetBlockByIdRequest,
    ) -> Result<proto::BlockResponse, Status> {
        not_served("GetBlockByID")
    }

    async fn get_block_by_height(
        &self,
        _request: proto::GetBlockByHeightRequest,
    ) -> Result<proto::BlockResponse, Status> {
        not_served("GetBlockByHeight")
    }

    async fn get_collection_by_id(
        &self,
        _request: proto::GetCollectionByIdRequest,
    ) -> Result<proto::CollectionResponse, Status> {
        not_served("GetCollectionByID")
    }

    async fn send_transaction(
        &self,
        _request: proto::SendTransactionRequest,
    ) -> Result<proto::SendTransactionResponse, Status> {
        not_served("SendTransaction")
    }

    async fn get_transaction(
        &self,
        _request: proto::GetTransactionRequest,
    ) -> Result<proto::TransactionResponse, Status> {
        not_served("GetTransaction")
    }

    async fn get_transaction_result(
        &self,
        _request: proto::GetTransactionRequest,
    ) -> Result<proto::TransactionResultResponse, Status> {
        not_served("GetTransactionResult")
    }

    async fn get_transactions_by_block_id(
        &self,
        _request: proto::GetTransactionsByBlockIdRequest,
    ) -> Result<proto::TransactionsResponse, Status> {
        not_served("GetTransactionsByBlockID")
    }

    async fn get_transaction_results_by_block_id(
        &self,
        _request: proto::GetTransactionsByBlockIdRequest,
    ) -> Result<proto::TransactionResultsResponse, Status> {
        not_served("GetTransactionResultsByBlockID")
    }

    async fn get_account_at_latest_block(
        &self,
        _request: proto::GetAccountAtLatestBlockRequest,
    ) -> Result<proto::AccountResponse, Status> {
        not_served("GetAccountAtLatestBlock")
    }

    async fn get_account_at_block_height(
        &self,
        _request: proto::GetAccountAtBlockHeightRequest,
    ) -> Result<proto::AccountResponse, Status> {
        not_served("GetAccountAtBlockHeight")
    }

    async fn execute_script_at_latest_block(
        &self,
        _request: proto::ExecuteScriptAtLatestBlockRequest,
    ) -> Result<proto::ExecuteScriptResponse, Status> {
        not_served("ExecuteScriptAtLatestBlock")
    }

    async fn execute_script_at_block_id(
        &self,
        _request: proto::ExecuteScriptAtBlockIdRequest,
    ) -> Result<proto::ExecuteScriptResponse, Status> {
        not_served("ExecuteScriptAtBlockID")
    }

    async fn execute_script_at_block_height(
        &self,
        _request: proto::ExecuteScriptAtBlockHeightRequest,
    ) -> Result<proto::ExecuteScriptResponse, Status> {
        not_served("ExecuteScriptAtBlockHeight")
    }

    async fn get_events_for_height_range(
        &self,
        _request: proto::GetEventsForHeightRangeRequest,
    ) -> Result<proto::EventsResponse, Status> {
        not_served("GetEventsForHeightRange")
    }

    async fn get_events_for_block_ids(
        &self,
        _request: proto::GetEventsForBlockIdsRequest,
    ) -> Result<proto::EventsResponse, Status> {
        not_served("GetEventsForBlockIDs")
    }

    async fn get_latest_protocol_state_snapshot(
        &self,
        _request: proto::GetLatestProtocolStateSnapshotRequest,
    ) -> Result<proto::ProtocolStateSnapshotResponse, Status> {
        not_served("GetLatestProtocolStateSnapshot")
    }

    async fn get_execution_result_for_block_id(
        &self,
        _request: proto::GetExecutionResultForBlockIdRequest,
    ) -> Result<proto::ExecutionResultForBlockIdResponse, Status> {
        not_served("GetExecutionResultForBlockID")
    }
}

/// The calls of the execution data API, including the two subscriptions.
#[async_trait]
pub trait ExecutionDataRpc: Send + Sync {
    async fn get_execution_data_by_block_id(
        &self,
        _request: proto::GetExecutionDataByBlockIdRequest,
    ) -> Result<proto::GetExecutionDataByBlockIdResponse, Status> {
        not_served("GetExecutionDataByBlockID")
    }

    /// Opens the execution data stream. An `Err` means the call could not be
    /// established at all.
    async fn subscribe_execution_data(
        &self,
        _request: proto::SubscribeExecutionDataRequest,
    ) -> Result<FrameStream<proto::SubscribeExecutionDataResponse>, Status> {
        not_served("SubscribeExecutionData")
    }

    /// Opens the filtered event stream.
    async fn subscribe_events(
        &self,
        _request: proto::SubscribeEventsRequest,
    ) -> Result<FrameStream<proto::SubscribeEventsResponse>, Status> {
        not_served("SubscribeEvents")
    }
}

fn missing(what: &str) -> AccessError {
    AccessError::MalformedFrame(format!("response carries no {what}"))
}

/// A domain-level client for an access node's gRPC API.
///
/// Cloning is cheap and clones share the underlying connections.
#[derive(Clone)]
pub struct GrpcClient {
    access: Arc<dyn AccessRpc>,
    execution_data: Arc<dyn ExecutionDataRpc>,
    /// Encoding requested for event payloads of unary calls.
    event_encoding: EventEncodingVersion,
    /// Options used by the `*_with_defaults` subscribe helpers.
    default_options: SubscribeOptions,
}

impl GrpcClient {
    /// Creates a client over existing RPC implementations.
    pub fn from_rpc(access: Arc<dyn AccessRpc>, execution_data: Arc<dyn ExecutionDataRpc>) -> Self {
        Self {
            access,
            execution_data,
            event_encoding: EventEncodingVersion::default(),
            default_options: SubscribeOptions::default(),
        }
    }

    /// Connects to a node serving both APIs on one endpoint.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(url, url).await
    }

    /// Connects to the access API and the execution data API separately.
    pub async fn connect_with(access_url: &str, execution_data_url: &str) -> Result<Self> {
        let access_channel = Self::channel(access_url).await?;
        let execution_data_channel = if execution_data_url == access_url {
            access_channel.clone()
        } else {
            Self::channel(execution_data_url).await?
        };
        tracing::info!(
            "Connected to access node at {} (execution data at {})",
            access_url,
            execution_data_url
        );

        Ok(Self::from_rpc(
            Arc::new(AccessApiClient::new(access_channel)),
            Arc::new(ExecutionDataApiClient::new(execution_data_channel)),
        ))
    }

    /// Connects using the endpoints and subscription defaults of `config`.
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let options = config.subscription.options()?;
        let client =
            Self::connect_with(&config.access.grpc_url, config.access.execution_data_url())
                .await?;
        Ok(client
            .with_event_encoding(options.event_encoding)
            .with_default_options(options))
    }

    async fn channel(url: &str) -> Result<Channel> {
        Ok(Endpoint::from_shared(url.to_string())?.connect().await?)
    }

    pub fn with_event_encoding(mut self, encoding: EventEncodingVersion) -> Self {
        self.event_encoding = encoding;
        self
    }

    pub fn with_default_options(mut self, options: SubscribeOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn default_options(&self) -> &SubscribeOptions {
        &self.default_options
    }

    // --- Network ---

    pub async fn ping(&self) -> Result<()> {
        self.access.ping(proto::PingRequest {}).await?;
        Ok(())
    }

    pub async fn get_network_parameters(&self) -> Result<NetworkParameters> {
        let response = self
            .access
            .get_network_parameters(proto::GetNetworkParametersRequest {})
            .await?;
        Ok(NetworkParameters {
            chain_id: response.chain_id,
        })
    }

    /// Returns the serialized protocol state snapshot of the latest finalized block.
    pub async fn get_latest_protocol_state_snapshot(&self) -> Result<Vec<u8>> {
        let response = self
            .access
            .get_latest_protocol_state_snapshot(proto::GetLatestProtocolStateSnapshotRequest {})
            .await?;
        Ok(response.serialized_snapshot)
    }

    // --- Blocks ---

    pub async fn get_latest_block_header(&self, is_sealed: bool) -> Result<BlockHeader> {
        let response = self
            .access
            .get_latest_block_header(proto::GetLatestBlockHeaderRequest { is_sealed })
            .await?;
        Self::block_header(response)
    }

    pub async fn get_block_header_by_id(&self, id: &Identifier) -> Result<BlockHeader> {
        let response = self
            .access
            .get_block_header_by_id(proto::GetBlockHeaderByIdRequest { id: id.to_vec() })
            .await?;
        Self::block_header(response)
    }

    pub async fn get_block_header_by_height(&self, height: u64) -> Result<BlockHeader> {
        let response = self
            .access
            .get_block_header_by_height(proto::GetBlockHeaderByHeightRequest { height })
            .await?;
        Self::block_header(response)
    }

    fn block_header(response: proto::BlockHeaderResponse) -> Result<BlockHeader> {
        let header = response.block.ok_or_else(|| missing("block header"))?;
        Ok(convert::block_header_from_proto(header, response.block_status))
    }

    pub async fn get_latest_block(&self, is_sealed: bool) -> Result<Block> {
        let response = self
            .access
            .get_latest_block(proto::GetLatestBlockRequest {
                is_sealed,
                full_block_response: true,
            })
            .await?;
        Self::block(response)
    }

    pub async fn get_block_by_id(&self, id: &Identifier) -> Result<Block> {
        let response = self
            .access
            .get_block_by_id(proto::GetBlockByIdRequest {
                id: id.to_vec(),
                full_block_response: true,
            })
            .await?;
        Self::block(response)
    }

    pub async fn get_block_by_height(&self, height: u64) -> Result<Block> {
        let response = self
            .access
            .get_block_by_height(proto::GetBlockByHeightRequest {
                height,
                full_block_response: true,
            })
            .await?;
        Self::block(response)
    }

    fn block(response: proto::BlockResponse) -> Result<Block> {
        let block = response.block.ok_or_else(|| missing("block"))?;
        Ok(convert::block_from_proto(block, response.block_status))
    }

    pub async fn get_collection(&self, id: &Identifier) -> Result<Collection> {
        let response = self
            .access
            .get_collection_by_id(proto::GetCollectionByIdRequest { id: id.to_vec() })
            .await?;
        let collection = response.collection.ok_or_else(|| missing("collection"))?;
        Ok(convert::collection_from_proto(collection))
    }

    // --- Transactions ---

    /// Submits a transaction and returns its id.
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Identifier> {
        let response = self
            .access
            .send_transaction(proto::SendTransactionRequest {
                transaction: Some(convert::transaction_to_proto(transaction)),
            })
            .await?;
        Ok(Identifier::from_slice(&response.id))
    }

    pub async fn get_transaction(&self, id: &Identifier) -> Result<Transaction> {
        let response = self
            .access
            .get_transaction(self.transaction_request(id))
            .await?;
        let transaction = response.transaction.ok_or_else(|| missing("transaction"))?;
        Ok(convert::transaction_from_proto(transaction))
    }

    pub async fn get_transaction_result(&self, id: &Identifier) -> Result<TransactionResult> {
        let response = self
            .access
            .get_transaction_result(self.transaction_request(id))
            .await?;
        convert::transaction_result_from_proto(response, self.event_encoding)
    }

    fn transaction_request(&self, id: &Identifier) -> proto::GetTransactionRequest {
        proto::GetTransactionRequest {
            id: id.to_vec(),
            event_encoding_version: convert::encoding_to_proto(self.event_encoding),
        }
    }

    pub async fn get_transactions_by_block_id(
        &self,
        block_id: &Identifier,
    ) -> Result<Vec<Transaction>> {
        let response = self
            .access
            .get_transactions_by_block_id(self.block_transactions_request(block_id))
            .await?;
        Ok(response
            .transactions
            .into_iter()
            .map(convert::transaction_from_proto)
            .collect())
    }

    pub async fn get_transaction_results_by_block_id(
        &self,
        block_id: &Identifier,
    ) -> Result<Vec<TransactionResult>> {
        let response = self
            .access
            .get_transaction_results_by_block_id(self.block_transactions_request(block_id))
            .await?;
        response
            .transaction_results
            .into_iter()
            .map(|result| convert::transaction_result_from_proto(result, self.event_encoding))
            .collect()
    }

    fn block_transactions_request(
        &self,
        block_id: &Identifier,
    ) -> proto::GetTransactionsByBlockIdRequest {
        proto::GetTransactionsByBlockIdRequest {
            block_id: block_id.to_vec(),
            event_encoding_version: convert::encoding_to_proto(self.event_encoding),
        }
    }

    // --- Accounts ---

    pub async fn get_account(&self, address: &Address) -> Result<Account> {
        self.get_account_at_latest_block(address).await
    }

    pub async fn get_account_at_latest_block(&self, address: &Address) -> Result<Account> {
        let response = self
            .access
            .get_account_at_latest_block(proto::GetAccountAtLatestBlockRequest {
                address: address.to_vec(),
            })
            .await?;
        let account = response.account.ok_or_else(|| missing("account"))?;
        Ok(convert::account_from_proto(account))
    }

    pub async fn get_account_at_block_height(
        &self,
        address: &Address,
        block_height: u64,
    ) -> Result<Account> {
        let response = self
            .access
            .get_account_at_block_height(proto::GetAccountAtBlockHeightRequest {
                address: address.to_vec(),
                block_height,
            })
            .await?;
        let account = response.account.ok_or_else(|| missing("account"))?;
        Ok(convert::account_from_proto(account))
    }

    // --- Scripts ---

    /// Executes a read-only script. Arguments and the result are JSON-CDC encoded.
    pub async fn execute_script_at_latest_block(
        &self,
        script: &[u8],
        arguments: Vec<Vec<u8>>,
    ) -> Result<Value> {
        let response = self
            .access
            .execute_script_at_latest_block(proto::ExecuteScriptAtLatestBlockRequest {
                script: script.to_vec(),
                arguments,
            })
            .await?;
        Self::script_value(response)
    }

    pub async fn execute_script_at_block_id(
        &self,
        block_id: &Identifier,
        script: &[u8],
        arguments: Vec<Vec<u8>>,
    ) -> Result<Value> {
        let response = self
            .access
            .execute_script_at_block_id(proto::ExecuteScriptAtBlockIdRequest {
                block_id: block_id.to_vec(),
                script: script.to_vec(),
                arguments,
            })
            .await?;
        Self::script_value(response)
    }

    pub async fn execute_script_at_block_height(
        &self,
        block_height: u64,
        script: &[u8],
        arguments: Vec<Vec<u8>>,
    ) -> Result<Value> {
        let response = self
            .access
            .execute_script_at_block_height(proto::ExecuteScriptAtBlockHeightRequest {
                block_height,
                script: script.to_vec(),
                arguments,
            })
            .await?;
        Self::script_value(response)
    }

    fn script_value(response: proto::ExecuteScriptResponse) -> Result<Value> {
        Ok(payload::decode(
            &response.value,
            EventEncodingVersion::JsonCdcV0,
        )?)
    }

    // --- Events ---

    /// Returns the events of `event_type` in the inclusive height range.
    pub async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start_height: u64,
        end_height: u64,
    ) -> Result<Vec<BlockEvents>> {
        let response = self
            .access
            .get_events_for_height_range(proto::GetEventsForHeightRangeRequest {
                r#type: event_type.to_string(),
                start_height,
                end_height,
                event_encoding_version: convert::encoding_to_proto(self.event_encoding),
            })
            .await?;
        self.block_events(response)
    }

    pub async fn get_events_for_block_ids(
        &self,
        event_type: &str,
        block_ids: &[Identifier],
    ) -> Result<Vec<BlockEvents>> {
        let response = self
            .access
            .get_events_for_block_ids(proto::GetEventsForBlockIdsRequest {
                r#type: event_type.to_string(),
                block_ids: block_ids.iter().map(Identifier::to_vec).collect(),
                event_encoding_version: convert::encoding_to_proto(self.event_encoding),
            })
            .await?;
        self.block_events(response)
    }

    fn block_events(&self, response: proto::EventsResponse) -> Result<Vec<BlockEvents>> {
        response
            .results
            .into_iter()
            .map(|result| convert::block_events_from_proto(result, self.event_encoding))
            .collect()
    }

    // --- Execution results and data ---

    pub async fn get_execution_result_for_block_id(
        &self,
        block_id: &Identifier,
    ) -> Result<ExecutionResult> {
        let response = self
            .access
            .get_execution_result_for_block_id(proto::GetExecutionResultForBlockIdRequest {
                block_id: block_id.to_vec(),
            })
            .await?;
        let result = response
            .execution_result
            .ok_or_else(|| missing("execution result"))?;
        convert::execution_result_from_proto(result)
    }

    pub async fn get_execution_data_by_block_id(
        &self,
        block_id: &Identifier,
    ) -> Result<ExecutionData> {
        let response = self
            .execution_data
            .get_execution_data_by_block_id(proto::GetExecutionDataByBlockIdRequest {
                block_id: block_id.to_vec(),
                event_encoding_version: convert::encoding_to_proto(self.event_encoding),
            })
            .await?;
        let data = response
            .block_execution_data
            .ok_or_else(|| missing("block execution data"))?;
        convert::execution_data_from_proto(data, self.event_encoding)
    }

    // --- Subscriptions ---

    /// Subscribes to execution data, starting at `start_block_id` or
    /// `start_height` (zero values mean unset; at most one may be set), or at
    /// the latest block when neither is.
    ///
    /// Returns an error only when the request is invalid or the stream cannot
    /// be opened. Failures after that arrive on the subscription's error
    /// channel. Cancelling `cancel` ends the session without an error.
    pub async fn subscribe_execution_data(
        &self,
        cancel: &CancelToken,
        start_block_id: Identifier,
        start_height: u64,
        options: SubscribeOptions,
    ) -> Result<Subscription<ExecutionDataStreamResponse>> {
        let request = ExecutionDataRequest::new(start_block_id, start_height, &options)?;
        tracing::info!(
            "Subscribing to execution data from {:?} ({})",
            request.anchor,
            request.event_encoding
        );

        let stream = self
            .execution_data
            .subscribe_execution_data(convert::execution_data_request_to_proto(&request))
            .await
            .map_err(AccessError::Open)?;

        Ok(subscription::spawn(
            stream,
            ExecutionDataConverter {
                encoding: request.event_encoding,
            },
            cancel.clone(),
            options.channel_capacity,
        ))
    }

    /// Subscribes to the events matching `filter`. An empty filter matches
    /// every event. Anchor and error semantics are those of
    /// [`GrpcClient::subscribe_execution_data`].
    pub async fn subscribe_events(
        &self,
        cancel: &CancelToken,
        start_block_id: Identifier,
        start_height: u64,
        filter: EventFilter,
        options: SubscribeOptions,
    ) -> Result<Subscription<BlockEvents>> {
        let request = EventsRequest::new(start_block_id, start_height, filter, &options)?;
        tracing::info!(
            "Subscribing to events from {:?} (heartbeat {}, {})",
            request.anchor,
            request.heartbeat_interval,
            request.event_encoding
        );

        let stream = self
            .execution_data
            .subscribe_events(convert::events_request_to_proto(&request))
            .await
            .map_err(AccessError::Open)?;

        Ok(subscription::spawn(
            stream,
            EventsConverter {
                encoding: request.event_encoding,
            },
            cancel.clone(),
            options.channel_capacity,
        ))
    }

    /// [`GrpcClient::subscribe_execution_data`] with the client's default options.
    pub async fn subscribe_execution_data_with_defaults(
        &self,
        cancel: &CancelToken,
        start_block_id: Identifier,
        start_height: u64,
    ) -> Result<Subscription<ExecutionDataStreamResponse>> {
        self.subscribe_execution_data(cancel, start_block_id, start_height, self.default_options)
            .await
    }

    /// [`GrpcClient::subscribe_events`] with the client's default options.
    pub async fn subscribe_events_with_defaults(
        &self,
        cancel: &CancelToken,
        start_block_id: Identifier,
        start_height: u64,
        filter: EventFilter,
    ) -> Result<Subscription<BlockEvents>> {
        self.subscribe_events(
            cancel,
            start_block_id,
            start_height,
            filter,
            self.default_options,
        )
        .await
    }
}

impl std::fmt::Debug for GrpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcClient")
            .field("event_encoding", &self.event_encoding)
            .field("default_options", &self.default_options)
            .finish_non_exhaustive()
    }
}
