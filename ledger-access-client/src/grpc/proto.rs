//! Protobuf messages of the access and execution data APIs.
//!
//! Only the messages and fields the client reads or writes are declared.
//! Unknown fields on the wire are skipped by the decoder.

use prost_types::Timestamp;
use std::collections::HashMap;

// --- Entities ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventEncodingVersion {
    JsonCdcV0 = 0,
    CcfV0 = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BlockStatus {
    BlockUnknown = 0,
    BlockFinalized = 1,
    BlockSealed = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TransactionStatus {
    Unknown = 0,
    Pending = 1,
    Finalized = 2,
    Executed = 3,
    Sealed = 4,
    Expired = 5,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockHeader {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub parent_id: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub height: u64,
    #[prost(message, optional, tag = "4")]
    pub timestamp: Option<Timestamp>,
    #[prost(bytes = "vec", tag = "5")]
    pub payload_hash: Vec<u8>,
    #[prost(uint64, tag = "6")]
    pub view: u64,
    #[prost(bytes = "vec", tag = "8")]
    pub parent_voter_sig_data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionGuarantee {
    #[prost(bytes = "vec", tag = "1")]
    pub collection_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockSeal {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub execution_receipt_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Block {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub parent_id: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub height: u64,
    #[prost(message, optional, tag = "4")]
    pub timestamp: Option<Timestamp>,
    #[prost(message, repeated, tag = "5")]
    pub collection_guarantees: Vec<CollectionGuarantee>,
    #[prost(message, repeated, tag = "6")]
    pub block_seals: Vec<BlockSeal>,
    #[prost(message, optional, tag = "10")]
    pub block_header: Option<BlockHeader>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Collection {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub transaction_ids: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposalKey {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub key_id: u32,
    #[prost(uint64, tag = "3")]
    pub sequence_number: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionSignature {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub key_id: u32,
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(bytes = "vec", tag = "1")]
    pub script: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub arguments: Vec<Vec<u8>>,
    #[prost(bytes = "vec", tag = "3")]
    pub reference_block_id: Vec<u8>,
    #[prost(uint64, tag = "4")]
    pub gas_limit: u64,
    #[prost(message, optional, tag = "5")]
    pub proposal_key: Option<ProposalKey>,
    #[prost(bytes = "vec", tag = "6")]
    pub payer: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "7")]
    pub authorizers: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "8")]
    pub payload_signatures: Vec<TransactionSignature>,
    #[prost(message, repeated, tag = "9")]
    pub envelope_signatures: Vec<TransactionSignature>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountKey {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub public_key: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub sign_algo: u32,
    #[prost(uint32, tag = "4")]
    pub hash_algo: u32,
    #[prost(uint32, tag = "5")]
    pub weight: u32,
    #[prost(uint32, tag = "6")]
    pub sequence_number: u32,
    #[prost(bool, tag = "7")]
    pub revoked: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Account {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub balance: u64,
    #[prost(message, repeated, tag = "4")]
    pub keys: Vec<AccountKey>,
    #[prost(map = "string, bytes", tag = "5")]
    pub contracts: HashMap<String, Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bytes = "vec", tag = "2")]
    pub transaction_id: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub transaction_index: u32,
    #[prost(uint32, tag = "4")]
    pub event_index: u32,
    #[prost(bytes = "vec", tag = "5")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Chunk {
    #[prost(uint32, tag = "1")]
    pub collection_index: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub start_state: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub event_collection: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub block_id: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub total_computation_used: u64,
    #[prost(uint32, tag = "6")]
    pub number_of_transactions: u32,
    #[prost(uint64, tag = "7")]
    pub index: u64,
    #[prost(bytes = "vec", tag = "8")]
    pub end_state: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceEvent {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionResult {
    #[prost(bytes = "vec", tag = "1")]
    pub previous_result_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub block_id: Vec<u8>,
    #[prost(message, repeated, tag = "3")]
    pub chunks: Vec<Chunk>,
    #[prost(message, repeated, tag = "4")]
    pub service_events: Vec<ServiceEvent>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyPart {
    #[prost(uint32, tag = "1")]
    pub r#type: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    #[prost(message, repeated, tag = "1")]
    pub key_part: Vec<KeyPart>,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrieUpdate {
    #[prost(bytes = "vec", tag = "1")]
    pub root_hash: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub paths: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "3")]
    pub payloads: Vec<Payload>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionDataCollection {
    #[prost(message, repeated, tag = "1")]
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionDataTransactionResult {
    #[prost(bytes = "vec", tag = "1")]
    pub transaction_id: Vec<u8>,
    #[prost(bool, tag = "2")]
    pub failed: bool,
    #[prost(uint64, tag = "3")]
    pub computation_used: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChunkExecutionData {
    #[prost(message, optional, tag = "1")]
    pub collection: Option<ExecutionDataCollection>,
    #[prost(message, repeated, tag = "2")]
    pub events: Vec<Event>,
    #[prost(message, optional, tag = "3")]
    pub trie_update: Option<TrieUpdate>,
    #[prost(message, repeated, tag = "4")]
    pub transaction_results: Vec<ExecutionDataTransactionResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockExecutionData {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub chunk_execution_data: Vec<ChunkExecutionData>,
}

// --- Access API ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PingResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetNetworkParametersRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetNetworkParametersResponse {
    #[prost(string, tag = "1")]
    pub chain_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetLatestBlockHeaderRequest {
    #[prost(bool, tag = "1")]
    pub is_sealed: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlockHeaderByIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlockHeaderByHeightRequest {
    #[prost(uint64, tag = "1")]
    pub height: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockHeaderResponse {
    #[prost(message, optional, tag = "1")]
    pub block: Option<BlockHeader>,
    #[prost(enumeration = "BlockStatus", tag = "2")]
    pub block_status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetLatestBlockRequest {
    #[prost(bool, tag = "1")]
    pub is_sealed: bool,
    #[prost(bool, tag = "2")]
    pub full_block_response: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlockByIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(bool, tag = "2")]
    pub full_block_response: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlockByHeightRequest {
    #[prost(uint64, tag = "1")]
    pub height: u64,
    #[prost(bool, tag = "2")]
    pub full_block_response: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockResponse {
    #[prost(message, optional, tag = "1")]
    pub block: Option<Block>,
    #[prost(enumeration = "BlockStatus", tag = "2")]
    pub block_status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetCollectionByIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CollectionResponse {
    #[prost(message, optional, tag = "1")]
    pub collection: Option<Collection>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendTransactionRequest {
    #[prost(message, optional, tag = "1")]
    pub transaction: Option<Transaction>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendTransactionResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTransactionRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(enumeration = "EventEncodingVersion", tag = "4")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionResponse {
    #[prost(message, optional, tag = "1")]
    pub transaction: Option<Transaction>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionResultResponse {
    #[prost(enumeration = "TransactionStatus", tag = "1")]
    pub status: i32,
    #[prost(uint32, tag = "2")]
    pub status_code: u32,
    #[prost(string, tag = "3")]
    pub error_message: String,
    #[prost(message, repeated, tag = "4")]
    pub events: Vec<Event>,
    #[prost(bytes = "vec", tag = "5")]
    pub block_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    pub transaction_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub collection_id: Vec<u8>,
    #[prost(uint64, tag = "8")]
    pub block_height: u64,
    #[prost(uint64, tag = "10")]
    pub computation_usage: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTransactionsByBlockIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(enumeration = "EventEncodingVersion", tag = "2")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionsResponse {
    #[prost(message, repeated, tag = "1")]
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionResultsResponse {
    #[prost(message, repeated, tag = "1")]
    pub transaction_results: Vec<TransactionResultResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAccountAtLatestBlockRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAccountAtBlockHeightRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub block_height: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountResponse {
    #[prost(message, optional, tag = "1")]
    pub account: Option<Account>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteScriptAtLatestBlockRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub script: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub arguments: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteScriptAtBlockIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub script: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub arguments: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteScriptAtBlockHeightRequest {
    #[prost(uint64, tag = "1")]
    pub block_height: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub script: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub arguments: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteScriptResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetEventsForHeightRangeRequest {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(uint64, tag = "2")]
    pub start_height: u64,
    #[prost(uint64, tag = "3")]
    pub end_height: u64,
    #[prost(enumeration = "EventEncodingVersion", tag = "4")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetEventsForBlockIdsRequest {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub block_ids: Vec<Vec<u8>>,
    #[prost(enumeration = "EventEncodingVersion", tag = "3")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventsResult {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub block_height: u64,
    #[prost(message, repeated, tag = "3")]
    pub events: Vec<Event>,
    #[prost(message, optional, tag = "4")]
    pub block_timestamp: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventsResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<EventsResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetLatestProtocolStateSnapshotRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtocolStateSnapshotResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub serialized_snapshot: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetExecutionResultForBlockIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionResultForBlockIdResponse {
    #[prost(message, optional, tag = "1")]
    pub execution_result: Option<ExecutionResult>,
}

// --- Execution data API ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetExecutionDataByBlockIdRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(enumeration = "EventEncodingVersion", tag = "2")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetExecutionDataByBlockIdResponse {
    #[prost(message, optional, tag = "1")]
    pub block_execution_data: Option<BlockExecutionData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeExecutionDataRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub start_block_id: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub start_block_height: u64,
    #[prost(enumeration = "EventEncodingVersion", tag = "3")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeExecutionDataResponse {
    #[prost(uint64, tag = "1")]
    pub block_height: u64,
    #[prost(message, optional, tag = "2")]
    pub block_execution_data: Option<BlockExecutionData>,
    #[prost(message, optional, tag = "3")]
    pub block_timestamp: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventFilter {
    #[prost(string, repeated, tag = "1")]
    pub event_type: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    pub contract: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub address: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeEventsRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub start_block_id: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub start_block_height: u64,
    #[prost(message, optional, tag = "3")]
    pub filter: Option<EventFilter>,
    #[prost(uint64, tag = "4")]
    pub heartbeat_interval: u64,
    #[prost(enumeration = "EventEncodingVersion", tag = "5")]
    pub event_encoding_version: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeEventsResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub block_id: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub block_height: u64,
    #[prost(message, repeated, tag = "3")]
    pub events: Vec<Event>,
    #[prost(message, optional, tag = "4")]
    pub block_timestamp: Option<Timestamp>,
    #[prost(uint64, tag = "5")]
    pub message_index: u64,
}
