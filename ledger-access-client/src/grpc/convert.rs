//! Conversions between protobuf messages and domain types.

use super::proto;
use crate::error::{AccessError, Result};
use crate::model::{
    Account, AccountKey, Address, Block, BlockEvents, BlockHeader, BlockPayload, BlockSeal,
    BlockStatus, Chunk, ChunkExecutionData, Collection, CollectionGuarantee, Event,
    ExecutionData, ExecutionResult, HashAlgorithm, Identifier, KeyPart,
    LightTransactionResult, ProposalKey, ServiceEvent, SignatureAlgorithm, Transaction,
    TransactionResult, TransactionSignature, TransactionStatus, TriePayload, TrieUpdate,
};
use crate::payload::{self, EventEncodingVersion};
use crate::subscription::{EventsRequest, ExecutionDataRequest};
use chrono::{DateTime, Utc};
use prost_types::Timestamp;

/// A missing or out-of-range timestamp maps to the Unix epoch.
pub(crate) fn timestamp_to_datetime(timestamp: Option<&Timestamp>) -> DateTime<Utc> {
    timestamp
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts.seconds, u32::try_from(ts.nanos).ok()?))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub(crate) fn encoding_to_proto(encoding: EventEncodingVersion) -> i32 {
    match encoding {
        EventEncodingVersion::JsonCdcV0 => proto::EventEncodingVersion::JsonCdcV0 as i32,
        EventEncodingVersion::CcfV0 => proto::EventEncodingVersion::CcfV0 as i32,
    }
}

fn block_status_from_proto(status: i32) -> BlockStatus {
    match proto::BlockStatus::try_from(status) {
        Ok(proto::BlockStatus::BlockFinalized) => BlockStatus::Finalized,
        Ok(proto::BlockStatus::BlockSealed) => BlockStatus::Sealed,
        _ => BlockStatus::Unknown,
    }
}

fn transaction_status_from_proto(status: i32) -> TransactionStatus {
    match proto::TransactionStatus::try_from(status) {
        Ok(proto::TransactionStatus::Pending) => TransactionStatus::Pending,
        Ok(proto::TransactionStatus::Finalized) => TransactionStatus::Finalized,
        Ok(proto::TransactionStatus::Executed) => TransactionStatus::Executed,
        Ok(proto::TransactionStatus::Sealed) => TransactionStatus::Sealed,
        Ok(proto::TransactionStatus::Expired) => TransactionStatus::Expired,
        _ => TransactionStatus::Unknown,
    }
}

fn ids(raw: &[Vec<u8>]) -> Vec<Identifier> {
    raw.iter().map(|id| Identifier::from_slice(id)).collect()
}

// --- Blocks ---

pub(crate) fn block_header_from_proto(header: proto::BlockHeader, status: i32) -> BlockHeader {
    BlockHeader {
        id: Identifier::from_slice(&header.id),
        parent_id: Identifier::from_slice(&header.parent_id),
        height: header.height,
        timestamp: timestamp_to_datetime(header.timestamp.as_ref()),
        status: block_status_from_proto(status),
        payload_hash: header.payload_hash,
        view: header.view,
        parent_voter_sig_data: header.parent_voter_sig_data,
    }
}

pub(crate) fn block_from_proto(block: proto::Block, status: i32) -> Block {
    let header = match block.block_header {
        Some(header) => block_header_from_proto(header, status),
        None => BlockHeader {
            id: Identifier::from_slice(&block.id),
            parent_id: Identifier::from_slice(&block.parent_id),
            height: block.height,
            timestamp: timestamp_to_datetime(block.timestamp.as_ref()),
            status: block_status_from_proto(status),
            payload_hash: Vec::new(),
            view: 0,
            parent_voter_sig_data: Vec::new(),
        },
    };

    Block {
        header,
        payload: BlockPayload {
            collection_guarantees: block
                .collection_guarantees
                .iter()
                .map(|g| CollectionGuarantee {
                    collection_id: Identifier::from_slice(&g.collection_id),
                })
                .collect(),
            seals: block
                .block_seals
                .iter()
                .map(|s| BlockSeal {
                    block_id: Identifier::from_slice(&s.block_id),
                    execution_receipt_id: Identifier::from_slice(&s.execution_receipt_id),
                })
                .collect(),
        },
    }
}

pub(crate) fn collection_from_proto(collection: proto::Collection) -> Collection {
    Collection {
        id: Identifier::from_slice(&collection.id),
        transaction_ids: ids(&collection.transaction_ids),
    }
}

// --- Transactions ---

fn signature_to_proto(signature: &TransactionSignature) -> proto::TransactionSignature {
    proto::TransactionSignature {
        address: signature.address.to_vec(),
        key_id: signature.key_index,
        signature: signature.signature.clone(),
    }
}

fn signature_from_proto(signature: proto::TransactionSignature) -> TransactionSignature {
    TransactionSignature {
        address: Address::from_slice(&signature.address),
        key_index: signature.key_id,
        signature: signature.signature,
    }
}

pub(crate) fn transaction_to_proto(tx: &Transaction) -> proto::Transaction {
    proto::Transaction {
        script: tx.script.clone(),
        arguments: tx.arguments.clone(),
        reference_block_id: tx.reference_block_id.to_vec(),
        gas_limit: tx.gas_limit,
        proposal_key: Some(proto::ProposalKey {
            address: tx.proposal_key.address.to_vec(),
            key_id: tx.proposal_key.key_index,
            sequence_number: tx.proposal_key.sequence_number,
        }),
        payer: tx.payer.to_vec(),
        authorizers: tx.authorizers.iter().map(Address::to_vec).collect(),
        payload_signatures: tx.payload_signatures.iter().map(signature_to_proto).collect(),
        envelope_signatures: tx.envelope_signatures.iter().map(signature_to_proto).collect(),
    }
}

pub(crate) fn transaction_from_proto(tx: proto::Transaction) -> Transaction {
    let proposal_key = tx
        .proposal_key
        .map(|key| ProposalKey {
            address: Address::from_slice(&key.address),
            key_index: key.key_id,
            sequence_number: key.sequence_number,
        })
        .unwrap_or_default();

    Transaction {
        script: tx.script,
        arguments: tx.arguments,
        reference_block_id: Identifier::from_slice(&tx.reference_block_id),
        gas_limit: tx.gas_limit,
        proposal_key,
        payer: Address::from_slice(&tx.payer),
        authorizers: tx.authorizers.iter().map(|a| Address::from_slice(a)).collect(),
        payload_signatures: tx
            .payload_signatures
            .into_iter()
            .map(signature_from_proto)
            .collect(),
        envelope_signatures: tx
            .envelope_signatures
            .into_iter()
            .map(signature_from_proto)
            .collect(),
    }
}

pub(crate) fn transaction_result_from_proto(
    result: proto::TransactionResultResponse,
    encoding: EventEncodingVersion,
) -> Result<TransactionResult> {
    Ok(TransactionResult {
        status: transaction_status_from_proto(result.status),
        status_code: result.status_code,
        error: (!result.error_message.is_empty()).then_some(result.error_message),
        events: events_from_proto(result.events, encoding)?,
        block_id: Identifier::from_slice(&result.block_id),
        block_height: result.block_height,
        transaction_id: Identifier::from_slice(&result.transaction_id),
        collection_id: Identifier::from_slice(&result.collection_id),
        computation_used: result.computation_usage,
    })
}

// --- Accounts ---

pub(crate) fn account_from_proto(account: proto::Account) -> Account {
    Account {
        address: Address::from_slice(&account.address),
        balance: account.balance,
        keys: account
            .keys
            .into_iter()
            .map(|key| AccountKey {
                index: key.index,
                public_key: key.public_key,
                sig_algo: SignatureAlgorithm::from_code(key.sign_algo),
                hash_algo: HashAlgorithm::from_code(key.hash_algo),
                weight: key.weight,
                sequence_number: u64::from(key.sequence_number),
                revoked: key.revoked,
            })
            .collect(),
        contracts: account.contracts.into_iter().collect(),
    }
}

// --- Events ---

/// Decodes the event payload with `encoding`; the raw payload is kept.
pub(crate) fn event_from_proto(event: proto::Event, encoding: EventEncodingVersion) -> Result<Event> {
    let value = payload::decode(&event.payload, encoding)?;
    Ok(Event {
        event_type: event.r#type,
        transaction_id: Identifier::from_slice(&event.transaction_id),
        transaction_index: event.transaction_index,
        event_index: event.event_index,
        value,
        payload: event.payload,
    })
}

/// Converts every event or fails on the first undecodable payload.
pub(crate) fn events_from_proto(
    events: Vec<proto::Event>,
    encoding: EventEncodingVersion,
) -> Result<Vec<Event>> {
    events
        .into_iter()
        .map(|event| event_from_proto(event, encoding))
        .collect()
}

pub(crate) fn block_events_from_proto(
    result: proto::EventsResult,
    encoding: EventEncodingVersion,
) -> Result<BlockEvents> {
    Ok(BlockEvents {
        block_id: Identifier::from_slice(&result.block_id),
        height: result.block_height,
        block_timestamp: timestamp_to_datetime(result.block_timestamp.as_ref()),
        events: events_from_proto(result.events, encoding)?,
    })
}

// --- Execution results and data ---

pub(crate) fn execution_result_from_proto(result: proto::ExecutionResult) -> Result<ExecutionResult> {
    let chunks = result
        .chunks
        .into_iter()
        .map(|chunk| {
            let number_of_transactions = u16::try_from(chunk.number_of_transactions)
                .map_err(|_| {
                    AccessError::MalformedFrame(format!(
                        "chunk {} has {} transactions",
                        chunk.index, chunk.number_of_transactions
                    ))
                })?;
            Ok(Chunk {
                collection_index: chunk.collection_index,
                start_state: Identifier::from_slice(&chunk.start_state),
                event_collection: Identifier::from_slice(&chunk.event_collection),
                block_id: Identifier::from_slice(&chunk.block_id),
                total_computation_used: chunk.total_computation_used,
                number_of_transactions,
                index: chunk.index,
                end_state: Identifier::from_slice(&chunk.end_state),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExecutionResult {
        previous_result_id: Identifier::from_slice(&result.previous_result_id),
        block_id: Identifier::from_slice(&result.block_id),
        chunks,
        service_events: result
            .service_events
            .into_iter()
            .map(|event| ServiceEvent {
                event_type: event.r#type,
                payload: event.payload,
            })
            .collect(),
    })
}

fn trie_update_from_proto(update: proto::TrieUpdate) -> Result<TrieUpdate> {
    let payloads = update
        .payloads
        .into_iter()
        .map(|payload| {
            let key_parts = payload
                .key_part
                .into_iter()
                .map(|part| {
                    let kind = u16::try_from(part.r#type).map_err(|_| {
                        AccessError::MalformedFrame(format!("invalid key part type {}", part.r#type))
                    })?;
                    Ok(KeyPart {
                        kind,
                        value: part.value,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(TriePayload {
                key_parts,
                value: payload.value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrieUpdate {
        root_hash: update.root_hash,
        paths: update.paths,
        payloads,
    })
}

fn chunk_execution_data_from_proto(
    chunk: proto::ChunkExecutionData,
    encoding: EventEncodingVersion,
) -> Result<ChunkExecutionData> {
    Ok(ChunkExecutionData {
        transactions: chunk
            .collection
            .map(|c| c.transactions.into_iter().map(transaction_from_proto).collect())
            .unwrap_or_default(),
        events: events_from_proto(chunk.events, encoding)?,
        trie_update: chunk.trie_update.map(trie_update_from_proto).transpose()?,
        transaction_results: chunk
            .transaction_results
            .into_iter()
            .map(|r| LightTransactionResult {
                transaction_id: Identifier::from_slice(&r.transaction_id),
                failed: r.failed,
                computation_used: r.computation_used,
            })
            .collect(),
    })
}

pub(crate) fn execution_data_from_proto(
    data: proto::BlockExecutionData,
    encoding: EventEncodingVersion,
) -> Result<ExecutionData> {
    Ok(ExecutionData {
        block_id: Identifier::from_slice(&data.block_id),
        chunk_execution_data: data
            .chunk_execution_data
            .into_iter()
            .map(|chunk| chunk_execution_data_from_proto(chunk, encoding))
            .collect::<Result<Vec<_>>>()?,
    })
}

// --- Subscription requests ---

pub(crate) fn execution_data_request_to_proto(
    request: &ExecutionDataRequest,
) -> proto::SubscribeExecutionDataRequest {
    proto::SubscribeExecutionDataRequest {
        start_block_id: request
            .anchor
            .start_block_id()
            .map(Identifier::to_vec)
            .unwrap_or_default(),
        start_block_height: request.anchor.start_height().unwrap_or_default(),
        event_encoding_version: encoding_to_proto(request.event_encoding),
    }
}

pub(crate) fn events_request_to_proto(request: &EventsRequest) -> proto::SubscribeEventsRequest {
    proto::SubscribeEventsRequest {
        start_block_id: request
            .anchor
            .start_block_id()
            .map(Identifier::to_vec)
            .unwrap_or_default(),
        start_block_height: request.anchor.start_height().unwrap_or_default(),
        filter: Some(proto::EventFilter {
            event_type: request.filter.event_types.clone(),
            contract: request.filter.contracts.clone(),
            address: request.filter.addresses.clone(),
        }),
        heartbeat_interval: request.heartbeat_interval,
        event_encoding_version: encoding_to_proto(request.event_encoding),
    }
}
