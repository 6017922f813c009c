//! Conversions between REST models and domain types.

use super::models;
use crate::error::{AccessError, Result};
use crate::model::{
    Account, AccountKey, Address, Block, BlockEvents, BlockHeader, BlockPayload, BlockSeal,
    BlockStatus, Chunk, Collection, CollectionGuarantee, Event, ExecutionResult, HashAlgorithm,
    Identifier, ProposalKey, ServiceEvent, SignatureAlgorithm, Transaction, TransactionResult,
    TransactionSignature, TransactionStatus,
};
use crate::payload::{self, EventEncodingVersion};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

/// The REST API always serves event payloads as JSON-CDC.
pub(crate) const REST_EVENT_ENCODING: EventEncodingVersion = EventEncodingVersion::JsonCdcV0;

fn malformed(what: &str, value: &str) -> AccessError {
    AccessError::MalformedFrame(format!("invalid {what} '{value}'"))
}

pub(crate) fn identifier(value: &str) -> Result<Identifier> {
    Identifier::from_hex(value).map_err(|_| malformed("identifier", value))
}

pub(crate) fn address(value: &str) -> Result<Address> {
    Address::from_hex(value).map_err(|_| malformed("address", value))
}

fn hex_bytes(value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim_start_matches("0x")).map_err(|_| malformed("hex value", value))
}

fn decode_base64(value: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(value)?)
}

fn timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| malformed("timestamp", value))
}

fn narrow<T: TryFrom<u64>>(field: &str, value: u64) -> Result<T> {
    T::try_from(value).map_err(|_| {
        AccessError::MalformedFrame(format!("{field} {value} is out of range"))
    })
}

// --- Blocks ---

fn block_status(status: Option<&str>) -> BlockStatus {
    match status.map(str::to_ascii_lowercase).as_deref() {
        Some("sealed") | Some("block_sealed") => BlockStatus::Sealed,
        Some("finalized") | Some("block_finalized") => BlockStatus::Finalized,
        _ => BlockStatus::Unknown,
    }
}

pub(crate) fn block_from_model(block: &models::Block) -> Result<Block> {
    let header = &block.header;
    let payload = block.payload.clone().unwrap_or_default();

    Ok(Block {
        header: BlockHeader {
            id: identifier(&header.id)?,
            parent_id: identifier(&header.parent_id)?,
            height: header.height,
            timestamp: timestamp(&header.timestamp)?,
            status: block_status(block.block_status.as_deref()),
            payload_hash: Vec::new(),
            view: 0,
            parent_voter_sig_data: decode_base64(&header.parent_voter_signature)?,
        },
        payload: BlockPayload {
            collection_guarantees: payload
                .collection_guarantees
                .iter()
                .map(|g| {
                    Ok(CollectionGuarantee {
                        collection_id: identifier(&g.collection_id)?,
                    })
                })
                .collect::<Result<_>>()?,
            seals: payload
                .block_seals
                .iter()
                .map(|s| {
                    Ok(BlockSeal {
                        block_id: identifier(&s.block_id)?,
                        execution_receipt_id: identifier(&s.result_id)?,
                    })
                })
                .collect::<Result<_>>()?,
        },
    })
}

pub(crate) fn collection_from_model(collection: &models::Collection) -> Result<Collection> {
    Ok(Collection {
        id: identifier(&collection.id)?,
        transaction_ids: collection
            .transactions
            .iter()
            .map(|tx| identifier(&tx.id))
            .collect::<Result<_>>()?,
    })
}

// --- Transactions ---

fn signature_from_model(signature: &models::TransactionSignature) -> Result<TransactionSignature> {
    Ok(TransactionSignature {
        address: address(&signature.address)?,
        key_index: narrow("key index", signature.key_index)?,
        signature: decode_base64(&signature.signature)?,
    })
}

fn signature_to_model(signature: &TransactionSignature) -> models::TransactionSignature {
    models::TransactionSignature {
        address: signature.address.to_string(),
        key_index: u64::from(signature.key_index),
        signature: STANDARD.encode(&signature.signature),
    }
}

pub(crate) fn transaction_from_model(tx: &models::Transaction) -> Result<Transaction> {
    Ok(Transaction {
        script: decode_base64(&tx.script)?,
        arguments: tx.arguments.iter().map(|a| decode_base64(a)).collect::<Result<_>>()?,
        reference_block_id: identifier(&tx.reference_block_id)?,
        gas_limit: tx.gas_limit,
        proposal_key: ProposalKey {
            address: address(&tx.proposal_key.address)?,
            key_index: narrow("key index", tx.proposal_key.key_index)?,
            sequence_number: tx.proposal_key.sequence_number,
        },
        payer: address(&tx.payer)?,
        authorizers: tx
            .authorizers
            .iter()
            .map(|a| address(a))
            .collect::<Result<_>>()?,
        payload_signatures: tx
            .payload_signatures
            .iter()
            .map(signature_from_model)
            .collect::<Result<_>>()?,
        envelope_signatures: tx
            .envelope_signatures
            .iter()
            .map(signature_from_model)
            .collect::<Result<_>>()?,
    })
}

pub(crate) fn transaction_to_model(tx: &Transaction) -> models::Transaction {
    models::Transaction {
        id: String::new(),
        script: STANDARD.encode(&tx.script),
        arguments: tx.arguments.iter().map(|a| STANDARD.encode(a)).collect(),
        reference_block_id: tx.reference_block_id.to_string(),
        gas_limit: tx.gas_limit,
        payer: tx.payer.to_string(),
        proposal_key: models::ProposalKey {
            address: tx.proposal_key.address.to_string(),
            key_index: u64::from(tx.proposal_key.key_index),
            sequence_number: tx.proposal_key.sequence_number,
        },
        authorizers: tx.authorizers.iter().map(Address::to_string).collect(),
        payload_signatures: tx.payload_signatures.iter().map(signature_to_model).collect(),
        envelope_signatures: tx.envelope_signatures.iter().map(signature_to_model).collect(),
        result: None,
    }
}

fn transaction_status(status: &str) -> TransactionStatus {
    match status {
        "Pending" => TransactionStatus::Pending,
        "Finalized" => TransactionStatus::Finalized,
        "Executed" => TransactionStatus::Executed,
        "Sealed" => TransactionStatus::Sealed,
        "Expired" => TransactionStatus::Expired,
        _ => TransactionStatus::Unknown,
    }
}

pub(crate) fn transaction_result_from_model(
    result: &models::TransactionResult,
    transaction_id: Identifier,
) -> Result<TransactionResult> {
    Ok(TransactionResult {
        status: transaction_status(&result.status),
        status_code: result.status_code,
        error: (!result.error_message.is_empty()).then(|| result.error_message.clone()),
        events: events_from_model(&result.events)?,
        block_id: identifier(&result.block_id)?,
        // The REST result does not carry the block height.
        block_height: 0,
        transaction_id,
        collection_id: identifier(&result.collection_id)?,
        computation_used: result.computation_used,
    })
}

// --- Accounts ---

pub(crate) fn account_from_model(account: &models::Account) -> Result<Account> {
    Ok(Account {
        address: address(&account.address)?,
        balance: account.balance,
        keys: account
            .keys
            .iter()
            .map(|key| {
                Ok(AccountKey {
                    index: narrow("key index", key.index)?,
                    public_key: hex_bytes(&key.public_key)?,
                    sig_algo: SignatureAlgorithm::from_name(&key.signing_algorithm),
                    hash_algo: HashAlgorithm::from_name(&key.hashing_algorithm),
                    weight: narrow("key weight", key.weight)?,
                    sequence_number: key.sequence_number,
                    revoked: key.revoked,
                })
            })
            .collect::<Result<_>>()?,
        contracts: account
            .contracts
            .iter()
            .map(|(name, code)| Ok((name.clone(), decode_base64(code)?)))
            .collect::<Result<_>>()?,
    })
}

// --- Events ---

fn event_from_model(event: &models::Event) -> Result<Event> {
    let raw = decode_base64(&event.payload)?;
    Ok(Event {
        event_type: event.event_type.clone(),
        transaction_id: identifier(&event.transaction_id)?,
        transaction_index: narrow("transaction index", event.transaction_index)?,
        event_index: narrow("event index", event.event_index)?,
        value: payload::decode(&raw, REST_EVENT_ENCODING)?,
        payload: raw,
    })
}

fn events_from_model(events: &[models::Event]) -> Result<Vec<Event>> {
    events.iter().map(event_from_model).collect()
}

pub(crate) fn block_events_from_model(events: &models::BlockEvents) -> Result<BlockEvents> {
    Ok(BlockEvents {
        block_id: identifier(&events.block_id)?,
        height: events.block_height,
        block_timestamp: timestamp(&events.block_timestamp)?,
        events: events_from_model(&events.events)?,
    })
}

// --- Execution results ---

pub(crate) fn execution_result_from_model(
    result: &models::ExecutionResult,
) -> Result<ExecutionResult> {
    Ok(ExecutionResult {
        previous_result_id: identifier(&result.previous_result_id)?,
        block_id: identifier(&result.block_id)?,
        chunks: result
            .chunks
            .iter()
            .map(|chunk| {
                Ok(Chunk {
                    collection_index: narrow("collection index", chunk.collection_index)?,
                    start_state: identifier(&chunk.start_state)?,
                    event_collection: identifier(&chunk.event_collection)?,
                    block_id: identifier(&chunk.block_id)?,
                    total_computation_used: chunk.total_computation_used,
                    number_of_transactions: narrow(
                        "number of transactions",
                        chunk.number_of_transactions,
                    )?,
                    index: chunk.index,
                    end_state: identifier(&chunk.end_state)?,
                })
            })
            .collect::<Result<_>>()?,
        service_events: result
            .events
            .iter()
            .map(|event| {
                Ok(ServiceEvent {
                    event_type: event.event_type.clone(),
                    payload: decode_base64(&event.payload)?,
                })
            })
            .collect::<Result<_>>()?,
    })
}

pub(crate) fn block_ids_param(block_ids: &[Identifier]) -> String {
    block_ids
        .iter()
        .map(Identifier::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
