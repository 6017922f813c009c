//! JSON shapes of the REST API.
//!
//! 64-bit integers travel as decimal strings, binary fields as base64 and
//! identifiers and addresses as hex. These types only mirror the wire format;
//! see the sibling `convert` module for the mapping to the domain model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// (De)serializes a `u64` as a decimal string.
pub(crate) mod string_u64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| de::Error::custom(format!("invalid integer '{raw}': {e}")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub id: String,
    pub parent_id: String,
    #[serde(with = "string_u64")]
    pub height: u64,
    pub timestamp: String,
    #[serde(default)]
    pub parent_voter_signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionGuarantee {
    pub collection_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSeal {
    pub block_id: String,
    pub result_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockPayload {
    #[serde(default)]
    pub collection_guarantees: Vec<CollectionGuarantee>,
    #[serde(default)]
    pub block_seals: Vec<BlockSeal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    /// Only present when requested with `expand=payload`.
    #[serde(default)]
    pub payload: Option<BlockPayload>,
    /// `"finalized"` or `"sealed"`, when the node reports it.
    #[serde(default)]
    pub block_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub transactions: Vec<TransactionRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalKey {
    pub address: String,
    #[serde(with = "string_u64")]
    pub key_index: u64,
    #[serde(with = "string_u64")]
    pub sequence_number: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub address: String,
    #[serde(with = "string_u64")]
    pub key_index: u64,
    pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub script: String,
    pub arguments: Vec<String>,
    pub reference_block_id: String,
    #[serde(with = "string_u64")]
    pub gas_limit: u64,
    pub payer: String,
    pub proposal_key: ProposalKey,
    pub authorizers: Vec<String>,
    pub payload_signatures: Vec<TransactionSignature>,
    pub envelope_signatures: Vec<TransactionSignature>,
    /// Only present when requested with `expand=result`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TransactionResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub transaction_id: String,
    #[serde(with = "string_u64")]
    pub transaction_index: u64,
    #[serde(with = "string_u64")]
    pub event_index: u64,
    pub payload: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionResult {
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub collection_id: String,
    /// `Pending`, `Success` or `Failure`.
    #[serde(default)]
    pub execution: String,
    /// `Pending`, `Finalized`, `Executed`, `Sealed` or `Expired`.
    pub status: String,
    #[serde(default)]
    pub status_code: u32,
    #[serde(default)]
    pub error_message: String,
    #[serde(with = "string_u64", default)]
    pub computation_used: u64,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPublicKey {
    #[serde(with = "string_u64")]
    pub index: u64,
    pub public_key: String,
    pub signing_algorithm: String,
    pub hashing_algorithm: String,
    #[serde(with = "string_u64")]
    pub sequence_number: u64,
    #[serde(with = "string_u64")]
    pub weight: u64,
    #[serde(default)]
    pub revoked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde(with = "string_u64")]
    pub balance: u64,
    #[serde(default)]
    pub keys: Vec<AccountPublicKey>,
    /// Contract name to base64 source.
    #[serde(default)]
    pub contracts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockEvents {
    pub block_id: String,
    #[serde(with = "string_u64")]
    pub block_height: u64,
    pub block_timestamp: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chunk {
    pub block_id: String,
    #[serde(with = "string_u64")]
    pub collection_index: u64,
    pub start_state: String,
    pub end_state: String,
    pub event_collection: String,
    #[serde(with = "string_u64")]
    pub index: u64,
    #[serde(with = "string_u64")]
    pub number_of_transactions: u64,
    #[serde(with = "string_u64")]
    pub total_computation_used: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: String,
    pub block_id: String,
    pub previous_result_id: String,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    /// The service events emitted by the block.
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkParameters {
    pub chain_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptBody {
    pub script: String,
    pub arguments: Vec<String>,
}

/// The body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    pub message: String,
}
