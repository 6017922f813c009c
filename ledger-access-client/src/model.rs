//! # Domain Model
//!
//! Transport-independent representations of ledger entities. Both the gRPC and
//! the REST client convert their wire messages into these types, so application
//! code never has to deal with protobuf or JSON shapes directly.

use crate::error::{AccessError, Result};
use crate::payload::Value;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Length in bytes of an [`Identifier`].
pub const IDENTIFIER_LEN: usize = 32;
/// Length in bytes of an [`Address`].
pub const ADDRESS_LEN: usize = 8;

/// A 32-byte identifier of a block, transaction, collection or result.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    /// The all-zero identifier, used as "unset".
    pub const EMPTY: Identifier = Identifier([0; IDENTIFIER_LEN]);

    pub const fn new(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an identifier from raw bytes.
    ///
    /// Shorter inputs are zero-padded on the right and longer ones truncated,
    /// which keeps conversions from wire messages total.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut id = [0u8; IDENTIFIER_LEN];
        let len = bytes.len().min(IDENTIFIER_LEN);
        id[..len].copy_from_slice(&bytes[..len]);
        Self(id)
    }

    /// Parses a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        Ok(Self::from_slice(&bytes))
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Returns `true` for [`Identifier::EMPTY`].
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

impl FromStr for Identifier {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// The hash of the execution state at a chunk boundary.
pub type StateCommitment = Identifier;

/// An 8-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const EMPTY: Address = Address([0; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an address from raw bytes, left-padding short inputs and keeping
    /// the trailing 8 bytes of long ones.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut address = [0u8; ADDRESS_LEN];
        let bytes = if bytes.len() > ADDRESS_LEN {
            &bytes[bytes.len() - ADDRESS_LEN..]
        } else {
            bytes
        };
        address[ADDRESS_LEN - bytes.len()..].copy_from_slice(bytes);
        Self(address)
    }

    /// Parses a hex string, with or without a `0x` prefix. Odd-length input is
    /// treated as if it had a leading zero.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex(s)?;
        Ok(Self::from_slice(&bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn hex_with_prefix(&self) -> String {
        format!("0x{self}")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{self})")
    }
}

impl FromStr for Address {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let decoded = if trimmed.len() % 2 == 1 {
        hex::decode(format!("0{trimmed}"))
    } else {
        hex::decode(trimmed)
    };
    decoded.map_err(|e| AccessError::InvalidArgument(format!("invalid hex value '{s}': {e}")))
}

// --- Blocks ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockStatus {
    #[default]
    Unknown,
    Finalized,
    Sealed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    pub id: Identifier,
    pub parent_id: Identifier,
    pub height: u64,
    pub timestamp: DateTime<Utc>,
    pub status: BlockStatus,
    pub payload_hash: Vec<u8>,
    pub view: u64,
    pub parent_voter_sig_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionGuarantee {
    pub collection_id: Identifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockSeal {
    pub block_id: Identifier,
    pub execution_receipt_id: Identifier,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockPayload {
    pub collection_guarantees: Vec<CollectionGuarantee>,
    pub seals: Vec<BlockSeal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: BlockPayload,
}

/// A batch of transactions included in a block, referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: Identifier,
    pub transaction_ids: Vec<Identifier>,
}

/// Parameters of the network the access node serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParameters {
    pub chain_id: String,
}

// --- Transactions ---

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProposalKey {
    pub address: Address,
    pub key_index: u32,
    pub sequence_number: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSignature {
    pub address: Address,
    pub key_index: u32,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transaction {
    pub script: Vec<u8>,
    pub arguments: Vec<Vec<u8>>,
    pub reference_block_id: Identifier,
    pub gas_limit: u64,
    pub proposal_key: ProposalKey,
    pub payer: Address,
    pub authorizers: Vec<Address>,
    pub payload_signatures: Vec<TransactionSignature>,
    pub envelope_signatures: Vec<TransactionSignature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    #[default]
    Unknown,
    Pending,
    Finalized,
    Executed,
    Sealed,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionResult {
    pub status: TransactionStatus,
    pub status_code: u32,
    /// The execution error message, if the transaction failed.
    pub error: Option<String>,
    pub events: Vec<Event>,
    pub block_id: Identifier,
    pub block_height: u64,
    pub transaction_id: Identifier,
    pub collection_id: Identifier,
    pub computation_used: u64,
}

// --- Accounts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Unknown,
    BlsBls12381,
    EcdsaP256,
    EcdsaSecp256k1,
}

impl SignatureAlgorithm {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::BlsBls12381,
            2 => Self::EcdsaP256,
            3 => Self::EcdsaSecp256k1,
            _ => Self::Unknown,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "BLS_BLS12_381" => Self::BlsBls12381,
            "ECDSA_P256" => Self::EcdsaP256,
            "ECDSA_secp256k1" | "ECDSA_SECP256K1" => Self::EcdsaSecp256k1,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Unknown,
    Sha2_256,
    Sha2_384,
    Sha3_256,
    Sha3_384,
    Kmac128,
    Keccak256,
}

impl HashAlgorithm {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Sha2_256,
            2 => Self::Sha2_384,
            3 => Self::Sha3_256,
            4 => Self::Sha3_384,
            5 => Self::Kmac128,
            6 => Self::Keccak256,
            _ => Self::Unknown,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "SHA2_256" => Self::Sha2_256,
            "SHA2_384" => Self::Sha2_384,
            "SHA3_256" => Self::Sha3_256,
            "SHA3_384" => Self::Sha3_384,
            "KMAC128" => Self::Kmac128,
            "KECCAK_256" | "Keccak256" => Self::Keccak256,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountKey {
    pub index: u32,
    pub public_key: Vec<u8>,
    pub sig_algo: SignatureAlgorithm,
    pub hash_algo: HashAlgorithm,
    pub weight: u32,
    pub sequence_number: u64,
    pub revoked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub address: Address,
    pub balance: u64,
    pub keys: Vec<AccountKey>,
    /// Deployed contract code, keyed by contract name.
    pub contracts: BTreeMap<String, Vec<u8>>,
}

// --- Events ---

/// An event emitted by a transaction, with its payload already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// The fully qualified event type, e.g. `A.0000000000000001.Contract.Name`.
    pub event_type: String,
    pub transaction_id: Identifier,
    pub transaction_index: u32,
    pub event_index: u32,
    pub value: Value,
    /// The payload exactly as received.
    pub payload: Vec<u8>,
}

/// The events of a single block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEvents {
    pub block_id: Identifier,
    pub height: u64,
    pub block_timestamp: DateTime<Utc>,
    pub events: Vec<Event>,
}

/// Selects which events a subscription delivers. An empty dimension does not
/// filter at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventFilter {
    pub event_types: Vec<String>,
    pub addresses: Vec<String>,
    pub contracts: Vec<String>,
}

impl EventFilter {
    /// Returns `true` when the filter matches every event.
    pub fn is_empty(&self) -> bool {
        self.event_types.is_empty() && self.addresses.is_empty() && self.contracts.is_empty()
    }
}

// --- Execution results ---

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub collection_index: u32,
    pub start_state: StateCommitment,
    pub event_collection: Identifier,
    pub block_id: Identifier,
    pub total_computation_used: u64,
    pub number_of_transactions: u16,
    pub index: u64,
    pub end_state: StateCommitment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEvent {
    pub event_type: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub previous_result_id: Identifier,
    pub block_id: Identifier,
    pub chunks: Vec<Chunk>,
    pub service_events: Vec<ServiceEvent>,
}

// --- Execution data ---

#[derive(Debug, Clone, PartialEq)]
pub struct KeyPart {
    pub kind: u16,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriePayload {
    pub key_parts: Vec<KeyPart>,
    pub value: Vec<u8>,
}

/// The register changes produced by executing one chunk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrieUpdate {
    pub root_hash: Vec<u8>,
    pub paths: Vec<Vec<u8>>,
    pub payloads: Vec<TriePayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightTransactionResult {
    pub transaction_id: Identifier,
    pub failed: bool,
    pub computation_used: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkExecutionData {
    pub transactions: Vec<Transaction>,
    pub events: Vec<Event>,
    pub trie_update: Option<TrieUpdate>,
    pub transaction_results: Vec<LightTransactionResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionData {
    pub block_id: Identifier,
    pub chunk_execution_data: Vec<ChunkExecutionData>,
}

/// One value of an execution-data subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionDataStreamResponse {
    pub height: u64,
    pub execution_data: ExecutionData,
    pub block_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_hex_roundtrip() {
        let hex_id = "0x2c8f2a1d3a6b4e1b51e7d9c0e4b6f02c4b2d5f8a9e0c1d2e3f405162738495a6";
        let id = Identifier::from_hex(hex_id).unwrap();
        assert_eq!(format!("0x{id}"), hex_id);
        assert!(!id.is_empty());
        assert!(Identifier::EMPTY.is_empty());
    }

    #[test]
    fn identifier_from_short_slice_is_right_padded() {
        let id = Identifier::from_slice(&[0xab, 0xcd]);
        assert_eq!(id.as_bytes()[..2], [0xab, 0xcd]);
        assert!(id.as_bytes()[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn address_is_left_padded() {
        let address = Address::from_hex("ABC123DEF456").unwrap();
        assert_eq!(address.to_string(), "0000abc123def456");
        assert_eq!(address.hex_with_prefix(), "0x0000abc123def456");

        let odd = Address::from_hex("0x1").unwrap();
        assert_eq!(odd.as_bytes(), &[0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(matches!(
            Identifier::from_hex("zz"),
            Err(AccessError::InvalidArgument(_))
        ));
        assert!(matches!(
            Address::from_hex("0x0x01"),
            Err(AccessError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EventFilter::default().is_empty());
        let filter = EventFilter {
            contracts: vec!["A.0.B".to_string()],
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
