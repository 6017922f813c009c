//! # REST Client
//!
//! The read and submit surface of an access node over its HTTP/JSON API.
//! Subscriptions are only available over gRPC.
//!
//! Every call goes through one request helper, which turns a non-success
//! answer into an [`ApiError`] carrying the server's message verbatim.

mod convert;
pub mod models;


use crate::config::ClientConfig;
use crate::error::{AccessError, ApiError, Result};
use crate::model::{
    Account, Address, Block, BlockEvents, BlockHeader, Collection, ExecutionResult, Identifier,
    NetworkParameters, Transaction, TransactionResult,
};
use crate::payload::{self, EventEncodingVersion, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Query value selecting the latest sealed block.
const SEALED: &str = "sealed";
/// Query value selecting the latest finalized block.
const FINAL: &str = "final";

/// A client for an access node's REST API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    /// Creates a client for the API rooted at `base_url`, e.g.
    /// `http://127.0.0.1:8888`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_timeout(&config.access.rest_url, config.http.timeout())
    }

    fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path, query)?;
        let request = self.client.request(Method::GET, url.clone());
        self.do_request(url, request).await
    }

    async fn post<B, T>(&self, path: &str, query: &[(&str, &str)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, query)?;
        let request = self.client.request(Method::POST, url.clone()).json(body);
        self.do_request(url, request).await
    }

    async fn do_request<T: DeserializeOwned>(&self, url: Url, request: RequestBuilder) -> Result<T> {
        tracing::debug!("REST request to {}", url);
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            // Prefer the structured message, fall back to the raw body.
            let message = serde_json::from_str::<models::ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or_else(|_| {
                    if text.trim().is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        text.trim().to_string()
                    }
                });
            tracing::debug!("REST request to {} failed with {}: {}", url, status, message);
            return Err(ApiError {
                url: url.to_string(),
                code: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(serde_json::from_str(&text)?)
    }

    // --- Network ---

    pub async fn get_network_parameters(&self) -> Result<NetworkParameters> {
        let params: models::NetworkParameters = self.get("v1/network/parameters", &[]).await?;
        Ok(NetworkParameters {
            chain_id: params.chain_id,
        })
    }

    // --- Blocks ---

    async fn blocks_at_height(&self, height: &str) -> Result<Block> {
        let blocks: Vec<models::Block> = self
            .get("v1/blocks", &[("height", height), ("expand", "payload")])
            .await?;
        first_block(&blocks)
    }

    pub async fn get_latest_block(&self, is_sealed: bool) -> Result<Block> {
        self.blocks_at_height(if is_sealed { SEALED } else { FINAL })
            .await
    }

    pub async fn get_block_by_height(&self, height: u64) -> Result<Block> {
        self.blocks_at_height(&height.to_string()).await
    }

    pub async fn get_block_by_id(&self, id: &Identifier) -> Result<Block> {
        let blocks: Vec<models::Block> = self
            .get(&format!("v1/blocks/{id}"), &[("expand", "payload")])
            .await?;
        first_block(&blocks)
    }

    pub async fn get_latest_block_header(&self, is_sealed: bool) -> Result<BlockHeader> {
        Ok(self.get_latest_block(is_sealed).await?.header)
    }

    pub async fn get_block_header_by_height(&self, height: u64) -> Result<BlockHeader> {
        Ok(self.get_block_by_height(height).await?.header)
    }

    pub async fn get_block_header_by_id(&self, id: &Identifier) -> Result<BlockHeader> {
        Ok(self.get_block_by_id(id).await?.header)
    }

    pub async fn get_collection(&self, id: &Identifier) -> Result<Collection> {
        let collection: models::Collection = self
            .get(&format!("v1/collections/{id}"), &[("expand", "transactions")])
            .await?;
        convert::collection_from_model(&collection)
    }

    // --- Transactions ---

    /// Submits a transaction and returns the id assigned by the node.
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Identifier> {
        let body = convert::transaction_to_model(transaction);
        let sent: models::Transaction = self.post("v1/transactions", &[], &body).await?;
        convert::identifier(&sent.id)
    }

    pub async fn get_transaction(&self, id: &Identifier) -> Result<Transaction> {
        let tx: models::Transaction = self.get(&format!("v1/transactions/{id}"), &[]).await?;
        convert::transaction_from_model(&tx)
    }

    pub async fn get_transaction_result(&self, id: &Identifier) -> Result<TransactionResult> {
        let tx: models::Transaction = self
            .get(&format!("v1/transactions/{id}"), &[("expand", "result")])
            .await?;
        let result = tx.result.as_ref().ok_or_else(|| {
            AccessError::MalformedFrame(format!("transaction {id} carries no result"))
        })?;
        convert::transaction_result_from_model(result, *id)
    }

    // --- Accounts ---

    pub async fn get_account(&self, address: &Address) -> Result<Account> {
        self.get_account_at_latest_block(address).await
    }

    pub async fn get_account_at_latest_block(&self, address: &Address) -> Result<Account> {
        self.account(address, SEALED).await
    }

    pub async fn get_account_at_block_height(
        &self,
        address: &Address,
        block_height: u64,
    ) -> Result<Account> {
        self.account(address, &block_height.to_string()).await
    }

    async fn account(&self, address: &Address, block_height: &str) -> Result<Account> {
        let account: models::Account = self
            .get(
                &format!("v1/accounts/{address}"),
                &[("block_height", block_height), ("expand", "keys,contracts")],
            )
            .await?;
        convert::account_from_model(&account)
    }

    // --- Scripts ---

    /// Executes a read-only script against the latest sealed block. Arguments
    /// and the result are JSON-CDC encoded.
    pub async fn execute_script_at_latest_block(
        &self,
        script: &[u8],
        arguments: &[Vec<u8>],
    ) -> Result<Value> {
        self.execute_script(("block_height", SEALED), script, arguments)
            .await
    }

    pub async fn execute_script_at_block_height(
        &self,
        block_height: u64,
        script: &[u8],
        arguments: &[Vec<u8>],
    ) -> Result<Value> {
        let height = block_height.to_string();
        self.execute_script(("block_height", height.as_str()), script, arguments)
            .await
    }

    pub async fn execute_script_at_block_id(
        &self,
        block_id: &Identifier,
        script: &[u8],
        arguments: &[Vec<u8>],
    ) -> Result<Value> {
        let id = block_id.to_string();
        self.execute_script(("block_id", id.as_str()), script, arguments)
            .await
    }

    async fn execute_script(
        &self,
        at: (&str, &str),
        script: &[u8],
        arguments: &[Vec<u8>],
    ) -> Result<Value> {
        let body = models::ScriptBody {
            script: STANDARD.encode(script),
            arguments: arguments.iter().map(|a| STANDARD.encode(a)).collect(),
        };
        let encoded: String = self.post("v1/scripts", &[at], &body).await?;
        let raw = STANDARD.decode(encoded.trim())?;
        Ok(payload::decode(&raw, EventEncodingVersion::JsonCdcV0)?)
    }

    // --- Events ---

    /// Returns the events of `event_type` in the inclusive height range.
    ///
    /// The range is checked before any request is made.
    pub async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start_height: u64,
        end_height: u64,
    ) -> Result<Vec<BlockEvents>> {
        validate_height_range(start_height, end_height)?;
        let start = start_height.to_string();
        let end = end_height.to_string();
        let events: Vec<models::BlockEvents> = self
            .get(
                "v1/events",
                &[("type", event_type), ("start_height", start.as_str()), ("end_height", end.as_str())],
            )
            .await?;
        events.iter().map(convert::block_events_from_model).collect()
    }

    pub async fn get_events_for_block_ids(
        &self,
        event_type: &str,
        block_ids: &[Identifier],
    ) -> Result<Vec<BlockEvents>> {
        let ids = convert::block_ids_param(block_ids);
        let events: Vec<models::BlockEvents> = self
            .get("v1/events", &[("type", event_type), ("block_ids", ids.as_str())])
            .await?;
        events.iter().map(convert::block_events_from_model).collect()
    }

    // --- Execution results ---

    pub async fn get_execution_result_for_block_id(
        &self,
        block_id: &Identifier,
    ) -> Result<ExecutionResult> {
        let id = block_id.to_string();
        let results: Vec<models::ExecutionResult> = self
            .get("v1/execution_results", &[("block_id", id.as_str())])
            .await?;
        let result = results.first().ok_or_else(|| {
            AccessError::MalformedFrame(format!("no execution result for block {id}"))
        })?;
        convert::execution_result_from_model(result)
    }
}

fn first_block(blocks: &[models::Block]) -> Result<Block> {
    let block = blocks
        .first()
        .ok_or_else(|| AccessError::MalformedFrame("response carries no block".to_string()))?;
    convert::block_from_model(block)
}

/// Checks a height range the way the node would, without a round trip.
pub fn validate_height_range(start_height: u64, end_height: u64) -> Result<()> {
    if start_height == 0 && end_height == 0 {
        return Err(AccessError::InvalidArgument(
            "must provide start and end height range".to_string(),
        ));
    }
    if start_height > end_height {
        return Err(AccessError::InvalidArgument(format!(
            "start height ({start_height}) must be smaller than end height ({end_height})"
        )));
    }
    Ok(())
}
