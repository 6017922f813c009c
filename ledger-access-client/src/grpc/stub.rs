//! tonic clients for the access and execution data services.

use super::proto;
use super::{AccessRpc, ExecutionDataRpc, FrameStream};
use async_trait::async_trait;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{Request, Status};

const ACCESS_SERVICE: &str = "flow.access.AccessAPI";
const EXECUTION_DATA_SERVICE: &str = "flow.executiondata.ExecutionDataAPI";

/// A thin unary/server-streaming caller over one service.
#[derive(Debug, Clone)]
struct ServiceClient {
    inner: tonic::client::Grpc<Channel>,
    service: &'static str,
}

impl ServiceClient {
    fn new(channel: Channel, service: &'static str) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
            service,
        }
    }

    fn path(&self, method: &str) -> Result<PathAndQuery, Status> {
        format!("/{}/{}", self.service, method)
            .parse::<PathAndQuery>()
            .map_err(|e| Status::internal(format!("invalid method path: {e}")))
    }

    async fn unary<Req, Resp>(&self, method: &str, request: Req) -> Result<Resp, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        // Clones share the underlying channel.
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {e}")))?;
        let codec = tonic::codec::ProstCodec::default();
        let response = grpc
            .unary(Request::new(request), self.path(method)?, codec)
            .await?;
        Ok(response.into_inner())
    }

    async fn server_streaming<Req, Resp>(
        &self,
        method: &str,
        request: Req,
    ) -> Result<tonic::Streaming<Resp>, Status>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unknown(format!("Service was not ready: {e}")))?;
        let codec = tonic::codec::ProstCodec::default();
        let response = grpc
            .server_streaming(Request::new(request), self.path(method)?, codec)
            .await?;
        Ok(response.into_inner())
    }
}

/// The access API over a tonic channel.
#[derive(Debug, Clone)]
pub struct AccessApiClient {
    client: ServiceClient,
}

impl AccessApiClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: ServiceClient::new(channel, ACCESS_SERVICE),
        }
    }
}

#[async_trait]
impl AccessRpc for AccessApiClient {
    async fn ping(&self, request: proto::PingRequest) -> Result<proto::PingResponse, Status> {
        self.client.unary("Ping", request).await
    }

    async fn get_network_parameters(
        &self,
        request: proto::GetNetworkParametersRequest,
    ) -> Result<proto::GetNetworkParametersResponse, Status> {
        self.client.unary("GetNetworkParameters", request).await
    }

    async fn get_latest_block_header(
        &self,
        request: proto::GetLatestBlockHeaderRequest,
    ) -> Result<proto::BlockHeaderResponse, Status> {
        self.client.unary("GetLatestBlockHeader", request).await
    }

    async fn get_block_header_by_id(
        &self,
        request: proto::GetBlockHeaderByIdRequest,
    ) -> Result<proto::BlockHeaderResponse, Status> {
        self.client.unary("GetBlockHeaderByID", request).await
    }

    async fn get_block_header_by_height(
        &self,
        request: proto::GetBlockHeaderByHeightRequest,
    ) -> Result<proto::BlockHeaderResponse, Status> {
        self.client.unary("GetBlockHeaderByHeight", request).await
    }

    async fn get_latest_block(
        &self,
        request: proto::GetLatestBlockRequest,
    ) -> Result<proto::BlockResponse, Status> {
        self.client.unary("GetLatestBlock", request).await
    }

    async fn get_block_by_id(
        &self,
        request: proto::GetBlockByIdRequest,
    ) -> Result<proto::BlockResponse, Status> {
        self.client.unary("GetBlockByID", request).await
    }

    async fn get_block_by_height(
        &self,
        request: proto::GetBlockByHeightRequest,
    ) -> Result<proto::BlockResponse, Status> {
        self.client.unary("GetBlockByHeight", request).await
    }

    async fn get_collection_by_id(
        &self,
        request: proto::GetCollectionByIdRequest,
    ) -> Result<proto::CollectionResponse, Status> {
        self.client.unary("GetCollectionByID", request).await
    }

    async fn send_transaction(
        &self,
        request: proto::SendTransactionRequest,
    ) -> Result<proto::SendTransactionResponse, Status> {
        self.client.unary("SendTransaction", request).await
    }

    async fn get_transaction(
        &self,
        request: proto::GetTransactionRequest,
    ) -> Result<proto::TransactionResponse, Status> {
        self.client.unary("GetTransaction", request).await
    }

    async fn get_transaction_result(
        &self,
        request: proto::GetTransactionRequest,
    ) -> Result<proto::TransactionResultResponse, Status> {
        self.client.unary("GetTransactionResult", request).await
    }

    async fn get_transactions_by_block_id(
        &self,
        request: proto::GetTransactionsByBlockIdRequest,
    ) -> Result<proto::TransactionsResponse, Status> {
        self.client.unary("GetTransactionsByBlockID", request).await
    }

    async fn get_transaction_results_by_block_id(
        &self,
        request: proto::GetTransactionsByBlockIdRequest,
    ) -> Result<proto::TransactionResultsResponse, Status> {
        self.client
            .unary("GetTransactionResultsByBlockID", request)
            .await
    }

    async fn get_account_at_latest_block(
        &self,
        request: proto::GetAccountAtLatestBlockRequest,
    ) -> Result<proto::AccountResponse, Status> {
        self.client.unary("GetAccountAtLatestBlock", request).await
    }

    async fn get_account_at_block_height(
        &self,
        request: proto::GetAccountAtBlockHeightRequest,
    ) -> Result<proto::AccountResponse, Status> {
        self.client.unary("GetAccountAtBlockHeight", request).await
    }

    async fn execute_script_at_latest_block(
        &self,
        request: proto::ExecuteScriptAtLatestBlockRequest,
    ) -> Result<proto::ExecuteScriptResponse, Status> {
        self.client.unary("ExecuteScriptAtLatestBlock", request).await
    }

    async fn execute_script_at_block_id(
        &self,
        request: proto::ExecuteScriptAtBlockIdRequest,
    ) -> Result<proto::ExecuteScriptResponse, Status> {
        self.client.unary("ExecuteScriptAtBlockID", request).await
    }

    async fn execute_script_at_block_height(
        &self,
        request: proto::ExecuteScriptAtBlockHeightRequest,
    ) -> Result<proto::ExecuteScriptResponse, Status> {
        self.client.unary("ExecuteScriptAtBlockHeight", request).await
    }

    async fn get_events_for_height_range(
        &self,
        request: proto::GetEventsForHeightRangeRequest,
    ) -> Result<proto::EventsResponse, Status> {
        self.client.unary("GetEventsForHeightRange", request).await
    }

    async fn get_events_for_block_ids(
        &self,
        request: proto::GetEventsForBlockIdsRequest,
    ) -> Result<proto::EventsResponse, Status> {
        self.client.unary("GetEventsForBlockIDs", request).await
    }

    async fn get_latest_protocol_state_snapshot(
        &self,
        request: proto::GetLatestProtocolStateSnapshotRequest,
    ) -> Result<proto::ProtocolStateSnapshotResponse, Status> {
        self.client
            .unary("GetLatestProtocolStateSnapshot", request)
            .await
    }

    async fn get_execution_result_for_block_id(
        &self,
        request: proto::GetExecutionResultForBlockIdRequest,
    ) -> Result<proto::ExecutionResultForBlockIdResponse, Status> {
        self.client
            .unary("GetExecutionResultForBlockID", request)
            .await
    }
}

/// The execution data API over a tonic channel.
#[derive(Debug, Clone)]
pub struct ExecutionDataApiClient {
    client: ServiceClient,
}

impl ExecutionDataApiClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: ServiceClient::new(channel, EXECUTION_DATA_SERVICE),
        }
    }
}

#[async_trait]
impl ExecutionDataRpc for ExecutionDataApiClient {
    async fn get_execution_data_by_block_id(
        &self,
        request: proto::GetExecutionDataByBlockIdRequest,
    ) -> Result<proto::GetExecutionDataByBlockIdResponse, Status> {
        self.client
            .unary("GetExecutionDataByBlockID", request)
            .await
    }

    async fn subscribe_execution_data(
        &self,
        request: proto::SubscribeExecutionDataRequest,
    ) -> Result<FrameStream<proto::SubscribeExecutionDataResponse>, Status> {
        let stream = self
            .client
            .server_streaming("SubscribeExecutionData", request)
            .await?;
        Ok(Box::new(stream))
    }

    async fn subscribe_events(
        &self,
        request: proto::SubscribeEventsRequest,
    ) -> Result<FrameStream<proto::SubscribeEventsResponse>, Status> {
        let stream = self
            .client
            .server_streaming("SubscribeEvents", request)
            .await?;
        Ok(Box::new(stream))
    }
}
