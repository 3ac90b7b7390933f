use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Code;

use crate::chain::account_types::{AccountInfo, ChainAccount};
use crate::chain::proto::{
    AuthQueryClient, BankQueryClient, BroadcastMode, BroadcastTxRequest, GetNodeInfoRequest,
    GetTxRequest, QueryAccountRequest, QueryBalanceRequest, ServiceClient, SimulateRequest,
    TendermintServiceClient,
};
use crate::chain::types::{BroadcastResult, Coin, GasEstimate, NodeInfo};
use crate::error::{Error, Result};

/// Timeouts applied to a node connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Bound on the initial handshake
    pub connect_timeout: Duration,
    /// Bound on every individual request
    pub request_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Requests a signing client sends to a chain node
#[async_trait]
pub trait ChainTransport: Send + Sync {
    async fn node_info(&self) -> Result<NodeInfo>;

    /// Account number and sequence; fresh accounts report zeros
    async fn account(&self, address: &str) -> Result<AccountInfo>;

    async fn balance(&self, address: &str, denom: &str) -> Result<Coin>;

    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasEstimate>;

    /// Submit in sync mode, returning the check-tx outcome
    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult>;

    /// Delivered result, or None while the transaction is not in a block
    async fn get_tx(&self, hash: &str) -> Result<Option<BroadcastResult>>;
}

/// Opens transports to an endpoint
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn open(
        &self,
        endpoint: &str,
        options: &TransportOptions,
    ) -> Result<Arc<dyn ChainTransport>>;
}

/// Opens gRPC transports
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcTransportFactory;

#[async_trait]
impl TransportFactory for GrpcTransportFactory {
    async fn open(
        &self,
        endpoint: &str,
        options: &TransportOptions,
    ) -> Result<Arc<dyn ChainTransport>> {
        let transport = GrpcTransport::connect(endpoint, options).await?;
        Ok(Arc::new(transport))
    }
}

/// gRPC transport to a Cosmos SDK node
#[derive(Clone)]
pub struct GrpcTransport {
    endpoint: String,
    channel: Channel,
}

fn unreachable(endpoint: &str, cause: impl std::fmt::Display) -> Error {
    Error::EndpointUnreachable {
        endpoint: endpoint.to_string(),
        cause: cause.to_string(),
    }
}

impl GrpcTransport {
    /// Connect to the gRPC endpoint within `connect_timeout`
    pub async fn connect(endpoint: &str, options: &TransportOptions) -> Result<Self> {
        log::info!("Connecting to node at {}", endpoint);

        let mut builder = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| unreachable(endpoint, format!("invalid endpoint: {}", e)))?
            .timeout(options.request_timeout)
            .connect_timeout(options.connect_timeout);

        if endpoint.starts_with("https://") {
            builder = builder
                .tls_config(ClientTlsConfig::new())
                .map_err(|e| unreachable(endpoint, format!("TLS setup failed: {}", e)))?;
        }

        let channel = tokio::time::timeout(options.connect_timeout, builder.connect())
            .await
            .map_err(|_| {
                unreachable(
                    endpoint,
                    format!("handshake timed out after {:?}", options.connect_timeout),
                )
            })?
            .map_err(|e| unreachable(endpoint, e))?;

        log::info!("Connected to {}", endpoint);
        Ok(Self {
            endpoint: endpoint.to_string(),
            channel,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChainTransport for GrpcTransport {
    async fn node_info(&self) -> Result<NodeInfo> {
        let mut client = TendermintServiceClient::new(self.channel.clone());
        let response = client
            .get_node_info(GetNodeInfoRequest {})
            .await
            .map_err(|e| Error::transport(format!("failed to get node info: {}", e)))?
            .into_inner();

        let default_node_info = response
            .default_node_info
            .ok_or_else(|| Error::transport("no default node info in response"))?;
        let app_version = response
            .application_version
            .map(|v| v.version)
            .unwrap_or_default();

        Ok(NodeInfo {
            network: default_node_info.network,
            moniker: default_node_info.moniker,
            app_version,
        })
    }

    async fn account(&self, address: &str) -> Result<AccountInfo> {
        let mut client = AuthQueryClient::new(self.channel.clone());
        let request = QueryAccountRequest {
            address: address.to_string(),
            ..Default::default()
        };

        let response = match client.account(request).await {
            Ok(response) => response.into_inner(),
            Err(status) if status.code() == Code::NotFound => {
                log::info!("Account {} not found on chain, using fresh account info", address);
                return Ok(AccountInfo::fresh(address));
            }
            Err(status) => {
                return Err(Error::transport(format!("failed to query account: {}", status)))
            }
        };

        let account_any = response
            .account
            .ok_or_else(|| Error::transport("account missing from response"))?;
        log::debug!("Decoding account with type_url: {}", account_any.type_url);

        let account = ChainAccount::decode_any(&account_any.type_url, &account_any.value)?;
        match account.account_info() {
            Some(info) => Ok(info),
            None => {
                log::warn!(
                    "Account type {} carries no signing info, assuming a fresh account",
                    account.account_type()
                );
                Ok(AccountInfo::fresh(address))
            }
        }
    }

    async fn balance(&self, address: &str, denom: &str) -> Result<Coin> {
        let mut client = BankQueryClient::new(self.channel.clone());
        let request = QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
            ..Default::default()
        };

        let response = client
            .balance(request)
            .await
            .map_err(|e| Error::transport(format!("failed to query bank balance: {}", e)))?
            .into_inner();

        // The bank module omits the coin for an empty balance
        Ok(response
            .balance
            .map(Coin::from)
            .unwrap_or_else(|| Coin::new(denom, "0")))
    }

    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasEstimate> {
        let mut client = ServiceClient::new(self.channel.clone());
        #[allow(deprecated)]
        let request = SimulateRequest {
            tx: None,
            tx_bytes,
        };

        let response = client
            .simulate(request)
            .await
            .map_err(|e| Error::transport(format!("failed to simulate transaction: {}", e)))?
            .into_inner();

        let gas_info = response
            .gas_info
            .ok_or_else(|| Error::transport("no gas info in simulation response"))?;

        Ok(GasEstimate {
            gas_used: gas_info.gas_used,
            gas_wanted: gas_info.gas_wanted,
        })
    }

    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
        log::info!("Broadcasting transaction of {} bytes", tx_bytes.len());
        let mut client = ServiceClient::new(self.channel.clone());
        let request = BroadcastTxRequest {
            tx_bytes,
            mode: BroadcastMode::Sync as i32,
        };

        let tx_response = client
            .broadcast_tx(request)
            .await
            .map_err(|e| Error::transport(format!("failed to broadcast transaction: {}", e)))?
            .into_inner()
            .tx_response
            .ok_or_else(|| Error::transport("no tx response in broadcast response"))?;

        Ok(tx_response.into())
    }

    async fn get_tx(&self, hash: &str) -> Result<Option<BroadcastResult>> {
        let mut client = ServiceClient::new(self.channel.clone());
        let request = GetTxRequest {
            hash: hash.to_string(),
            ..Default::default()
        };

        match client.get_tx(request).await {
            Ok(response) => Ok(response.into_inner().tx_response.map(Into::into)),
            Err(status) if status.code() == Code::NotFound => Ok(None),
            Err(status) => Err(Error::transport(format!(
                "failed to look up transaction {}: {}",
                hash, status
            ))),
        }
    }
}
