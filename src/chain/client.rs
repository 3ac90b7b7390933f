use std::sync::Arc;
use std::time::Duration;

use crate::chain::proto::Any;
use crate::chain::registry::{Registry, TypedMessage};
use crate::chain::transport::{ChainTransport, TransportFactory, TransportOptions};
use crate::chain::tx_builder::TxBuilder;
use crate::chain::types::{BroadcastResult, Coin, Fee, GasEstimate};
use crate::error::{Error, Result};
use crate::wallet::{AccountData, Signer};

/// Configuration for signing clients
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Chain ID the transactions are signed for (e.g., "coreum-testnet-1")
    pub chain_id: String,
    pub transport: TransportOptions,
    /// How long to wait for a broadcast transaction to land in a block;
    /// None returns the check-tx result straight away
    pub confirm_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub registry: Registry,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            chain_id: "coreum-testnet-1".to_string(),
            transport: TransportOptions::default(),
            confirm_timeout: Some(Duration::from_secs(30)),
            poll_interval: Duration::from_millis(1000),
            registry: Registry::with_asset_messages(),
        }
    }
}

/// Client bound to one node endpoint and one signer account
#[derive(Clone)]
pub struct SigningClient {
    endpoint: String,
    chain_id: String,
    transport: Arc<dyn ChainTransport>,
    signer: Signer,
    account: AccountData,
    registry: Registry,
    confirm_timeout: Option<Duration>,
    poll_interval: Duration,
}

/// Handshake with `rpc_endpoint` and bind the first account `signer` exposes
pub async fn create_client(
    factory: &dyn TransportFactory,
    rpc_endpoint: &str,
    signer: Signer,
    options: ClientOptions,
) -> Result<SigningClient> {
    let accounts = signer
        .get_accounts()
        .await
        .map_err(|e| Error::SignerInvalid(e.to_string()))?;
    let account = accounts
        .into_iter()
        .next()
        .ok_or_else(|| Error::SignerInvalid("signer exposes no accounts".to_string()))?;

    let transport = factory.open(rpc_endpoint, &options.transport).await?;

    let node = tokio::time::timeout(options.transport.connect_timeout, transport.node_info())
        .await
        .map_err(|_| Error::EndpointUnreachable {
            endpoint: rpc_endpoint.to_string(),
            cause: format!(
                "node info not returned within {:?}",
                options.transport.connect_timeout
            ),
        })?
        .map_err(|e| Error::EndpointUnreachable {
            endpoint: rpc_endpoint.to_string(),
            cause: e.to_string(),
        })?;

    if node.network != options.chain_id {
        log::warn!(
            "Node {} reports network {} but client is configured for {}",
            rpc_endpoint,
            node.network,
            options.chain_id
        );
    }
    log::info!(
        "Signing client ready: {} via {} ({}, app {})",
        account.address,
        rpc_endpoint,
        node.moniker,
        node.app_version
    );

    Ok(SigningClient {
        endpoint: rpc_endpoint.to_string(),
        chain_id: options.chain_id,
        transport,
        signer,
        account,
        registry: options.registry,
        confirm_timeout: options.confirm_timeout,
        poll_interval: options.poll_interval,
    })
}

impl SigningClient {
    /// Address of the bound account
    pub fn address(&self) -> &str {
        &self.account.address
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Wrap a message in Any after checking its schema is registered
    pub fn encode<M: TypedMessage>(&self, msg: &M) -> Result<Any> {
        self.registry.encode(msg)
    }

    pub async fn get_balance(&self, address: &str, denom: &str) -> Result<Coin> {
        self.transport.balance(address, denom).await
    }

    /// Gas the node would use for `messages`
    pub async fn simulate(
        &self,
        signer_address: &str,
        messages: Vec<Any>,
        memo: &str,
    ) -> Result<GasEstimate> {
        self.check_request(signer_address, &messages)?;

        let account = self.transport.account(signer_address).await?;
        let builder = TxBuilder::new(
            &self.chain_id,
            account.account_number,
            account.sequence,
            &self.account.pubkey,
        )
        .with_memo(memo);

        // Fee is irrelevant to simulation
        let placeholder = Fee {
            amount: Vec::new(),
            gas_limit: 0,
        };
        let estimate = self
            .transport
            .simulate(builder.simulation_bytes(messages, &placeholder))
            .await?;
        log::debug!(
            "Gas simulation: used={}, wanted={}",
            estimate.gas_used,
            estimate.gas_wanted
        );
        Ok(estimate)
    }

    /// Sign `messages` with the bound signer and broadcast them
    ///
    /// A nonzero check-tx code is returned as-is for the caller to interpret.
    pub async fn sign_and_broadcast(
        &self,
        signer_address: &str,
        messages: Vec<Any>,
        fee: &Fee,
        memo: &str,
    ) -> Result<BroadcastResult> {
        self.check_request(signer_address, &messages)?;

        // 1. Fresh account number and sequence
        let account = self.transport.account(signer_address).await?;
        log::debug!(
            "Account sequence: {}, account_number: {}",
            account.sequence,
            account.account_number
        );

        // 2. SignDoc
        let builder = TxBuilder::new(
            &self.chain_id,
            account.account_number,
            account.sequence,
            &self.account.pubkey,
        )
        .with_memo(memo);
        let sign_doc = builder.sign_doc(messages, fee);

        // 3. Wallet signature
        let response = self.signer.sign_direct(signer_address, sign_doc).await?;

        // 4. Broadcast
        let tx_bytes = TxBuilder::tx_raw_bytes(response.signed, response.signature);
        let result = self.transport.broadcast(tx_bytes).await?;
        if !result.is_success() {
            log::warn!(
                "Transaction {} failed check-tx with code {}: {}",
                result.transaction_hash,
                result.code,
                result.raw_log
            );
            return Ok(result);
        }

        match self.confirm_timeout {
            Some(timeout) => self.wait_for_inclusion(&result.transaction_hash, timeout).await,
            None => Ok(result),
        }
    }

    /// Poll until `hash` is in a block or `timeout` runs out
    ///
    /// Check-tx already accepted the transaction, so a failed lookup counts
    /// as still pending.
    async fn wait_for_inclusion(&self, hash: &str, timeout: Duration) -> Result<BroadcastResult> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut last_error = None;
        loop {
            match self.transport.get_tx(hash).await {
                Ok(Some(delivered)) => {
                    log::info!(
                        "Transaction {} included at height {} with code {}",
                        hash,
                        delivered.height,
                        delivered.code
                    );
                    return Ok(delivered);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Lookup of transaction {} failed, still waiting: {}", hash, e);
                    last_error = Some(e);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                let cause = match last_error {
                    Some(e) => format!(" (last lookup error: {})", e),
                    None => String::new(),
                };
                return Err(Error::transport(format!(
                    "transaction {} not included within {:?}{}",
                    hash, timeout, cause
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn check_request(&self, signer_address: &str, messages: &[Any]) -> Result<()> {
        if signer_address != self.account.address {
            return Err(Error::SignerInvalid(format!(
                "client is bound to {}, not {}",
                self.account.address, signer_address
            )));
        }
        for msg in messages {
            self.registry.ensure_registered(&msg.type_url)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SigningClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningClient")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.chain_id)
            .field("address", &self.account.address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::proto::{MsgIssue, TxBody, TxRaw};
    use crate::testing::{MockFactory, MockSigner, MockTransport};
    use prost::Message;

    fn options() -> ClientOptions {
        ClientOptions {
            confirm_timeout: None,
            ..ClientOptions::default()
        }
    }

    async fn client(transport: Arc<MockTransport>) -> SigningClient {
        let factory = MockFactory::new(transport);
        create_client(&factory, "http://node:9090", MockSigner::arc(), options())
            .await
            .unwrap()
    }

    fn issue(client: &SigningClient) -> Any {
        client
            .encode(&MsgIssue {
                issuer: client.address().to_string(),
                symbol: "DEMOLOG".to_string(),
                subunit: "udemolog".to_string(),
                initial_amount: "1".to_string(),
                ..Default::default()
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_client_binds_first_signer_account() {
        let transport = MockTransport::arc();
        let client = client(transport.clone()).await;
        assert!(client.address().starts_with("testcore1"));
        assert_eq!(client.endpoint(), "http://node:9090");
        // node info handshake only
        assert_eq!(transport.network_calls(), 1);
    }

    #[tokio::test]
    async fn test_signer_without_accounts_is_invalid() {
        let transport = MockTransport::arc();
        let factory = MockFactory::new(transport.clone());
        let err = create_client(&factory, "http://node:9090", MockSigner::empty(), options())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SignerInvalid");
        assert_eq!(transport.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let factory = MockFactory::unreachable();
        let err = create_client(&factory, "http://nowhere:9090", MockSigner::arc(), options())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EndpointUnreachable { ref endpoint, .. } if endpoint == "http://nowhere:9090"));
    }

    #[tokio::test]
    async fn test_failed_handshake_is_unreachable() {
        let transport = MockTransport::arc();
        transport.fail_node_info();
        let factory = MockFactory::new(transport);
        let err = create_client(&factory, "http://node:9090", MockSigner::arc(), options())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "EndpointUnreachable");
    }

    #[tokio::test]
    async fn test_sign_and_broadcast_submits_signed_tx() {
        let transport = MockTransport::arc();
        transport.set_broadcast_result(0, "ABC123", "");
        let client = client(transport.clone()).await;

        let fee = Fee::single("utestcore", "5000", 200_000);
        let msg = issue(&client);
        let result = client
            .sign_and_broadcast(client.address(), vec![msg], &fee, "memo")
            .await
            .unwrap();
        assert_eq!(result.code, 0);
        assert_eq!(result.transaction_hash, "ABC123");

        let sent = transport.broadcasts();
        assert_eq!(sent.len(), 1);
        let raw = TxRaw::decode(&sent[0][..]).unwrap();
        assert_eq!(raw.signatures.len(), 1);
        assert_eq!(raw.signatures[0].len(), 64);
        let body = TxBody::decode(&raw.body_bytes[..]).unwrap();
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.memo, "memo");
    }

    #[tokio::test]
    async fn test_nonzero_code_returned_without_polling() {
        let transport = MockTransport::arc();
        transport.set_broadcast_result(5, "DEF456", "insufficient funds");
        let factory = MockFactory::new(transport.clone());
        let client = create_client(
            &factory,
            "http://node:9090",
            MockSigner::arc(),
            ClientOptions::default(),
        )
        .await
        .unwrap();

        let result = client
            .sign_and_broadcast(client.address(), vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap();
        assert_eq!(result.code, 5);
        assert_eq!(result.raw_log, "insufficient funds");
        assert_eq!(transport.get_tx_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inclusion_polling_returns_delivered_result() {
        let transport = MockTransport::arc();
        transport.set_broadcast_result(0, "ABC123", "");
        transport.set_pending_polls(2);
        let factory = MockFactory::new(transport.clone());
        let client = create_client(
            &factory,
            "http://node:9090",
            MockSigner::arc(),
            ClientOptions::default(),
        )
        .await
        .unwrap();

        let result = client
            .sign_and_broadcast(client.address(), vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap();
        assert_eq!(result.transaction_hash, "ABC123");
        assert!(result.height > 0);
        assert_eq!(transport.get_tx_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inclusion_timeout_is_transport_failure() {
        let transport = MockTransport::arc();
        transport.set_broadcast_result(0, "ABC123", "");
        transport.set_pending_polls(u32::MAX);
        let factory = MockFactory::new(transport);
        let client = create_client(
            &factory,
            "http://node:9090",
            MockSigner::arc(),
            ClientOptions {
                confirm_timeout: Some(Duration::from_secs(3)),
                ..ClientOptions::default()
            },
        )
        .await
        .unwrap();

        let err = client
            .sign_and_broadcast(client.address(), vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "TransportFailure");
        assert!(err.to_string().contains("ABC123"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookups_keep_polling() {
        let transport = MockTransport::arc();
        transport.set_broadcast_result(0, "ABC123", "");
        transport.fail_lookups(2);
        let factory = MockFactory::new(transport.clone());
        let client = create_client(
            &factory,
            "http://node:9090",
            MockSigner::arc(),
            ClientOptions::default(),
        )
        .await
        .unwrap();

        let result = client
            .sign_and_broadcast(client.address(), vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap();
        assert_eq!(result.transaction_hash, "ABC123");
        assert_eq!(result.height, 1234);
        assert_eq!(transport.get_tx_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_failing_until_deadline() {
        let transport = MockTransport::arc();
        transport.set_broadcast_result(0, "ABC123", "");
        transport.fail_lookups(u32::MAX);
        let factory = MockFactory::new(transport);
        let client = create_client(
            &factory,
            "http://node:9090",
            MockSigner::arc(),
            ClientOptions {
                confirm_timeout: Some(Duration::from_secs(3)),
                ..ClientOptions::default()
            },
        )
        .await
        .unwrap();

        let err = client
            .sign_and_broadcast(client.address(), vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "TransportFailure");
        assert!(err.to_string().contains("ABC123"));
        assert!(err.to_string().contains("lookup unavailable"));
    }

    #[tokio::test]
    async fn test_foreign_signer_address_refused() {
        let transport = MockTransport::arc();
        let signer = MockSigner::arc();
        let factory = MockFactory::new(transport.clone());
        let client = create_client(&factory, "http://node:9090", signer.clone(), options())
            .await
            .unwrap();
        let err = client
            .sign_and_broadcast("testcore1other", vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SignerInvalid");
        assert_eq!(signer.sign_calls(), 0);
        assert_eq!(transport.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_message_refused() {
        let transport = MockTransport::arc();
        let factory = MockFactory::new(transport.clone());
        let client = create_client(
            &factory,
            "http://node:9090",
            MockSigner::arc(),
            ClientOptions {
                registry: Registry::new(),
                ..options()
            },
        )
        .await
        .unwrap();

        let msg = Any {
            type_url: "/coreum.asset.ft.v1.MsgIssue".to_string(),
            value: Vec::new(),
        };
        let err = client
            .sign_and_broadcast(client.address(), vec![msg], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap_err();
        assert_eq!(err, Error::SchemaNotRegistered("/coreum.asset.ft.v1.MsgIssue".to_string()));
        assert_eq!(transport.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn test_signing_rejection_propagates() {
        let transport = MockTransport::arc();
        let signer = MockSigner::arc();
        signer.reject_signing();
        let factory = MockFactory::new(transport.clone());
        let client = create_client(&factory, "http://node:9090", signer, options())
            .await
            .unwrap();

        let err = client
            .sign_and_broadcast(client.address(), vec![issue(&client)], &Fee::single("utestcore", "1", 1), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UserRejected");
        assert_eq!(transport.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn test_simulate_reports_gas() {
        let transport = MockTransport::arc();
        transport.set_simulated_gas(120_000);
        let client = client(transport).await;
        let estimate = client
            .simulate(client.address(), vec![issue(&client)], "")
            .await
            .unwrap();
        assert_eq!(estimate.gas_used, 120_000);
    }
}
