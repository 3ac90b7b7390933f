//! In-memory wallet and node doubles that count the calls made to them

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::chain::proto::SignDoc;
use crate::chain::transport::{ChainTransport, TransportFactory, TransportOptions};
use crate::chain::types::{BroadcastResult, Coin, GasEstimate, NodeInfo};
use crate::chain::AccountInfo;
use crate::error::{Error, Result};
use crate::wallet::{
    AccountData, Approval, DirectSignResponse, KeyWallet, LocalSigner, OfflineSigner, Signer,
    WalletProvider, COREUM_HD_PATH,
};

pub const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn test_key() -> KeyWallet {
    KeyWallet::from_mnemonic(TEST_MNEMONIC, "", COREUM_HD_PATH, "testcore").unwrap()
}

/// Address every mock signer exposes
pub fn test_address() -> String {
    test_key().address.clone()
}

struct TransportState {
    balance: Option<String>,
    broadcast: std::result::Result<BroadcastResult, Error>,
    simulated_gas: u64,
    node_info_fails: bool,
    broadcasts: Vec<Vec<u8>>,
}

/// Chain node double
pub struct MockTransport {
    state: Mutex<TransportState>,
    calls: AtomicUsize,
    get_tx_calls: AtomicUsize,
    pending_polls: AtomicU32,
    failing_lookups: AtomicU32,
}

impl MockTransport {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TransportState {
                balance: Some("0".to_string()),
                broadcast: Ok(BroadcastResult {
                    code: 0,
                    transaction_hash: "ABC123".to_string(),
                    raw_log: String::new(),
                    height: 0,
                    gas_wanted: 200_000,
                    gas_used: 0,
                }),
                simulated_gas: 100_000,
                node_info_fails: false,
                broadcasts: Vec::new(),
            }),
            calls: AtomicUsize::new(0),
            get_tx_calls: AtomicUsize::new(0),
            pending_polls: AtomicU32::new(0),
            failing_lookups: AtomicU32::new(0),
        })
    }

    pub fn set_balance(&self, amount: &str) {
        self.state.lock().unwrap().balance = Some(amount.to_string());
    }

    /// Balance queries fail with a transport error
    pub fn fail_balance(&self) {
        self.state.lock().unwrap().balance = None;
    }

    pub fn set_broadcast_result(&self, code: u32, hash: &str, raw_log: &str) {
        self.state.lock().unwrap().broadcast = Ok(BroadcastResult {
            code,
            transaction_hash: hash.to_string(),
            raw_log: raw_log.to_string(),
            height: 0,
            gas_wanted: 200_000,
            gas_used: 0,
        });
    }

    pub fn set_broadcast_error(&self, err: Error) {
        self.state.lock().unwrap().broadcast = Err(err);
    }

    pub fn set_simulated_gas(&self, gas: u64) {
        self.state.lock().unwrap().simulated_gas = gas;
    }

    pub fn fail_node_info(&self) {
        self.state.lock().unwrap().node_info_fails = true;
    }

    /// Number of get_tx lookups that report the transaction as pending
    pub fn set_pending_polls(&self, polls: u32) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    /// Number of get_tx lookups that fail with a transport error
    pub fn fail_lookups(&self, lookups: u32) {
        self.failing_lookups.store(lookups, Ordering::SeqCst);
    }

    /// Every request that would have hit the network
    pub fn network_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get_tx_calls(&self) -> usize {
        self.get_tx_calls.load(Ordering::SeqCst)
    }

    pub fn broadcast_count(&self) -> usize {
        self.state.lock().unwrap().broadcasts.len()
    }

    /// Raw transaction bytes submitted so far
    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().broadcasts.clone()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainTransport for MockTransport {
    async fn node_info(&self) -> Result<NodeInfo> {
        self.hit();
        if self.state.lock().unwrap().node_info_fails {
            return Err(Error::transport("node info unavailable"));
        }
        Ok(NodeInfo {
            network: "coreum-testnet-1".to_string(),
            moniker: "mock".to_string(),
            app_version: "v4.0.0".to_string(),
        })
    }

    async fn account(&self, address: &str) -> Result<AccountInfo> {
        self.hit();
        Ok(AccountInfo {
            address: address.to_string(),
            sequence: 3,
            account_number: 17,
        })
    }

    async fn balance(&self, _address: &str, denom: &str) -> Result<Coin> {
        self.hit();
        match &self.state.lock().unwrap().balance {
            Some(amount) => Ok(Coin::new(denom, amount.clone())),
            None => Err(Error::transport("balance query failed: connection reset")),
        }
    }

    async fn simulate(&self, _tx_bytes: Vec<u8>) -> Result<GasEstimate> {
        self.hit();
        let gas = self.state.lock().unwrap().simulated_gas;
        Ok(GasEstimate {
            gas_used: gas,
            gas_wanted: gas,
        })
    }

    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
        self.hit();
        let mut state = self.state.lock().unwrap();
        state.broadcasts.push(tx_bytes);
        state.broadcast.clone()
    }

    async fn get_tx(&self, hash: &str) -> Result<Option<BroadcastResult>> {
        self.hit();
        self.get_tx_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_lookups.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_lookups.store(failing - 1, Ordering::SeqCst);
            return Err(Error::transport("lookup unavailable"));
        }
        let pending = self.pending_polls.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_polls.store(pending - 1, Ordering::SeqCst);
            return Ok(None);
        }

        let state = self.state.lock().unwrap();
        let mut delivered = state.broadcast.clone()?;
        delivered.transaction_hash = hash.to_string();
        delivered.height = 1234;
        delivered.gas_used = 95_000;
        Ok(Some(delivered))
    }
}

/// Hands out one shared MockTransport, or fails like a dead endpoint
pub struct MockFactory {
    transport: Option<Arc<MockTransport>>,
    opens: AtomicUsize,
}

impl MockFactory {
    pub fn new(transport: Arc<MockTransport>) -> Self {
        Self {
            transport: Some(transport),
            opens: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            transport: None,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportFactory for MockFactory {
    async fn open(
        &self,
        endpoint: &str,
        _options: &TransportOptions,
    ) -> Result<Arc<dyn ChainTransport>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match &self.transport {
            Some(transport) => Ok(transport.clone()),
            None => Err(Error::EndpointUnreachable {
                endpoint: endpoint.to_string(),
                cause: "connection refused".to_string(),
            }),
        }
    }
}

/// Signer over the test key, optionally empty or refusing to sign
pub struct MockSigner {
    inner: Option<LocalSigner>,
    reject: AtomicBool,
    sign_calls: AtomicUsize,
}

impl MockSigner {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self {
            inner: Some(LocalSigner::new(test_key(), Approval::Auto)),
            reject: AtomicBool::new(false),
            sign_calls: AtomicUsize::new(0),
        })
    }

    /// Signer exposing no accounts
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            inner: None,
            reject: AtomicBool::new(false),
            sign_calls: AtomicUsize::new(0),
        })
    }

    pub fn reject_signing(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OfflineSigner for MockSigner {
    async fn get_accounts(&self) -> Result<Vec<AccountData>> {
        match &self.inner {
            Some(signer) => signer.get_accounts().await,
            None => Ok(Vec::new()),
        }
    }

    async fn sign_direct(
        &self,
        signer_address: &str,
        sign_doc: SignDoc,
    ) -> Result<DirectSignResponse> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::UserRejected("signing declined".to_string()));
        }
        match &self.inner {
            Some(signer) => signer.sign_direct(signer_address, sign_doc).await,
            None => Err(Error::SignerInvalid("no keys".to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBehavior {
    Approve,
    Reject,
    Fail,
    NoAccounts,
}

/// Wallet provider double
pub struct MockProvider {
    behavior: Mutex<ProviderBehavior>,
    signer: Arc<MockSigner>,
    enable_calls: AtomicUsize,
}

impl MockProvider {
    pub fn arc(behavior: ProviderBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            signer: MockSigner::arc(),
            enable_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_behavior(&self, behavior: ProviderBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    /// The signer handed out on approval
    pub fn signer(&self) -> Arc<MockSigner> {
        self.signer.clone()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn enable(&self, chain_id: &str) -> Result<()> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        match *self.behavior.lock().unwrap() {
            ProviderBehavior::Reject => Err(Error::UserRejected(format!(
                "access to {} declined",
                chain_id
            ))),
            ProviderBehavior::Fail => Err(Error::ProviderError("extension crashed".to_string())),
            ProviderBehavior::Approve | ProviderBehavior::NoAccounts => Ok(()),
        }
    }

    fn offline_signer(&self, _chain_id: &str) -> Result<Signer> {
        match *self.behavior.lock().unwrap() {
            ProviderBehavior::NoAccounts => Ok(MockSigner::empty()),
            _ => Ok(self.signer.clone()),
        }
    }
}
