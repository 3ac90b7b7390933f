use std::sync::Arc;

use super::{Account, Signer, WalletProvider};
use crate::error::{Error, Result};
use crate::log_sink::LogSink;

/// Lifecycle of the wallet connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Last connect attempt failed with this error
    Error(Error),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

struct ActiveWallet {
    account: Account,
    signer: Signer,
}

/// Connects to a wallet provider and owns the resulting account and signer
///
/// Every state transition appends exactly one entry to the log.
pub struct WalletConnector {
    chain_id: String,
    provider: Option<Arc<dyn WalletProvider>>,
    log: LogSink,
    state: ConnectionState,
    active: Option<ActiveWallet>,
}

impl WalletConnector {
    /// `provider` is None when no wallet is installed
    pub fn new(
        chain_id: impl Into<String>,
        provider: Option<Arc<dyn WalletProvider>>,
        log: LogSink,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            provider,
            log,
            state: ConnectionState::Disconnected,
            active: None,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The connected account, if any
    pub fn account(&self) -> Option<&Account> {
        self.active.as_ref().map(|a| &a.account)
    }

    /// Authorize the chain with the provider and acquire its signer
    ///
    /// Failures leave the connector in `Error` with the cause logged; the
    /// error is also returned. Calling this while connected returns the
    /// current account without touching the provider.
    pub async fn connect(&mut self) -> Result<Account> {
        if let (ConnectionState::Connected, Some(active)) = (&self.state, &self.active) {
            return Ok(active.account.clone());
        }

        self.transition(
            ConnectionState::Connecting,
            format!("Connecting to wallet for {}...", self.chain_id),
        );

        match self.acquire().await {
            Ok(active) => {
                let account = active.account.clone();
                self.active = Some(active);
                self.transition(
                    ConnectionState::Connected,
                    format!("Connected: {}", account.address),
                );
                Ok(account)
            }
            Err(e) => {
                self.active = None;
                self.transition(
                    ConnectionState::Error(e.clone()),
                    format!("Connection failed [{}]: {}", e.kind(), e),
                );
                Err(e)
            }
        }
    }

    async fn acquire(&self) -> Result<ActiveWallet> {
        let provider = self.provider.as_ref().ok_or(Error::ProviderAbsent)?;
        tracing::debug!(provider = provider.name(), chain_id = %self.chain_id, "enabling wallet");

        provider.enable(&self.chain_id).await.map_err(classify)?;
        let signer = provider.offline_signer(&self.chain_id).map_err(classify)?;
        let accounts = signer.get_accounts().await.map_err(classify)?;

        let first = accounts
            .into_iter()
            .find(|a| !a.address.is_empty())
            .ok_or_else(|| Error::ProviderError("wallet exposed no accounts".to_string()))?;

        Ok(ActiveWallet {
            account: Account {
                address: first.address,
                chain_id: self.chain_id.clone(),
            },
            signer,
        })
    }

    /// Drop the account and signer; a no-op when already disconnected
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        let message = match self.active.take() {
            Some(active) => format!("Disconnected: {}", active.account.address),
            None => "Wallet disconnected".to_string(),
        };
        self.transition(ConnectionState::Disconnected, message);
    }

    /// The signer of the active connection
    pub fn signer(&self) -> Result<Signer> {
        match (&self.state, &self.active) {
            (ConnectionState::Connected, Some(active)) => Ok(active.signer.clone()),
            _ => Err(Error::NotConnected),
        }
    }

    fn transition(&mut self, state: ConnectionState, message: String) {
        tracing::debug!(from = ?self.state, to = ?state, "wallet state transition");
        self.state = state;
        self.log.append(message);
    }
}

/// Keep the provider-facing kinds, fold everything else into ProviderError
fn classify(err: Error) -> Error {
    match err {
        Error::ProviderAbsent | Error::UserRejected(_) | Error::ProviderError(_) => err,
        other => Error::ProviderError(other.to_string()),
    }
}
