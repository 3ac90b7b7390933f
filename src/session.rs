//! One console session: wallet connection, signing client, balance and mints

use std::future::Future;
use std::sync::Arc;

use crate::balance::{fetch_balance, Balance};
use crate::chain::{create_client, BroadcastResult, ClientOptions, SigningClient, TransportFactory};
use crate::error::Error;
use crate::log_sink::LogSink;
use crate::pipeline::{FeeSetting, IssuanceMessage, MintPipeline, PipelineState};
use crate::wallet::{Account, ConnectionState, WalletConnector, WalletProvider};

/// Everything a session needs to know about the chain and the token
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub rpc_endpoint: String,
    pub fee_denom: String,
    pub client: ClientOptions,
    pub fee: FeeSetting,
    pub token: IssuanceMessage,
    pub memo: String,
}

impl SessionSettings {
    pub fn chain_id(&self) -> &str {
        &self.client.chain_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    ViewBalance,
    Mint,
    Disconnect,
    Log,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Connected(Account),
    Balance(Balance),
    Minted(BroadcastResult),
    Disconnected,
    Log(String),
    /// The failure has already been logged
    Failed(Error),
}

impl CommandOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CommandOutcome::Failed(_))
    }
}

/// Last known balance as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BalanceDisplay {
    #[default]
    Unknown,
    Loaded(Balance),
    Unavailable,
}

impl std::fmt::Display for BalanceDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceDisplay::Unknown => f.write_str("-"),
            BalanceDisplay::Loaded(balance) => write!(f, "{} {}", balance.display, balance.denom),
            BalanceDisplay::Unavailable => f.write_str("unavailable"),
        }
    }
}

pub struct Session {
    settings: SessionSettings,
    log: LogSink,
    connector: WalletConnector,
    transports: Arc<dyn TransportFactory>,
    client: Option<SigningClient>,
    balance: BalanceDisplay,
    pipeline: MintPipeline,
}

impl Session {
    /// `provider` is None when no wallet is available
    pub fn new(
        settings: SessionSettings,
        provider: Option<Arc<dyn WalletProvider>>,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        let log = LogSink::new();
        let connector = WalletConnector::new(settings.chain_id(), provider, log.clone());
        let pipeline = MintPipeline::new(log.clone()).with_memo(settings.memo.clone());
        Self {
            settings,
            log,
            connector,
            transports,
            client: None,
            balance: BalanceDisplay::Unknown,
            pipeline,
        }
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn connection_state(&self) -> &ConnectionState {
        self.connector.state()
    }

    pub fn account(&self) -> Option<&Account> {
        self.connector.account()
    }

    pub fn balance(&self) -> &BalanceDisplay {
        &self.balance
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline.state()
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some() && self.connector.state().is_connected()
    }

    /// Run one command; failures come back as `Failed` after being logged
    pub async fn dispatch(&mut self, command: Command) -> CommandOutcome {
        tracing::debug!(?command, "dispatching command");
        match command {
            Command::Connect => self.connect().await,
            Command::ViewBalance => self.view_balance().await,
            Command::Mint => self.begin_mint().await,
            Command::Disconnect => self.disconnect(),
            Command::Log => CommandOutcome::Log(self.log.render()),
        }
    }

    async fn connect(&mut self) -> CommandOutcome {
        let account = match self.connector.connect().await {
            Ok(account) => account,
            Err(e) => return CommandOutcome::Failed(e),
        };
        if self.client.is_some() {
            return CommandOutcome::Connected(account);
        }

        let signer = match self.connector.signer() {
            Ok(signer) => signer,
            Err(e) => return self.fail("Client setup failed", e),
        };
        match create_client(
            self.transports.as_ref(),
            &self.settings.rpc_endpoint,
            signer,
            self.settings.client.clone(),
        )
        .await
        {
            Ok(client) => {
                self.log
                    .append(format!("Signing client ready at {}", client.endpoint()));
                self.client = Some(client);
            }
            Err(e) => return self.fail("Client setup failed", e),
        }

        // The balance is shown right after connecting; its failure does not
        // undo the connection
        let _ = self.view_balance().await;
        CommandOutcome::Connected(account)
    }

    async fn view_balance(&mut self) -> CommandOutcome {
        let (client, address) = match (&self.client, self.connector.account()) {
            (Some(client), Some(account)) => (client, account.address.clone()),
            _ => return self.fail("Balance unavailable", Error::NotConnected),
        };

        match fetch_balance(client, &address, &self.settings.fee_denom).await {
            Ok(balance) => {
                self.log.append(format!(
                    "Balance: {} {} ({} base units)",
                    balance.display, balance.denom, balance.amount
                ));
                self.balance = BalanceDisplay::Loaded(balance.clone());
                CommandOutcome::Balance(balance)
            }
            Err(e) => {
                self.balance = BalanceDisplay::Unavailable;
                self.fail("Balance query failed", e)
            }
        }
    }

    /// Start a mint that no longer borrows the session
    ///
    /// Client and account are captured now, so a disconnect while the
    /// broadcast is outstanding leaves the result logged against the
    /// account the mint started with.
    pub fn begin_mint(&self) -> impl Future<Output = CommandOutcome> + Send + 'static {
        let pipeline = self.pipeline.clone();
        let account = self.connector.account().cloned();
        let client = self.client.clone();
        let token = self.settings.token.clone();
        let fee = self.settings.fee.clone();

        async move {
            match pipeline
                .mint(client.as_ref(), account.as_ref(), &token, &fee)
                .await
            {
                Ok(result) => CommandOutcome::Minted(result),
                Err(e) => CommandOutcome::Failed(e),
            }
        }
    }

    fn disconnect(&mut self) -> CommandOutcome {
        self.client = None;
        self.balance = BalanceDisplay::Unknown;
        self.connector.disconnect();
        CommandOutcome::Disconnected
    }

    fn fail(&self, context: &str, e: Error) -> CommandOutcome {
        self.log
            .append(format!("{} [{}]: {}", context, e.kind(), e));
        CommandOutcome::Failed(e)
    }
}
