use std::sync::{Arc, Mutex};

use crate::chain::{BroadcastResult, SigningClient};
use crate::error::{Error, Result};
use crate::log_sink::LogSink;
use crate::wallet::Account;

use super::fee::FeeSetting;
use super::message::IssuanceMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Broadcasting,
}

/// Builds, signs and broadcasts one issuance per call
///
/// Clones share the log and the state, so a mint can run apart from the
/// session that started it.
#[derive(Clone)]
pub struct MintPipeline {
    log: LogSink,
    state: Arc<Mutex<PipelineState>>,
    memo: String,
}

impl MintPipeline {
    pub fn new(log: LogSink) -> Self {
        Self {
            log,
            state: Arc::new(Mutex::new(PipelineState::Idle)),
            memo: String::new(),
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: PipelineState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// Issue `template` as `account`
    ///
    /// Every outcome appends exactly one log entry, naming `account` as it
    /// was passed in. Nothing is retried and the pipeline is Idle again
    /// when this returns.
    pub async fn mint(
        &self,
        client: Option<&SigningClient>,
        account: Option<&Account>,
        template: &IssuanceMessage,
        fee: &FeeSetting,
    ) -> Result<BroadcastResult> {
        let result = self.run(client, account, template, fee).await;
        self.set_state(PipelineState::Idle);

        match &result {
            Ok(delivered) => {
                self.log.append(format!(
                    "Mint succeeded: {} issued by {} in tx {}",
                    template.symbol,
                    account.map(|a| a.address.as_str()).unwrap_or_default(),
                    delivered.transaction_hash
                ));
            }
            Err(Error::OnChainRejection { code, raw_log }) => {
                self.log
                    .append(format!("Broadcast failed (code {}): {}", code, raw_log));
            }
            Err(e) => {
                self.log.append(format!("Mint failed [{}]: {}", e.kind(), e));
            }
        }
        result
    }

    async fn run(
        &self,
        client: Option<&SigningClient>,
        account: Option<&Account>,
        template: &IssuanceMessage,
        fee: &FeeSetting,
    ) -> Result<BroadcastResult> {
        let account = account.ok_or(Error::NoActiveAccount)?;
        let client = client.ok_or(Error::NotConnected)?;

        // 1. Construct
        let message = template.for_issuer(account);
        let msg_any = client.encode(&message.to_proto()?)?;

        // 2. Sign and broadcast
        self.set_state(PipelineState::Broadcasting);
        tracing::info!(
            symbol = %message.symbol,
            issuer = %message.issuer,
            endpoint = client.endpoint(),
            "broadcasting issuance"
        );
        let messages = vec![msg_any];
        let broadcast = async {
            let fee = fee
                .resolve(client, &account.address, &messages, &self.memo)
                .await?;
            client
                .sign_and_broadcast(&account.address, messages, &fee, &self.memo)
                .await
        };
        let result = broadcast.await.map_err(|e| match e {
            Error::SchemaNotRegistered(_) | Error::InvalidPayload(_) => e,
            Error::TransportFailure { .. } => e,
            other => Error::transport(other),
        })?;

        // 3. Interpret
        if result.is_success() {
            Ok(result)
        } else {
            Err(Error::OnChainRejection {
                code: result.code,
                raw_log: result.raw_log,
            })
        }
    }
}
