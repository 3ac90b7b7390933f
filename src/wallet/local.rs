//! Mnemonic-backed wallet provider for terminal sessions

use async_trait::async_trait;
use prost::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::keys::KeyWallet;
use super::signer::TransactionSigner;
use super::{AccountData, DirectSignResponse, OfflineSigner, Signer, WalletProvider};
use crate::chain::proto::SignDoc;
use crate::error::{Error, Result};

/// How the local wallet asks for consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approval {
    /// Approve every request
    #[default]
    Auto,
    /// Ask on the terminal before enabling a chain and before each signature
    Prompt,
}

impl Approval {
    async fn confirm(&self, prompt: String) -> Result<bool> {
        match self {
            Approval::Auto => Ok(true),
            Approval::Prompt => tokio::task::spawn_blocking(move || {
                dialoguer::Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
            })
            .await
            .map_err(|e| Error::ProviderError(format!("approval prompt failed: {}", e)))?
            .map_err(|e| Error::ProviderError(format!("approval prompt failed: {}", e))),
        }
    }
}

/// Signer over a single local key
pub struct LocalSigner {
    wallet: KeyWallet,
    signer: TransactionSigner,
    approval: Approval,
}

impl LocalSigner {
    pub fn new(wallet: KeyWallet, approval: Approval) -> Self {
        Self {
            wallet,
            signer: TransactionSigner::new(),
            approval,
        }
    }

    pub fn address(&self) -> &str {
        &self.wallet.address
    }
}

#[async_trait]
impl OfflineSigner for LocalSigner {
    async fn get_accounts(&self) -> Result<Vec<AccountData>> {
        Ok(vec![AccountData {
            address: self.wallet.address.clone(),
            algo: "secp256k1".to_string(),
            pubkey: self.wallet.public_key_compressed().to_vec(),
        }])
    }

    async fn sign_direct(
        &self,
        signer_address: &str,
        sign_doc: SignDoc,
    ) -> Result<DirectSignResponse> {
        if signer_address != self.wallet.address {
            return Err(Error::SignerInvalid(format!(
                "no key for {} in this wallet",
                signer_address
            )));
        }

        let approved = self
            .approval
            .confirm(format!(
                "Sign transaction on {} (account #{}) as {}?",
                sign_doc.chain_id, sign_doc.account_number, signer_address
            ))
            .await?;
        if !approved {
            return Err(Error::UserRejected("signing declined".to_string()));
        }

        let private_key = self
            .wallet
            .private_key()
            .map_err(|e| Error::SignerInvalid(e.to_string()))?;
        let signature = self
            .signer
            .sign_direct(&sign_doc.encode_to_vec(), &private_key)
            .map_err(|e| Error::ProviderError(format!("signing failed: {}", e)))?;

        Ok(DirectSignResponse {
            signed: sign_doc,
            signature,
        })
    }
}

/// Wallet provider holding one local key
pub struct LocalWallet {
    signer: Arc<LocalSigner>,
    approval: Approval,
}

impl LocalWallet {
    pub fn new(wallet: KeyWallet, approval: Approval) -> Self {
        Self {
            signer: Arc::new(LocalSigner::new(wallet, approval)),
            approval,
        }
    }

    pub fn address(&self) -> &str {
        self.signer.address()
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn name(&self) -> &str {
        "local-mnemonic"
    }

    async fn enable(&self, chain_id: &str) -> Result<()> {
        let approved = self
            .approval
            .confirm(format!(
                "Allow this session to use {} on {}?",
                self.signer.address(),
                chain_id
            ))
            .await?;
        if approved {
            Ok(())
        } else {
            Err(Error::UserRejected(format!("access to {} declined", chain_id)))
        }
    }

    fn offline_signer(&self, _chain_id: &str) -> Result<Signer> {
        Ok(self.signer.clone())
    }
}
