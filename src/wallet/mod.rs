mod connector;
mod keys;
mod local;
mod signer;

pub use connector::{ConnectionState, WalletConnector};
pub use keys::{generate_mnemonic, KeyWallet, COREUM_HD_PATH};
pub use local::{Approval, LocalSigner, LocalWallet};
pub use signer::TransactionSigner;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::chain::proto::SignDoc;
use crate::error::Result;

/// The account a session is connected with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub address: String,
    pub chain_id: String,
}

/// An account as exposed by a signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub address: String,
    pub algo: String,
    /// Compressed secp256k1 public key
    pub pubkey: Vec<u8>,
}

/// A SignDoc together with the signature the wallet produced over it
#[derive(Debug, Clone)]
pub struct DirectSignResponse {
    pub signed: SignDoc,
    /// 64-byte compact secp256k1 signature
    pub signature: Vec<u8>,
}

/// Signing capability handed out by a wallet provider
///
/// Private keys never leave the implementation.
#[async_trait]
pub trait OfflineSigner: Send + Sync {
    async fn get_accounts(&self) -> Result<Vec<AccountData>>;

    /// Sign in SIGN_MODE_DIRECT; a declined request is `UserRejected`
    async fn sign_direct(&self, signer_address: &str, sign_doc: SignDoc)
        -> Result<DirectSignResponse>;
}

pub type Signer = Arc<dyn OfflineSigner>;

/// A wallet able to authorize a chain and hand out a signer for it
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Ask the wallet to authorize `chain_id`
    async fn enable(&self, chain_id: &str) -> Result<()>;

    fn offline_signer(&self, chain_id: &str) -> Result<Signer>;
}
