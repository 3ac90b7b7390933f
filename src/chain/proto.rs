//! Proto definitions for Coreum/Cosmos chain integration
//! Cosmos SDK types come from cosmos-sdk-proto; the Coreum asset messages
//! are declared here since no published crate carries them

use serde::{Deserialize, Serialize};

pub use prost_types::Any;
pub use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
pub use cosmos_sdk_proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, BroadcastMode, BroadcastTxRequest, Fee, GetTxRequest, ModeInfo,
    SignDoc, SignerInfo, SimulateRequest, TxBody, TxRaw,
    service_client::ServiceClient,
};
pub use cosmos_sdk_proto::cosmos::base::abci::v1beta1::TxResponse;
pub use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
pub use cosmos_sdk_proto::cosmos::auth::v1beta1::{
    BaseAccount, QueryAccountRequest, query_client::QueryClient as AuthQueryClient,
};
pub use cosmos_sdk_proto::cosmos::bank::v1beta1::{
    QueryBalanceRequest, query_client::QueryClient as BankQueryClient,
};
pub use cosmos_sdk_proto::cosmos::base::tendermint::v1beta1::{
    GetNodeInfoRequest, service_client::ServiceClient as TendermintServiceClient,
};
pub use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey as Secp256k1PubKey;

/// Type URL of the secp256k1 public key carried in SignerInfo
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

/// Type URL the chain registers `MsgIssue` under
pub const MSG_ISSUE_TYPE_URL: &str = "/coreum.asset.ft.v1.MsgIssue";

/// coreum.asset.ft.v1.MsgIssue
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgIssue {
    #[prost(string, tag = "1")]
    pub issuer: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub symbol: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub subunit: ::prost::alloc::string::String,
    #[prost(uint32, tag = "4")]
    pub precision: u32,
    /// sdk.Int, decimal string
    #[prost(string, tag = "5")]
    pub initial_amount: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub description: ::prost::alloc::string::String,
    #[prost(enumeration = "Feature", repeated, tag = "7")]
    pub features: ::prost::alloc::vec::Vec<i32>,
    /// sdk.Dec, 18-decimal atomics string
    #[prost(string, tag = "8")]
    pub burn_rate: ::prost::alloc::string::String,
    /// sdk.Dec, 18-decimal atomics string
    #[prost(string, tag = "9")]
    pub send_commission_rate: ::prost::alloc::string::String,
    #[prost(string, tag = "10")]
    pub uri: ::prost::alloc::string::String,
    #[prost(string, tag = "11")]
    pub uri_hash: ::prost::alloc::string::String,
}

/// coreum.asset.ft.v1.Feature
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Feature {
    Minting = 0,
    Burning = 1,
    Freezing = 2,
    Whitelisting = 3,
    Ibc = 4,
    BlockSmartContracts = 5,
    Clawback = 6,
    Extension = 7,
    DexBlock = 8,
    DexWhitelistedDenoms = 9,
    DexOrderCancellation = 10,
    DexUnifiedRefAmountChange = 11,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Minting => "minting",
            Feature::Burning => "burning",
            Feature::Freezing => "freezing",
            Feature::Whitelisting => "whitelisting",
            Feature::Ibc => "ibc",
            Feature::BlockSmartContracts => "block_smart_contracts",
            Feature::Clawback => "clawback",
            Feature::Extension => "extension",
            Feature::DexBlock => "dex_block",
            Feature::DexWhitelistedDenoms => "dex_whitelisted_denoms",
            Feature::DexOrderCancellation => "dex_order_cancellation",
            Feature::DexUnifiedRefAmountChange => "dex_unified_ref_amount_change",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
