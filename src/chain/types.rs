use serde::{Deserialize, Serialize};

use crate::chain::proto;

/// An amount of a single denom, amount kept as the on-chain integer string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl From<Coin> for proto::Coin {
    fn from(coin: Coin) -> Self {
        proto::Coin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

impl From<proto::Coin> for Coin {
    fn from(coin: proto::Coin) -> Self {
        Coin {
            denom: coin.denom,
            amount: coin.amount,
        }
    }
}

/// Fee offered for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
}

impl Fee {
    /// Fee paid in a single denom
    pub fn single(denom: impl Into<String>, amount: impl Into<String>, gas_limit: u64) -> Self {
        Self {
            amount: vec![Coin::new(denom, amount)],
            gas_limit,
        }
    }

    /// True if every coin of the fee is in `denom`
    pub fn pays_in(&self, denom: &str) -> bool {
        !self.amount.is_empty() && self.amount.iter().all(|c| c.denom == denom)
    }

    pub(crate) fn to_proto(&self) -> proto::Fee {
        proto::Fee {
            amount: self.amount.iter().cloned().map(Into::into).collect(),
            gas_limit: self.gas_limit,
            payer: String::new(),
            granter: String::new(),
        }
    }
}

/// Terminal outcome of one broadcast as reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// 0 on success, chain error code otherwise
    pub code: u32,
    pub transaction_hash: String,
    pub raw_log: String,
    /// Block height, 0 until included
    pub height: i64,
    pub gas_wanted: i64,
    pub gas_used: i64,
}

impl BroadcastResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl From<proto::TxResponse> for BroadcastResult {
    fn from(response: proto::TxResponse) -> Self {
        BroadcastResult {
            code: response.code,
            transaction_hash: response.txhash,
            raw_log: response.raw_log,
            height: response.height,
            gas_wanted: response.gas_wanted,
            gas_used: response.gas_used,
        }
    }
}

/// Node information used to verify the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub network: String,
    pub moniker: String,
    pub app_version: String,
}

/// Response from transaction simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas_used: u64,
    pub gas_wanted: u64,
}
