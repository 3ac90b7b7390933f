use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::chain::proto::Feature;
use crate::chain::{ClientOptions, Registry, TransportOptions};
use crate::pipeline::{FeeConfig, IssuanceMessage};
use crate::session::SessionSettings;
use crate::wallet::{Approval, COREUM_HD_PATH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub fee: FeeConfig,
    pub token: IssuanceMessage,
    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    /// Node gRPC endpoint (e.g., "https://full-node.testnet-1.coreum.dev:9090")
    pub rpc_endpoint: String,
    /// Denom every fee is paid in (e.g., "utestcore")
    pub fee_denom: String,
    pub address_prefix: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// 0 skips waiting for block inclusion
    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    // Note: the mnemonic comes from COREUM_MNEMONIC, never from this file
    pub hd_path: String,
    #[serde(default)]
    pub approval: Approval,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_confirm_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    1000
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            hd_path: COREUM_HD_PATH.to_string(),
            approval: Approval::Auto,
        }
    }
}

impl Default for Config {
    /// Template written by `init`; endpoint and fee denom must be filled in
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                chain_id: "coreum-testnet-1".to_string(),
                rpc_endpoint: String::new(),
                fee_denom: String::new(),
                address_prefix: "testcore".to_string(),
                connect_timeout_secs: default_connect_timeout(),
                request_timeout_secs: default_request_timeout(),
                confirm_timeout_secs: default_confirm_timeout(),
                poll_interval_ms: default_poll_interval(),
                memo: String::new(),
            },
            fee: FeeConfig::Fixed {
                amount: "5000".to_string(),
                gas_limit: 200_000,
            },
            token: IssuanceMessage {
                issuer: String::new(),
                symbol: "DEMOLOG".to_string(),
                subunit: "udemolog".to_string(),
                precision: 6,
                initial_amount: "5000000000".to_string(),
                description: "Minted via testnet log demo".to_string(),
                features: vec![Feature::Minting, Feature::Burning],
                burn_rate: "0.00".to_string(),
                send_commission_rate: "0.00".to_string(),
                uri: String::new(),
                uri_hash: String::new(),
            },
            wallet: WalletConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Refuse configurations that cannot drive a session
    pub fn validate(&self) -> Result<()> {
        let chain = &self.chain;
        if chain.chain_id.trim().is_empty() {
            bail!("chain.chain_id is empty");
        }
        if chain.rpc_endpoint.trim().is_empty() {
            bail!("chain.rpc_endpoint is empty: set it to the node gRPC endpoint");
        }
        if !chain.rpc_endpoint.starts_with("http://") && !chain.rpc_endpoint.starts_with("https://")
        {
            bail!(
                "chain.rpc_endpoint {} must start with http:// or https://",
                chain.rpc_endpoint
            );
        }
        if chain.fee_denom.trim().is_empty() {
            bail!("chain.fee_denom is empty: set it to the chain fee denom");
        }
        if chain.address_prefix.trim().is_empty() {
            bail!("chain.address_prefix is empty");
        }
        if chain.connect_timeout_secs == 0 || chain.request_timeout_secs == 0 {
            bail!("chain timeouts must be positive");
        }
        if chain.poll_interval_ms == 0 {
            bail!("chain.poll_interval_ms must be positive");
        }

        let fee = self
            .fee
            .to_setting(&chain.fee_denom)
            .map_err(|e| anyhow!("[fee] {}", e))?;
        if !fee.pays_in(&chain.fee_denom) {
            bail!("[fee] must be paid in {}", chain.fee_denom);
        }

        if !self.token.issuer.is_empty() {
            bail!("token.issuer must not be configured; it is always the connected account");
        }
        self.token
            .validate()
            .map_err(|e| anyhow!("[token] {}", e))?;

        if self.wallet.hd_path.trim().is_empty() {
            bail!("wallet.hd_path is empty");
        }
        Ok(())
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(self.chain.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.chain.request_timeout_secs),
        }
    }

    /// Validated settings for a session
    pub fn session_settings(&self) -> Result<SessionSettings> {
        self.validate()?;

        let confirm_timeout = match self.chain.confirm_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(SessionSettings {
            rpc_endpoint: self.chain.rpc_endpoint.clone(),
            fee_denom: self.chain.fee_denom.clone(),
            client: ClientOptions {
                chain_id: self.chain.chain_id.clone(),
                transport: self.transport_options(),
                confirm_timeout,
                poll_interval: Duration::from_millis(self.chain.poll_interval_ms),
                registry: Registry::with_asset_messages(),
            },
            fee: self.fee.to_setting(&self.chain.fee_denom)?,
            token: self.token.clone(),
            memo: self.chain.memo.clone(),
        })
    }
}
