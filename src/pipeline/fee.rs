use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::message::dec_to_atomics;
use crate::chain::proto::Any;
use crate::chain::{Coin, Fee, SigningClient};
use crate::error::{Error, Result};

const ATOMICS_SCALE: u128 = 1_000_000_000_000_000_000;

/// Price of one unit of gas, e.g. "0.0625utestcore"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    /// Price × 10^18
    atomics: u128,
    pub denom: String,
}

impl GasPrice {
    pub fn new(amount: &str, denom: impl Into<String>) -> Result<Self> {
        let atomics = dec_to_atomics(amount)
            .map_err(|e| Error::Config(format!("invalid gas price: {}", e)))?;
        Ok(Self {
            atomics,
            denom: denom.into(),
        })
    }

    /// ceil(gas_limit × price)
    pub fn fee_amount(&self, gas_limit: u64) -> Result<u128> {
        let scaled = self
            .atomics
            .checked_mul(gas_limit as u128)
            .ok_or_else(|| Error::InvalidPayload("fee amount overflows".to_string()))?;
        Ok(scaled.div_ceil(ATOMICS_SCALE))
    }
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Find where the number ends and denom begins
        let split_pos = s
            .chars()
            .position(|c| c.is_alphabetic())
            .ok_or_else(|| Error::Config(format!("gas price {:?} has no denom", s)))?;
        let (amount, denom) = s.split_at(split_pos);
        Self::new(amount, denom)
    }
}

/// How a mint pays for itself
#[derive(Debug, Clone, PartialEq)]
pub enum FeeSetting {
    Fixed(Fee),
    /// Simulate, scale by `gas_adjustment`, price at `gas_price`
    Auto {
        gas_price: GasPrice,
        gas_adjustment: f64,
    },
}

impl FeeSetting {
    /// The concrete fee for `messages`; only `Auto` touches the network
    pub async fn resolve(
        &self,
        client: &SigningClient,
        signer_address: &str,
        messages: &[Any],
        memo: &str,
    ) -> Result<Fee> {
        match self {
            FeeSetting::Fixed(fee) => Ok(fee.clone()),
            FeeSetting::Auto {
                gas_price,
                gas_adjustment,
            } => {
                let estimate = client
                    .simulate(signer_address, messages.to_vec(), memo)
                    .await?;
                let gas_limit = adjusted_gas(estimate.gas_used, *gas_adjustment);
                let amount = gas_price.fee_amount(gas_limit)?;
                tracing::debug!(
                    gas_used = estimate.gas_used,
                    gas_limit,
                    amount = %amount,
                    "derived fee from simulation"
                );
                Ok(Fee {
                    amount: vec![Coin::new(gas_price.denom.clone(), amount.to_string())],
                    gas_limit,
                })
            }
        }
    }

    /// True when every coin of the fee is in `denom`
    pub fn pays_in(&self, denom: &str) -> bool {
        match self {
            FeeSetting::Fixed(fee) => fee.pays_in(denom),
            FeeSetting::Auto { gas_price, .. } => gas_price.denom == denom,
        }
    }
}

/// ceil(gas_used × adjustment)
pub fn adjusted_gas(gas_used: u64, adjustment: f64) -> u64 {
    (gas_used as f64 * adjustment).ceil() as u64
}

/// Serialized form used in config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeeConfig {
    Fixed { amount: String, gas_limit: u64 },
    Auto { gas_price: String, gas_adjustment: f64 },
}

impl FeeConfig {
    pub fn to_setting(&self, fee_denom: &str) -> Result<FeeSetting> {
        match self {
            FeeConfig::Fixed { amount, gas_limit } => {
                if *gas_limit == 0 {
                    return Err(Error::Config("fee gas_limit must be positive".to_string()));
                }
                if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::Config(format!(
                        "fee amount {:?} is not an integer",
                        amount
                    )));
                }
                Ok(FeeSetting::Fixed(Fee::single(fee_denom, amount.clone(), *gas_limit)))
            }
            FeeConfig::Auto {
                gas_price,
                gas_adjustment,
            } => {
                if !gas_adjustment.is_finite() || *gas_adjustment < 1.0 {
                    return Err(Error::Config(format!(
                        "gas_adjustment {} must be at least 1.0",
                        gas_adjustment
                    )));
                }
                Ok(FeeSetting::Auto {
                    gas_price: GasPrice::new(gas_price, fee_denom)?,
                    gas_adjustment: *gas_adjustment,
                })
            }
        }
    }
}
