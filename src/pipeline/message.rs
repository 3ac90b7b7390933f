use serde::{Deserialize, Serialize};

use crate::chain::proto::{Feature, MsgIssue};
use crate::error::{Error, Result};
use crate::wallet::Account;

/// sdk.Dec fixed-point scale
const DEC_PRECISION: usize = 18;
const MAX_PRECISION: u32 = 18;

/// Fungible token issuance request
///
/// Templates come from configuration with `issuer` left empty; the issuer is
/// always overwritten with the connected account before sending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issuer: String,
    pub symbol: String,
    pub subunit: String,
    pub precision: u32,
    /// Positive integer in subunits
    pub initial_amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Decimal in [0, 1]
    #[serde(default = "zero_rate")]
    pub burn_rate: String,
    /// Decimal in [0, 1]
    #[serde(default = "zero_rate")]
    pub send_commission_rate: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri_hash: String,
}

fn zero_rate() -> String {
    "0.00".to_string()
}

impl IssuanceMessage {
    /// Copy of the template issued by `account`
    pub fn for_issuer(&self, account: &Account) -> Self {
        Self {
            issuer: account.address.clone(),
            ..self.clone()
        }
    }

    /// Local checks of every field the chain would otherwise reject
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::InvalidPayload("symbol is empty".to_string()));
        }
        if self.subunit.trim().is_empty() {
            return Err(Error::InvalidPayload("subunit is empty".to_string()));
        }
        if self.precision > MAX_PRECISION {
            return Err(Error::InvalidPayload(format!(
                "precision {} exceeds {}",
                self.precision, MAX_PRECISION
            )));
        }
        if self.initial_amount.is_empty()
            || !self.initial_amount.bytes().all(|b| b.is_ascii_digit())
            || self.initial_amount.bytes().all(|b| b == b'0')
        {
            return Err(Error::InvalidPayload(format!(
                "initial amount {:?} is not a positive integer",
                self.initial_amount
            )));
        }
        rate_to_atomics("burn rate", &self.burn_rate)?;
        rate_to_atomics("send commission rate", &self.send_commission_rate)?;
        Ok(())
    }

    /// Wire form of the message
    pub fn to_proto(&self) -> Result<MsgIssue> {
        self.validate()?;
        Ok(MsgIssue {
            issuer: self.issuer.clone(),
            symbol: self.symbol.clone(),
            subunit: self.subunit.clone(),
            precision: self.precision,
            initial_amount: self.initial_amount.clone(),
            description: self.description.clone(),
            features: self.features.iter().map(|f| *f as i32).collect(),
            burn_rate: rate_to_atomics("burn rate", &self.burn_rate)?,
            send_commission_rate: rate_to_atomics(
                "send commission rate",
                &self.send_commission_rate,
            )?,
            uri: self.uri.clone(),
            uri_hash: self.uri_hash.clone(),
        })
    }
}

fn rate_to_atomics(field: &str, value: &str) -> Result<String> {
    let atomics = dec_to_atomics(value)
        .map_err(|e| Error::InvalidPayload(format!("{}: {}", field, e)))?;
    if atomics > 10u128.pow(DEC_PRECISION as u32) {
        return Err(Error::InvalidPayload(format!(
            "{} {} is above 1.00",
            field, value
        )));
    }
    Ok(atomics.to_string())
}

/// Parse a non-negative decimal into sdk.Dec atomics (value × 10^18)
pub(crate) fn dec_to_atomics(value: &str) -> std::result::Result<u128, String> {
    let value = value.trim();
    let (int_part, frac_part) = value.split_once('.').unwrap_or((value, ""));

    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !digits_only(int_part)
        || !digits_only(frac_part)
    {
        return Err(format!("{:?} is not a decimal number", value));
    }
    if frac_part.len() > DEC_PRECISION {
        return Err(format!(
            "{:?} has more than {} decimal places",
            value, DEC_PRECISION
        ));
    }

    let scale = 10u128.pow(DEC_PRECISION as u32);
    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| format!("{:?} is out of range", value))?
    };
    let frac: u128 = if frac_part.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac_part, width = DEC_PRECISION)
            .parse()
            .map_err(|_| format!("{:?} is out of range", value))?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| format!("{:?} is out of range", value))
}
