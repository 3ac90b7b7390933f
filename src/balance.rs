//! Spendable balance lookup and display formatting

use serde::Serialize;

use crate::chain::SigningClient;
use crate::error::{Error, Result};

/// Decimal places between base units and display units
const DISPLAY_DECIMALS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub denom: String,
    /// On-chain integer amount, unchanged
    pub amount: String,
    /// amount / 1,000,000 with exactly six decimals
    pub display: String,
}

/// Query the spendable balance of `address` in `denom`
///
/// Any transport or decode failure is reported as `QueryError`.
pub async fn fetch_balance(client: &SigningClient, address: &str, denom: &str) -> Result<Balance> {
    let coin = client
        .get_balance(address, denom)
        .await
        .map_err(|e| Error::QueryError(e.to_string()))?;

    let display = format_display(&coin.amount).ok_or_else(|| {
        Error::QueryError(format!("balance amount {:?} is not an integer", coin.amount))
    })?;

    Ok(Balance {
        denom: coin.denom,
        display,
        amount: coin.amount,
    })
}

/// Format a base-unit integer string as whole units with six decimals
///
/// Works on the digits directly, so amounts of any size are exact.
/// Returns None unless `base_units` is a non-negative integer.
pub fn format_display(base_units: &str) -> Option<String> {
    let digits = base_units.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    let padded = format!("{:0>width$}", significant, width = DISPLAY_DECIMALS + 1);
    let (whole, fraction) = padded.split_at(padded.len() - DISPLAY_DECIMALS);
    Some(format!("{}.{}", whole, fraction))
}
