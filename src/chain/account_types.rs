//! Account types returned by the auth module, wrapped in google.protobuf.Any
//!
//! Only the account number and sequence are needed to sign, so every
//! variant is reduced to `AccountInfo`.

use prost::Message;

use cosmos_sdk_proto::cosmos::auth::v1beta1::BaseAccount;
use cosmos_sdk_proto::cosmos::vesting::v1beta1::{
    ContinuousVestingAccount, DelayedVestingAccount, PeriodicVestingAccount,
    PermanentLockedAccount,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub enum ChainAccount {
    Base(BaseAccount),
    ContinuousVesting(ContinuousVestingAccount),
    DelayedVesting(DelayedVestingAccount),
    PeriodicVesting(PeriodicVestingAccount),
    PermanentLocked(PermanentLockedAccount),
    Unsupported { type_url: String },
}

/// Signing information of an account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub sequence: u64,
    pub account_number: u64,
}

impl AccountInfo {
    /// Info for an account the chain has not seen yet
    pub fn fresh(address: &str) -> Self {
        Self {
            address: address.to_string(),
            ..Default::default()
        }
    }
}

fn decode<M: Message + Default>(name: &str, value: &[u8]) -> Result<M> {
    M::decode(value).map_err(|e| Error::transport(format!("failed to decode {}: {}", name, e)))
}

impl ChainAccount {
    pub fn decode_any(type_url: &str, value: &[u8]) -> Result<Self> {
        let account = match type_url {
            "/cosmos.auth.v1beta1.BaseAccount" => {
                ChainAccount::Base(decode("BaseAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.ContinuousVestingAccount" => {
                ChainAccount::ContinuousVesting(decode("ContinuousVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.DelayedVestingAccount" => {
                ChainAccount::DelayedVesting(decode("DelayedVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.PeriodicVestingAccount" => {
                ChainAccount::PeriodicVesting(decode("PeriodicVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.PermanentLockedAccount" => {
                ChainAccount::PermanentLocked(decode("PermanentLockedAccount", value)?)
            }
            other => {
                log::warn!("Encountered unsupported account type: {}", other);
                ChainAccount::Unsupported {
                    type_url: other.to_string(),
                }
            }
        };
        Ok(account)
    }

    /// None if the variant carries no BaseAccount
    pub fn account_info(&self) -> Option<AccountInfo> {
        let base = match self {
            ChainAccount::Base(acc) => Some(acc),
            ChainAccount::ContinuousVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            ChainAccount::DelayedVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            ChainAccount::PeriodicVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            ChainAccount::PermanentLocked(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            ChainAccount::Unsupported { .. } => None,
        }?;

        Some(AccountInfo {
            address: base.address.clone(),
            sequence: base.sequence,
            account_number: base.account_number,
        })
    }

    pub fn account_type(&self) -> &'static str {
        match self {
            ChainAccount::Base(_) => "BaseAccount",
            ChainAccount::ContinuousVesting(_) => "ContinuousVestingAccount",
            ChainAccount::DelayedVesting(_) => "DelayedVestingAccount",
            ChainAccount::PeriodicVesting(_) => "PeriodicVestingAccount",
            ChainAccount::PermanentLocked(_) => "PermanentLockedAccount",
            ChainAccount::Unsupported { .. } => "UnsupportedAccount",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmos_sdk_proto::cosmos::vesting::v1beta1::BaseVestingAccount;

    fn base(address: &str, sequence: u64, account_number: u64) -> BaseAccount {
        BaseAccount {
            address: address.to_string(),
            pub_key: None,
            account_number,
            sequence,
        }
    }

    #[test]
    fn test_base_account_decoding() {
        let bytes = base("testcore1abc", 5, 12345).encode_to_vec();
        let account = ChainAccount::decode_any("/cosmos.auth.v1beta1.BaseAccount", &bytes).unwrap();
        assert_eq!(account.account_type(), "BaseAccount");

        let info = account.account_info().unwrap();
        assert_eq!(info.address, "testcore1abc");
        assert_eq!(info.sequence, 5);
        assert_eq!(info.account_number, 12345);
    }

    #[test]
    fn test_vesting_account_unwraps_base() {
        let account = ChainAccount::DelayedVesting(DelayedVestingAccount {
            base_vesting_account: Some(BaseVestingAccount {
                base_account: Some(base("testcore1vest", 2, 7)),
                ..Default::default()
            }),
        });
        let info = account.account_info().unwrap();
        assert_eq!(info.sequence, 2);
        assert_eq!(info.account_number, 7);
    }

    #[test]
    fn test_unsupported_account() {
        let account = ChainAccount::decode_any("/unknown.Account", &[1, 2, 3]).unwrap();
        assert!(account.account_info().is_none());
        assert_eq!(account.account_type(), "UnsupportedAccount");
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let err = ChainAccount::decode_any("/cosmos.auth.v1beta1.BaseAccount", &[0xff, 0xff, 0xff]);
        assert!(err.is_err());
    }
}
