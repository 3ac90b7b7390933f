//! Transaction builder for Cosmos SDK SIGN_MODE_DIRECT transactions
//!
//! Signing itself happens in the wallet: the builder produces the SignDoc
//! and assembles the broadcast bytes from whatever the wallet signed.

use prost::Message;

use crate::chain::proto::{
    mode_info, Any, AuthInfo, ModeInfo, Secp256k1PubKey, SignDoc, SignMode, SignerInfo, TxBody,
    TxRaw, SECP256K1_PUBKEY_TYPE_URL,
};
use crate::chain::types::Fee;

pub struct TxBuilder<'a> {
    chain_id: &'a str,
    account_number: u64,
    sequence: u64,
    /// Compressed secp256k1 public key of the signer
    public_key: &'a [u8],
    memo: String,
}

impl<'a> TxBuilder<'a> {
    pub fn new(chain_id: &'a str, account_number: u64, sequence: u64, public_key: &'a [u8]) -> Self {
        Self {
            chain_id,
            account_number,
            sequence,
            public_key,
            memo: String::new(),
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Build the SignDoc for `messages` paying `fee`
    pub fn sign_doc(&self, messages: Vec<Any>, fee: &Fee) -> SignDoc {
        // 1. Body with the messages
        let tx_body = TxBody {
            messages,
            memo: self.memo.clone(),
            timeout_height: 0,
            ..Default::default()
        };

        // 2. Signer public key wrapped in Any
        let pub_key_any = Any {
            type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
            value: Secp256k1PubKey {
                key: self.public_key.to_vec(),
            }
            .encode_to_vec(),
        };

        // 3. SignerInfo and AuthInfo
        let signer_info = SignerInfo {
            public_key: Some(pub_key_any),
            mode_info: Some(ModeInfo {
                sum: Some(mode_info::Sum::Single(mode_info::Single {
                    mode: SignMode::Direct as i32,
                })),
            }),
            sequence: self.sequence,
        };

        let auth_info = AuthInfo {
            signer_infos: vec![signer_info],
            fee: Some(fee.to_proto()),
            ..Default::default()
        };

        // 4. SignDoc over the encoded body and auth info
        SignDoc {
            body_bytes: tx_body.encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            chain_id: self.chain_id.to_string(),
            account_number: self.account_number,
        }
    }

    /// Encode the TxRaw to broadcast for a signed document
    pub fn tx_raw_bytes(signed: SignDoc, signature: Vec<u8>) -> Vec<u8> {
        TxRaw {
            body_bytes: signed.body_bytes,
            auth_info_bytes: signed.auth_info_bytes,
            signatures: vec![signature],
        }
        .encode_to_vec()
    }

    /// Bytes for gas simulation, signature left empty
    pub fn simulation_bytes(&self, messages: Vec<Any>, fee: &Fee) -> Vec<u8> {
        Self::tx_raw_bytes(self.sign_doc(messages, fee), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::proto::{MsgIssue, MSG_ISSUE_TYPE_URL};

    fn issue_any() -> Any {
        Any {
            type_url: MSG_ISSUE_TYPE_URL.to_string(),
            value: MsgIssue {
                issuer: "testcore1issuer".to_string(),
                symbol: "DEMOLOG".to_string(),
                ..Default::default()
            }
            .encode_to_vec(),
        }
    }

    #[test]
    fn test_sign_doc_carries_single_message_and_fee() {
        let public_key = [2u8; 33];
        let builder = TxBuilder::new("coreum-testnet-1", 42, 7, &public_key).with_memo("demo");
        let fee = Fee::single("utestcore", "5000", 200_000);

        let doc = builder.sign_doc(vec![issue_any()], &fee);
        assert_eq!(doc.chain_id, "coreum-testnet-1");
        assert_eq!(doc.account_number, 42);

        let body = TxBody::decode(&doc.body_bytes[..]).unwrap();
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].type_url, MSG_ISSUE_TYPE_URL);
        assert_eq!(body.memo, "demo");

        let auth_info = AuthInfo::decode(&doc.auth_info_bytes[..]).unwrap();
        let proto_fee = auth_info.fee.unwrap();
        assert_eq!(proto_fee.gas_limit, 200_000);
        assert_eq!(proto_fee.amount[0].denom, "utestcore");
        assert_eq!(auth_info.signer_infos[0].sequence, 7);
        assert_eq!(
            auth_info.signer_infos[0].public_key.as_ref().unwrap().type_url,
            SECP256K1_PUBKEY_TYPE_URL
        );
    }

    #[test]
    fn test_tx_raw_keeps_signed_bytes() {
        let public_key = [3u8; 33];
        let builder = TxBuilder::new("coreum-testnet-1", 1, 0, &public_key);
        let doc = builder.sign_doc(vec![issue_any()], &Fee::single("utestcore", "1", 1));
        let body_bytes = doc.body_bytes.clone();

        let bytes = TxBuilder::tx_raw_bytes(doc, vec![9u8; 64]);
        let raw = TxRaw::decode(&bytes[..]).unwrap();
        assert_eq!(raw.body_bytes, body_bytes);
        assert_eq!(raw.signatures, vec![vec![9u8; 64]]);
    }
}
