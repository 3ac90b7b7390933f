use anyhow::Result;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// Transaction signer for Cosmos SDK chains
/// Produces 64-byte compact secp256k1 signatures over sha256(sign bytes)
pub struct TransactionSigner {
    secp: Secp256k1<secp256k1::All>,
}

impl TransactionSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Sign encoded SignDoc bytes
    pub fn sign_direct(&self, sign_doc_bytes: &[u8], private_key: &SecretKey) -> Result<Vec<u8>> {
        let hash: [u8; 32] = Sha256::digest(sign_doc_bytes).into();
        let message = Message::from_digest_slice(&hash)?;

        // libsecp256k1 always emits low-S signatures, which the SDK requires
        let signature = self.secp.sign_ecdsa(&message, private_key);
        Ok(signature.serialize_compact().to_vec())
    }

    /// Check a compact signature over encoded SignDoc bytes
    pub fn verify_direct(
        &self,
        sign_doc_bytes: &[u8],
        signature: &[u8],
        public_key: &PublicKey,
    ) -> Result<bool> {
        let hash: [u8; 32] = Sha256::digest(sign_doc_bytes).into();
        let message = Message::from_digest_slice(&hash)?;
        let signature = Signature::from_compact(signature)?;
        Ok(self.secp.verify_ecdsa(&message, &signature, public_key).is_ok())
    }
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new()
    }
}
