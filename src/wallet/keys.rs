use anyhow::{anyhow, Result};
use bech32::{self, Hrp};
use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use rand::RngCore;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Coreum HD path (coin type 990)
pub const COREUM_HD_PATH: &str = "m/44'/990'/0'/0/0";

/// Key pair derived from a mnemonic, addressed with a bech32 prefix
/// Private key bytes are zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyWallet {
    #[zeroize(skip)]
    pub address: String,

    private_key_bytes: [u8; 32],
    public_key_bytes: [u8; 33],
}

impl KeyWallet {
    /// Derive a wallet from a BIP39 mnemonic along `hd_path`
    pub fn from_mnemonic(
        mnemonic_str: &str,
        passphrase: &str,
        hd_path: &str,
        prefix: &str,
    ) -> Result<Self> {
        let mnemonic = Mnemonic::parse(mnemonic_str.trim())?;
        let mut seed = mnemonic.to_seed(passphrase);

        let path: DerivationPath = hd_path
            .parse()
            .map_err(|e| anyhow!("Invalid HD path {}: {}", hd_path, e))?;
        let derived = XPrv::derive_from_path(seed, &path)
            .map_err(|e| anyhow!("Failed to derive key: {}", e));
        seed.zeroize();

        let mut private_key = derived?.to_bytes();
        let wallet = Self::from_private_key(&private_key, prefix);
        private_key.zeroize();
        wallet
    }

    pub fn from_private_key(private_key: &[u8; 32], prefix: &str) -> Result<Self> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key)?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let public_key_bytes = public_key.serialize();

        let address = cosmos_address(&public_key_bytes, prefix)?;

        Ok(Self {
            address,
            private_key_bytes: *private_key,
            public_key_bytes,
        })
    }

    /// Note: Caller is responsible for secure handling
    pub fn private_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.private_key_bytes)
            .map_err(|e| anyhow!("Invalid private key: {}", e))
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_slice(&self.public_key_bytes)
            .map_err(|e| anyhow!("Invalid public key: {}", e))
    }

    /// Compressed public key (33 bytes)
    pub fn public_key_compressed(&self) -> [u8; 33] {
        self.public_key_bytes
    }
}

impl std::fmt::Debug for KeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyWallet")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// bech32(prefix, ripemd160(sha256(compressed pubkey)))
pub fn cosmos_address(compressed_pubkey: &[u8], prefix: &str) -> Result<String> {
    let sha = Sha256::digest(compressed_pubkey);
    let addr_bytes = Ripemd160::digest(sha);

    let hrp = Hrp::parse(prefix)?;
    let encoded = bech32::encode::<bech32::Bech32>(hrp, &addr_bytes)?;
    Ok(encoded)
}

/// Fresh 24-word mnemonic
pub fn generate_mnemonic() -> Result<String> {
    let mut entropy = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy);
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}
