use crate::error::{BlockchainError, Result};
use crate::utils::{hex_decode, new_key_pair, sha256_digest};
use secp256k1::{PublicKey, SecretKey};

/// Address prefix; the remainder is 40 lowercase hex characters.
pub const ADDRESS_PREFIX: &str = "0x";
const ADDRESS_HASH_LEN: usize = 20;

/// A secp256k1 keypair. Keys are held hex-encoded, matching the form they
/// travel in transaction inputs.
#[derive(Clone)]
pub struct Wallet {
    private_key: String,
    public_key: String,
}

impl Wallet {
    pub fn new() -> Wallet {
        let (private_key, public_key) = new_key_pair();
        Wallet {
            private_key,
            public_key,
        }
    }

    /// Import a wallet from a raw private key (64 hex characters).
    pub fn from_private_key(private_key_hex: &str) -> Result<Wallet> {
        let public_key = public_key_of(private_key_hex)?;
        Ok(Wallet {
            private_key: private_key_hex.to_string(),
            public_key,
        })
    }

    pub fn get_address(&self) -> String {
        // The keypair was validated on construction, so derivation cannot fail
        address_of(&self.public_key).unwrap_or_default()
    }

    pub fn get_public_key(&self) -> &str {
        self.public_key.as_str()
    }

    pub fn get_private_key(&self) -> &str {
        self.private_key.as_str()
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the address for a compressed public key: SHA-256 over the decoded
/// key bytes, keep the last 20 bytes, hex-encode, prefix `0x`.
pub fn address_of(public_key_hex: &str) -> Result<String> {
    let key_bytes = hex::decode(public_key_hex)
        .map_err(|e| BlockchainError::Crypto(format!("Invalid public key hex: {e}")))?;
    let digest = sha256_digest(key_bytes.as_slice());
    let tail = &digest[digest.len() - ADDRESS_HASH_LEN..];
    Ok(format!("{ADDRESS_PREFIX}{}", hex::encode(tail)))
}

/// Standard secp256k1 scalar-to-point derivation, compressed-point hex.
pub fn public_key_of(private_key_hex: &str) -> Result<String> {
    let secret_bytes = hex_decode(private_key_hex)?;
    let secret_key = SecretKey::from_slice(secret_bytes.as_slice())
        .map_err(|e| BlockchainError::Crypto(format!("Invalid private key: {e}")))?;
    let public_key = PublicKey::from_secret_key(&*crate::utils::crypto::SECP, &secret_key);
    Ok(hex::encode(public_key.serialize()))
}

pub fn validate_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix(ADDRESS_PREFIX) else {
        return false;
    };
    body.len() == ADDRESS_HASH_LEN * 2
        && body
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_address_format() {
        let wallet = Wallet::new();
        let address = wallet.get_address();
        assert!(validate_address(&address));
        assert_eq!(address.len(), 42);
    }

    #[test]
    fn test_address_is_deterministic() {
        let wallet = Wallet::new();
        let a = address_of(wallet.get_public_key()).unwrap();
        let b = address_of(wallet.get_public_key()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_public_key_of_round_trip() {
        let wallet = Wallet::new();
        let derived = public_key_of(wallet.get_private_key()).unwrap();
        assert_eq!(derived, wallet.get_public_key());
        // Compressed point: 33 bytes, 66 hex chars
        assert_eq!(derived.len(), 66);
    }

    #[test]
    fn test_wallet_import() {
        let wallet = Wallet::new();
        let imported = Wallet::from_private_key(wallet.get_private_key()).unwrap();
        assert_eq!(imported.get_address(), wallet.get_address());
    }

    #[test]
    fn test_address_of_rejects_bad_hex() {
        assert!(address_of("not-hex").is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address(
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01"
        ));
        assert!(!validate_address(
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01"
        ));
        assert!(!validate_address("0xshort"));
        assert!(!validate_address(
            "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA01"
        ));
    }
}
