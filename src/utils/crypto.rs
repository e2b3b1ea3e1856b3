use data_encoding::HEXLOWER;
use once_cell::sync::Lazy;
use secp256k1::ecdsa::Signature;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::error::{BlockchainError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared secp256k1 context; building one is expensive, so it is created once.
pub(crate) static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

pub fn current_timestamp() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BlockchainError::Crypto(format!("System time error: {e}")))?
        .as_millis();

    // Ensure the timestamp fits in i64
    if duration > i64::MAX as u128 {
        return Err(BlockchainError::Crypto("Timestamp overflow".to_string()));
    }

    Ok(duration as i64)
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// SHA-256 of `data`, returned as 64 lowercase hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    HEXLOWER.encode(sha256_digest(data).as_slice())
}

pub fn hex_decode(data: &str) -> Result<Vec<u8>> {
    HEXLOWER
        .decode(data.as_bytes())
        .map_err(|e| BlockchainError::Crypto(format!("Invalid hex encoding: {e}")))
}

pub fn new_key_pair() -> (String, String) {
    let (secret_key, public_key) = SECP.generate_keypair(&mut rand::thread_rng());
    (
        hex::encode(secret_key.secret_bytes()),
        hex::encode(public_key.serialize()),
    )
}

/// Sign a 32-byte digest with a secp256k1 private key; compact signature, hex.
pub fn ecdsa_secp256k1_sign_digest(private_key_hex: &str, digest: &[u8]) -> Result<String> {
    let secret_bytes = hex_decode(private_key_hex)?;
    let secret_key = SecretKey::from_slice(secret_bytes.as_slice())
        .map_err(|e| BlockchainError::Crypto(format!("Invalid private key: {e}")))?;
    let message = Message::from_digest_slice(digest)
        .map_err(|e| BlockchainError::Crypto(format!("Invalid signing digest: {e}")))?;
    let signature = SECP.sign_ecdsa(&message, &secret_key);
    Ok(hex::encode(signature.serialize_compact()))
}

/// Verify a compact hex signature over a 32-byte digest against a compressed
/// public key. Any decoding failure counts as verification failure.
pub fn ecdsa_secp256k1_verify(public_key_hex: &str, signature_hex: &str, digest: &[u8]) -> bool {
    let public_key = match hex_decode(public_key_hex)
        .ok()
        .and_then(|bytes| PublicKey::from_slice(bytes.as_slice()).ok())
    {
        Some(pk) => pk,
        None => return false,
    };
    let signature = match hex_decode(signature_hex)
        .ok()
        .and_then(|bytes| Signature::from_compact(bytes.as_slice()).ok())
    {
        Some(sig) => sig,
        None => return false,
    };
    let message = match Message::from_digest_slice(digest) {
        Ok(msg) => msg,
        Err(_) => return false,
    };
    SECP.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_length_and_case() {
        let hash = sha256_hex(b"emberchain");
        assert_eq!(hash.len(), 64);
        assert!(hash
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_sha256_empty_input() {
        // Known SHA-256 of the empty byte string
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sign_and_verify_digest() {
        let (private_key, public_key) = new_key_pair();
        let digest = sha256_digest(b"payload");

        let signature = ecdsa_secp256k1_sign_digest(&private_key, &digest).unwrap();
        assert!(ecdsa_secp256k1_verify(&public_key, &signature, &digest));

        // Tampered digest must fail
        let other_digest = sha256_digest(b"other payload");
        assert!(!ecdsa_secp256k1_verify(&public_key, &signature, &other_digest));

        // Wrong key must fail
        let (_, other_public_key) = new_key_pair();
        assert!(!ecdsa_secp256k1_verify(&other_public_key, &signature, &digest));
    }

    #[test]
    fn test_verify_rejects_garbage_inputs() {
        let digest = sha256_digest(b"payload");
        assert!(!ecdsa_secp256k1_verify("zz", "zz", &digest));
        assert!(!ecdsa_secp256k1_verify("", "", &digest));
    }
}
