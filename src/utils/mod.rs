//! Utility functions and helpers
//!
//! This module contains cryptographic utilities, encoding functions,
//! and other helper functions used throughout the node.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    current_timestamp, ecdsa_secp256k1_sign_digest, ecdsa_secp256k1_verify, hex_decode,
    new_key_pair, sha256_digest, sha256_hex,
};

pub use serialization::{deserialize, serialize};
