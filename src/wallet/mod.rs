//! Key management and address derivation
//!
//! Wallets hold secp256k1 keypairs; addresses are derived from the
//! compressed public key and carried as opaque `0x`-prefixed identifiers.

pub mod wallet;

pub use wallet::{address_of, public_key_of, validate_address, Wallet, ADDRESS_PREFIX};
