//! Error handling for the node
//!
//! This module provides the error types for all chain, ledger, mempool and
//! network operations. Validation failures stay distinguishable so callers
//! can map them to their own responses (insufficient funds vs. bad signature
//! vs. malformed payload).

use std::fmt;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for node operations
#[derive(Debug, Clone)]
pub enum BlockchainError {
    /// Malformed transaction/block payload (missing fields, wrong types)
    Structural(String),
    /// A transaction input references an output absent from the ledger
    UtxoNotFound { txid: String, vout: usize },
    /// Derived address does not match the owner of the referenced output
    OwnerMismatch { expected: String, derived: String },
    /// An input carries no signature
    MissingSignature { input: usize },
    /// Signature verification failed
    InvalidSignature(String),
    /// Insufficient funds for transaction
    InsufficientFunds { required: u64, available: u64 },
    /// Candidate block does not extend the current tip
    InvalidBlock(String),
    /// Mining errors, including a cancelled search
    Mining(String),
    /// Network communication errors
    Network(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Structural(msg) => write!(f, "Malformed payload: {msg}"),
            BlockchainError::UtxoNotFound { txid, vout } => {
                write!(f, "Unknown output: {txid}:{vout}")
            }
            BlockchainError::OwnerMismatch { expected, derived } => {
                write!(
                    f,
                    "Output owner mismatch: output belongs to {expected}, key derives {derived}"
                )
            }
            BlockchainError::MissingSignature { input } => {
                write!(f, "Input {input} has no signature")
            }
            BlockchainError::InvalidSignature(msg) => write!(f, "Invalid signature: {msg}"),
            BlockchainError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Mining(msg) => write!(f, "Mining error: {msg}"),
            BlockchainError::Network(msg) => write!(f, "Network error: {msg}"),
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for BlockchainError {
    fn from(err: serde_json::Error) -> Self {
        BlockchainError::Structural(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}
