//! # Emberchain
//!
//! A minimal proof-of-work blockchain node: an append-only chain of blocks,
//! the UTXO ledger derived from it, a pool of pending transactions, and a
//! peer-to-peer channel that propagates newly mined blocks and newly
//! submitted transactions to other nodes.
//!
//! ## Layout
//! - `core/`: blocks, transactions, the chain, Merkle roots, mining
//! - `storage/`: the in-memory UTXO ledger and memory pool
//! - `network/`: libp2p transport and the `block`/`tx` wire protocol
//! - `node/`: the orchestrator wiring chain, mempool and peers together
//! - `wallet/`: secp256k1 keys and address derivation
//! - `config/`, `error/`, `utils/`, `cli/`: settings, error types, crypto
//!   and serialization helpers, command-line definitions
//!
//! Everything lives in memory; a restarted node begins again from genesis.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod node;
pub mod storage;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Settings, DEFAULT_DIFFICULTY};
pub use crate::core::{
    Block, Blockchain, MerkleTree, ProofOfWork, Transaction, TxInput, TxOutput, BLOCK_REWARD,
    GENESIS_PREV_HASH, UNITS_PER_COIN,
};
pub use error::{BlockchainError, Result};
pub use network::{PeerHandle, PeerInfo, PeerService, WireMessage, PROTOCOL_VERSION};
pub use node::{BlockSummary, Node, NodeEvent, TxSummary};
pub use storage::{MemoryPool, OutPoint, Utxo, UtxoRecord, UtxoSet};
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
pub use wallet::{address_of, public_key_of, validate_address, Wallet};
