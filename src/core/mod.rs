//! Core chain functionality
//!
//! This module contains the fundamental components: blocks, transactions,
//! the chain itself, Merkle roots and the proof-of-work search.

pub mod block;
pub mod blockchain;
pub mod merkle;
pub mod monetary;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, GENESIS_PREV_HASH};
pub use blockchain::Blockchain;
pub use merkle::MerkleTree;
pub use monetary::{BLOCK_REWARD, UNITS_PER_COIN};
pub use proof_of_work::ProofOfWork;
pub use transaction::{Transaction, TxInput, TxOutput};
