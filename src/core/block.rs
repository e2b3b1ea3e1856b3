use crate::core::{MerkleTree, ProofOfWork, Transaction};
use crate::error::Result;
use crate::utils::{current_timestamp, sha256_hex};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;

/// Predecessor hash carried by the genesis block: 64 hex zeros.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A mined block. Immutable once the proof-of-work search has produced a
/// hash satisfying its own difficulty; height and predecessor are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    index: u64,
    prev_hash: String,
    #[serde(rename = "txs")]
    transactions: Vec<Transaction>,
    timestamp: i64,
    nonce: u64,
    difficulty: u32,
    merkle_root: String,
    hash: String,
}

impl Block {
    pub fn new_block(
        prev_hash: String,
        transactions: &[Transaction],
        index: u64,
        difficulty: u32,
        cancel: &AtomicBool,
    ) -> Result<Block> {
        let merkle_root = MerkleTree::compute_merkle_root(&Self::txids_of(transactions));

        let mut block = Block {
            index,
            prev_hash,
            transactions: transactions.to_vec(),
            timestamp: current_timestamp()?,
            nonce: 0,
            difficulty,
            merkle_root,
            hash: String::new(),
        };

        info!("Starting proof-of-work for block at height {index} with difficulty {difficulty}");
        let pow = ProofOfWork::new_proof_of_work(block.clone());
        let (nonce, hash) = pow.run(cancel)?;
        block.nonce = nonce;
        block.hash = hash.clone();
        info!("Proof-of-work completed for block: {hash} (difficulty: {difficulty})");

        Ok(block)
    }

    /// Genesis is hand-constructed: height 0, all-zero predecessor, empty
    /// transaction list, and no proof-of-work search over its hash.
    pub fn generate_genesis_block(difficulty: u32) -> Result<Block> {
        let mut block = Block {
            index: 0,
            prev_hash: GENESIS_PREV_HASH.to_string(),
            transactions: vec![],
            timestamp: current_timestamp()?,
            nonce: 0,
            difficulty,
            merkle_root: MerkleTree::compute_merkle_root(&[]),
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        Ok(block)
    }

    /// SHA-256 over the pipe-joined header fields.
    pub fn compute_hash(&self) -> String {
        sha256_hex(self.header_bytes(self.nonce).as_slice())
    }

    pub(crate) fn header_bytes(&self, nonce: u64) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.index, self.prev_hash, self.merkle_root, self.timestamp, nonce, self.difficulty
        )
        .into_bytes()
    }

    pub fn txids(&self) -> Vec<String> {
        Self::txids_of(&self.transactions)
    }

    fn txids_of(transactions: &[Transaction]) -> Vec<String> {
        transactions
            .iter()
            .map(|tx| tx.get_id().to_string())
            .collect()
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_prev_hash(&self) -> &str {
        self.prev_hash.as_str()
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn get_merkle_root(&self) -> &str {
        self.merkle_root.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ADDRESS: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01";

    #[test]
    fn test_genesis_block_shape() {
        let genesis = Block::generate_genesis_block(3).unwrap();
        assert_eq!(genesis.get_index(), 0);
        assert_eq!(genesis.get_prev_hash(), GENESIS_PREV_HASH);
        assert!(genesis.get_transactions().is_empty());
        assert_eq!(genesis.get_nonce(), 0);
        assert_eq!(genesis.get_hash(), genesis.compute_hash());
        // Empty transaction list: merkle root is the hash of the empty string
        assert_eq!(
            genesis.get_merkle_root(),
            crate::utils::sha256_hex(b"")
        );
    }

    #[test]
    fn test_mined_block_commits_to_transactions() {
        let coinbase = Transaction::new_coinbase(TEST_ADDRESS, 50).unwrap();
        let cancel = AtomicBool::new(false);
        let block =
            Block::new_block(GENESIS_PREV_HASH.to_string(), &[coinbase.clone()], 1, 1, &cancel)
                .unwrap();

        assert_eq!(block.get_index(), 1);
        assert_eq!(block.get_transactions().len(), 1);
        assert_eq!(
            block.get_merkle_root(),
            MerkleTree::compute_merkle_root(&[coinbase.get_id().to_string()])
        );
    }

    #[test]
    fn test_block_json_field_names() {
        let genesis = Block::generate_genesis_block(1).unwrap();
        let json = serde_json::to_value(&genesis).unwrap();
        assert!(json.get("prevHash").is_some());
        assert!(json.get("merkleRoot").is_some());
        assert!(json.get("txs").is_some());
        assert!(json.get("prev_hash").is_none());
    }
}
