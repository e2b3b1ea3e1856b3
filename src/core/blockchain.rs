// The chain itself: an append-only list of blocks starting at genesis, the
// UTXO ledger derived from it, and the pool of pending transactions. All
// three are mutated together, only through `add_block` and `queue_tx`.

use crate::core::{Block, ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::{MemoryPool, UtxoSet};
use log::info;
use std::sync::atomic::AtomicBool;

pub struct Blockchain {
    blocks: Vec<Block>,
    utxo_set: UtxoSet,
    mempool: MemoryPool,
    difficulty: u32,
}

impl Blockchain {
    /// Start a fresh chain: genesis at the configured difficulty, folded
    /// into an empty ledger.
    pub fn new(difficulty: u32) -> Result<Blockchain> {
        // A 64-char hex hash cannot carry more than 64 leading zeros
        if difficulty > 64 {
            return Err(BlockchainError::Config(format!(
                "Difficulty {difficulty} exceeds the 64 hex characters of a hash"
            )));
        }

        let genesis = Block::generate_genesis_block(difficulty)?;
        info!("Created genesis block: {}", genesis.get_hash());

        let mut utxo_set = UtxoSet::new();
        utxo_set.apply_block(&genesis);

        Ok(Blockchain {
            blocks: vec![genesis],
            utxo_set,
            mempool: MemoryPool::new(),
            difficulty,
        })
    }

    pub fn tip(&self) -> &Block {
        self.blocks
            .last()
            .expect("Chain always holds at least the genesis block")
    }

    pub fn height(&self) -> u64 {
        self.tip().get_index()
    }

    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    pub fn utxo_set(&self) -> &UtxoSet {
        &self.utxo_set
    }

    pub fn mempool(&self) -> &MemoryPool {
        &self.mempool
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Successor rule: the candidate must sit directly on `prev` and its
    /// hash must satisfy its own declared difficulty. Merkle-root
    /// correctness and per-transaction validity are intentionally not
    /// checked here.
    pub fn is_valid_new_block(candidate: &Block, prev: &Block) -> bool {
        candidate.get_index() == prev.get_index() + 1
            && candidate.get_prev_hash() == prev.get_hash()
            && ProofOfWork::meets_difficulty(candidate.get_hash(), candidate.get_difficulty())
    }

    /// Mine and append a block carrying `transactions`.
    ///
    /// Builds at tip+1 referencing the tip hash, runs the proof-of-work
    /// search, asserts the successor rule, then pushes the block, folds it
    /// into the ledger and retires its txids from the mempool. A failure at
    /// any step leaves chain, ledger and mempool untouched.
    pub fn add_block(
        &mut self,
        transactions: Vec<Transaction>,
        cancel: &AtomicBool,
    ) -> Result<Block> {
        let next_index = self.tip().get_index() + 1;
        let prev_hash = self.tip().get_hash().to_string();

        info!(
            "Mining block at height {} with {} transactions (difficulty: {})",
            next_index,
            transactions.len(),
            self.difficulty
        );

        let block = Block::new_block(
            prev_hash,
            transactions.as_slice(),
            next_index,
            self.difficulty,
            cancel,
        )?;

        if !Self::is_valid_new_block(&block, self.tip()) {
            return Err(BlockchainError::InvalidBlock(format!(
                "Mined block at height {next_index} does not extend the current tip"
            )));
        }

        self.blocks.push(block.clone());
        self.utxo_set.apply_block(&block);
        for tx in block.get_transactions() {
            self.mempool.remove(tx.get_id());
        }

        info!(
            "Appended block {} at height {}",
            block.get_hash(),
            next_index
        );
        Ok(block)
    }

    /// Append a pending transaction. No validation at this layer; callers
    /// that want verified admission run `verify_all_inputs` first.
    pub fn queue_tx(&mut self, tx: Transaction) {
        self.mempool.add(tx);
    }
}
