use crate::core::Block;
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use num_bigint::{BigInt, Sign};
use std::ops::ShlAssign;
use std::sync::atomic::{AtomicBool, Ordering};

/// Proof-of-work search over a block header.
///
/// Difficulty counts required leading hex `'0'` characters; the equivalent
/// numeric target is 2^(256 - 4·difficulty).
pub struct ProofOfWork {
    block: Block,
    target: BigInt,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: Block) -> ProofOfWork {
        let difficulty = block.get_difficulty();
        let mut target = BigInt::from(1);
        // Each hex character of the hash covers four bits
        target.shl_assign(256 - 4 * difficulty);
        ProofOfWork { block, target }
    }

    /// Validate proof-of-work for a mined block: the stored hash must be the
    /// recomputed header hash and must satisfy the block's own difficulty.
    pub fn validate(block: &Block) -> bool {
        block.get_hash() == block.compute_hash()
            && Self::meets_difficulty(block.get_hash(), block.get_difficulty())
    }

    /// Does `hash` carry at least `difficulty` leading hex zeros?
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        hash.len() >= difficulty as usize
            && hash.chars().take(difficulty as usize).all(|c| c == '0')
    }

    fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        self.block.header_bytes(nonce)
    }

    /// Search for a nonce whose header hash meets the target. The `cancel`
    /// flag is checked every iteration so a shutdown can stop an unbounded
    /// search; cancellation surfaces as a mining error.
    pub fn run(&self, cancel: &AtomicBool) -> Result<(u64, String)> {
        let mut nonce: u64 = 0;
        loop {
            if cancel.load(Ordering::Relaxed) {
                return Err(BlockchainError::Mining(
                    "Mining cancelled before a valid nonce was found".to_string(),
                ));
            }

            let hash = sha256_digest(self.prepare_data(nonce).as_slice());
            let hash_int = BigInt::from_bytes_be(Sign::Plus, hash.as_slice());
            if hash_int < self.target {
                return Ok((nonce, HEXLOWER.encode(hash.as_slice())));
            }

            nonce = nonce.checked_add(1).ok_or_else(|| {
                BlockchainError::Mining("Nonce space exhausted".to_string())
            })?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;

    const TEST_ADDRESS: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01";

    fn mined_block(difficulty: u32) -> Block {
        let coinbase = Transaction::new_coinbase(TEST_ADDRESS, 50).unwrap();
        let cancel = AtomicBool::new(false);
        Block::new_block(
            "00".repeat(32),
            &[coinbase],
            1,
            difficulty,
            &cancel,
        )
        .unwrap()
    }

    #[test]
    fn test_mined_block_meets_difficulty() {
        let block = mined_block(1);
        assert!(block.get_hash().starts_with('0'));
        assert!(ProofOfWork::validate(&block));
    }

    #[test]
    fn test_hash_matches_recomputed_header() {
        let block = mined_block(1);
        assert_eq!(block.get_hash(), block.compute_hash());
    }

    #[test]
    fn test_meets_difficulty_prefix() {
        assert!(ProofOfWork::meets_difficulty(&"0".repeat(64), 64));
        assert!(ProofOfWork::meets_difficulty(
            &format!("00{}", "f".repeat(62)),
            2
        ));
        assert!(!ProofOfWork::meets_difficulty(
            &format!("0f{}", "f".repeat(62)),
            2
        ));
    }

    #[test]
    fn test_higher_difficulty_has_smaller_target() {
        let easy = ProofOfWork::new_proof_of_work(mined_block(1));
        let hard = ProofOfWork::new_proof_of_work(mined_block(2));
        assert!(hard.target < easy.target);
    }

    #[test]
    fn test_cancel_aborts_search() {
        let coinbase = Transaction::new_coinbase(TEST_ADDRESS, 50).unwrap();
        let cancel = AtomicBool::new(true);
        // Difficulty high enough that the first nonce cannot plausibly win
        let result = Block::new_block("00".repeat(32), &[coinbase], 1, 16, &cancel);
        assert!(matches!(result, Err(BlockchainError::Mining(_))));
    }
}
