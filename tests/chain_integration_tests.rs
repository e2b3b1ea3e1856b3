//! Chain integration tests
//!
//! End-to-end checks of mining, ledger mutation and the successor rule,
//! exercising the chain the way the node orchestrator drives it.

use emberchain::core::{Block, Blockchain, MerkleTree, ProofOfWork, Transaction};
use emberchain::storage::UtxoSet;
use emberchain::wallet::Wallet;
use std::sync::atomic::AtomicBool;

const ADDR_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01";
const ADDR_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb02";

fn no_cancel() -> AtomicBool {
    AtomicBool::new(false)
}

#[test]
fn test_coinbase_mining_scenario() {
    // Genesis at difficulty 1, then one block carrying a coinbase of 50 to A
    let mut chain = Blockchain::new(1).unwrap();
    let coinbase = Transaction::new_coinbase(ADDR_A, 50).unwrap();
    let txid = coinbase.get_id().to_string();

    let block = chain.add_block(vec![coinbase], &no_cancel()).unwrap();

    assert_eq!(block.get_index(), 1);
    assert!(ProofOfWork::validate(&block));
    assert_eq!(chain.utxo_set().balance_of(ADDR_A), 50);

    let utxos = chain.utxo_set().utxos_of(ADDR_A);
    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].txid, txid);
    assert_eq!(utxos[0].vout, 0);
    assert_eq!(utxos[0].value, 50);
}

#[test]
fn test_spend_scenario() {
    // Fund a real keypair, spend 20 to B with 30 change, fee zero
    let mut chain = Blockchain::new(1).unwrap();
    let wallet = Wallet::new();
    let sender = wallet.get_address();

    let coinbase = Transaction::new_coinbase(&sender, 50).unwrap();
    let funding_txid = coinbase.get_id().to_string();
    chain.add_block(vec![coinbase], &no_cancel()).unwrap();

    let mut tx = Transaction::new_transfer(&sender, ADDR_B, 20, chain.utxo_set()).unwrap();
    tx.sign_all_inputs(wallet.get_private_key()).unwrap();
    tx.verify_all_inputs(chain.utxo_set()).unwrap();
    let spend_txid = tx.get_id().to_string();

    chain.queue_tx(tx.clone());
    chain.add_block(vec![tx], &no_cancel()).unwrap();

    assert_eq!(chain.utxo_set().balance_of(&sender), 30);
    assert_eq!(chain.utxo_set().balance_of(ADDR_B), 20);

    // The funding output is consumed wholly; two outputs replace it
    assert!(chain.utxo_set().get(&funding_txid, 0).is_none());
    assert!(chain.utxo_set().get(&spend_txid, 0).is_some());
    assert!(chain.utxo_set().get(&spend_txid, 1).is_some());

    // Mining retired the transaction from the mempool
    assert!(!chain.mempool().contains(&spend_txid));
}

#[test]
fn test_ledger_equals_replay_of_chain() {
    let mut chain = Blockchain::new(1).unwrap();
    let wallet = Wallet::new();
    let sender = wallet.get_address();

    let coinbase = Transaction::new_coinbase(&sender, 100).unwrap();
    chain.add_block(vec![coinbase], &no_cancel()).unwrap();

    let mut first = Transaction::new_transfer(&sender, ADDR_B, 40, chain.utxo_set()).unwrap();
    first.sign_all_inputs(wallet.get_private_key()).unwrap();
    chain.add_block(vec![first], &no_cancel()).unwrap();

    let mut second = Transaction::new_transfer(&sender, ADDR_A, 10, chain.utxo_set()).unwrap();
    second.sign_all_inputs(wallet.get_private_key()).unwrap();
    chain.add_block(vec![second], &no_cancel()).unwrap();

    let mut replayed = UtxoSet::new();
    for block in chain.blocks() {
        replayed.apply_block(block);
    }
    assert_eq!(&replayed, chain.utxo_set());
}

#[test]
fn test_chain_continuity_rejection() {
    let mut chain = Blockchain::new(1).unwrap();
    let genesis_hash = chain.tip().get_hash().to_string();

    let coinbase = Transaction::new_coinbase(ADDR_A, 50).unwrap();
    chain.add_block(vec![coinbase], &no_cancel()).unwrap();

    // Mined against the stale genesis tip: its own proof-of-work is fine,
    // but it is not a successor of the current tip
    let competing = Transaction::new_coinbase(ADDR_B, 50).unwrap();
    let stale = Block::new_block(genesis_hash, &[competing], 1, 1, &no_cancel()).unwrap();

    assert!(ProofOfWork::validate(&stale));
    assert!(!Blockchain::is_valid_new_block(&stale, chain.tip()));
}

#[test]
fn test_block_commits_to_txid_merkle_root() {
    let mut chain = Blockchain::new(1).unwrap();
    let first = Transaction::new_coinbase(ADDR_A, 10).unwrap();
    let second = Transaction::new_coinbase(ADDR_B, 20).unwrap();
    let expected = MerkleTree::compute_merkle_root(&[
        first.get_id().to_string(),
        second.get_id().to_string(),
    ]);

    let block = chain.add_block(vec![first, second], &no_cancel()).unwrap();
    assert_eq!(block.get_merkle_root(), expected);
}

#[test]
fn test_chain_links_back_to_genesis() {
    let mut chain = Blockchain::new(1).unwrap();
    for value in [10u64, 20, 30] {
        let coinbase = Transaction::new_coinbase(ADDR_A, value).unwrap();
        chain.add_block(vec![coinbase], &no_cancel()).unwrap();
    }

    let blocks = chain.blocks();
    assert_eq!(blocks.len(), 4);
    for i in 1..blocks.len() {
        assert_eq!(blocks[i].get_prev_hash(), blocks[i - 1].get_hash());
        assert_eq!(blocks[i].get_index(), blocks[i - 1].get_index() + 1);
    }
    assert_eq!(blocks[0].get_prev_hash(), emberchain::GENESIS_PREV_HASH);
}
