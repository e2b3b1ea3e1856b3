use crate::core::Block;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A spendable output: who owns it and how much it is worth (minor units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub address: String,
    pub value: u64,
}

/// Reference to a transaction output: (txid, output index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: String,
    pub vout: usize,
}

/// Flat view of a UTXO for external queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub txid: String,
    pub vout: usize,
    pub value: u64,
}

/// In-memory ledger of unspent outputs.
///
/// Mutated only by [`UtxoSet::apply_block`], called from chain append; at any
/// point the ledger equals the fold of every block in the chain over an empty
/// map. It is never hand-edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSet {
    inner: HashMap<OutPoint, Utxo>,
}

impl UtxoSet {
    pub fn new() -> UtxoSet {
        UtxoSet {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, txid: &str, vout: usize) -> Option<&Utxo> {
        self.inner.get(&OutPoint {
            txid: txid.to_string(),
            vout,
        })
    }

    pub fn put(&mut self, txid: &str, vout: usize, utxo: Utxo) {
        self.inner.insert(
            OutPoint {
                txid: txid.to_string(),
                vout,
            },
            utxo,
        );
    }

    pub fn remove(&mut self, txid: &str, vout: usize) -> Option<Utxo> {
        self.inner.remove(&OutPoint {
            txid: txid.to_string(),
            vout,
        })
    }

    /// Sum of the values of every output owned by `address`.
    pub fn balance_of(&self, address: &str) -> u64 {
        self.inner
            .values()
            .filter(|utxo| utxo.address == address)
            .map(|utxo| utxo.value)
            .sum()
    }

    /// Every unspent output owned by `address`.
    pub fn utxos_of(&self, address: &str) -> Vec<UtxoRecord> {
        let mut records: Vec<UtxoRecord> = self
            .inner
            .iter()
            .filter(|(_, utxo)| utxo.address == address)
            .map(|(outpoint, utxo)| UtxoRecord {
                txid: outpoint.txid.clone(),
                vout: outpoint.vout,
                value: utxo.value,
            })
            .collect();
        records.sort_by(|a, b| a.txid.cmp(&b.txid).then(a.vout.cmp(&b.vout)));
        records
    }

    /// Apply a confirmed block: for each transaction in order, remove the
    /// outputs its inputs spend, then insert one UTXO per created output.
    ///
    /// Spends go first so an input can never observe an output created by its
    /// own transaction. Inputs naming unknown outpoints are removed
    /// best-effort; referencing outputs created later in the same block is
    /// not rejected here.
    pub fn apply_block(&mut self, block: &Block) {
        for tx in block.get_transactions() {
            for input in tx.get_vin() {
                self.remove(input.get_txid(), input.get_vout());
            }
            for (index, output) in tx.get_vout().iter().enumerate() {
                self.put(
                    tx.get_id(),
                    index,
                    Utxo {
                        address: output.get_address().to_string(),
                        value: output.get_value(),
                    },
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
