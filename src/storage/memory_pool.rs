use crate::core::Transaction;

/// Pending transactions, in submission order.
///
/// Membership is best-effort: no double-spend or signature check happens at
/// this layer. Transactions leave the pool when a mined block carries their
/// txid.
#[derive(Debug, Clone, Default)]
pub struct MemoryPool {
    inner: Vec<Transaction>,
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool { inner: Vec::new() }
    }

    pub fn add(&mut self, tx: Transaction) {
        self.inner.push(tx);
    }

    pub fn contains(&self, txid: &str) -> bool {
        self.inner.iter().any(|tx| tx.get_id() == txid)
    }

    pub fn get(&self, txid: &str) -> Option<&Transaction> {
        self.inner.iter().find(|tx| tx.get_id() == txid)
    }

    /// Remove every pending transaction with the given txid.
    pub fn remove(&mut self, txid: &str) {
        self.inner.retain(|tx| tx.get_id() != txid);
    }

    pub fn get_all(&self) -> Vec<Transaction> {
        self.inner.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;

    fn coinbase(to: &str, reward: u64) -> Transaction {
        Transaction::new_coinbase(to, reward).unwrap()
    }

    #[test]
    fn test_add_contains_remove() {
        let mut pool = MemoryPool::new();
        let tx = coinbase("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01", 50);
        let txid = tx.get_id().to_string();

        pool.add(tx);
        assert!(pool.contains(&txid));
        assert_eq!(pool.len(), 1);

        pool.remove(&txid);
        assert!(!pool.contains(&txid));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_get_all_preserves_order() {
        let mut pool = MemoryPool::new();
        let first = coinbase("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01", 10);
        let second = coinbase("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb02", 20);

        pool.add(first.clone());
        pool.add(second.clone());

        let all = pool.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get_id(), first.get_id());
        assert_eq!(all[1].get_id(), second.get_id());
    }

    #[test]
    fn test_remove_unknown_txid_is_noop() {
        let mut pool = MemoryPool::new();
        pool.add(coinbase("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa01", 10));
        pool.remove("deadbeef");
        assert_eq!(pool.len(), 1);
    }
}
