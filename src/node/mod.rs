//! Node orchestrator
//!
//! The [`Node`] exclusively owns the chain, ledger and mempool; everything
//! mutates through its methods and concurrent readers get snapshots, never
//! references. Locally originated work flows out to peers; remotely received
//! work flows in through `on_remote_block`/`on_remote_tx` and is never
//! re-broadcast.

use crate::config::Settings;
use crate::core::{Block, Blockchain, Transaction, BLOCK_REWARD};
use crate::error::{BlockchainError, Result};
use crate::network::{PeerHandle, PeerInfo, PeerService, WireMessage};
use crate::storage::UtxoRecord;
use log::{info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events surfaced to external collaborators (HTTP layer, websocket fan-out).
#[derive(Debug, Clone)]
pub enum NodeEvent {
    Block(Block),
    Tx(Transaction),
}

/// Header-level view of a block for chain listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    pub index: u64,
    pub hash: String,
    pub prev_hash: String,
    pub timestamp: i64,
    pub difficulty: u32,
    pub tx_count: usize,
}

/// Pending-transaction view for mempool listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSummary {
    pub id: String,
    pub inputs: usize,
    pub outputs: usize,
    pub total_value: u64,
}

pub struct Node {
    chain: Arc<Mutex<Blockchain>>,
    peers: PeerHandle,
    events: broadcast::Sender<NodeEvent>,
    mining_cancel: Arc<AtomicBool>,
}

impl Node {
    /// Build genesis at the configured difficulty, bring up the peer
    /// service, and wire inbound frames to the remote ingestion paths.
    pub fn start(settings: &Settings) -> Result<Arc<Node>> {
        let chain = Blockchain::new(settings.difficulty)?;
        let (peers, mut inbound) =
            PeerService::start(settings.listen.clone(), settings.bootstrap.clone())?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let node = Arc::new(Node {
            chain: Arc::new(Mutex::new(chain)),
            peers,
            events,
            mining_cancel: Arc::new(AtomicBool::new(false)),
        });

        let dispatch = Arc::clone(&node);
        tokio::spawn(async move {
            while let Some(frame) = inbound.recv().await {
                match frame {
                    WireMessage::Block(block) => dispatch.on_remote_block(block).await,
                    WireMessage::Tx(tx) => dispatch.on_remote_tx(tx).await,
                }
            }
        });

        Ok(node)
    }

    /// Local submission path: verify against the current ledger, queue,
    /// broadcast to peers, emit a `tx` event. Broadcast failures never fail
    /// the submission.
    pub async fn submit_transaction(&self, tx: Transaction) -> Result<()> {
        {
            let mut chain = self.chain.lock().await;
            tx.verify_all_inputs(chain.utxo_set())?;
            chain.queue_tx(tx.clone());
        }
        self.peers.broadcast(WireMessage::Tx(tx.clone()));
        let _ = self.events.send(NodeEvent::Tx(tx));
        Ok(())
    }

    /// Snapshot the mempool, prepend a coinbase when a miner address is
    /// given, and mine the block on a blocking worker thread. The chain lock
    /// is held across the search, so appends stay serialized and readers
    /// never observe a half-applied block; the async caller just awaits.
    pub async fn mine_block(&self, miner: Option<String>) -> Result<Block> {
        let mut guard = Arc::clone(&self.chain).lock_owned().await;
        let cancel = Arc::clone(&self.mining_cancel);

        let block = tokio::task::spawn_blocking(move || -> Result<Block> {
            let mut transactions = guard.mempool().get_all();
            if let Some(address) = miner.as_deref() {
                transactions.insert(0, Transaction::new_coinbase(address, BLOCK_REWARD)?);
            }
            guard.add_block(transactions, cancel.as_ref())
        })
        .await
        .map_err(|e| BlockchainError::Mining(format!("Mining task failed: {e}")))??;

        self.peers.broadcast(WireMessage::Block(block.clone()));
        let _ = self.events.send(NodeEvent::Block(block.clone()));
        Ok(block)
    }

    /// Remote ingestion of a block. Accepted only when it sits directly on
    /// the current tip; anything else is ignored. The received transaction
    /// set is re-mined locally rather than trusting the peer's header, so
    /// the appended block's timestamp/nonce/hash differ from the peer's
    /// copy. Errors are swallowed: a bad peer must not crash the node.
    pub async fn on_remote_block(&self, block: Block) {
        let mut guard = Arc::clone(&self.chain).lock_owned().await;
        if block.get_prev_hash() != guard.tip().get_hash() {
            warn!(
                "Ignoring remote block {}: does not extend the current tip",
                block.get_hash()
            );
            return;
        }

        let cancel = Arc::clone(&self.mining_cancel);
        let result = tokio::task::spawn_blocking(move || {
            let transactions = block.get_transactions().to_vec();
            guard.add_block(transactions, cancel.as_ref())
        })
        .await;

        match result {
            Ok(Ok(accepted)) => {
                info!(
                    "Accepted remote block at height {} as {}",
                    accepted.get_index(),
                    accepted.get_hash()
                );
                let _ = self.events.send(NodeEvent::Block(accepted));
            }
            Ok(Err(e)) => warn!("Discarding remote block: {e}"),
            Err(e) => warn!("Remote block task failed: {e}"),
        }
    }

    /// Remote ingestion of a transaction: queued as-is, no verification, and
    /// never re-broadcast.
    pub async fn on_remote_tx(&self, tx: Transaction) {
        {
            let mut chain = self.chain.lock().await;
            chain.queue_tx(tx.clone());
        }
        let _ = self.events.send(NodeEvent::Tx(tx));
    }

    pub async fn get_chain(&self) -> Vec<BlockSummary> {
        let chain = self.chain.lock().await;
        chain
            .blocks()
            .iter()
            .map(|block| BlockSummary {
                index: block.get_index(),
                hash: block.get_hash().to_string(),
                prev_hash: block.get_prev_hash().to_string(),
                timestamp: block.get_timestamp(),
                difficulty: block.get_difficulty(),
                tx_count: block.get_transactions().len(),
            })
            .collect()
    }

    pub async fn get_balance(&self, address: &str) -> u64 {
        self.chain.lock().await.utxo_set().balance_of(address)
    }

    pub async fn list_utxos(&self, address: &str) -> Vec<UtxoRecord> {
        self.chain.lock().await.utxo_set().utxos_of(address)
    }

    pub async fn list_mempool(&self) -> Vec<TxSummary> {
        let chain = self.chain.lock().await;
        chain
            .mempool()
            .get_all()
            .iter()
            .map(|tx| TxSummary {
                id: tx.get_id().to_string(),
                inputs: tx.get_vin().len(),
                outputs: tx.get_vout().len(),
                total_value: tx.total_value(),
            })
            .collect()
    }

    pub async fn height(&self) -> u64 {
        self.chain.lock().await.height()
    }

    pub fn get_peer_info(&self) -> PeerInfo {
        self.peers.peer_info()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    /// Cancel any in-flight mining search and stop the peer service.
    pub fn shutdown(&self) {
        self.mining_cancel.store(true, Ordering::Relaxed);
        self.peers.shutdown();
    }
}
