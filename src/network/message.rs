use crate::core::{Block, Transaction};
use serde::{Deserialize, Serialize};

/// Application-level frame exchanged between peers: a single JSON object
/// `{"type":"block"|"tx","payload":...}`, one gossip publish per message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum WireMessage {
    Block(Block),
    Tx(Transaction),
}

impl WireMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Block(_) => "block",
            WireMessage::Tx(_) => "tx",
        }
    }
}
