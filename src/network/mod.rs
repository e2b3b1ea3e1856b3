//! Peer-to-peer networking
//!
//! This module maintains the encrypted, multiplexed transport to the
//! configured peers and runs the one application protocol over it: `block`
//! and `tx` frames, broadcast to everyone, ingested from anyone.

pub mod message;
pub mod peer_service;

pub use message::WireMessage;
pub use peer_service::{PeerHandle, PeerInfo, PeerService, PROTOCOL_VERSION};
