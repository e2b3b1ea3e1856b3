// Peer transport: QUIC (encrypted, multiplexed) with gossipsub fan-out over
// a single versioned topic. The swarm runs on its own task; the rest of the
// node talks to it through the command channel and reads inbound frames from
// the mpsc receiver returned by `start`.

use crate::error::{BlockchainError, Result};
use crate::network::WireMessage;
use futures::StreamExt;
use libp2p::core::muxing::StreamMuxerBox;
use libp2p::gossipsub::{
    self, AllowAllSubscriptionFilter, Behaviour as Gossipsub, Event as GossipsubEvent, IdentTopic,
    IdentityTransform, MessageAuthenticity,
};
use libp2p::swarm::SwarmEvent;
use libp2p::{identity, quic, Multiaddr, PeerId, Swarm, Transport};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

/// Protocol identity; peers only exchange frames published under this topic.
pub const PROTOCOL_VERSION: &str = "/emberchain/1.0.0";

/// Snapshot of the peer layer for external queries.
#[derive(Debug, Clone, Serialize)]
pub struct PeerInfo {
    pub peer_id: String,
    pub listen_addrs: Vec<String>,
    pub connected_peers: usize,
}

#[derive(Debug, Default)]
struct PeerState {
    listen_addrs: Vec<String>,
    connected: HashSet<PeerId>,
}

#[derive(Debug)]
enum PeerCommand {
    Broadcast(WireMessage),
    Shutdown,
}

/// Handle to a running peer service.
#[derive(Clone)]
pub struct PeerHandle {
    command_tx: mpsc::UnboundedSender<PeerCommand>,
    peer_id: PeerId,
    state: Arc<RwLock<PeerState>>,
}

impl PeerHandle {
    /// Queue a frame for delivery to every connected peer. Fire-and-forget:
    /// serialization happens once on the swarm task and per-peer delivery is
    /// the gossip layer's problem, so one slow peer cannot stall another.
    pub fn broadcast(&self, message: WireMessage) {
        let _ = self.command_tx.send(PeerCommand::Broadcast(message));
    }

    pub fn peer_info(&self) -> PeerInfo {
        let state = self
            .state
            .read()
            .expect("Failed to acquire read lock on peer state - this should never happen");
        PeerInfo {
            peer_id: self.peer_id.to_string(),
            listen_addrs: state.listen_addrs.clone(),
            connected_peers: state.connected.len(),
        }
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(PeerCommand::Shutdown);
    }
}

pub struct PeerService;

impl PeerService {
    /// Bring up the transport, subscribe to the protocol topic, dial every
    /// bootstrap peer and spawn the swarm event loop. A node may run with no
    /// listen address (outbound-only); dial failures are logged and do not
    /// abort startup.
    ///
    /// Returns the handle plus the stream of inbound frames. Malformed
    /// inbound frames are dropped before they reach the receiver.
    pub fn start(
        listen: Option<String>,
        bootstrap: Vec<String>,
    ) -> Result<(PeerHandle, mpsc::UnboundedReceiver<WireMessage>)> {
        let id_keys = identity::Keypair::generate_ed25519();
        let peer_id = PeerId::from(id_keys.public());
        info!("Local peer id: {peer_id}");

        let transport = quic::tokio::Transport::new(quic::Config::new(&id_keys))
            .map(|(peer_id, muxer), _| (peer_id, StreamMuxerBox::new(muxer)))
            .boxed();

        let gossipsub_config = gossipsub::ConfigBuilder::default()
            .heartbeat_interval(Duration::from_secs(1))
            .validation_mode(gossipsub::ValidationMode::Permissive)
            .mesh_n_low(0)
            .mesh_outbound_min(0)
            .flood_publish(true)
            .build()
            .map_err(|e| BlockchainError::Network(format!("Invalid gossipsub config: {e}")))?;

        let mut behaviour: Gossipsub<IdentityTransform, AllowAllSubscriptionFilter> =
            Gossipsub::new(MessageAuthenticity::Signed(id_keys.clone()), gossipsub_config)
                .map_err(|e| BlockchainError::Network(format!("Failed to build gossipsub: {e}")))?;

        let topic = IdentTopic::new(PROTOCOL_VERSION);
        behaviour
            .subscribe(&topic)
            .map_err(|e| BlockchainError::Network(format!("Failed to subscribe to topic: {e}")))?;

        let mut swarm = Swarm::new(
            transport,
            behaviour,
            peer_id,
            libp2p::swarm::Config::with_tokio_executor()
                .with_idle_connection_timeout(Duration::from_secs(60)),
        );

        if let Some(addr) = listen.as_deref() {
            let listen_addr: Multiaddr = addr.parse().map_err(|e| {
                BlockchainError::Network(format!("Invalid listen address {addr}: {e}"))
            })?;
            swarm.listen_on(listen_addr).map_err(|e| {
                BlockchainError::Network(format!("Failed to listen on {addr}: {e}"))
            })?;
        }

        for addr in &bootstrap {
            match addr.parse::<Multiaddr>() {
                Ok(multiaddr) => {
                    info!("Dialing bootstrap peer: {addr}");
                    if let Err(e) = swarm.dial(multiaddr) {
                        warn!("Failed to dial bootstrap peer {addr}: {e}");
                    }
                }
                Err(e) => warn!("Invalid bootstrap address {addr}: {e}"),
            }
        }

        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(PeerState::default()));
        let loop_state = Arc::clone(&state);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = swarm.select_next_some() => match event {
                        SwarmEvent::NewListenAddr { address, .. } => {
                            info!("Listening on {address}");
                            loop_state
                                .write()
                                .expect("Failed to acquire write lock on peer state - this should never happen")
                                .listen_addrs
                                .push(address.to_string());
                        }
                        SwarmEvent::ConnectionEstablished { peer_id, .. } => {
                            info!("Connected to peer: {peer_id}");
                            loop_state
                                .write()
                                .expect("Failed to acquire write lock on peer state - this should never happen")
                                .connected
                                .insert(peer_id);
                        }
                        SwarmEvent::ConnectionClosed { peer_id, cause, .. } => {
                            info!("Disconnected from peer {peer_id}: {cause:?}");
                            loop_state
                                .write()
                                .expect("Failed to acquire write lock on peer state - this should never happen")
                                .connected
                                .remove(&peer_id);
                        }
                        SwarmEvent::Behaviour(GossipsubEvent::Message { message, .. }) => {
                            if message.topic.as_str() != PROTOCOL_VERSION {
                                continue;
                            }
                            match serde_json::from_slice::<WireMessage>(&message.data) {
                                Ok(frame) => {
                                    if inbound_tx.send(frame).is_err() {
                                        // Receiver gone: the node is shutting down
                                        break;
                                    }
                                }
                                Err(e) => {
                                    debug!("Dropping malformed frame from {:?}: {e}", message.source);
                                }
                            }
                        }
                        _ => {}
                    },
                    command = command_rx.recv() => match command {
                        Some(PeerCommand::Broadcast(message)) => {
                            match serde_json::to_vec(&message) {
                                Ok(data) => {
                                    if let Err(e) =
                                        swarm.behaviour_mut().publish(topic.clone(), data)
                                    {
                                        if !matches!(e, gossipsub::PublishError::InsufficientPeers) {
                                            warn!("Failed to publish {} frame: {e}", message.kind());
                                        }
                                    }
                                }
                                Err(e) => warn!("Failed to encode outbound frame: {e}"),
                            }
                        }
                        Some(PeerCommand::Shutdown) | None => {
                            info!("Peer service stopped");
                            break;
                        }
                    },
                }
            }
        });

        Ok((
            PeerHandle {
                command_tx,
                peer_id,
                state,
            },
            inbound_rx,
        ))
    }
}
