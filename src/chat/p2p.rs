//! Peer-to-Peer Chat Log
//!
//! Decentralized leg of the chat persistence: a gossipsub topic carrying
//! conversation envelopes, with mDNS peer discovery. Semantics are those
//! of a replicated append-only log — publishing appends, every received
//! envelope is handed to the sync layer, which treats the stream as one
//! more partial source for reconciliation.
//!
//! The event loop owns the swarm; the rest of the service talks to it
//! through command/event channels.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use futures::StreamExt;
use libp2p::gossipsub::{self, IdentTopic};
use libp2p::swarm::{NetworkBehaviour, SwarmEvent};
use libp2p::{mdns, noise, tcp, yamux};
use thiserror::Error;
use tokio::sync::mpsc;

use super::message::ChatEnvelope;

/// Default gossipsub topic for chat envelopes
pub const DEFAULT_TOPIC: &str = "landledger-chat-v1";

/// Commands accepted by the p2p event loop
#[derive(Debug)]
pub enum P2pCommand {
    /// Append an envelope to the log
    Publish(ChatEnvelope),
}

/// Events emitted by the p2p event loop
#[derive(Debug)]
pub enum P2pEvent {
    /// An envelope arrived from a peer
    Envelope(ChatEnvelope),
    PeerDiscovered(String),
    PeerExpired(String),
    Listening(String),
}

/// Errors from the p2p layer
#[derive(Debug, Error)]
pub enum P2pError {
    #[error("Swarm setup failed: {0}")]
    Setup(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}

#[derive(NetworkBehaviour)]
struct ChatBehaviour {
    gossipsub: gossipsub::Behaviour,
    mdns: mdns::tokio::Behaviour,
}

/// Handle for appending to the log from anywhere in the service
#[derive(Clone)]
pub struct P2pHandle {
    command_tx: mpsc::Sender<P2pCommand>,
}

impl P2pHandle {
    /// Best-effort append. Returns an error only when the event loop is
    /// gone; gossip delivery itself is fire-and-forget.
    pub async fn publish(&self, envelope: ChatEnvelope) -> Result<(), P2pError> {
        self.command_tx
            .send(P2pCommand::Publish(envelope))
            .await
            .map_err(|e| P2pError::Publish(e.to_string()))
    }
}

/// The p2p event loop. Built once, then `run` consumes it.
pub struct P2pChat {
    topic: IdentTopic,
    command_rx: mpsc::Receiver<P2pCommand>,
    event_tx: mpsc::Sender<P2pEvent>,
}

impl P2pChat {
    /// Create the event loop plus the handle and event stream the rest of
    /// the service uses to talk to it.
    pub fn new(topic: &str) -> (Self, P2pHandle, mpsc::Receiver<P2pEvent>) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(256);

        (
            Self {
                topic: IdentTopic::new(topic),
                command_rx,
                event_tx,
            },
            P2pHandle { command_tx },
            event_rx,
        )
    }

    /// Drive the swarm until the command channel closes.
    pub async fn run(mut self) -> Result<(), P2pError> {
        let mut swarm = libp2p::SwarmBuilder::with_new_identity()
            .with_tokio()
            .with_tcp(
                tcp::Config::default(),
                noise::Config::new,
                yamux::Config::default,
            )
            .map_err(|e| P2pError::Setup(e.to_string()))?
            .with_dns()
            .map_err(|e| P2pError::Setup(e.to_string()))?
            .with_behaviour(|key| {
                // Content-address messages so identical envelopes gossiped
                // by two peers count once
                let message_id_fn = |message: &gossipsub::Message| {
                    let mut hasher = DefaultHasher::new();
                    message.data.hash(&mut hasher);
                    gossipsub::MessageId::from(hasher.finish().to_string())
                };

                let gossipsub_config = gossipsub::ConfigBuilder::default()
                    .heartbeat_interval(Duration::from_secs(10))
                    .validation_mode(gossipsub::ValidationMode::Strict)
                    .message_id_fn(message_id_fn)
                    .build()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

                let gossipsub = gossipsub::Behaviour::new(
                    gossipsub::MessageAuthenticity::Signed(key.clone()),
                    gossipsub_config,
                )?;

                let mdns = mdns::tokio::Behaviour::new(
                    mdns::Config::default(),
                    key.public().to_peer_id(),
                )?;

                Ok(ChatBehaviour { gossipsub, mdns })
            })
            .map_err(|e| P2pError::Setup(e.to_string()))?
            .with_swarm_config(|c| c.with_idle_connection_timeout(Duration::from_secs(60)))
            .build();

        swarm
            .behaviour_mut()
            .gossipsub
            .subscribe(&self.topic)
            .map_err(|e| P2pError::Setup(e.to_string()))?;

        swarm
            .listen_on(
                "/ip4/0.0.0.0/tcp/0"
                    .parse()
                    .map_err(|e: libp2p::multiaddr::Error| P2pError::Setup(e.to_string()))?,
            )
            .map_err(|e| P2pError::Setup(e.to_string()))?;

        tracing::info!(peer_id = %swarm.local_peer_id(), topic = %self.topic, "P2P chat log started");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command, &mut swarm),
                        None => break,
                    }
                }
                event = swarm.select_next_some() => {
                    self.handle_swarm_event(event, &mut swarm).await;
                }
            }
        }

        tracing::info!("P2P chat log stopped");
        Ok(())
    }

    fn handle_command(&self, command: P2pCommand, swarm: &mut libp2p::Swarm<ChatBehaviour>) {
        match command {
            P2pCommand::Publish(envelope) => match serde_json::to_vec(&envelope) {
                Ok(bytes) => {
                    if let Err(e) = swarm
                        .behaviour_mut()
                        .gossipsub
                        .publish(self.topic.clone(), bytes)
                    {
                        // InsufficientPeers is routine while alone on the
                        // topic; the cloud backup still covers the message
                        tracing::debug!(error = %e, "Gossip publish skipped");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize chat envelope");
                }
            },
        }
    }

    async fn handle_swarm_event(
        &self,
        event: SwarmEvent<ChatBehaviourEvent>,
        swarm: &mut libp2p::Swarm<ChatBehaviour>,
    ) {
        match event {
            SwarmEvent::Behaviour(ChatBehaviourEvent::Gossipsub(gossipsub::Event::Message {
                message,
                ..
            })) => match serde_json::from_slice::<ChatEnvelope>(&message.data) {
                Ok(envelope) => {
                    let _ = self.event_tx.send(P2pEvent::Envelope(envelope)).await;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring malformed gossip payload");
                }
            },
            SwarmEvent::Behaviour(ChatBehaviourEvent::Mdns(mdns::Event::Discovered(peers))) => {
                for (peer_id, _addr) in peers {
                    swarm.behaviour_mut().gossipsub.add_explicit_peer(&peer_id);
                    let _ = self
                        .event_tx
                        .send(P2pEvent::PeerDiscovered(peer_id.to_string()))
                        .await;
                }
            }
            SwarmEvent::Behaviour(ChatBehaviourEvent::Mdns(mdns::Event::Expired(peers))) => {
                for (peer_id, _addr) in peers {
                    swarm
                        .behaviour_mut()
                        .gossipsub
                        .remove_explicit_peer(&peer_id);
                    let _ = self
                        .event_tx
                        .send(P2pEvent::PeerExpired(peer_id.to_string()))
                        .await;
                }
            }
            SwarmEvent::NewListenAddr { address, .. } => {
                tracing::debug!(%address, "P2P listening");
                let _ = self
                    .event_tx
                    .send(P2pEvent::Listening(address.to_string()))
                    .await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::ChatMessage;

    #[test]
    fn envelope_round_trips_through_json() {
        let envelope = ChatEnvelope {
            conversation: "0xaa:0xbb".to_string(),
            message: ChatMessage {
                id: "m1".to_string(),
                sender: "0xaa".to_string(),
                content: "hello".to_string(),
                timestamp: 1_000,
            },
        };

        let bytes = serde_json::to_vec(&envelope).unwrap();
        let back: ChatEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.conversation, envelope.conversation);
        assert_eq!(back.message, envelope.message);
    }

    #[tokio::test]
    async fn handle_survives_loop_shutdown() {
        let (p2p, handle, _events) = P2pChat::new(DEFAULT_TOPIC);
        drop(p2p);

        let envelope = ChatEnvelope {
            conversation: "0xaa:0xbb".to_string(),
            message: ChatMessage::new("0xaa", "hello"),
        };
        assert!(handle.publish(envelope).await.is_err());
    }
}
