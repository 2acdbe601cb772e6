//! WebSocket Message Types
//!
//! Message types for the live chat stream between dashboard clients and
//! the service. Clients subscribe to conversation topics
//! (`chat.<conversation-id>`, or `chat.*` for all of them) and receive
//! messages as they are stored, whether sent through this service or
//! gossiped in from a peer.

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for real-time updates
    Subscribe {
        /// Topics to subscribe to (e.g., "chat.0xaa:0xbb", "chat.*")
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe {
        /// Topics to unsubscribe from
        topics: Vec<String>,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A chat message was stored
    Chat {
        /// Canonical conversation id
        conversation: String,
        message: ChatMessage,
    },
    /// A p2p peer joined or left the chat log
    Peer {
        peer_id: String,
        connected: bool,
    },
    /// Subscription confirmed
    Subscribed { topics: Vec<String> },
    /// Unsubscription confirmed
    Unsubscribed { topics: Vec<String> },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
    /// Connection established
    Connected { connection_id: String },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "chat.0xaa:0xbb")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    /// A stored chat message, addressed to its conversation topic
    pub fn chat(conversation: &str, message: ChatMessage) -> Self {
        Self {
            topic: format!("chat.{conversation}"),
            message: ServerMessage::Chat {
                conversation: conversation.to_string(),
                message,
            },
        }
    }

    /// A peer joining or leaving the p2p log
    pub fn peer(peer_id: &str, connected: bool) -> Self {
        Self {
            topic: "peers".to_string(),
            message: ServerMessage::Peer {
                peer_id: peer_id.to_string(),
                connected,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_event_topic_includes_conversation() {
        let event = WsEvent::chat("0xaa:0xbb", ChatMessage::new("0xaa", "hello"));
        assert_eq!(event.topic, "chat.0xaa:0xbb");
    }

    #[test]
    fn client_message_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "subscribe", "topics": ["chat.0xaa:0xbb"]}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { .. }));

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn server_message_serializes_tagged() {
        let json = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(json["type"], "pong");

        let json = serde_json::to_value(ServerMessage::Peer {
            peer_id: "12D3KooW".to_string(),
            connected: true,
        })
        .unwrap();
        assert_eq!(json["type"], "peer");
        assert_eq!(json["connected"], true);
    }
}
