//! Chat Message Types
//!
//! Messages are immutable once sent and may arrive from any of three
//! stores (local cache, pinned cloud snapshot, p2p log), so identity
//! matters more than provenance: every message maps to a dedup key that
//! is stable across stores.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of the coarse bucket used for synthetic keys, in milliseconds.
/// Near-simultaneous duplicate writes of the same message from different
/// stores land in the same bucket and collapse.
const DEDUP_BUCKET_MS: i64 = 10_000;

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable id assigned at send time; may be empty for messages that
    /// came back from a store that dropped it
    #[serde(default)]
    pub id: String,
    /// Sender wallet address, 0x-prefixed hex
    pub sender: String,
    pub content: String,
    /// Milliseconds since epoch
    pub timestamp: i64,
}

impl ChatMessage {
    /// Build a new outbound message stamped with a fresh id and now
    pub fn new(sender: &str, content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.to_lowercase(),
            content: content.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Key used for cross-store deduplication.
    ///
    /// The stable id wins when present; otherwise a synthetic key is
    /// derived from (sender, content, coarse time bucket) so the same
    /// message written to two stores without an id still collapses.
    pub fn dedup_key(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }

        let bucket = self.timestamp.div_euclid(DEDUP_BUCKET_MS);
        let mut hasher = Sha256::new();
        hasher.update(self.sender.to_lowercase().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.content.as_bytes());
        hasher.update([0u8]);
        hasher.update(bucket.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Envelope carried on the p2p topic: the conversation a message belongs
/// to plus the message itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub conversation: String,
    pub message: ChatMessage,
}

/// Canonical conversation id for a pair of wallets: lowercased, sorted,
/// colon-joined. Both participants derive the same id.
pub fn conversation_id(a: &str, b: &str) -> String {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

/// The other participant of a conversation, from one side's address
pub fn conversation_partner(conversation: &str, me: &str) -> Option<String> {
    let me = me.to_lowercase();
    let (a, b) = conversation.split_once(':')?;
    if a == me {
        Some(b.to_string())
    } else if b == me {
        Some(a.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_wins_over_synthetic() {
        let mut msg = ChatMessage::new("0xAA", "hello");
        assert_eq!(msg.dedup_key(), msg.id);

        msg.id.clear();
        assert_ne!(msg.dedup_key(), "");
        assert_eq!(msg.dedup_key().len(), 64);
    }

    #[test]
    fn same_bucket_same_key() {
        let a = ChatMessage {
            id: String::new(),
            sender: "0xaa".into(),
            content: "hi".into(),
            timestamp: 1_700_000_001_000,
        };
        let b = ChatMessage {
            // 4 seconds later, same 10s bucket
            timestamp: 1_700_000_005_000,
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn different_bucket_different_key() {
        let a = ChatMessage {
            id: String::new(),
            sender: "0xaa".into(),
            content: "hi".into(),
            timestamp: 1_700_000_001_000,
        };
        let b = ChatMessage {
            timestamp: 1_700_000_011_000,
            ..a.clone()
        };
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn synthetic_key_ignores_sender_case() {
        let a = ChatMessage {
            id: String::new(),
            sender: "0xAB".into(),
            content: "hi".into(),
            timestamp: 1_700_000_001_000,
        };
        let b = ChatMessage {
            sender: "0xab".into(),
            ..a.clone()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn conversation_id_is_order_independent() {
        let id = conversation_id("0xBB", "0xaa");
        assert_eq!(id, conversation_id("0xAA", "0xbb"));
        assert_eq!(id, "0xaa:0xbb");
    }

    #[test]
    fn partner_resolution() {
        let id = conversation_id("0xaa", "0xbb");
        assert_eq!(conversation_partner(&id, "0xAA").as_deref(), Some("0xbb"));
        assert_eq!(conversation_partner(&id, "0xbb").as_deref(), Some("0xaa"));
        assert!(conversation_partner(&id, "0xcc").is_none());
    }
}
