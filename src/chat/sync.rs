//! Chat Sync Manager
//!
//! Ties the three chat stores together: the local SQLite cache, the
//! pinned cloud snapshots, and the p2p log. Reads reconcile local and
//! cloud through [`merge_sources`]; sends go local-first, then gossip;
//! a background task periodically pins per-conversation and per-user
//! snapshots as the cloud backup.
//!
//! Any individual source may fail or time out without blocking the
//! others. Failures surface only through the sync status flag.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::pinning::{GatewayClient, PinningClient, PinningError};

use super::merge::merge_sources;
use super::message::{conversation_id, ChatEnvelope, ChatMessage};
use super::p2p::P2pHandle;
use super::store::{ChatStore, InboxEntry, StoreError};

/// Connection status the UI shows for the chat subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No successful sync yet
    Connecting,
    /// Last sync cycle completed against every configured source
    Synced,
    /// At least one source failed on the last cycle
    Error,
}

/// Current state of the chat sync subsystem
#[derive(Debug, Clone, Serialize)]
pub struct ChatSyncState {
    pub status: SyncStatus,
    /// Timestamp of the last completed cloud backup, ms since epoch;
    /// zero when none has run
    pub last_backup_timestamp: i64,
    pub last_error: Option<String>,
}

impl Default for ChatSyncState {
    fn default() -> Self {
        Self {
            status: SyncStatus::Connecting,
            last_backup_timestamp: 0,
            last_error: None,
        }
    }
}

/// Outcome of one backup cycle
#[derive(Debug, Clone, Serialize)]
pub struct BackupStatus {
    pub conversations_pinned: u32,
    pub inboxes_pinned: u32,
    pub failures: u32,
    pub duration_ms: u64,
}

/// Configuration for sync behavior
#[derive(Debug, Clone)]
pub struct ChatSyncConfig {
    /// How often to push cloud backups (seconds)
    pub backup_interval_secs: u64,
    /// Whether the periodic backup runs at all
    pub backup_enabled: bool,
}

impl Default for ChatSyncConfig {
    fn default() -> Self {
        Self {
            backup_interval_secs: 300,
            backup_enabled: true,
        }
    }
}

/// Coordinates the chat stores
pub struct ChatSyncManager {
    store: Arc<ChatStore>,
    pinning: Option<Arc<PinningClient>>,
    gateway: Option<Arc<GatewayClient>>,
    p2p: Option<P2pHandle>,
    state: Arc<RwLock<ChatSyncState>>,
    config: ChatSyncConfig,
}

impl ChatSyncManager {
    /// Create a manager. `pinning`/`gateway` absent means local-only
    /// mode; `p2p` absent means no gossip leg.
    pub fn new(
        store: Arc<ChatStore>,
        pinning: Option<Arc<PinningClient>>,
        gateway: Option<Arc<GatewayClient>>,
        p2p: Option<P2pHandle>,
        config: ChatSyncConfig,
    ) -> Self {
        Self {
            store,
            pinning,
            gateway,
            p2p,
            state: Arc::new(RwLock::new(ChatSyncState::default())),
            config,
        }
    }

    /// Snapshot of the current sync state
    pub async fn state(&self) -> ChatSyncState {
        self.state.read().await.clone()
    }

    /// True when a cloud backup target is configured
    pub fn has_cloud(&self) -> bool {
        self.pinning.is_some()
    }

    /// Metadata name the cloud snapshot of a conversation is pinned under
    pub fn snapshot_name(conversation: &str) -> String {
        format!("landledger-chat-{conversation}")
    }

    /// Metadata name a user's inbox snapshot is pinned under
    pub fn inbox_name(owner: &str) -> String {
        format!("landledger-inbox-{}", owner.to_lowercase())
    }

    /// Send a message: cache it locally, append to the p2p log, and
    /// return the envelope for fan-out. Cloud backup happens on the
    /// periodic cycle.
    pub async fn send(&self, from: &str, to: &str, content: &str) -> Result<ChatEnvelope, StoreError> {
        let conversation = conversation_id(from, to);
        let message = ChatMessage::new(from, content);

        self.store.upsert(&conversation, &message)?;

        let envelope = ChatEnvelope {
            conversation,
            message,
        };

        if let Some(p2p) = &self.p2p {
            if let Err(e) = p2p.publish(envelope.clone()).await {
                // Gossip is one of three legs; losing it is not fatal
                tracing::warn!(error = %e, "P2P publish failed; message kept locally");
                self.note_error(e.to_string()).await;
            }
        }

        Ok(envelope)
    }

    /// A message arrived from the p2p log
    pub async fn handle_incoming(&self, envelope: &ChatEnvelope) {
        if let Err(e) = self.store.upsert(&envelope.conversation, &envelope.message) {
            tracing::warn!(error = %e, "Failed to cache incoming p2p message");
            self.note_error(e.to_string()).await;
        }
    }

    /// Reconciled view of a conversation: local cache merged with the
    /// latest cloud snapshot. A failing source contributes nothing and
    /// flips the status flag; it never hides the other source's data.
    pub async fn conversation(&self, a: &str, b: &str) -> Vec<ChatMessage> {
        let conversation = conversation_id(a, b);
        let mut degraded = false;

        let local = match self.store.conversation(&conversation) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(error = %e, "Local chat store read failed");
                degraded = true;
                Vec::new()
            }
        };

        let cloud = match self.restore(&conversation).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(conversation = %conversation, error = %e, "Cloud snapshot fetch failed");
                self.note_error(e.to_string()).await;
                degraded = true;
                Vec::new()
            }
        };

        let merged = merge_sources([local, cloud]);

        // Write the merged view back so the cache converges
        if let Err(e) = self.store.upsert_all(&conversation, &merged) {
            tracing::warn!(error = %e, "Failed to persist merged conversation");
        }

        if !degraded {
            self.note_synced().await;
        }

        merged
    }

    /// Inbox preview for one user, from the local cache
    pub fn inbox(&self, owner: &str) -> Result<Vec<InboxEntry>, StoreError> {
        self.store.inbox(owner)
    }

    /// Mark a conversation read for one side
    pub fn mark_read(&self, a: &str, b: &str, owner: &str) -> Result<u64, StoreError> {
        self.store.mark_read(&conversation_id(a, b), owner)
    }

    /// Pull the latest pinned snapshot of a conversation. Empty when no
    /// cloud is configured or nothing was ever pinned.
    async fn restore(&self, conversation: &str) -> Result<Vec<ChatMessage>, PinningError> {
        let (Some(pinning), Some(gateway)) = (&self.pinning, &self.gateway) else {
            return Ok(Vec::new());
        };

        let Some(cid) = pinning
            .find_latest_by_name(&Self::snapshot_name(conversation))
            .await?
        else {
            return Ok(Vec::new());
        };

        let document = gateway.fetch_json(&cid).await?;
        let messages = document
            .get("messages")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        Ok(serde_json::from_value(messages).unwrap_or_default())
    }

    /// Push one backup cycle: a snapshot per conversation and an inbox
    /// document per participant. Individual failures are counted, not
    /// propagated.
    pub async fn backup(&self) -> BackupStatus {
        let start = std::time::Instant::now();
        let mut status = BackupStatus {
            conversations_pinned: 0,
            inboxes_pinned: 0,
            failures: 0,
            duration_ms: 0,
        };

        let Some(pinning) = &self.pinning else {
            tracing::debug!("No pinning service configured; skipping backup");
            status.duration_ms = start.elapsed().as_millis() as u64;
            return status;
        };

        let conversations = match self.store.conversations() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot enumerate conversations for backup");
                self.note_error(e.to_string()).await;
                status.failures += 1;
                status.duration_ms = start.elapsed().as_millis() as u64;
                return status;
            }
        };

        let mut owners: Vec<String> = Vec::new();

        for conversation in &conversations {
            for side in conversation.split(':') {
                if !owners.iter().any(|o| o == side) {
                    owners.push(side.to_string());
                }
            }

            let messages = match self.store.conversation(conversation) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(conversation = %conversation, error = %e, "Skipping conversation backup");
                    status.failures += 1;
                    continue;
                }
            };

            let snapshot = json!({
                "conversation": conversation,
                "messages": messages,
            });

            match pinning
                .replace_json(&Self::snapshot_name(conversation), &snapshot)
                .await
            {
                Ok(cid) => {
                    tracing::debug!(conversation = %conversation, cid = %cid, "Conversation snapshot pinned");
                    status.conversations_pinned += 1;
                }
                Err(e) => {
                    tracing::warn!(conversation = %conversation, error = %e, "Conversation backup failed");
                    status.failures += 1;
                }
            }
        }

        for owner in owners {
            let entries = match self.store.inbox(&owner) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(owner = %owner, error = %e, "Skipping inbox backup");
                    status.failures += 1;
                    continue;
                }
            };

            let snapshot = json!({
                "owner": owner,
                "entries": entries,
            });

            match pinning
                .replace_json(&Self::inbox_name(&owner), &snapshot)
                .await
            {
                Ok(_) => status.inboxes_pinned += 1,
                Err(e) => {
                    tracing::warn!(owner = %owner, error = %e, "Inbox backup failed");
                    status.failures += 1;
                }
            }
        }

        status.duration_ms = start.elapsed().as_millis() as u64;

        let mut state = self.state.write().await;
        state.last_backup_timestamp = Utc::now().timestamp_millis();
        if status.failures == 0 {
            state.status = SyncStatus::Synced;
            state.last_error = None;
        } else {
            state.status = SyncStatus::Error;
            state.last_error = Some(format!("{} backup failures", status.failures));
        }

        status
    }

    /// Start the periodic cloud backup task
    pub fn start_background_backup(self: Arc<Self>) {
        if !self.config.backup_enabled || self.pinning.is_none() {
            tracing::info!("Chat cloud backup disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.backup_interval_secs,
            "Starting chat backup task"
        );

        tokio::spawn(async move {
            let interval = std::time::Duration::from_secs(self.config.backup_interval_secs);
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let status = self.backup().await;
                tracing::info!(
                    conversations = status.conversations_pinned,
                    inboxes = status.inboxes_pinned,
                    failures = status.failures,
                    duration_ms = status.duration_ms,
                    "Chat backup cycle completed"
                );
            }
        });
    }

    async fn note_error(&self, message: String) {
        let mut state = self.state.write().await;
        state.status = SyncStatus::Error;
        state.last_error = Some(message);
    }

    async fn note_synced(&self) {
        let mut state = self.state.write().await;
        state.status = SyncStatus::Synced;
        state.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_only() -> ChatSyncManager {
        ChatSyncManager::new(
            Arc::new(ChatStore::in_memory().unwrap()),
            None,
            None,
            None,
            ChatSyncConfig::default(),
        )
    }

    #[tokio::test]
    async fn starts_in_connecting_state() {
        let sync = local_only();
        assert_eq!(sync.state().await.status, SyncStatus::Connecting);
    }

    #[tokio::test]
    async fn send_then_read_back_local_only() {
        let sync = local_only();

        sync.send("0xAA", "0xBB", "hello").await.unwrap();
        sync.send("0xBB", "0xAA", "hi yourself").await.unwrap();

        let messages = sync.conversation("0xaa", "0xbb").await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].content, "hi yourself");

        // Both sources (local, absent cloud) succeeded
        assert_eq!(sync.state().await.status, SyncStatus::Synced);
    }

    #[tokio::test]
    async fn incoming_p2p_envelope_lands_in_store() {
        let sync = local_only();

        let envelope = ChatEnvelope {
            conversation: conversation_id("0xaa", "0xbb"),
            message: ChatMessage {
                id: "m-p2p".to_string(),
                sender: "0xbb".to_string(),
                content: "from gossip".to_string(),
                timestamp: 5_000,
            },
        };
        sync.handle_incoming(&envelope).await;

        let messages = sync.conversation("0xaa", "0xbb").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "m-p2p");
    }

    #[tokio::test]
    async fn duplicate_delivery_across_legs_collapses() {
        let sync = local_only();

        let envelope = sync.send("0xaa", "0xbb", "hello").await.unwrap();
        // The same message echoed back through the p2p log
        sync.handle_incoming(&envelope).await;

        let messages = sync.conversation("0xaa", "0xbb").await;
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn inbox_tracks_unread_per_side() {
        let sync = local_only();

        sync.send("0xaa", "0xbb", "ping").await.unwrap();

        let inbox_b = sync.inbox("0xbb").unwrap();
        assert_eq!(inbox_b.len(), 1);
        assert_eq!(inbox_b[0].unread, 1);

        sync.mark_read("0xaa", "0xbb", "0xbb").unwrap();
        assert_eq!(sync.inbox("0xbb").unwrap()[0].unread, 0);

        // Sender's own side was never unread
        assert_eq!(sync.inbox("0xaa").unwrap()[0].unread, 0);
    }

    #[tokio::test]
    async fn backup_without_cloud_is_a_noop() {
        let sync = local_only();
        sync.send("0xaa", "0xbb", "hello").await.unwrap();

        let status = sync.backup().await;
        assert_eq!(status.conversations_pinned, 0);
        assert_eq!(status.failures, 0);
    }

    #[test]
    fn snapshot_names_are_deterministic() {
        assert_eq!(
            ChatSyncManager::snapshot_name("0xaa:0xbb"),
            "landledger-chat-0xaa:0xbb"
        );
        assert_eq!(
            ChatSyncManager::inbox_name("0xAA"),
            "landledger-inbox-0xaa"
        );
    }
}
