//! Decentralized Chat
//!
//! Messaging between registry participants, persisted redundantly to
//! three stores with no central authority:
//!
//! - [`store`]: local SQLite cache (always available)
//! - [`sync`]: cloud snapshots on the pinning service (best-effort backup)
//! - [`p2p`]: gossipsub append-only log (peer delivery)
//!
//! [`merge`] reconciles the partial views: dedup by stable id or a coarse
//! (sender, content, time-bucket) key, last-write-wins by arrival order,
//! output sorted by timestamp. A failing store degrades the status flag,
//! never the data the other stores already delivered.

pub mod merge;
pub mod message;
pub mod p2p;
pub mod store;
pub mod sync;

pub use merge::{merge_sources, merge_two};
pub use message::{conversation_id, conversation_partner, ChatEnvelope, ChatMessage};
pub use p2p::{P2pChat, P2pCommand, P2pError, P2pEvent, P2pHandle, DEFAULT_TOPIC};
pub use store::{ChatStore, InboxEntry, StoreError};
pub use sync::{BackupStatus, ChatSyncConfig, ChatSyncManager, ChatSyncState, SyncStatus};
