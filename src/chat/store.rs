//! Local Chat Store
//!
//! SQLite cache of messages and read marks. This is the fastest of the
//! three chat sources and the only one that is always available; it is
//! not authoritative — reconciliation treats it as just another partial
//! view.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

use super::message::{conversation_partner, ChatMessage};

/// Errors from the local chat store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One conversation preview in a user's inbox
#[derive(Debug, Clone, serde::Serialize)]
pub struct InboxEntry {
    /// The other participant's wallet address
    pub partner: String,
    pub last_message: String,
    /// Timestamp of the last message, ms since epoch
    pub last_timestamp: i64,
    /// Messages from the partner not yet marked read
    pub unread: u64,
}

/// SQLite-backed message cache.
///
/// The connection is guarded by a mutex; all statements are short.
pub struct ChatStore {
    conn: Mutex<Connection>,
}

impl ChatStore {
    /// Open (and migrate) the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS messages (
                key          TEXT PRIMARY KEY,
                conversation TEXT NOT NULL,
                msg_id       TEXT NOT NULL,
                sender       TEXT NOT NULL,
                content      TEXT NOT NULL,
                timestamp    INTEGER NOT NULL,
                read         INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_messages_conversation
                ON messages (conversation, timestamp);",
        )?;
        Ok(())
    }

    /// Insert or overwrite a message, keyed by its dedup key
    pub fn upsert(&self, conversation: &str, message: &ChatMessage) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO messages (key, conversation, msg_id, sender, content, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(key) DO UPDATE SET
                msg_id = excluded.msg_id,
                sender = excluded.sender,
                content = excluded.content,
                timestamp = excluded.timestamp",
            params![
                message.dedup_key(),
                conversation,
                message.id,
                message.sender.to_lowercase(),
                message.content,
                message.timestamp,
            ],
        )?;
        Ok(())
    }

    /// Write back a merged conversation view
    pub fn upsert_all(
        &self,
        conversation: &str,
        messages: &[ChatMessage],
    ) -> Result<(), StoreError> {
        for message in messages {
            self.upsert(conversation, message)?;
        }
        Ok(())
    }

    /// All cached messages of a conversation, ascending by timestamp
    pub fn conversation(&self, conversation: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT msg_id, sender, content, timestamp
             FROM messages
             WHERE conversation = ?1
             ORDER BY timestamp ASC, key ASC",
        )?;

        let rows = stmt.query_map(params![conversation], |row| {
            Ok(ChatMessage {
                id: row.get(0)?,
                sender: row.get(1)?,
                content: row.get(2)?,
                timestamp: row.get(3)?,
            })
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Every conversation id present in the store
    pub fn conversations(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT DISTINCT conversation FROM messages ORDER BY conversation")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Inbox preview for one user: each conversation they participate in,
    /// its last message, and the unread count.
    pub fn inbox(&self, owner: &str) -> Result<Vec<InboxEntry>, StoreError> {
        let owner = owner.to_lowercase();
        let mut entries = Vec::new();

        for conversation in self.conversations()? {
            let Some(partner) = conversation_partner(&conversation, &owner) else {
                continue;
            };

            let conn = self.conn.lock().unwrap();
            let (last_message, last_timestamp) = conn.query_row(
                "SELECT content, timestamp FROM messages
                 WHERE conversation = ?1
                 ORDER BY timestamp DESC, key DESC LIMIT 1",
                params![conversation],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )?;

            let unread: u64 = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE conversation = ?1 AND sender != ?2 AND read = 0",
                params![conversation, owner],
                |row| row.get(0),
            )?;

            entries.push(InboxEntry {
                partner,
                last_message,
                last_timestamp,
                unread,
            });
        }

        entries.sort_by(|a, b| b.last_timestamp.cmp(&a.last_timestamp));
        Ok(entries)
    }

    /// Mark every message the partner sent in this conversation as read
    pub fn mark_read(&self, conversation: &str, owner: &str) -> Result<u64, StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE messages SET read = 1
             WHERE conversation = ?1 AND sender != ?2 AND read = 0",
            params![conversation, owner.to_lowercase()],
        )?;
        Ok(changed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::message::conversation_id;

    fn msg(id: &str, sender: &str, content: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            sender: sender.to_string(),
            content: content.to_string(),
            timestamp,
        }
    }

    #[test]
    fn upsert_and_read_back_ordered() {
        let store = ChatStore::in_memory().unwrap();
        let conv = conversation_id("0xaa", "0xbb");

        store.upsert(&conv, &msg("m2", "0xbb", "hi", 2_000)).unwrap();
        store
            .upsert(&conv, &msg("m1", "0xaa", "hello", 1_000))
            .unwrap();

        let messages = store.conversation(&conv).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[1].id, "m2");
    }

    #[test]
    fn upsert_same_key_overwrites() {
        let store = ChatStore::in_memory().unwrap();
        let conv = conversation_id("0xaa", "0xbb");

        store
            .upsert(&conv, &msg("m1", "0xaa", "hello", 1_000))
            .unwrap();
        store
            .upsert(&conv, &msg("m1", "0xaa", "hello", 1_500))
            .unwrap();

        let messages = store.conversation(&conv).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].timestamp, 1_500);
    }

    #[test]
    fn inbox_reports_partner_and_unread() {
        let store = ChatStore::in_memory().unwrap();
        let conv = conversation_id("0xaa", "0xbb");

        store
            .upsert(&conv, &msg("m1", "0xbb", "hello", 1_000))
            .unwrap();
        store
            .upsert(&conv, &msg("m2", "0xbb", "you there?", 2_000))
            .unwrap();
        store.upsert(&conv, &msg("m3", "0xaa", "yes", 3_000)).unwrap();

        let inbox = store.inbox("0xAA").unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].partner, "0xbb");
        assert_eq!(inbox[0].last_message, "yes");
        assert_eq!(inbox[0].unread, 2);

        store.mark_read(&conv, "0xaa").unwrap();
        let inbox = store.inbox("0xaa").unwrap();
        assert_eq!(inbox[0].unread, 0);
    }

    #[test]
    fn inbox_skips_foreign_conversations() {
        let store = ChatStore::in_memory().unwrap();
        let conv = conversation_id("0xbb", "0xcc");
        store.upsert(&conv, &msg("m1", "0xbb", "hey", 1_000)).unwrap();

        assert!(store.inbox("0xaa").unwrap().is_empty());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let conv = conversation_id("0xaa", "0xbb");

        {
            let store = ChatStore::open(&path).unwrap();
            store
                .upsert(&conv, &msg("m1", "0xaa", "hello", 1_000))
                .unwrap();
        }

        let store = ChatStore::open(&path).unwrap();
        assert_eq!(store.conversation(&conv).unwrap().len(), 1);
    }
}
