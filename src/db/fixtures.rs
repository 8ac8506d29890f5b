//! Test fixtures: a throwaway messages.db with the bridge schema.

use rusqlite::{params, Connection};
use tempfile::TempDir;

use super::connection::Store;

const SCHEMA: &str = r#"
CREATE TABLE chats (
    jid TEXT PRIMARY KEY,
    name TEXT,
    last_message_time TIMESTAMP
);
CREATE TABLE messages (
    id TEXT,
    chat_jid TEXT,
    sender TEXT,
    content TEXT,
    timestamp TIMESTAMP,
    is_from_me BOOLEAN,
    media_type TEXT,
    PRIMARY KEY (id, chat_jid),
    FOREIGN KEY (chat_jid) REFERENCES chats(jid)
);
CREATE TABLE reactions (
    target_message_id TEXT,
    target_chat_jid TEXT,
    reactor_sender TEXT,
    reaction_text TEXT,
    timestamp TIMESTAMP,
    PRIMARY KEY (target_message_id, target_chat_jid, reactor_sender)
);
"#;

pub(crate) struct Fixture {
    _dir: TempDir,
    store: Store,
    conn: Connection,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_schema(SCHEMA)
    }

    /// Store without a reactions table (older bridge versions).
    pub(crate) fn without_reactions() -> Self {
        let schema = SCHEMA
            .split("CREATE TABLE reactions")
            .next()
            .unwrap_or(SCHEMA);
        Self::with_schema(schema)
    }

    fn with_schema(schema: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(schema).unwrap();
        Self {
            _dir: dir,
            store: Store::new(path),
            conn,
        }
    }

    pub(crate) fn store(&self) -> Store {
        self.store.clone()
    }

    pub(crate) fn chat(&self, jid: &str, name: Option<&str>) -> &Self {
        self.conn
            .execute(
                "INSERT INTO chats (jid, name, last_message_time) VALUES (?1, ?2, NULL)",
                params![jid, name],
            )
            .unwrap();
        self
    }

    /// Insert a message and bump the chat's last_message_time when newer.
    pub(crate) fn message(
        &self,
        id: &str,
        chat_jid: &str,
        sender: &str,
        content: &str,
        timestamp: &str,
        is_from_me: bool,
    ) -> &Self {
        self.media_message(id, chat_jid, sender, content, timestamp, is_from_me, None)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn media_message(
        &self,
        id: &str,
        chat_jid: &str,
        sender: &str,
        content: &str,
        timestamp: &str,
        is_from_me: bool,
        media_type: Option<&str>,
    ) -> &Self {
        self.conn
            .execute(
                "INSERT INTO messages (id, chat_jid, sender, content, timestamp, is_from_me, media_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, chat_jid, sender, content, timestamp, is_from_me, media_type],
            )
            .unwrap();
        self.conn
            .execute(
                "UPDATE chats SET last_message_time = ?2
                 WHERE jid = ?1 AND (last_message_time IS NULL OR last_message_time < ?2)",
                params![chat_jid, timestamp],
            )
            .unwrap();
        self
    }

    pub(crate) fn reaction(
        &self,
        message_id: &str,
        chat_jid: &str,
        reactor: &str,
        text: &str,
        timestamp: &str,
    ) -> &Self {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO reactions
                 (target_message_id, target_chat_jid, reactor_sender, reaction_text, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![message_id, chat_jid, reactor, text, timestamp],
            )
            .unwrap();
        self
    }
}
