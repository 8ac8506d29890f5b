//! SQL for the bridge's messages.db.
//!
//! Base SELECTs here are extended by [`super::query::QuerySpec`]; the rest are
//! complete statements with positional parameters.
//!
//! CHANGELOG:
//! - 02/01/2026 - Reactions and contact-chat queries
//! - 01/28/2026 - Initial query constants

/// Message columns, in the order `helpers::message_from_row` reads them.
pub const MESSAGE_SELECT: &str = r#"
SELECT
    messages.timestamp,
    messages.sender,
    chats.name,
    messages.content,
    messages.is_from_me,
    chats.jid,
    messages.id,
    messages.media_type
FROM messages
JOIN chats ON messages.chat_jid = chats.jid
"#;

/// Chat columns without the last-message join.
pub const CHAT_SELECT: &str = r#"
SELECT
    chats.jid,
    chats.name,
    chats.last_message_time,
    NULL,
    NULL,
    NULL
FROM chats
"#;

/// Chat columns joined with the message at `last_message_time`.
///
/// The rowid subquery picks a single message even when two share a timestamp.
pub const CHAT_SELECT_WITH_LAST_MESSAGE: &str = r#"
SELECT
    chats.jid,
    chats.name,
    chats.last_message_time,
    messages.content,
    messages.sender,
    messages.is_from_me
FROM chats
LEFT JOIN messages ON messages.rowid = (
    SELECT m.rowid FROM messages m
    WHERE m.chat_jid = chats.jid
      AND m.timestamp = chats.last_message_time
    ORDER BY m.rowid DESC
    LIMIT 1
)
"#;

/// Contact columns (jid, name) from chats.
pub const CONTACT_SELECT: &str = r#"
SELECT
    chats.jid,
    chats.name
FROM chats
"#;

/// Look up a message by id, optionally pinned to a chat.
/// Parameters: ?1 = message id, ?2 = chat jid or NULL
/// Column 8 is the raw stored timestamp, used to bound the context windows.
pub const CONTEXT_TARGET: &str = r#"
SELECT
    messages.timestamp,
    messages.sender,
    chats.name,
    messages.content,
    messages.is_from_me,
    chats.jid,
    messages.id,
    messages.media_type,
    messages.timestamp
FROM messages
JOIN chats ON messages.chat_jid = chats.jid
WHERE messages.id = ?1
  AND (?2 IS NULL OR messages.chat_jid = ?2)
LIMIT 1
"#;

/// Messages strictly before the target, closest first.
/// Parameters: ?1 = chat jid, ?2 = target timestamp, ?3 = limit
pub const CONTEXT_BEFORE: &str = r#"
SELECT
    messages.timestamp,
    messages.sender,
    chats.name,
    messages.content,
    messages.is_from_me,
    chats.jid,
    messages.id,
    messages.media_type
FROM messages
JOIN chats ON messages.chat_jid = chats.jid
WHERE messages.chat_jid = ?1
  AND messages.timestamp < ?2
ORDER BY messages.timestamp DESC
LIMIT ?3
"#;

/// Messages strictly after the target, closest first.
/// Parameters: ?1 = chat jid, ?2 = target timestamp, ?3 = limit
pub const CONTEXT_AFTER: &str = r#"
SELECT
    messages.timestamp,
    messages.sender,
    chats.name,
    messages.content,
    messages.is_from_me,
    chats.jid,
    messages.id,
    messages.media_type
FROM messages
JOIN chats ON messages.chat_jid = chats.jid
WHERE messages.chat_jid = ?1
  AND messages.timestamp > ?2
ORDER BY messages.timestamp ASC
LIMIT ?3
"#;

/// Single chat by jid, with last message.
pub const CHAT_BY_JID: &str = r#"
SELECT
    c.jid,
    c.name,
    c.last_message_time,
    m.content,
    m.sender,
    m.is_from_me
FROM chats c
LEFT JOIN messages m ON m.rowid = (
    SELECT rowid FROM messages
    WHERE chat_jid = c.jid AND timestamp = c.last_message_time
    ORDER BY rowid DESC
    LIMIT 1
)
WHERE c.jid = ?1
"#;

/// Single chat by jid, metadata only.
pub const CHAT_BY_JID_NO_LAST: &str = r#"
SELECT
    c.jid,
    c.name,
    c.last_message_time,
    NULL,
    NULL,
    NULL
FROM chats c
WHERE c.jid = ?1
"#;

/// First direct chat whose jid contains a phone number.
/// Parameters: ?1 = LIKE pattern
pub const DIRECT_CHAT_BY_PHONE: &str = r#"
SELECT
    c.jid,
    c.name,
    c.last_message_time,
    m.content,
    m.sender,
    m.is_from_me
FROM chats c
LEFT JOIN messages m ON m.rowid = (
    SELECT rowid FROM messages
    WHERE chat_jid = c.jid AND timestamp = c.last_message_time
    ORDER BY rowid DESC
    LIMIT 1
)
WHERE c.jid LIKE ?1 ESCAPE '\'
  AND c.jid NOT LIKE '%@g.us'
ORDER BY c.jid
LIMIT 1
"#;

/// Chats the contact is the chat of, or has sent into.
/// Parameters: ?1 = contact jid, ?2 = limit, ?3 = offset
pub const CONTACT_CHATS: &str = r#"
SELECT
    c.jid,
    c.name,
    c.last_message_time,
    m.content,
    m.sender,
    m.is_from_me
FROM chats c
LEFT JOIN messages m ON m.rowid = (
    SELECT rowid FROM messages
    WHERE chat_jid = c.jid AND timestamp = c.last_message_time
    ORDER BY rowid DESC
    LIMIT 1
)
WHERE c.jid = ?1
   OR EXISTS (SELECT 1 FROM messages s WHERE s.chat_jid = c.jid AND s.sender = ?1)
ORDER BY c.last_message_time DESC, c.jid ASC
LIMIT ?2 OFFSET ?3
"#;

/// Most recent message sent by the contact or in their chat.
/// Parameters: ?1 = contact jid
pub const LAST_INTERACTION: &str = r#"
SELECT
    m.timestamp,
    m.sender,
    c.name,
    m.content,
    m.is_from_me,
    c.jid,
    m.id,
    m.media_type
FROM messages m
JOIN chats c ON m.chat_jid = c.jid
WHERE m.sender = ?1 OR c.jid = ?1
ORDER BY m.timestamp DESC
LIMIT 1
"#;

/// Reactions on a message, oldest first.
/// Parameters: ?1 = target message id, ?2 = target chat jid
pub const REACTIONS_FOR_MESSAGE: &str = r#"
SELECT
    reactor_sender,
    reaction_text,
    timestamp
FROM reactions
WHERE target_message_id = ?1
  AND target_chat_jid = ?2
ORDER BY timestamp ASC
"#;

/// Chat name for an exact jid. Unnamed chats count as a miss.
pub const NAME_BY_JID: &str = r#"
SELECT name
FROM chats
WHERE jid = ?1
  AND name IS NOT NULL AND name <> ''
LIMIT 1
"#;

/// Chat name for the first jid containing a fragment.
pub const NAME_BY_JID_FRAGMENT: &str = r#"
SELECT name
FROM chats
WHERE jid LIKE ?1 ESCAPE '\'
  AND name IS NOT NULL AND name <> ''
ORDER BY jid
LIMIT 1
"#;
