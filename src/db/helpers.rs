//! Database query helpers: row mapping and statement execution.
//!
//! All functions take `&Connection` so one scoped connection can serve a whole
//! facade call (query, context windows, and sender-name lookups).
//!
//! CHANGELOG:
//! - 02/01/2026 - Reactions helper tolerates stores without a reactions table
//! - 01/30/2026 - Initial extraction from the facade

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::queries;
use super::query::{escape_like, CompiledQuery};
use crate::error::Result;
use crate::format::NameLookup;
use crate::models::{parse_store_timestamp, Chat, Contact, Message, Reaction};

// ============================================================================
// Row mapping
// ============================================================================

fn conversion_error(idx: usize, ty: Type, reason: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, reason.into())
}

/// Read a timestamp column stored as text (ISO-8601 / SQLite format) or as
/// integer unix seconds.
pub(crate) fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<FixedOffset>> {
    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let raw = std::str::from_utf8(bytes)
                .map_err(|e| conversion_error(idx, Type::Text, e.to_string()))?;
            parse_store_timestamp(raw).ok_or_else(|| {
                conversion_error(idx, Type::Text, format!("unrecognized timestamp '{}'", raw))
            })
        }
        ValueRef::Integer(secs) => Utc
            .timestamp_opt(secs, 0)
            .single()
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| conversion_error(idx, Type::Integer, format!("timestamp out of range: {}", secs))),
        other => Err(conversion_error(
            idx,
            other.data_type(),
            "timestamp column is neither text nor integer".to_string(),
        )),
    }
}

fn optional_timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<FixedOffset>>> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        _ => timestamp_at(row, idx).map(Some),
    }
}

/// Map a row in `queries::MESSAGE_SELECT` column order.
pub fn message_from_row(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        timestamp: timestamp_at(row, 0)?,
        sender: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        chat_name: row.get(2)?,
        content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        is_from_me: row.get::<_, Option<bool>>(4)?.unwrap_or(false),
        chat_jid: row.get(5)?,
        id: row.get(6)?,
        media_type: row.get(7)?,
    })
}

/// Map a row in `queries::CHAT_SELECT*` column order.
pub fn chat_from_row(row: &Row) -> rusqlite::Result<Chat> {
    Ok(Chat {
        jid: row.get(0)?,
        name: row.get(1)?,
        last_message_time: optional_timestamp_at(row, 2)?,
        last_message: row.get(3)?,
        last_sender: row.get(4)?,
        last_is_from_me: row.get(5)?,
    })
}

// ============================================================================
// Listing helpers
// ============================================================================

/// Run a compiled message query.
pub fn query_messages(conn: &Connection, query: &CompiledQuery) -> Result<Vec<Message>> {
    tracing::debug!(sql = %query.sql, params = query.params.len(), "message query");
    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), message_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Run a compiled chat query.
pub fn query_chats(conn: &Connection, query: &CompiledQuery) -> Result<Vec<Chat>> {
    tracing::debug!(sql = %query.sql, params = query.params.len(), "chat query");
    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), chat_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Run a compiled contact query (jid, name).
pub fn query_contacts(conn: &Connection, query: &CompiledQuery) -> Result<Vec<Contact>> {
    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), |row| {
        Ok(Contact::from_jid(row.get(0)?, row.get(1)?))
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ============================================================================
// Single-chat helpers
// ============================================================================

pub fn query_chat(conn: &Connection, jid: &str, include_last_message: bool) -> Result<Option<Chat>> {
    let sql = if include_last_message {
        queries::CHAT_BY_JID
    } else {
        queries::CHAT_BY_JID_NO_LAST
    };
    Ok(conn.query_row(sql, params![jid], chat_from_row).optional()?)
}

/// First direct chat whose jid contains `phone`.
pub fn query_direct_chat(conn: &Connection, phone: &str) -> Result<Option<Chat>> {
    let pattern = format!("%{}%", escape_like(phone));
    Ok(conn
        .query_row(queries::DIRECT_CHAT_BY_PHONE, params![pattern], chat_from_row)
        .optional()?)
}

pub fn query_contact_chats(conn: &Connection, jid: &str, limit: u32, page: u32) -> Result<Vec<Chat>> {
    let offset = i64::try_from(u64::from(limit) * u64::from(page)).unwrap_or(i64::MAX);
    let mut stmt = conn.prepare(queries::CONTACT_CHATS)?;
    let rows = stmt.query_map(params![jid, i64::from(limit), offset], chat_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn query_last_interaction(conn: &Connection, jid: &str) -> Result<Option<Message>> {
    Ok(conn
        .query_row(queries::LAST_INTERACTION, params![jid], message_from_row)
        .optional()?)
}

// ============================================================================
// Reactions
// ============================================================================

/// Reactions on a message, oldest first. Rows with unreadable timestamps are
/// skipped; a store without a reactions table has no reactions.
pub fn query_reactions(conn: &Connection, message_id: &str, chat_jid: &str) -> Result<Vec<Reaction>> {
    let mut stmt = match conn.prepare(queries::REACTIONS_FOR_MESSAGE) {
        Ok(stmt) => stmt,
        Err(e) if is_missing_table(&e) => {
            tracing::debug!("reactions table not present");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let rows = stmt.query_map(params![message_id, chat_jid], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, Option<String>>(1)?,
            timestamp_at(row, 2).ok(),
        ))
    })?;

    let mut reactions = Vec::new();
    for row in rows {
        let (reactor, text, timestamp) = row?;
        let Some(timestamp) = timestamp else {
            tracing::debug!(message_id, "skipping reaction with unreadable timestamp");
            continue;
        };
        reactions.push(Reaction {
            reactor_sender: reactor.unwrap_or_default(),
            reaction_text: text.unwrap_or_default(),
            timestamp,
        });
    }
    Ok(reactions)
}

fn is_missing_table(err: &rusqlite::Error) -> bool {
    err.to_string().to_lowercase().contains("no such table")
}

// ============================================================================
// Sender names
// ============================================================================

impl NameLookup for Connection {
    fn name_for_jid(&self, jid: &str) -> Result<Option<String>> {
        Ok(self
            .query_row(queries::NAME_BY_JID, params![jid], |row| row.get(0))
            .optional()?)
    }

    fn name_for_jid_fragment(&self, fragment: &str) -> Result<Option<String>> {
        let pattern = format!("%{}%", escape_like(fragment));
        Ok(self
            .query_row(queries::NAME_BY_JID_FRAGMENT, params![pattern], |row| row.get(0))
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::Fixture;
    use crate::db::query::{contact_search_spec, ChatFilter, ChatSort, MessageFilter};

    fn seeded() -> Fixture {
        let fx = Fixture::new();
        fx.chat("14155550001@s.whatsapp.net", Some("Alice"))
            .chat("14155550002@s.whatsapp.net", Some("bob"))
            .chat("14155550003@s.whatsapp.net", None)
            .chat("120363000000000001@g.us", Some("Alice's Group"));
        fx.message("m1", "14155550001@s.whatsapp.net", "14155550001@s.whatsapp.net", "Lunch today?", "2025-01-15 12:00:00+00:00", false)
            .message("m2", "14155550001@s.whatsapp.net", "me", "Sure, noon", "2025-01-15 12:05:00+00:00", true)
            .message("m3", "120363000000000001@g.us", "14155550002@s.whatsapp.net", "LUNCH is ready", "2025-01-15 12:10:00+00:00", false)
            .message("m4", "14155550002@s.whatsapp.net", "14155550002@s.whatsapp.net", "hello", "2025-01-14 09:00:00+00:00", false);
        fx
    }

    #[test]
    fn test_messages_ordered_desc_and_limited() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let filter = MessageFilter { limit: 3, ..MessageFilter::default() };
        let msgs = query_messages(&conn, &filter.to_query_spec().unwrap().compile()).unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m2", "m1"]);
        assert!(msgs.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    }

    #[test]
    fn test_messages_pagination() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let filter = MessageFilter { limit: 2, page: 1, ..MessageFilter::default() };
        let msgs = query_messages(&conn, &filter.to_query_spec().unwrap().compile()).unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m4"]);
    }

    #[test]
    fn test_messages_query_is_case_insensitive() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let filter = MessageFilter { query: Some("lunch".into()), ..MessageFilter::default() };
        let msgs = query_messages(&conn, &filter.to_query_spec().unwrap().compile()).unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m1"]);
    }

    #[test]
    fn test_messages_time_bounds_are_exclusive() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let filter = MessageFilter {
            after: Some("2025-01-15T12:00:00+00:00".into()),
            before: Some("2025-01-15T12:10:00+00:00".into()),
            ..MessageFilter::default()
        };
        let msgs = query_messages(&conn, &filter.to_query_spec().unwrap().compile()).unwrap();
        let ids: Vec<&str> = msgs.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2"]);
    }

    #[test]
    fn test_messages_sender_and_chat_filters() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let filter = MessageFilter {
            sender_phone_number: Some("14155550002@s.whatsapp.net".into()),
            chat_jid: Some("120363000000000001@g.us".into()),
            ..MessageFilter::default()
        };
        let msgs = query_messages(&conn, &filter.to_query_spec().unwrap().compile()).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].id, "m3");
        assert_eq!(msgs[0].chat_name.as_deref(), Some("Alice's Group"));
    }

    #[test]
    fn test_chats_with_last_message() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let chats = query_chats(&conn, &ChatFilter::default().to_query_spec().compile()).unwrap();
        assert_eq!(chats[0].jid, "120363000000000001@g.us");
        assert!(chats[0].is_group());
        let alice = chats.iter().find(|c| c.name.as_deref() == Some("Alice")).unwrap();
        assert_eq!(alice.last_message.as_deref(), Some("Sure, noon"));
        assert_eq!(alice.last_is_from_me, Some(true));
        let unnamed = chats.iter().find(|c| c.name.is_none()).unwrap();
        assert!(unnamed.last_message_time.is_none());
        assert!(unnamed.last_message.is_none());
    }

    #[test]
    fn test_chats_by_name_with_query() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let filter = ChatFilter {
            query: Some("ALICE".into()),
            sort_by: ChatSort::Name,
            include_last_message: false,
            ..ChatFilter::default()
        };
        let chats = query_chats(&conn, &filter.to_query_spec().compile()).unwrap();
        let names: Vec<Option<&str>> = chats.iter().map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec![Some("Alice"), Some("Alice's Group")]);
        assert!(chats.iter().all(|c| c.last_message.is_none()));
    }

    #[test]
    fn test_contact_search_excludes_groups() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let contacts = query_contacts(&conn, &contact_search_spec("Alice").compile()).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phone_number, "14155550001");
        assert_eq!(contacts[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_contact_search_by_number_orders_by_name_then_jid() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let contacts = query_contacts(&conn, &contact_search_spec("1415555").compile()).unwrap();
        let jids: Vec<&str> = contacts.iter().map(|c| c.jid.as_str()).collect();
        // NULL names sort first in SQLite
        assert_eq!(
            jids,
            vec![
                "14155550003@s.whatsapp.net",
                "14155550001@s.whatsapp.net",
                "14155550002@s.whatsapp.net",
            ]
        );
    }

    #[test]
    fn test_query_chat_and_direct_chat() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let chat = query_chat(&conn, "14155550001@s.whatsapp.net", true).unwrap().unwrap();
        assert_eq!(chat.last_message.as_deref(), Some("Sure, noon"));
        let bare = query_chat(&conn, "14155550001@s.whatsapp.net", false).unwrap().unwrap();
        assert!(bare.last_message.is_none());
        assert!(query_chat(&conn, "nobody@s.whatsapp.net", true).unwrap().is_none());

        let direct = query_direct_chat(&conn, "4155550002").unwrap().unwrap();
        assert_eq!(direct.jid, "14155550002@s.whatsapp.net");
        assert!(query_direct_chat(&conn, "120363").unwrap().is_none());
    }

    #[test]
    fn test_contact_chats_includes_groups_they_posted_in() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let chats = query_contact_chats(&conn, "14155550002@s.whatsapp.net", 20, 0).unwrap();
        let jids: Vec<&str> = chats.iter().map(|c| c.jid.as_str()).collect();
        assert_eq!(jids, vec!["120363000000000001@g.us", "14155550002@s.whatsapp.net"]);

        let second_page = query_contact_chats(&conn, "14155550002@s.whatsapp.net", 1, 1).unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].jid, "14155550002@s.whatsapp.net");
    }

    #[test]
    fn test_last_interaction() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        let msg = query_last_interaction(&conn, "14155550002@s.whatsapp.net").unwrap().unwrap();
        assert_eq!(msg.id, "m3");
        assert!(query_last_interaction(&conn, "ghost@s.whatsapp.net").unwrap().is_none());
    }

    #[test]
    fn test_reactions_ordered_and_skip_bad_timestamps() {
        let fx = seeded();
        fx.reaction("m1", "14155550001@s.whatsapp.net", "me", "👍", "2025-01-15 12:02:00+00:00")
            .reaction("m1", "14155550001@s.whatsapp.net", "14155550001@s.whatsapp.net", "", "2025-01-15 12:01:00+00:00")
            .reaction("m1", "14155550001@s.whatsapp.net", "someone", "❤️", "garbage")
            .reaction("m1", "other@g.us", "me", "😂", "2025-01-15 12:03:00+00:00");
        let conn = fx.store().open().unwrap();
        let reactions = query_reactions(&conn, "m1", "14155550001@s.whatsapp.net").unwrap();
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].reaction_text, "");
        assert_eq!(reactions[1].reaction_text, "👍");
    }

    #[test]
    fn test_reactions_missing_table_is_empty() {
        let fx = Fixture::without_reactions();
        let conn = fx.store().open().unwrap();
        assert!(query_reactions(&conn, "m1", "x").unwrap().is_empty());
    }

    #[test]
    fn test_name_lookup_exact_then_fragment() {
        let fx = seeded();
        let conn = fx.store().open().unwrap();
        assert_eq!(
            conn.name_for_jid("14155550001@s.whatsapp.net").unwrap().as_deref(),
            Some("Alice")
        );
        assert_eq!(conn.name_for_jid("14155550001").unwrap(), None);
        assert_eq!(
            conn.name_for_jid_fragment("14155550002").unwrap().as_deref(),
            Some("bob")
        );
        assert_eq!(conn.name_for_jid_fragment("14155550003").unwrap(), None);
    }

    #[test]
    fn test_integer_timestamps_are_read() {
        let fx = Fixture::new();
        fx.chat("a@s.whatsapp.net", Some("A"));
        let conn = rusqlite::Connection::open(fx.store().path()).unwrap();
        conn.execute(
            "INSERT INTO messages (id, chat_jid, sender, content, timestamp, is_from_me)
             VALUES ('x', 'a@s.whatsapp.net', 'a', 'hi', 1736942400, 0)",
            [],
        )
        .unwrap();
        let ro = fx.store().open().unwrap();
        let msgs = query_messages(&ro, &MessageFilter::default().to_query_spec().unwrap().compile()).unwrap();
        assert_eq!(msgs[0].timestamp.to_rfc3339(), "2025-01-15T12:00:00+00:00");
    }
}
