//! Message context windows: a target message plus its neighbours in the
//! same chat.
//!
//! CHANGELOG:
//! - 02/01/2026 - Pin lookups to a chat for list_messages expansion
//! - 01/31/2026 - Initial context assembler

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

use super::helpers::message_from_row;
use super::queries;
use crate::error::{Error, Result};
use crate::models::{Message, MessageContext};

/// Load `message_id` with up to `before` older and `after` newer messages
/// from its chat.
///
/// When `chat_jid` is given the target is looked up within that chat only.
/// A missing target is [`Error::NotFound`].
pub fn message_context(
    conn: &Connection,
    message_id: &str,
    chat_jid: Option<&str>,
    before: u32,
    after: u32,
) -> Result<MessageContext> {
    let target = conn
        .query_row(queries::CONTEXT_TARGET, params![message_id, chat_jid], |row| {
            Ok((message_from_row(row)?, row.get::<_, Value>(8)?))
        })
        .optional()?;

    let Some((message, raw_timestamp)) = target else {
        return Err(Error::NotFound {
            message_id: message_id.to_string(),
        });
    };

    let mut before_msgs = neighbours(conn, queries::CONTEXT_BEFORE, &message.chat_jid, &raw_timestamp, before)?;
    before_msgs.reverse();
    let after_msgs = neighbours(conn, queries::CONTEXT_AFTER, &message.chat_jid, &raw_timestamp, after)?;

    Ok(MessageContext {
        message,
        before: before_msgs,
        after: after_msgs,
    })
}

fn neighbours(
    conn: &Connection,
    sql: &str,
    chat_jid: &str,
    timestamp: &Value,
    limit: u32,
) -> Result<Vec<Message>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![chat_jid, timestamp, i64::from(limit)], message_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
