//! Plain-text rendering of messages for tool and CLI output.
//!
//! Line shape:
//! `[YYYY-MM-DD HH:MM:SS] Chat: <name> From: <sender>: [<media> - Message ID: <id> - Chat JID: <jid>] <content>`
//!
//! The chat segment appears only when requested and the chat has a name; the
//! media segment only when the message carries media.

use crate::error::Result;
use crate::models::{jid_user, Message};

/// Returned by [`format_messages_list`] for an empty input.
pub const NO_MESSAGES: &str = "No messages to display.";

/// Display-name source for sender ids.
pub trait NameLookup {
    /// Name of the chat whose jid is exactly `jid`.
    fn name_for_jid(&self, jid: &str) -> Result<Option<String>>;

    /// Name of the first chat whose jid contains `fragment`.
    fn name_for_jid_fragment(&self, fragment: &str) -> Result<Option<String>>;
}

/// Lookup that knows no names; every sender renders as its raw id.
pub struct RawIds;

impl NameLookup for RawIds {
    fn name_for_jid(&self, _jid: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn name_for_jid_fragment(&self, _fragment: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Resolve a sender id: exact jid, then its numeric part, then the raw id.
/// Lookup failures fall through to the raw id.
pub fn resolve_sender_name(sender: &str, names: &dyn NameLookup) -> String {
    let attempt = || -> Result<Option<String>> {
        if let Some(name) = names.name_for_jid(sender)? {
            return Ok(Some(name));
        }
        let user = jid_user(sender);
        if user.is_empty() {
            return Ok(None);
        }
        names.name_for_jid_fragment(user)
    };

    match attempt() {
        Ok(Some(name)) => name,
        Ok(None) => sender.to_string(),
        Err(e) => {
            tracing::warn!(sender, error = %e, "sender name lookup failed");
            sender.to_string()
        }
    }
}

/// One message as a single line, without a trailing newline.
pub fn format_message(msg: &Message, show_chat_info: bool, names: &dyn NameLookup) -> String {
    let mut line = format!("[{}] ", msg.timestamp.format("%Y-%m-%d %H:%M:%S"));

    if show_chat_info {
        if let Some(chat_name) = msg.chat_name.as_deref().filter(|n| !n.is_empty()) {
            line.push_str(&format!("Chat: {} ", chat_name));
        }
    }

    let sender = if msg.is_from_me {
        "Me".to_string()
    } else {
        resolve_sender_name(&msg.sender, names)
    };
    line.push_str(&format!("From: {}: ", sender));

    if let Some(media) = msg.media() {
        line.push_str(&format!(
            "[{} - Message ID: {} - Chat JID: {}] ",
            media, msg.id, msg.chat_jid
        ));
    }

    line.push_str(&msg.content);
    line
}

/// Messages in input order, one per line. Never returns an empty string.
pub fn format_messages_list(messages: &[Message], show_chat_info: bool, names: &dyn NameLookup) -> String {
    if messages.is_empty() {
        return NO_MESSAGES.to_string();
    }
    let mut out = String::new();
    for msg in messages {
        out.push_str(&format_message(msg, show_chat_info, names));
        out.push('\n');
    }
    out
}
