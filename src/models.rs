//! Read-only projections of store rows plus send outcomes.
//!
//! CHANGELOG:
//! - 02/03/2026 - Added DownloadOutcome
//! - 01/28/2026 - Initial data model

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::Serialize;

/// JID suffix used by group chats.
pub const GROUP_JID_SUFFIX: &str = "@g.us";

/// A single message joined with its chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub timestamp: DateTime<FixedOffset>,
    pub sender: String,
    pub content: String,
    pub is_from_me: bool,
    pub chat_jid: String,
    pub id: String,
    pub chat_name: Option<String>,
    pub media_type: Option<String>,
}

impl Message {
    /// Media type, treating an empty column as "no media".
    pub fn media(&self) -> Option<&str> {
        self.media_type.as_deref().filter(|m| !m.is_empty())
    }
}

/// Chat metadata, optionally with its most recent message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chat {
    pub jid: String,
    pub name: Option<String>,
    pub last_message_time: Option<DateTime<FixedOffset>>,
    pub last_message: Option<String>,
    pub last_sender: Option<String>,
    pub last_is_from_me: Option<bool>,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        is_group_jid(&self.jid)
    }
}

/// A direct (non-group) conversation partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub phone_number: String,
    pub name: Option<String>,
    pub jid: String,
}

impl Contact {
    pub fn from_jid(jid: String, name: Option<String>) -> Self {
        Self {
            phone_number: jid_user(&jid).to_string(),
            name,
            jid,
        }
    }
}

/// A message with its neighbours in the same chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageContext {
    pub message: Message,
    /// Chronological, adjacent-to-target last.
    pub before: Vec<Message>,
    /// Chronological, adjacent-to-target first.
    pub after: Vec<Message>,
}

impl MessageContext {
    /// before ++ [message] ++ after.
    pub fn into_window(self) -> Vec<Message> {
        let mut window = self.before;
        window.push(self.message);
        window.extend(self.after);
        window
    }
}

/// A reaction on a message. Empty `reaction_text` means the reaction was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub reactor_sender: String,
    pub reaction_text: String,
    pub timestamp: DateTime<FixedOffset>,
}

/// Result of a send/react call to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message: String,
}

impl SendOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result of a media download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl DownloadOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            file_path: None,
        }
    }
}

// ============================================================================
// JID helpers
// ============================================================================

pub fn is_group_jid(jid: &str) -> bool {
    jid.ends_with(GROUP_JID_SUFFIX)
}

/// User part of a JID (everything before the first `@`).
pub fn jid_user(jid: &str) -> &str {
    jid.split('@').next().unwrap_or(jid)
}

// ============================================================================
// Timestamp helpers
// ============================================================================

/// Parse a timestamp column as written by the bridge.
///
/// Accepts RFC 3339 and SQLite's `YYYY-MM-DD HH:MM:SS[.fff][+HH:MM]`. Values
/// without an offset are taken as UTC.
pub fn parse_store_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    parse_naive(raw).map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parse a caller-supplied ISO-8601 bound and render it the way the store
/// writes timestamps, so SQLite's text comparison orders it correctly.
///
/// Returns `None` when the input is not ISO-8601.
pub fn iso_bound_to_store_text(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(render_store_text(&dt.naive_local(), Some(dt.offset())));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(render_store_text(&dt.naive_local(), Some(dt.offset())));
        }
    }
    parse_naive(raw).map(|naive| render_store_text(&naive, None))
}

fn render_store_text(naive: &NaiveDateTime, offset: Option<&FixedOffset>) -> String {
    let mut text = naive.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = naive.nanosecond() / 1_000;
    if micros != 0 {
        text.push_str(&format!(".{:06}", micros));
    }
    if let Some(offset) = offset {
        text.push_str(&offset.to_string());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_group_jid() {
        assert!(is_group_jid("120363025246125486@g.us"));
        assert!(!is_group_jid("14155551234@s.whatsapp.net"));
    }

    #[test]
    fn test_contact_phone_number_strips_suffix() {
        let contact = Contact::from_jid("14155551234@s.whatsapp.net".to_string(), None);
        assert_eq!(contact.phone_number, "14155551234");
        let bare = Contact::from_jid("14155551234".to_string(), None);
        assert_eq!(bare.phone_number, "14155551234");
    }

    #[test]
    fn test_parse_store_timestamp_variants() {
        let sqlite = parse_store_timestamp("2025-01-15 12:00:00+00:00").unwrap();
        let rfc = parse_store_timestamp("2025-01-15T12:00:00Z").unwrap();
        let naive = parse_store_timestamp("2025-01-15 12:00:00").unwrap();
        let frac = parse_store_timestamp("2025-01-15 12:00:00.123456789-07:00").unwrap();
        assert_eq!(sqlite, rfc);
        assert_eq!(sqlite, naive);
        assert_eq!(frac.offset().local_minus_utc(), -7 * 3600);
        assert!(parse_store_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_iso_bound_rendering() {
        assert_eq!(
            iso_bound_to_store_text("2025-01-15T08:30:00").as_deref(),
            Some("2025-01-15 08:30:00")
        );
        assert_eq!(
            iso_bound_to_store_text("2025-01-15").as_deref(),
            Some("2025-01-15 00:00:00")
        );
        assert_eq!(
            iso_bound_to_store_text("2025-01-15T08:30:00Z").as_deref(),
            Some("2025-01-15 08:30:00+00:00")
        );
        assert_eq!(
            iso_bound_to_store_text("2025-01-15T08:30:00.5+02:00").as_deref(),
            Some("2025-01-15 08:30:00.500000+02:00")
        );
        assert!(iso_bound_to_store_text("15/01/2025").is_none());
    }

    #[test]
    fn test_context_window_order() {
        let ts = parse_store_timestamp("2025-01-15 12:00:00").unwrap();
        let msg = |id: &str| Message {
            timestamp: ts,
            sender: "a".into(),
            content: id.into(),
            is_from_me: false,
            chat_jid: "c".into(),
            id: id.into(),
            chat_name: None,
            media_type: None,
        };
        let ctx = MessageContext {
            message: msg("t"),
            before: vec![msg("b1"), msg("b2")],
            after: vec![msg("a1")],
        };
        let ids: Vec<String> = ctx.into_window().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["b1", "b2", "t", "a1"]);
    }
}
