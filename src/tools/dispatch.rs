//! Tool method dispatch: maps a method name plus JSON params onto the
//! [`WhatsApp`] facade and shapes the result the way tool clients expect.
//!
//! CHANGELOG:
//! - 02/03/2026 - download_media, get_reactions, health
//! - 01/30/2026 - Initial dispatch table

use serde_json::{json, Value};
use std::collections::HashMap;

use crate::bridge::ReplyTo;
use crate::db::query::{ChatFilter, ChatSort, MessageFilter, DEFAULT_CONTEXT_WINDOW, DEFAULT_LIMIT};
use crate::error::Error;
use crate::service::WhatsApp;
use crate::tools::protocol::UNKNOWN_METHOD;

/// Context window for `get_message_context` when the caller gives none.
const DEFAULT_MESSAGE_CONTEXT: u32 = 5;

pub type Params = HashMap<String, Value>;

/// A failed tool call: stable code plus readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub code: &'static str,
    pub message: String,
}

impl From<Error> for ToolError {
    fn from(e: Error) -> Self {
        Self {
            code: e.code(),
            message: e.to_string(),
        }
    }
}

type ToolResult = std::result::Result<Value, ToolError>;

pub struct ToolService {
    wa: WhatsApp,
    started_at: String,
}

impl ToolService {
    pub fn new(wa: WhatsApp) -> Self {
        Self {
            wa,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn dispatch(&self, method: &str, params: &Params) -> ToolResult {
        tracing::debug!(method, "dispatch");
        match method {
            "health" => Ok(self.health()),
            "search_contacts" => self.search_contacts(params),
            "list_messages" => self.list_messages(params),
            "list_chats" => self.list_chats(params),
            "get_chat" => self.get_chat(params),
            "get_direct_chat_by_contact" => self.get_direct_chat_by_contact(params),
            "get_contact_chats" => self.get_contact_chats(params),
            "get_last_interaction" => self.get_last_interaction(params),
            "get_message_context" => self.get_message_context(params),
            "get_reactions" => self.get_reactions(params),
            "send_message" => self.send_message(params),
            "send_file" => self.send_file(params),
            "send_audio_message" => self.send_audio_message(params),
            "send_reaction" => self.send_reaction(params),
            "download_media" => self.download_media(params),
            _ => Err(ToolError {
                code: UNKNOWN_METHOD,
                message: format!("Unknown method: {}", method),
            }),
        }
    }

    fn health(&self) -> Value {
        json!({
            "pid": std::process::id(),
            "started_at": self.started_at,
            "version": env!("CARGO_PKG_VERSION"),
            "store_path": self.wa.store().path().display().to_string(),
            "store_readable": self.wa.store().check_access(),
            "bridge_url": self.wa.bridge().base_url(),
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn search_contacts(&self, params: &Params) -> ToolResult {
        let query = required_str(params, "query")?;
        to_json(&self.wa.search_contacts(query))
    }

    fn list_messages(&self, params: &Params) -> ToolResult {
        let filter = MessageFilter {
            after: opt_string(params, "after")?,
            before: opt_string(params, "before")?,
            sender_phone_number: opt_string(params, "sender_phone_number")?,
            chat_jid: opt_string(params, "chat_jid")?,
            query: opt_string(params, "query")?,
            limit: u32_param(params, "limit", DEFAULT_LIMIT)?,
            page: u32_param(params, "page", 0)?,
            include_context: bool_param(params, "include_context", true)?,
            context_before: u32_param(params, "context_before", DEFAULT_CONTEXT_WINDOW)?,
            context_after: u32_param(params, "context_after", DEFAULT_CONTEXT_WINDOW)?,
        };
        Ok(Value::String(self.wa.list_messages_text(&filter)?))
    }

    fn list_chats(&self, params: &Params) -> ToolResult {
        let sort_by = match opt_str(params, "sort_by")? {
            Some(key) => key.parse::<ChatSort>()?,
            None => ChatSort::default(),
        };
        let filter = ChatFilter {
            query: opt_string(params, "query")?,
            limit: u32_param(params, "limit", DEFAULT_LIMIT)?,
            page: u32_param(params, "page", 0)?,
            include_last_message: bool_param(params, "include_last_message", true)?,
            sort_by,
        };
        to_json(&self.wa.list_chats(&filter))
    }

    fn get_chat(&self, params: &Params) -> ToolResult {
        let chat_jid = required_str(params, "chat_jid")?;
        let include_last_message = bool_param(params, "include_last_message", true)?;
        to_json(&self.wa.get_chat(chat_jid, include_last_message))
    }

    fn get_direct_chat_by_contact(&self, params: &Params) -> ToolResult {
        let phone = required_str(params, "sender_phone_number")?;
        to_json(&self.wa.get_direct_chat_by_contact(phone))
    }

    fn get_contact_chats(&self, params: &Params) -> ToolResult {
        let jid = required_str(params, "jid")?;
        let limit = u32_param(params, "limit", DEFAULT_LIMIT)?;
        let page = u32_param(params, "page", 0)?;
        to_json(&self.wa.get_contact_chats(jid, limit, page))
    }

    fn get_last_interaction(&self, params: &Params) -> ToolResult {
        let jid = required_str(params, "jid")?;
        Ok(self
            .wa
            .get_last_interaction_text(jid)
            .map_or(Value::Null, Value::String))
    }

    fn get_message_context(&self, params: &Params) -> ToolResult {
        let message_id = required_str(params, "message_id")?;
        let before = u32_param(params, "before", DEFAULT_MESSAGE_CONTEXT)?;
        let after = u32_param(params, "after", DEFAULT_MESSAGE_CONTEXT)?;
        to_json(&self.wa.get_message_context(message_id, before, after)?)
    }

    fn get_reactions(&self, params: &Params) -> ToolResult {
        let message_id = required_str(params, "message_id")?;
        let chat_jid = required_str(params, "chat_jid")?;
        let reactions = self
            .wa
            .get_reactions(message_id, chat_jid)
            .into_iter()
            .map(|r| {
                json!({
                    "reactor_sender": r.reactor_sender,
                    "reaction_text": r.reaction_text,
                    "timestamp": r.timestamp.to_rfc3339(),
                })
            })
            .collect();
        Ok(Value::Array(reactions))
    }

    // ========================================================================
    // Sends
    // ========================================================================

    fn send_message(&self, params: &Params) -> ToolResult {
        let recipient = opt_str(params, "recipient")?.unwrap_or("");
        let message = opt_str(params, "message")?.unwrap_or("");
        to_json(&self.wa.send_message(recipient, message, &reply_to(params)?))
    }

    fn send_file(&self, params: &Params) -> ToolResult {
        let recipient = opt_str(params, "recipient")?.unwrap_or("");
        let media_path = opt_str(params, "media_path")?.unwrap_or("");
        to_json(&self.wa.send_file(recipient, media_path, &reply_to(params)?))
    }

    fn send_audio_message(&self, params: &Params) -> ToolResult {
        let recipient = opt_str(params, "recipient")?.unwrap_or("");
        let media_path = opt_str(params, "media_path")?.unwrap_or("");
        to_json(&self.wa.send_audio_message(recipient, media_path, &reply_to(params)?))
    }

    fn send_reaction(&self, params: &Params) -> ToolResult {
        let chat_jid = opt_str(params, "chat_jid")?.unwrap_or("");
        let message_id = opt_str(params, "message_id")?.unwrap_or("");
        let reaction = required_str(params, "reaction")?;
        let reply_to_sender_jid = opt_str(params, "reply_to_sender_jid")?;
        to_json(&self.wa.send_reaction(chat_jid, message_id, reaction, reply_to_sender_jid))
    }

    fn download_media(&self, params: &Params) -> ToolResult {
        let message_id = opt_str(params, "message_id")?.unwrap_or("");
        let chat_jid = opt_str(params, "chat_jid")?.unwrap_or("");
        to_json(&self.wa.download_media(message_id, chat_jid))
    }
}

// ============================================================================
// Param helpers
// ============================================================================

fn to_json<T: serde::Serialize>(value: &T) -> ToolResult {
    serde_json::to_value(value).map_err(|e| ToolError {
        code: "INTERNAL_ERROR",
        message: format!("failed to serialize result: {}", e),
    })
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ToolError {
    Error::invalid(field, reason).into()
}

/// String param; absent and `null` are both `None`.
fn opt_str<'a>(params: &'a Params, key: &'static str) -> Result<Option<&'a str>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(invalid(key, format!("expected a string, got {}", other))),
    }
}

fn opt_string(params: &Params, key: &'static str) -> Result<Option<String>, ToolError> {
    Ok(opt_str(params, key)?.map(str::to_string))
}

fn required_str<'a>(params: &'a Params, key: &'static str) -> Result<&'a str, ToolError> {
    opt_str(params, key)?.ok_or_else(|| invalid(key, "missing required parameter"))
}

fn u32_param(params: &Params, key: &'static str, default: u32) -> Result<u32, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| invalid(key, format!("expected a non-negative integer, got {}", value))),
    }
}

fn bool_param(params: &Params, key: &'static str, default: bool) -> Result<bool, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(invalid(key, format!("expected a boolean, got {}", other))),
    }
}

fn reply_to(params: &Params) -> Result<ReplyTo, ToolError> {
    Ok(ReplyTo::new(
        opt_string(params, "reply_to_message_id")?,
        opt_string(params, "reply_to_sender_jid")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::Fixture;
    use crate::service::tests::{seeded, service, ALICE, BOB};

    fn params(value: Value) -> Params {
        serde_json::from_value(value).unwrap()
    }

    fn tool(fx: &Fixture) -> ToolService {
        ToolService::new(service(fx))
    }

    #[test]
    fn test_unknown_method() {
        let fx = seeded();
        let err = tool(&fx).dispatch("teleport", &Params::new()).unwrap_err();
        assert_eq!(err.code, UNKNOWN_METHOD);
        assert!(err.message.contains("teleport"));
    }

    #[test]
    fn test_health_reports_store() {
        let fx = seeded();
        let health = tool(&fx).dispatch("health", &Params::new()).unwrap();
        assert_eq!(health["store_readable"], true);
        assert_eq!(health["bridge_url"], "http://127.0.0.1:9/api");
    }

    #[test]
    fn test_list_messages_returns_text() {
        let fx = seeded();
        let result = tool(&fx)
            .dispatch(
                "list_messages",
                &params(json!({"chat_jid": ALICE, "limit": 1, "include_context": false})),
            )
            .unwrap();
        let text = result.as_str().unwrap();
        assert!(text.starts_with("[2025-01-15 09:04:00] Chat: Alice From: Alice: [image"));
    }

    #[test]
    fn test_list_messages_bad_date() {
        let fx = seeded();
        let err = tool(&fx)
            .dispatch("list_messages", &params(json!({"after": "soon"})))
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert_eq!(err.message, "Invalid value for 'after': soon is not an ISO-8601 date");
    }

    #[test]
    fn test_list_chats_sort_key() {
        let fx = seeded();
        let svc = tool(&fx);
        let chats = svc
            .dispatch("list_chats", &params(json!({"sort_by": "name"})))
            .unwrap();
        let names: Vec<&str> = chats
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Lunch Crew"]);

        let err = svc
            .dispatch("list_chats", &params(json!({"sort_by": "loudest"})))
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[test]
    fn test_get_chat_missing_is_null() {
        let fx = seeded();
        let result = tool(&fx)
            .dispatch("get_chat", &params(json!({"chat_jid": "nobody@s.whatsapp.net"})))
            .unwrap();
        assert!(result.is_null());
    }

    #[test]
    fn test_required_params() {
        let fx = seeded();
        let svc = tool(&fx);
        let err = svc.dispatch("get_chat", &Params::new()).unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert!(err.message.contains("chat_jid"));

        let err = svc
            .dispatch("get_contact_chats", &params(json!({"jid": BOB, "limit": -1})))
            .unwrap_err();
        assert!(err.message.contains("limit"));
    }

    #[test]
    fn test_message_context_shape_and_not_found() {
        let fx = seeded();
        let svc = tool(&fx);
        let ctx = svc
            .dispatch("get_message_context", &params(json!({"message_id": "a3"})))
            .unwrap();
        assert_eq!(ctx["message"]["id"], "a3");
        assert_eq!(ctx["before"].as_array().unwrap().len(), 2);
        assert_eq!(ctx["after"].as_array().unwrap().len(), 2);

        let err = svc
            .dispatch("get_message_context", &params(json!({"message_id": "zzz"})))
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "Message with ID zzz not found");
    }

    #[test]
    fn test_reactions_have_iso_timestamps() {
        let fx = seeded();
        fx.reaction("a1", ALICE, "me", "👍", "2025-01-15 09:05:00+00:00");
        let reactions = tool(&fx)
            .dispatch("get_reactions", &params(json!({"message_id": "a1", "chat_jid": ALICE})))
            .unwrap();
        assert_eq!(reactions[0]["reaction_text"], "👍");
        assert_eq!(reactions[0]["timestamp"], "2025-01-15T09:05:00+00:00");
    }

    #[test]
    fn test_last_interaction_miss_is_null() {
        let fx = seeded();
        let svc = tool(&fx);
        let miss = svc
            .dispatch("get_last_interaction", &params(json!({"jid": "19995550000@s.whatsapp.net"})))
            .unwrap();
        assert_eq!(miss, Value::Null);
        let hit = svc
            .dispatch("get_last_interaction", &params(json!({"jid": BOB})))
            .unwrap();
        assert_eq!(hit, "[2025-01-15 10:00:00] Chat: Lunch Crew From: Bob: who is in for lunch");
    }

    #[test]
    fn test_send_message_outcome_shape() {
        let fx = seeded();
        let result = tool(&fx)
            .dispatch("send_message", &params(json!({"recipient": "", "message": "hi"})))
            .unwrap();
        assert_eq!(result, json!({"success": false, "message": "Recipient must be provided"}));
    }

    #[test]
    fn test_download_failure_has_no_path() {
        let fx = seeded();
        let result = tool(&fx)
            .dispatch("download_media", &params(json!({"message_id": "a5"})))
            .unwrap();
        assert_eq!(result["success"], false);
        assert!(result.get("file_path").is_none());
    }
}
