//! The WhatsApp facade: the fourteen operations the CLI and tool server call.
//!
//! Reads go to the bridge's SQLite store through a fresh read-only connection
//! per call. Store failures on read paths are logged and degrade to an empty
//! result; malformed arguments and a missing context target are errors.
//! Sends are forwarded to [`BridgeClient`] and always produce an outcome.
//!
//! CHANGELOG:
//! - 02/03/2026 - download_media and get_reactions
//! - 02/01/2026 - Context windows for list_messages
//! - 01/30/2026 - Initial facade

use crate::bridge::{BridgeClient, ReplyTo};
use crate::config::Config;
use crate::db::connection::Store;
use crate::db::context::message_context;
use crate::db::helpers;
use crate::db::query::{contact_search_spec, ChatFilter, MessageFilter};
use crate::error::Result;
use crate::format::{format_message, format_messages_list, NameLookup, RawIds};
use crate::models::{Chat, Contact, DownloadOutcome, Message, MessageContext, Reaction, SendOutcome};

pub struct WhatsApp {
    store: Store,
    bridge: BridgeClient,
}

/// Log a failed read and substitute an empty value.
fn degrade<T: Default>(operation: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(operation, error = %e, "store read failed; returning empty result");
            T::default()
        }
    }
}

impl WhatsApp {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_parts(
            Store::new(&config.db_path),
            BridgeClient::new(config.api_base_url.clone())?,
        ))
    }

    pub fn with_parts(store: Store, bridge: BridgeClient) -> Self {
        Self { store, bridge }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn bridge(&self) -> &BridgeClient {
        &self.bridge
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Direct contacts whose name or jid contains `query` (at most 50).
    pub fn search_contacts(&self, query: &str) -> Vec<Contact> {
        let compiled = contact_search_spec(query).compile();
        degrade(
            "search_contacts",
            self.store.with_connection(|conn| helpers::query_contacts(conn, &compiled)),
        )
    }

    /// Messages matching `filter`, newest first. With `include_context` each
    /// match is replaced by its context window, so the result may contain the
    /// same message more than once.
    pub fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
        let compiled = filter.to_query_spec()?.compile();
        let result = self.store.with_connection(|conn| {
            let matches = helpers::query_messages(conn, &compiled)?;
            if !filter.include_context {
                return Ok(matches);
            }

            let mut expanded = Vec::with_capacity(matches.len() * 3);
            for msg in matches {
                match message_context(
                    conn,
                    &msg.id,
                    Some(msg.chat_jid.as_str()),
                    filter.context_before,
                    filter.context_after,
                ) {
                    Ok(ctx) => expanded.extend(ctx.into_window()),
                    Err(e) => {
                        tracing::debug!(message_id = %msg.id, error = %e, "context lookup failed");
                        expanded.push(msg);
                    }
                }
            }
            Ok(expanded)
        });
        Ok(degrade("list_messages", result))
    }

    /// [`Self::list_messages`] rendered as text lines.
    pub fn list_messages_text(&self, filter: &MessageFilter) -> Result<String> {
        let messages = self.list_messages(filter)?;
        Ok(self.render_messages(&messages, true))
    }

    pub fn list_chats(&self, filter: &ChatFilter) -> Vec<Chat> {
        let compiled = filter.to_query_spec().compile();
        degrade(
            "list_chats",
            self.store.with_connection(|conn| helpers::query_chats(conn, &compiled)),
        )
    }

    pub fn get_chat(&self, chat_jid: &str, include_last_message: bool) -> Option<Chat> {
        degrade(
            "get_chat",
            self.store
                .with_connection(|conn| helpers::query_chat(conn, chat_jid, include_last_message)),
        )
    }

    /// First direct chat whose jid contains `sender_phone_number`.
    pub fn get_direct_chat_by_contact(&self, sender_phone_number: &str) -> Option<Chat> {
        degrade(
            "get_direct_chat_by_contact",
            self.store
                .with_connection(|conn| helpers::query_direct_chat(conn, sender_phone_number)),
        )
    }

    /// Chats where `jid` is the chat itself or has sent a message.
    pub fn get_contact_chats(&self, jid: &str, limit: u32, page: u32) -> Vec<Chat> {
        degrade(
            "get_contact_chats",
            self.store
                .with_connection(|conn| helpers::query_contact_chats(conn, jid, limit, page)),
        )
    }

    pub fn get_last_interaction(&self, jid: &str) -> Option<Message> {
        degrade(
            "get_last_interaction",
            self.store
                .with_connection(|conn| helpers::query_last_interaction(conn, jid)),
        )
    }

    /// Most recent message with `jid` as one formatted line.
    pub fn get_last_interaction_text(&self, jid: &str) -> Option<String> {
        let msg = self.get_last_interaction(jid)?;
        Some(self.with_names(|names| format_message(&msg, true, names)))
    }

    /// A message and its neighbours. Unlike the other reads this propagates
    /// store failures, and a missing message is [`crate::error::Error::NotFound`].
    pub fn get_message_context(&self, message_id: &str, before: u32, after: u32) -> Result<MessageContext> {
        self.store
            .with_connection(|conn| message_context(conn, message_id, None, before, after))
    }

    pub fn get_reactions(&self, message_id: &str, chat_jid: &str) -> Vec<Reaction> {
        degrade(
            "get_reactions",
            self.store
                .with_connection(|conn| helpers::query_reactions(conn, message_id, chat_jid)),
        )
    }

    /// Render messages, resolving sender names against the store.
    pub fn render_messages(&self, messages: &[Message], show_chat_info: bool) -> String {
        self.with_names(|names| format_messages_list(messages, show_chat_info, names))
    }

    fn with_names<T>(&self, f: impl FnOnce(&dyn NameLookup) -> T) -> T {
        match self.store.open() {
            Ok(conn) => f(&conn),
            Err(e) => {
                tracing::warn!(error = %e, "store unavailable for sender names");
                f(&RawIds)
            }
        }
    }

    // ========================================================================
    // Sends
    // ========================================================================

    pub fn send_message(&self, recipient: &str, message: &str, reply: &ReplyTo) -> SendOutcome {
        self.bridge.send_message(recipient, message, reply)
    }

    pub fn send_file(&self, recipient: &str, media_path: &str, reply: &ReplyTo) -> SendOutcome {
        self.bridge.send_file(recipient, media_path, reply)
    }

    pub fn send_audio_message(&self, recipient: &str, media_path: &str, reply: &ReplyTo) -> SendOutcome {
        self.bridge.send_audio_message(recipient, media_path, reply)
    }

    pub fn send_reaction(
        &self,
        chat_jid: &str,
        message_id: &str,
        reaction: &str,
        reply_to_sender_jid: Option<&str>,
    ) -> SendOutcome {
        self.bridge
            .send_reaction(chat_jid, message_id, reaction, reply_to_sender_jid)
    }

    pub fn download_media(&self, message_id: &str, chat_jid: &str) -> DownloadOutcome {
        self.bridge.download_media(message_id, chat_jid)
    }
}
