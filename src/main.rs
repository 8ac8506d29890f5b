//! whatsapp-mcp - CLI over the WhatsApp bridge
//!
//! Direct SQLite queries for reading, bridge HTTP API for sending.
//!
//! CHANGELOG:
//! - 02/03/2026 - download, reactions and context subcommands
//! - 01/30/2026 - Initial CLI

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use whatsapp_mcp::bridge::ReplyTo;
use whatsapp_mcp::commands;
use whatsapp_mcp::config::Config;
use whatsapp_mcp::db::query::{ChatFilter, ChatSort, MessageFilter};
use whatsapp_mcp::output::OutputControls;
use whatsapp_mcp::service::WhatsApp;

/// Query and send WhatsApp messages through the local bridge.
#[derive(Parser, Debug)]
#[command(name = "whatsapp-mcp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long, global = true)]
    compact: bool,

    /// Path to the bridge's messages.db
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// Bridge API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Quote-reply flags shared by the send commands.
#[derive(clap::Args, Debug)]
struct ReplyArgs {
    /// Reply to this message ID
    #[arg(long)]
    reply_to_message_id: Option<String>,

    /// Sender JID of the message being replied to
    #[arg(long)]
    reply_to_sender_jid: Option<String>,
}

impl From<ReplyArgs> for ReplyTo {
    fn from(args: ReplyArgs) -> Self {
        ReplyTo::new(args.reply_to_message_id, args.reply_to_sender_jid)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    // =========================================================================
    // READING
    // =========================================================================
    /// Search contacts by name or phone number
    Contacts {
        query: String,
    },

    /// List messages, newest first
    Messages {
        /// Only messages after this ISO-8601 time
        #[arg(long)]
        after: Option<String>,

        /// Only messages before this ISO-8601 time
        #[arg(long)]
        before: Option<String>,

        /// Sender JID
        #[arg(long)]
        sender: Option<String>,

        /// Chat JID
        #[arg(long)]
        chat: Option<String>,

        /// Case-insensitive text to search for
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Zero-based page
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Show only matches, without surrounding messages
        #[arg(long)]
        no_context: bool,

        #[arg(long, default_value_t = 1)]
        context_before: u32,

        #[arg(long, default_value_t = 1)]
        context_after: u32,
    },

    /// List chats
    Chats {
        /// Filter by name or JID
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Omit the last message
        #[arg(long)]
        no_last_message: bool,

        /// last_active or name
        #[arg(long, default_value = "last_active")]
        sort_by: String,
    },

    /// Show one chat
    Chat {
        jid: String,

        #[arg(long)]
        no_last_message: bool,
    },

    /// Find the direct chat for a phone number
    DirectChat {
        phone: String,
    },

    /// Chats a contact takes part in
    ContactChats {
        jid: String,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        page: u32,
    },

    /// Most recent message with a contact
    LastInteraction {
        jid: String,
    },

    /// A message with surrounding messages from its chat
    Context {
        message_id: String,

        #[arg(long, default_value_t = 5)]
        before: u32,

        #[arg(long, default_value_t = 5)]
        after: u32,
    },

    /// Reactions on a message
    Reactions {
        message_id: String,
        chat_jid: String,
    },

    // =========================================================================
    // SENDING
    // =========================================================================
    /// Send a text message
    Send {
        /// Phone number or JID
        recipient: String,

        /// Message text
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,

        #[command(flatten)]
        reply: ReplyArgs,
    },

    /// Send a file (image, video, document)
    SendFile {
        recipient: String,
        media_path: String,

        #[command(flatten)]
        reply: ReplyArgs,
    },

    /// Send an audio file as a voice message (converted with ffmpeg if needed)
    SendAudio {
        recipient: String,
        media_path: String,

        #[command(flatten)]
        reply: ReplyArgs,
    },

    /// React to a message; an empty reaction removes yours
    React {
        chat_jid: String,
        message_id: String,
        #[arg(default_value = "")]
        reaction: String,

        /// Original sender, for group chats
        #[arg(long)]
        sender_jid: Option<String>,
    },

    /// Download a message's media and print the local path
    Download {
        message_id: String,
        chat_jid: String,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?.with_overrides(cli.db_path.as_deref(), cli.api_url.as_deref());
    let wa = WhatsApp::new(&config)?;

    let output = OutputControls {
        json: cli.json || cli.compact,
        compact: cli.compact,
    };

    match cli.command {
        Command::Contacts { query } => commands::contacts::search(&wa, &query, &output),
        Command::Messages {
            after,
            before,
            sender,
            chat,
            query,
            limit,
            page,
            no_context,
            context_before,
            context_after,
        } => {
            let filter = MessageFilter {
                after,
                before,
                sender_phone_number: sender,
                chat_jid: chat,
                query,
                limit,
                page,
                include_context: !no_context,
                context_before,
                context_after,
            };
            commands::reading::messages(&wa, &filter, &output)
        }
        Command::Chats {
            query,
            limit,
            page,
            no_last_message,
            sort_by,
        } => {
            let filter = ChatFilter {
                query,
                limit,
                page,
                include_last_message: !no_last_message,
                sort_by: sort_by.parse::<ChatSort>()?,
            };
            commands::contacts::chats(&wa, &filter, &output)
        }
        Command::Chat { jid, no_last_message } => {
            commands::contacts::chat(&wa, &jid, !no_last_message, &output)
        }
        Command::DirectChat { phone } => commands::contacts::direct_chat(&wa, &phone, &output),
        Command::ContactChats { jid, limit, page } => {
            commands::contacts::contact_chats(&wa, &jid, limit, page, &output)
        }
        Command::LastInteraction { jid } => commands::reading::last_interaction(&wa, &jid, &output),
        Command::Context {
            message_id,
            before,
            after,
        } => commands::reading::context(&wa, &message_id, before, after, &output),
        Command::Reactions { message_id, chat_jid } => {
            commands::reading::reactions(&wa, &message_id, &chat_jid, &output)
        }
        Command::Send {
            recipient,
            message,
            reply,
        } => commands::messaging::send(&wa, &recipient, &message.join(" "), &ReplyTo::from(reply), &output),
        Command::SendFile {
            recipient,
            media_path,
            reply,
        } => commands::messaging::send_file(&wa, &recipient, &media_path, &ReplyTo::from(reply), &output),
        Command::SendAudio {
            recipient,
            media_path,
            reply,
        } => commands::messaging::send_audio(&wa, &recipient, &media_path, &ReplyTo::from(reply), &output),
        Command::React {
            chat_jid,
            message_id,
            reaction,
            sender_jid,
        } => commands::messaging::react(
            &wa,
            &chat_jid,
            &message_id,
            &reaction,
            sender_jid.as_deref(),
            &output,
        ),
        Command::Download { message_id, chat_jid } => {
            commands::messaging::download(&wa, &message_id, &chat_jid, &output)
        }
    }
}

fn main() -> ExitCode {
    whatsapp_mcp::init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
