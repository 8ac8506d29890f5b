//! Contact and chat commands.
//!
//! CHANGELOG:
//! - 01/30/2026 - Rewritten for WhatsApp chats and contacts

use anyhow::Result;

use crate::db::query::ChatFilter;
use crate::models::{Chat, Contact};
use crate::output::OutputControls;
use crate::service::WhatsApp;

pub fn search(wa: &WhatsApp, query: &str, output: &OutputControls) -> Result<()> {
    let contacts = wa.search_contacts(query);
    if output.json {
        output.print(&contacts);
        return Ok(());
    }
    if contacts.is_empty() {
        println!("No contacts matching '{}'", query);
    }
    for contact in &contacts {
        println!("{}", contact_line(contact));
    }
    Ok(())
}

pub fn chats(wa: &WhatsApp, filter: &ChatFilter, output: &OutputControls) -> Result<()> {
    print_chats(&wa.list_chats(filter), output);
    Ok(())
}

pub fn chat(wa: &WhatsApp, jid: &str, include_last_message: bool, output: &OutputControls) -> Result<()> {
    print_chat(wa.get_chat(jid, include_last_message), jid, output);
    Ok(())
}

pub fn direct_chat(wa: &WhatsApp, phone: &str, output: &OutputControls) -> Result<()> {
    print_chat(wa.get_direct_chat_by_contact(phone), phone, output);
    Ok(())
}

pub fn contact_chats(wa: &WhatsApp, jid: &str, limit: u32, page: u32, output: &OutputControls) -> Result<()> {
    print_chats(&wa.get_contact_chats(jid, limit, page), output);
    Ok(())
}

fn print_chat(chat: Option<Chat>, key: &str, output: &OutputControls) {
    if output.json {
        output.print(&chat);
        return;
    }
    match chat {
        Some(chat) => println!("{}", chat_line(&chat)),
        None => println!("No chat found for {}", key),
    }
}

fn print_chats(chats: &[Chat], output: &OutputControls) {
    if output.json {
        output.print(&chats);
        return;
    }
    if chats.is_empty() {
        println!("No chats");
    }
    for chat in chats {
        println!("{}", chat_line(chat));
    }
}

fn contact_line(contact: &Contact) -> String {
    match contact.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{} ({})", name, contact.jid),
        _ => contact.jid.clone(),
    }
}

/// `Name (jid) [group] - last: [time] Me: text`
fn chat_line(chat: &Chat) -> String {
    let mut line = match chat.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{} ({})", name, chat.jid),
        _ => chat.jid.clone(),
    };
    if chat.is_group() {
        line.push_str(" [group]");
    }
    if let Some(ts) = chat.last_message_time {
        line.push_str(&format!(" - last: [{}]", ts.format("%Y-%m-%d %H:%M:%S")));
        if let Some(text) = chat.last_message.as_deref() {
            let who = if chat.last_is_from_me == Some(true) {
                "Me"
            } else {
                chat.last_sender.as_deref().unwrap_or("?")
            };
            line.push_str(&format!(" {}: {}", who, text));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_store_timestamp;

    fn chat() -> Chat {
        Chat {
            jid: "120363000000000001@g.us".into(),
            name: Some("Lunch Crew".into()),
            last_message_time: parse_store_timestamp("2025-01-15 10:00:00+00:00"),
            last_message: Some("who is in".into()),
            last_sender: Some("14155550002@s.whatsapp.net".into()),
            last_is_from_me: Some(false),
        }
    }

    #[test]
    fn test_chat_line_with_last_message() {
        assert_eq!(
            chat_line(&chat()),
            "Lunch Crew (120363000000000001@g.us) [group] - last: [2025-01-15 10:00:00] 14155550002@s.whatsapp.net: who is in"
        );
    }

    #[test]
    fn test_chat_line_bare() {
        let bare = Chat {
            jid: "14155550001@s.whatsapp.net".into(),
            name: None,
            last_message_time: None,
            last_message: None,
            last_sender: None,
            last_is_from_me: None,
        };
        assert_eq!(chat_line(&bare), "14155550001@s.whatsapp.net");
    }

    #[test]
    fn test_contact_line() {
        let named = Contact::from_jid("14155550001@s.whatsapp.net".into(), Some("Alice".into()));
        assert_eq!(contact_line(&named), "Alice (14155550001@s.whatsapp.net)");
        let unnamed = Contact::from_jid("14155550003@s.whatsapp.net".into(), None);
        assert_eq!(contact_line(&unnamed), "14155550003@s.whatsapp.net");
    }
}
