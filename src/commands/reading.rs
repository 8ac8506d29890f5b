//! Reading commands: messages, context, last interaction, reactions.
//!
//! CHANGELOG:
//! - 02/03/2026 - Reactions command
//! - 01/30/2026 - Initial implementation

use anyhow::Result;

use crate::db::query::MessageFilter;
use crate::models::Reaction;
use crate::output::OutputControls;
use crate::service::WhatsApp;

/// List messages as formatted lines, or as JSON message objects.
pub fn messages(wa: &WhatsApp, filter: &MessageFilter, output: &OutputControls) -> Result<()> {
    if output.json {
        output.print(&wa.list_messages(filter)?);
    } else {
        print!("{}", with_trailing_newline(wa.list_messages_text(filter)?));
    }
    Ok(())
}

/// Show a message with its neighbours.
pub fn context(wa: &WhatsApp, message_id: &str, before: u32, after: u32, output: &OutputControls) -> Result<()> {
    let ctx = wa.get_message_context(message_id, before, after)?;
    if output.json {
        output.print(&ctx);
        return Ok(());
    }

    let before_text = wa.render_messages(&ctx.before, false);
    let after_text = wa.render_messages(&ctx.after, false);
    let target = wa.render_messages(std::slice::from_ref(&ctx.message), true);

    if !ctx.before.is_empty() {
        print!("{}", before_text);
    }
    print!("> {}", target);
    if !ctx.after.is_empty() {
        print!("{}", after_text);
    }
    Ok(())
}

pub fn last_interaction(wa: &WhatsApp, jid: &str, output: &OutputControls) -> Result<()> {
    if output.json {
        output.print(&wa.get_last_interaction(jid));
    } else {
        match wa.get_last_interaction_text(jid) {
            Some(line) => println!("{}", line),
            None => println!("No interactions with {}", jid),
        }
    }
    Ok(())
}

pub fn reactions(wa: &WhatsApp, message_id: &str, chat_jid: &str, output: &OutputControls) -> Result<()> {
    let reactions = wa.get_reactions(message_id, chat_jid);
    if output.json {
        output.print(&reactions);
        return Ok(());
    }
    if reactions.is_empty() {
        println!("No reactions");
    }
    for reaction in &reactions {
        println!("{}", reaction_line(reaction));
    }
    Ok(())
}

fn reaction_line(reaction: &Reaction) -> String {
    let text = if reaction.reaction_text.is_empty() {
        "(removed)"
    } else {
        reaction.reaction_text.as_str()
    };
    format!(
        "[{}] {}: {}",
        reaction.timestamp.format("%Y-%m-%d %H:%M:%S"),
        reaction.reactor_sender,
        text
    )
}

fn with_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
