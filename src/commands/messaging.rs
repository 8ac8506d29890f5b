//! Messaging commands: send text, file, voice note, reaction; download media.
//!
//! A failed bridge outcome is returned as an error so the process exits 1.
//!
//! CHANGELOG:
//! - 02/02/2026 - Reactions and downloads
//! - 01/30/2026 - Sends go through the bridge client

use anyhow::{anyhow, Result};

use crate::bridge::ReplyTo;
use crate::models::{DownloadOutcome, SendOutcome};
use crate::output::OutputControls;
use crate::service::WhatsApp;

pub fn send(wa: &WhatsApp, recipient: &str, message: &str, reply: &ReplyTo, output: &OutputControls) -> Result<()> {
    report(wa.send_message(recipient, message, reply), output)
}

pub fn send_file(wa: &WhatsApp, recipient: &str, media_path: &str, reply: &ReplyTo, output: &OutputControls) -> Result<()> {
    report(wa.send_file(recipient, media_path, reply), output)
}

pub fn send_audio(wa: &WhatsApp, recipient: &str, media_path: &str, reply: &ReplyTo, output: &OutputControls) -> Result<()> {
    report(wa.send_audio_message(recipient, media_path, reply), output)
}

pub fn react(
    wa: &WhatsApp,
    chat_jid: &str,
    message_id: &str,
    reaction: &str,
    reply_to_sender_jid: Option<&str>,
    output: &OutputControls,
) -> Result<()> {
    report(
        wa.send_reaction(chat_jid, message_id, reaction, reply_to_sender_jid),
        output,
    )
}

pub fn download(wa: &WhatsApp, message_id: &str, chat_jid: &str, output: &OutputControls) -> Result<()> {
    let outcome: DownloadOutcome = wa.download_media(message_id, chat_jid);
    if output.json {
        output.print(&outcome);
    } else if let Some(path) = outcome.file_path.as_deref() {
        println!("{}", path);
    }
    if outcome.success {
        Ok(())
    } else {
        Err(anyhow!("{}", outcome.message))
    }
}

fn report(outcome: SendOutcome, output: &OutputControls) -> Result<()> {
    if output.json {
        output.print(&outcome);
    } else if outcome.success {
        println!("{}", outcome.message);
    }
    if outcome.success {
        Ok(())
    } else {
        Err(anyhow!("{}", outcome.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_is_error() {
        let err = report(SendOutcome::failed("Recipient must be provided"), &OutputControls::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Recipient must be provided");
        assert!(report(SendOutcome::ok("sent"), &OutputControls::default()).is_ok());
    }
}
