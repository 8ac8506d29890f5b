//! HTTP client for the WhatsApp bridge's REST API.
//!
//! Every operation is a single blocking POST with the transport's default
//! timeouts and no retry. Failures never surface as `Err`: they come back as
//! a failed [`SendOutcome`] / [`DownloadOutcome`] carrying a readable message.
//!
//! CHANGELOG:
//! - 02/03/2026 - download_media reports the bridge's file path
//! - 02/02/2026 - Reactions and reply-to support
//! - 01/30/2026 - Initial send client

use std::path::Path;

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use super::audio::{needs_conversion, AudioTranscoder, FfmpegTranscoder};
use crate::error::{Error, Result};
use crate::models::{DownloadOutcome, SendOutcome};

const UNKNOWN_RESPONSE: &str = "Unknown response";

/// Quote-reply target. Empty strings count as "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyTo {
    pub message_id: Option<String>,
    pub sender_jid: Option<String>,
}

impl ReplyTo {
    pub fn new(message_id: Option<String>, sender_jid: Option<String>) -> Self {
        Self {
            message_id,
            sender_jid,
        }
    }

    fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref().filter(|v| !v.is_empty())
    }

    fn sender_jid(&self) -> Option<&str> {
        self.sender_jid.as_deref().filter(|v| !v.is_empty())
    }
}

#[derive(Serialize)]
struct SendPayload<'a> {
    recipient: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_sender_jid: Option<&'a str>,
}

#[derive(Serialize)]
struct ReactPayload<'a> {
    chat_jid: &'a str,
    message_id: &'a str,
    reaction: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_sender_jid: Option<&'a str>,
}

#[derive(Serialize)]
struct DownloadPayload<'a> {
    message_id: &'a str,
    chat_jid: &'a str,
}

pub struct BridgeClient {
    http: Client,
    base_url: String,
    transcoder: Box<dyn AudioTranscoder>,
}

impl BridgeClient {
    /// Client for `base_url` (e.g. `http://localhost:8080/api`) using ffmpeg for audio.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_transcoder(base_url, Box::new(FfmpegTranscoder::default()))
    }

    pub fn with_transcoder(base_url: impl Into<String>, transcoder: Box<dyn AudioTranscoder>) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transcoder,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a text message, optionally as a quote reply.
    pub fn send_message(&self, recipient: &str, message: &str, reply: &ReplyTo) -> SendOutcome {
        if recipient.is_empty() {
            return SendOutcome::failed("Recipient must be provided");
        }
        let payload = SendPayload {
            recipient,
            message: Some(message),
            media_path: None,
            reply_to_message_id: reply.message_id(),
            reply_to_sender_jid: reply.sender_jid(),
        };
        self.send_outcome("send", &payload)
    }

    /// Send a local file as media (image, video, document, raw audio).
    pub fn send_file(&self, recipient: &str, media_path: &str, reply: &ReplyTo) -> SendOutcome {
        if let Err(outcome) = check_media_args(recipient, media_path) {
            return outcome;
        }
        let payload = SendPayload {
            recipient,
            message: None,
            media_path: Some(media_path),
            reply_to_message_id: reply.message_id(),
            reply_to_sender_jid: reply.sender_jid(),
        };
        self.send_outcome("send", &payload)
    }

    /// Send a local audio file as a voice note, converting to Opus/Ogg when needed.
    pub fn send_audio_message(&self, recipient: &str, media_path: &str, reply: &ReplyTo) -> SendOutcome {
        if let Err(outcome) = check_media_args(recipient, media_path) {
            return outcome;
        }

        let input = Path::new(media_path);
        let converted = if needs_conversion(input) {
            match self.transcoder.to_opus_ogg(input) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(media_path, error = %e, "audio conversion failed");
                    return SendOutcome::failed(format!(
                        "Error converting file to opus ogg. You likely need to install ffmpeg: {}",
                        e
                    ));
                }
            }
        } else {
            None
        };

        let converted_str = converted.as_ref().map(|p| p.to_string_lossy().into_owned());
        let payload = SendPayload {
            recipient,
            message: None,
            media_path: Some(converted_str.as_deref().unwrap_or(media_path)),
            reply_to_message_id: reply.message_id(),
            reply_to_sender_jid: reply.sender_jid(),
        };
        self.send_outcome("send", &payload)
    }

    /// React to a message. An empty `reaction` removes a prior reaction.
    pub fn send_reaction(
        &self,
        chat_jid: &str,
        message_id: &str,
        reaction: &str,
        reply_to_sender_jid: Option<&str>,
    ) -> SendOutcome {
        if chat_jid.is_empty() || message_id.is_empty() {
            return SendOutcome::failed("chat_jid and message_id are required");
        }
        let payload = ReactPayload {
            chat_jid,
            message_id,
            reaction,
            reply_to_sender_jid: reply_to_sender_jid.filter(|v| !v.is_empty()),
        };
        self.send_outcome("react", &payload)
    }

    /// Ask the bridge to download a message's media; returns the local path.
    pub fn download_media(&self, message_id: &str, chat_jid: &str) -> DownloadOutcome {
        if chat_jid.is_empty() || message_id.is_empty() {
            return DownloadOutcome::failed("chat_jid and message_id are required");
        }
        let payload = DownloadPayload { message_id, chat_jid };

        let body = match self.post("download", &payload) {
            Ok(body) => body,
            Err(Error::Response {
                status: Some(code),
                body,
            }) => {
                tracing::warn!(status = code, "download failed");
                return DownloadOutcome::failed(format!("HTTP {}: {}", code, body));
            }
            Err(e) => {
                tracing::warn!(error = %e, "download failed");
                return DownloadOutcome::failed(failure_message(&e));
            }
        };

        if !bool_field(&body, "success") {
            let message = str_field(&body, "message").unwrap_or("Unknown error");
            tracing::warn!(message_id, reason = message, "download failed");
            return DownloadOutcome::failed(message);
        }

        match str_field(&body, "path").filter(|p| !p.is_empty()) {
            Some(path) => {
                tracing::info!(message_id, path, "media downloaded");
                DownloadOutcome {
                    success: true,
                    message: "Media downloaded successfully".to_string(),
                    file_path: Some(path.to_string()),
                }
            }
            None => DownloadOutcome::failed("Failed to download media"),
        }
    }

    fn send_outcome<P: Serialize>(&self, endpoint: &str, payload: &P) -> SendOutcome {
        match self.post(endpoint, payload) {
            Ok(body) => {
                let outcome = SendOutcome {
                    success: bool_field(&body, "success"),
                    message: str_field(&body, "message").unwrap_or(UNKNOWN_RESPONSE).to_string(),
                };
                if outcome.success {
                    tracing::info!(endpoint, "bridge accepted request");
                } else {
                    tracing::warn!(endpoint, reason = %outcome.message, "bridge rejected request");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "bridge request failed");
                SendOutcome::failed(failure_message(&e))
            }
        }
    }

    /// POST `payload` as JSON; a 200 response must carry a JSON body.
    fn post<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, "POST");

        let response = self.http.post(&url).json(payload).send()?;
        let status = response.status();
        let body = response.text()?;

        if status != reqwest::StatusCode::OK {
            return Err(Error::Response {
                status: Some(status.as_u16()),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|_| Error::Response { status: None, body })
    }
}

fn check_media_args(recipient: &str, media_path: &str) -> std::result::Result<(), SendOutcome> {
    if recipient.is_empty() {
        return Err(SendOutcome::failed("Recipient must be provided"));
    }
    if media_path.is_empty() {
        return Err(SendOutcome::failed("Media path must be provided"));
    }
    if !Path::new(media_path).is_file() {
        return Err(SendOutcome::failed(format!("Media file not found: {}", media_path)));
    }
    Ok(())
}

/// Outcome text for a failed POST.
fn failure_message(err: &Error) -> String {
    match err {
        Error::Response {
            status: Some(code),
            body,
        } => format!("Error: HTTP {} - {}", code, body),
        Error::Response { status: None, body } => format!("Error parsing response: {}", body),
        Error::Transport(e) => format!("Request error: {}", e),
        other => format!("Unexpected error: {}", other),
    }
}

fn bool_field(body: &Value, key: &str) -> bool {
    body.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}
