//! Error taxonomy for store reads and bridge calls.
//!
//! CHANGELOG:
//! - 02/03/2026 - Split bridge failures into Transport / Response variants
//! - 01/28/2026 - Initial error enum

use thiserror::Error;

/// Errors surfaced by the query and send layers.
///
/// Read paths log `Store` and degrade to empty results; send paths turn every
/// variant into a failed [`crate::models::SendOutcome`]. Only `InvalidArgument`
/// and `NotFound` normally reach a caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    #[error("Message with ID {message_id} not found")]
    NotFound { message_id: String },

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bridge response error: {body}")]
    Response { status: Option<u16>, body: String },

    #[error("Audio conversion failed: {0}")]
    Transcode(String),
}

impl Error {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Stable code used in tool-server error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Response { .. } => "RESPONSE_ERROR",
            Self::Transcode(_) => "TRANSCODE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_names_field() {
        let err = Error::invalid("after", "not ISO-8601");
        assert!(err.to_string().contains("'after'"));
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            message_id: "ABC123".to_string(),
        };
        assert_eq!(err.to_string(), "Message with ID ABC123 not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
