//! NDJSON wire types for the tool server: one request per line on stdin,
//! one response per line on stdout.
//!
//! CHANGELOG:
//! - 02/02/2026 - Error payloads carry typed codes
//! - 01/30/2026 - Initial protocol

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PROTOCOL_VERSION: u8 = 1;

/// Error codes emitted by the server itself (argument and lookup codes come
/// from [`crate::error::Error::code`]).
pub const INVALID_JSON: &str = "INVALID_JSON";
pub const UNKNOWN_METHOD: &str = "UNKNOWN_METHOD";
pub const UNSUPPORTED_VERSION: &str = "UNSUPPORTED_VERSION";

#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    /// Caller-chosen id, echoed in the response.
    pub id: String,
    #[serde(default = "default_version")]
    pub v: u8,
    pub method: String,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

fn default_version() -> u8 {
    PROTOCOL_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Handling time in milliseconds.
    pub server_ms: f64,
    pub protocol_v: u8,
}

impl Request {
    pub fn from_ndjson_line(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim()).context("Failed to parse request JSON")
    }
}

impl Response {
    pub fn success(id: String, result: serde_json::Value, server_ms: f64) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
            meta: ResponseMeta {
                server_ms,
                protocol_v: PROTOCOL_VERSION,
            },
        }
    }

    pub fn error(id: String, code: &str, message: String, server_ms: f64) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(ErrorInfo {
                code: code.to_string(),
                message,
            }),
            meta: ResponseMeta {
                server_ms,
                protocol_v: PROTOCOL_VERSION,
            },
        }
    }

    pub fn to_ndjson_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
