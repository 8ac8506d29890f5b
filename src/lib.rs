//! whatsapp-mcp library
//!
//! Query and send layer over a WhatsApp bridge: read-only SQLite access to
//! the bridge's message store plus an HTTP client for its send API.
//!
//! CHANGELOG:
//! - 02/02/2026 - Tool server module
//! - 01/28/2026 - Initial library structure

pub mod bridge;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod output;
pub mod service;
pub mod tools;

/// Install the stderr tracing subscriber. `RUST_LOG` adds directives on top
/// of the WARN default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();
}
