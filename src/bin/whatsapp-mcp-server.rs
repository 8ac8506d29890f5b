//! whatsapp-mcp-server - NDJSON tool server on stdin/stdout.
//!
//! CHANGELOG:
//! - 01/30/2026 - Initial implementation

use anyhow::{Context, Result};
use clap::Parser;

use whatsapp_mcp::config::Config;
use whatsapp_mcp::service::WhatsApp;
use whatsapp_mcp::tools::{ToolServer, ToolService};

#[derive(Parser)]
#[command(name = "whatsapp-mcp-server")]
#[command(version, about = "Serve WhatsApp query and send tools as NDJSON over stdio")]
struct Cli {
    /// Path to the bridge's messages.db
    #[arg(long)]
    db_path: Option<String>,

    /// Bridge API base URL
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    whatsapp_mcp::init_tracing();

    let cli = Cli::parse();
    let config = Config::load()?.with_overrides(cli.db_path.as_deref(), cli.api_url.as_deref());

    tracing::info!(
        db_path = %config.db_path.display(),
        api_base_url = %config.api_base_url,
        "starting tool server"
    );
    if !config.db_path.exists() {
        tracing::warn!(db_path = %config.db_path.display(), "store not found; reads will return empty results");
    }

    let wa = WhatsApp::new(&config).context("Failed to build bridge client")?;
    ToolServer::new(ToolService::new(wa)).serve_stdio()
}
