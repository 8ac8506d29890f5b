//! NDJSON tool server exposing the facade operations to an agent host.

pub mod dispatch;
pub mod protocol;
pub mod server;

pub use dispatch::{ToolError, ToolService};
pub use server::ToolServer;
