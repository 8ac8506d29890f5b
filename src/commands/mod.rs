//! CLI command implementations. Each renders one facade operation as text
//! or JSON.
//!
//! CHANGELOG:
//! - 01/30/2026 - Regrouped into reading / contacts / messaging

pub mod contacts;
pub mod messaging;
pub mod reading;
