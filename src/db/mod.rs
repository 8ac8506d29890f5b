//! Database module: read-only SQLite access to the bridge's messages.db.
//!
//! CHANGELOG:
//! - 02/01/2026 - Added typed query builder and context assembler
//! - 01/28/2026 - Initial module structure

pub mod connection;
pub mod context;
pub mod helpers;
pub mod queries;
pub mod query;

#[cfg(test)]
pub(crate) mod fixtures;
