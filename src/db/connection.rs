//! Scoped SQLite connections to the bridge store.
//!
//! Every call opens its own read-only connection and drops it on return.
//! There is no pooling and no shared connection state.
//!
//! CHANGELOG:
//! - 01/28/2026 - Initial implementation

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Handle to the store file. Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a read-only connection.
    pub fn open(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Run `f` against a fresh connection. The connection is closed on every
    /// exit path, including errors from `f`.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    /// Check that the store can be opened.
    pub fn check_access(&self) -> bool {
        self.open().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::Fixture;

    #[test]
    fn test_missing_store_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("absent.db"));
        assert!(store.open().is_err());
        assert!(!store.check_access());
    }

    #[test]
    fn test_with_connection_reads() {
        let fixture = Fixture::new();
        let count: i64 = fixture
            .store()
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM chats", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_connection_is_read_only() {
        let fixture = Fixture::new();
        let result = fixture.store().with_connection(|conn| {
            conn.execute("INSERT INTO chats (jid, name) VALUES ('x', 'y')", [])?;
            Ok(())
        });
        assert!(result.is_err());
    }
}
