//! SQLite connection wrapper.
//! One connection per process, shared between the capture path and the
//! background synchronizer through `core::store::PendingStore`.

use rusqlite::{Connection, Result};
use std::path::Path;
use std::time::Duration;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Private in-memory database (tests, dry runs).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Durability settings: a row is on disk once its INSERT returns.
    fn configure(conn: &Connection) -> Result<()> {
        // before WAL: switching a fresh file needs the lock another opener may hold
        conn.busy_timeout(Duration::from_secs(5))?;
        // in-memory databases answer "memory" here
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        Ok(())
    }
}
