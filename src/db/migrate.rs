//! Schema migrations.
//!
//! The `log` table is created first; every later migration is recorded there
//! as a `migration_applied` row whose target is the migration version, so a
//! migration never runs twice against the same database.

use rusqlite::{Connection, OptionalExtension, Result, params};
use tracing::info;

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    message: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20251001_0001_create_pending_events",
        message: "Created pending_events table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS pending_events (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id      TEXT NOT NULL,
            action           TEXT NOT NULL CHECK(action IN ('clock_in','clock_out')),
            captured_at      INTEGER NOT NULL,
            local_photo_path TEXT,
            synced           INTEGER NOT NULL DEFAULT 0 CHECK(synced IN (0,1)),
            created_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pending_synced_id ON pending_events(synced, id);
        CREATE INDEX IF NOT EXISTS idx_pending_employee_time ON pending_events(employee_id, captured_at);
        "#,
    },
    Migration {
        version: "20251001_0002_sync_bookkeeping",
        message: "Added synced_at, remote_id, attempts and last_error to pending_events",
        sql: r#"
        ALTER TABLE pending_events ADD COLUMN synced_at TEXT;
        ALTER TABLE pending_events ADD COLUMN remote_id TEXT;
        ALTER TABLE pending_events ADD COLUMN attempts INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE pending_events ADD COLUMN last_error TEXT;
        "#,
    },
    Migration {
        version: "20251001_0003_synced_monotonic_trigger",
        message: "Installed trigger keeping the synced flag monotonic",
        sql: r#"
        CREATE TRIGGER IF NOT EXISTS pending_events_synced_monotonic
        BEFORE UPDATE OF synced ON pending_events
        WHEN OLD.synced = 1 AND NEW.synced = 0
        BEGIN
            SELECT RAISE(ABORT, 'synced flag cannot be cleared');
        END;
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Run one migration and its bookkeeping row inside a single transaction.
///
/// The ledger is checked again once the write lock is held: another process
/// opening the same file may have applied the migration in the meantime.
/// Returns `false` when there was nothing left to do.
fn apply(conn: &Connection, m: &Migration) -> Result<bool> {
    conn.execute_batch("BEGIN IMMEDIATE;")?;

    let res = is_applied(conn, m.version).and_then(|done| {
        if done {
            return Ok(false);
        }
        conn.execute_batch(m.sql)?;
        conn.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (?1, 'migration_applied', ?2, ?3)",
            params![chrono::Utc::now().to_rfc3339(), m.version, m.message],
        )?;
        Ok(true)
    });

    match res {
        Ok(ran) => {
            conn.execute_batch("COMMIT;")?;
            if ran {
                info!(version = m.version, "{}", m.message);
            }
            Ok(ran)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(e)
        }
    }
}

/// Public entry point: run all pending migrations.
///
/// Returns the versions applied by this call.
pub fn run_pending_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        if apply(conn, m)? {
            applied.push(m.version);
        }
    }

    Ok(applied)
}
