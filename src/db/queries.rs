use crate::errors::AppError;
use crate::models::action::ClockAction;
use crate::models::pending_event::{NewPendingEvent, PendingEvent};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use std::path::PathBuf;

const SELECT_PENDING: &str = "SELECT id, employee_id, action, captured_at, local_photo_path,
            synced, created_at, synced_at, remote_id, attempts, last_error
     FROM pending_events";

pub fn map_row(row: &Row) -> Result<PendingEvent> {
    let action_str: String = row.get("action")?;
    let action = ClockAction::from_db_str(&action_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidAction(action_str.clone())),
        )
    })?;

    let photo: Option<String> = row.get("local_photo_path")?;

    Ok(PendingEvent {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        action,
        captured_at: row.get("captured_at")?,
        local_photo_path: photo.map(PathBuf::from),
        synced: row.get::<_, i64>("synced")? == 1,
        created_at: row.get("created_at")?,
        synced_at: row.get("synced_at")?,
        remote_id: row.get("remote_id")?,
        attempts: row.get("attempts")?,
        last_error: row.get("last_error")?,
    })
}

fn collect(stmt: &mut rusqlite::Statement<'_>, params: impl rusqlite::Params) -> Result<Vec<PendingEvent>> {
    let rows = stmt.query_map(params, map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert a new, unsynced event. Single statement: either the whole row
/// is visible afterwards or nothing is.
pub fn insert_pending(conn: &Connection, ev: &NewPendingEvent) -> Result<PendingEvent> {
    let photo = ev
        .local_photo_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());

    conn.execute(
        "INSERT INTO pending_events (employee_id, action, captured_at, local_photo_path, synced, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![
            ev.employee_id,
            ev.action.to_db_str(),
            ev.captured_at,
            photo,
            Utc::now().to_rfc3339(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    load_pending(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn load_pending(conn: &Connection, id: i64) -> Result<Option<PendingEvent>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_PENDING} WHERE id = ?1"))?;
    stmt.query_row([id], map_row).optional()
}

/// All rows still waiting for the synchronizer, in capture (id) order.
pub fn list_unsynced(conn: &Connection) -> Result<Vec<PendingEvent>> {
    let mut stmt =
        conn.prepare_cached(&format!("{SELECT_PENDING} WHERE synced = 0 ORDER BY id ASC"))?;
    collect(&mut stmt, [])
}

pub fn list_all(conn: &Connection) -> Result<Vec<PendingEvent>> {
    let mut stmt = conn.prepare_cached(&format!("{SELECT_PENDING} ORDER BY id ASC"))?;
    collect(&mut stmt, [])
}

/// Flip `synced` to 1. Rows already synced are left untouched, so the call
/// is idempotent; returns whether this call changed the row.
pub fn mark_synced(conn: &Connection, id: i64, remote_id: Option<&str>) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE pending_events
         SET synced = 1, synced_at = ?1, remote_id = ?2, last_error = NULL
         WHERE id = ?3 AND synced = 0",
        params![Utc::now().to_rfc3339(), remote_id, id],
    )?;
    Ok(changed == 1)
}

/// Remember why a sync attempt failed. Never touches `synced`.
pub fn record_failure(conn: &Connection, id: i64, message: &str) -> Result<()> {
    conn.execute(
        "UPDATE pending_events
         SET attempts = attempts + 1, last_error = ?1
         WHERE id = ?2 AND synced = 0",
        params![message, id],
    )?;
    Ok(())
}

/// Delete every synced row in one statement. Unsynced rows, and rows
/// inserted while this runs (always unsynced), are never matched.
pub fn purge_synced(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM pending_events WHERE synced = 1", [])
}

/// (pending, synced) row counts.
pub fn count_by_status(conn: &Connection) -> Result<(i64, i64)> {
    conn.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN synced = 0 THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN synced = 1 THEN 1 ELSE 0 END), 0)
         FROM pending_events",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}

/// Most recent unsynced event for an employee captured at or after `since_ms`.
pub fn latest_unsynced_for(
    conn: &Connection,
    employee_id: &str,
    since_ms: i64,
) -> Result<Option<PendingEvent>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{SELECT_PENDING}
         WHERE employee_id = ?1 AND synced = 0 AND captured_at >= ?2
         ORDER BY captured_at DESC, id DESC
         LIMIT 1"
    ))?;
    stmt.query_row(params![employee_id, since_ms], map_row).optional()
}
