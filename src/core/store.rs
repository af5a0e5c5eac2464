//! Durable queue of captured events awaiting confirmation.
//!
//! `PendingStore` is cheap to clone; the capture path and the synchronizer
//! each hold one. Every operation is a single SQL statement run under a
//! short-lived lock, never held across an `.await`.

use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::pending_event::{NewPendingEvent, PendingEvent};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Clone)]
pub struct PendingStore {
    pool: Arc<Mutex<DbPool>>,
}

impl PendingStore {
    /// Open (or create) the database file and bring the schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self::from_pool(pool))
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            pool: Arc::new(Mutex::new(pool)),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> AppResult<T> {
        let guard = self
            .pool
            .lock()
            .map_err(|_| AppError::Other("database lock poisoned".into()))?;
        Ok(f(&guard.conn)?)
    }

    pub fn insert(&self, event: &NewPendingEvent) -> AppResult<PendingEvent> {
        self.with(|c| queries::insert_pending(c, event))
    }

    pub fn get(&self, id: i64) -> AppResult<PendingEvent> {
        self.with(|c| queries::load_pending(c, id))?
            .ok_or(AppError::EventNotFound(id))
    }

    pub fn list_unsynced(&self) -> AppResult<Vec<PendingEvent>> {
        self.with(queries::list_unsynced)
    }

    pub fn list_all(&self) -> AppResult<Vec<PendingEvent>> {
        self.with(queries::list_all)
    }

    /// Idempotent; `Ok(false)` when the event was already synced.
    pub fn mark_synced(&self, id: i64, remote_id: Option<&str>) -> AppResult<bool> {
        self.with(|c| queries::mark_synced(c, id, remote_id))
    }

    pub fn record_failure(&self, id: i64, message: &str) -> AppResult<()> {
        self.with(|c| queries::record_failure(c, id, message))
    }

    pub fn purge_synced(&self) -> AppResult<usize> {
        self.with(queries::purge_synced)
    }

    /// (pending, synced)
    pub fn counts(&self) -> AppResult<(i64, i64)> {
        self.with(queries::count_by_status)
    }

    pub fn latest_unsynced_for(
        &self,
        employee_id: &str,
        since_ms: i64,
    ) -> AppResult<Option<PendingEvent>> {
        self.with(|c| queries::latest_unsynced_for(c, employee_id, since_ms))
    }

    /// Append to the internal audit log. Failures are logged, never returned.
    pub fn audit(&self, operation: &str, target: &str, message: &str) {
        let res = self
            .pool
            .lock()
            .map_err(|_| AppError::Other("database lock poisoned".into()))
            .and_then(|guard| ttlog(&guard.conn, operation, target, message));

        if let Err(e) = res {
            warn!(operation, error = %e, "failed to write internal log");
        }
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) {
        self.with(|c| c.execute_batch(sql)).unwrap();
    }
}
