use super::action::ClockAction;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// A captured clock event waiting to be confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingEvent {
    pub id: i64,                           // ⇔ pending_events.id (AUTOINCREMENT)
    pub employee_id: String,               // ⇔ pending_events.employee_id
    pub action: ClockAction,               // ⇔ pending_events.action ('clock_in' | 'clock_out')
    pub captured_at: i64,                  // ⇔ pending_events.captured_at (epoch ms, UTC)
    pub local_photo_path: Option<PathBuf>, // ⇔ pending_events.local_photo_path
    pub synced: bool,                      // ⇔ pending_events.synced (0/1)

    pub created_at: String,        // ⇔ pending_events.created_at (RFC 3339)
    pub synced_at: Option<String>, // ⇔ pending_events.synced_at
    pub remote_id: Option<String>, // ⇔ pending_events.remote_id
    pub attempts: i64,             // ⇔ pending_events.attempts
    pub last_error: Option<String>, // ⇔ pending_events.last_error
}

/// Fields the capture path provides; the store assigns the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPendingEvent {
    pub employee_id: String,
    pub action: ClockAction,
    pub captured_at: i64,
    pub local_photo_path: Option<PathBuf>,
}

impl NewPendingEvent {
    pub fn new(employee_id: impl Into<String>, action: ClockAction, captured_at: i64) -> Self {
        Self {
            employee_id: employee_id.into(),
            action,
            captured_at,
            local_photo_path: None,
        }
    }

    pub fn with_photo(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_photo_path = Some(path.into());
        self
    }
}

impl PendingEvent {
    pub fn captured_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.captured_at).single()
    }

    /// Capture time rendered in the kiosk's zone, for listings.
    pub fn captured_local(&self, tz: &FixedOffset) -> String {
        self.captured_utc()
            .map(|dt| dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.captured_at.to_string())
    }

    /// Deterministic per-event key carried in remote records so that
    /// duplicates from retried writes can be recognised.
    pub fn capture_key(&self) -> String {
        format!("{}:{}:{}", self.employee_id, self.captured_at, self.action)
    }
}
