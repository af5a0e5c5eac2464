//! Decide whether the next capture is a clock-in or a clock-out.

use crate::core::store::PendingStore;
use crate::errors::{AppError, AppResult};
use crate::models::action::ClockAction;
use crate::remote::DocumentStore;
use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};
use std::sync::Arc;
use tracing::debug;

pub struct ActionResolver {
    documents: Arc<dyn DocumentStore>,
    tz: FixedOffset,
    lookback_days: u32,
    pending: Option<PendingStore>,
}

impl ActionResolver {
    pub fn new(documents: Arc<dyn DocumentStore>, tz: FixedOffset, lookback_days: u32) -> Self {
        Self {
            documents,
            tz,
            lookback_days,
            pending: None,
        }
    }

    /// Also consult local events that have not been confirmed yet, so two
    /// offline captures in a row still alternate.
    pub fn with_pending(mut self, store: PendingStore) -> Self {
        self.pending = Some(store);
        self
    }

    /// Local midnight `lookback_days - 1` days before `now`, as UTC.
    /// A lookback of 0 or 1 means "since the start of today".
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.tz).date_naive();
        let back = u64::from(self.lookback_days.max(1) - 1);
        let first_day = today.checked_sub_days(Days::new(back)).unwrap_or(today);

        // a fixed offset has no gaps, so local midnight always exists
        first_day
            .and_time(NaiveTime::MIN)
            .and_local_timezone(self.tz)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now)
    }

    pub async fn resolve(&self, employee_id: &str, now: DateTime<Utc>) -> AppResult<ClockAction> {
        let since = self.window_start(now);

        let remote = self
            .documents
            .latest_for(employee_id, since)
            .await
            .map_err(|e| AppError::Lookup("Read last log", e))?;

        let mut last = remote.map(|r| (r.timestamp.timestamp_millis(), r.action));

        if let Some(store) = &self.pending
            && let Some(local) = store.latest_unsynced_for(employee_id, since.timestamp_millis())?
            && last.is_none_or(|(ts, _)| local.captured_at >= ts)
        {
            last = Some((local.captured_at, local.action));
        }

        let next = ClockAction::next_after(last.map(|(_, a)| a));
        debug!(
            employee_id,
            since = %since,
            last = ?last.map(|(_, a)| a),
            next = %next,
            "resolved next action"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pending_event::NewPendingEvent;
    use crate::models::remote_record::RemoteEventRecord;
    use crate::remote::memory::MemoryRemote;
    use chrono::TimeZone;

    fn manila() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn record(employee: &str, action: ClockAction, ts: DateTime<Utc>) -> RemoteEventRecord {
        RemoteEventRecord {
            employee_id: employee.into(),
            action,
            timestamp: ts,
            photo_ref_in: None,
            photo_ref_out: None,
            photo_in_path: None,
            photo_out_path: None,
            capture_key: None,
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        manila()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn window_starts_at_local_midnight() {
        let remote = Arc::new(MemoryRemote::new());
        let now = local(2025, 3, 10, 0, 30);

        let today = ActionResolver::new(remote.clone(), manila(), 1);
        assert_eq!(today.window_start(now), local(2025, 3, 10, 0, 0));

        let two_days = ActionResolver::new(remote, manila(), 2);
        assert_eq!(two_days.window_start(now), local(2025, 3, 9, 0, 0));
    }

    #[tokio::test]
    async fn alternates_on_latest_record() {
        let remote = Arc::new(MemoryRemote::new());
        let resolver = ActionResolver::new(remote.clone(), manila(), 1);
        let now = local(2025, 3, 10, 17, 0);

        assert_eq!(resolver.resolve("E1", now).await.unwrap(), ClockAction::ClockIn);

        remote.add_record(record("E1", ClockAction::ClockIn, local(2025, 3, 10, 8, 0)));
        assert_eq!(resolver.resolve("E1", now).await.unwrap(), ClockAction::ClockOut);

        remote.add_record(record("E1", ClockAction::ClockOut, local(2025, 3, 10, 12, 0)));
        assert_eq!(resolver.resolve("E1", now).await.unwrap(), ClockAction::ClockIn);

        // other employees do not count
        assert_eq!(resolver.resolve("E2", now).await.unwrap(), ClockAction::ClockIn);
    }

    #[tokio::test]
    async fn clock_in_after_clock_out_resolves_to_out() {
        let remote = Arc::new(MemoryRemote::new());
        let resolver = ActionResolver::new(remote.clone(), manila(), 1);
        let now = local(2025, 3, 10, 17, 0);

        // stored newest first so the pick is by timestamp, not append order
        remote.add_record(record("E3", ClockAction::ClockIn, local(2025, 3, 10, 13, 0)));
        remote.add_record(record("E3", ClockAction::ClockOut, local(2025, 3, 10, 12, 0)));

        assert_eq!(resolver.resolve("E3", now).await.unwrap(), ClockAction::ClockOut);
    }

    #[tokio::test]
    async fn records_before_the_window_are_ignored() {
        let remote = Arc::new(MemoryRemote::new());
        remote.add_record(record("E1", ClockAction::ClockIn, local(2025, 3, 9, 23, 59)));
        let resolver = ActionResolver::new(remote.clone(), manila(), 1);

        let now = local(2025, 3, 10, 0, 1);
        assert_eq!(resolver.resolve("E1", now).await.unwrap(), ClockAction::ClockIn);

        // exactly at the boundary is inside
        remote.add_record(record("E2", ClockAction::ClockIn, local(2025, 3, 10, 0, 0)));
        assert_eq!(resolver.resolve("E2", now).await.unwrap(), ClockAction::ClockOut);
    }

    #[tokio::test]
    async fn two_day_window_pairs_overnight_shift() {
        let remote = Arc::new(MemoryRemote::new());
        remote.add_record(record("E1", ClockAction::ClockIn, local(2025, 3, 9, 22, 0)));
        let resolver = ActionResolver::new(remote, manila(), 2);

        let now = local(2025, 3, 10, 6, 0);
        assert_eq!(resolver.resolve("E1", now).await.unwrap(), ClockAction::ClockOut);
    }

    #[tokio::test]
    async fn lookup_failure_is_reported() {
        let remote = Arc::new(MemoryRemote::new());
        remote.set_offline(true);
        let resolver = ActionResolver::new(remote, manila(), 1);

        let err = resolver.resolve("E1", Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Lookup("Read last log", _)));
    }

    #[tokio::test]
    async fn unsynced_local_events_are_considered_when_enabled() {
        let remote = Arc::new(MemoryRemote::new());
        let store = PendingStore::in_memory().unwrap();
        let now = local(2025, 3, 10, 9, 0);

        store
            .insert(&NewPendingEvent::new(
                "E1",
                ClockAction::ClockIn,
                local(2025, 3, 10, 8, 0).timestamp_millis(),
            ))
            .unwrap();

        let plain = ActionResolver::new(remote.clone(), manila(), 1);
        assert_eq!(plain.resolve("E1", now).await.unwrap(), ClockAction::ClockIn);

        let hardened = ActionResolver::new(remote.clone(), manila(), 1).with_pending(store);
        assert_eq!(hardened.resolve("E1", now).await.unwrap(), ClockAction::ClockOut);

        // a newer confirmed record still wins
        remote.add_record(record("E1", ClockAction::ClockOut, local(2025, 3, 10, 8, 30)));
        assert_eq!(hardened.resolve("E1", now).await.unwrap(), ClockAction::ClockIn);
    }
}
