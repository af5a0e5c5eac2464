//! Push pending events to the remote store.
//!
//! One run walks the unsynced events in capture order. For each event:
//! upload the photo (if any), write the record, mark the event synced.
//! A failure on one event is recorded on that event and the run moves on;
//! only a failure to read the queue fails the run itself.

use crate::config::{Config, TimestampSource};
use crate::core::stager::{blob_key, image_extension};
use crate::core::store::PendingStore;
use crate::errors::AppResult;
use crate::models::pending_event::PendingEvent;
use crate::models::remote_record::{NewRemoteRecord, PhotoRef};
use crate::remote::{BlobSink, DocumentStore, Remote};
use chrono::FixedOffset;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to one event during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Synced,
    /// The staged photo was gone; the record went out without one.
    SyncedWithoutPhoto,
    /// Photo upload failed; no record was written.
    UploadFailed,
    WriteFailed,
    /// The record was written but the local flag could not be set.
    /// The event stays pending and will be written again.
    ConfirmFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub attempted: usize,
    pub synced: usize,
    pub synced_without_photo: usize,
    pub upload_failed: usize,
    pub write_failed: usize,
    pub confirm_failed: usize,
    pub purged: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: EventOutcome) {
        self.attempted += 1;
        match outcome {
            EventOutcome::Synced => self.synced += 1,
            EventOutcome::SyncedWithoutPhoto => {
                self.synced += 1;
                self.synced_without_photo += 1;
            }
            EventOutcome::UploadFailed => self.upload_failed += 1,
            EventOutcome::WriteFailed => self.write_failed += 1,
            EventOutcome::ConfirmFailed => self.confirm_failed += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.upload_failed + self.write_failed + self.confirm_failed
    }

    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} attempted, {} synced, {} failed",
            self.attempted,
            self.synced,
            self.failed()
        );
        if self.synced_without_photo > 0 {
            s.push_str(&format!(", {} without photo", self.synced_without_photo));
        }
        if self.purged > 0 {
            s.push_str(&format!(", {} purged", self.purged));
        }
        s
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub tz: FixedOffset,
    pub blob_prefix: String,
    pub timestamp_source: TimestampSource,
    pub delete_local_photo: bool,
    pub purge_after_sync: bool,
}

impl SyncOptions {
    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        Ok(Self {
            tz: cfg.tz()?,
            blob_prefix: cfg.sync.blob_prefix.clone(),
            timestamp_source: cfg.sync.timestamp_source,
            delete_local_photo: cfg.sync.delete_local_photo,
            purge_after_sync: cfg.sync.purge_after_sync,
        })
    }
}

enum PhotoStep {
    None,
    Missing,
    Uploaded(PhotoRef),
}

#[derive(Clone)]
pub struct Synchronizer {
    store: PendingStore,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobSink>,
    opts: SyncOptions,
}

impl Synchronizer {
    pub fn new(store: PendingStore, remote: &Remote, opts: SyncOptions) -> Self {
        Self {
            store,
            documents: remote.documents.clone(),
            blobs: remote.blobs.clone(),
            opts,
        }
    }

    pub async fn run(&self) -> AppResult<SyncReport> {
        let pending = self.store.list_unsynced()?;
        let mut report = SyncReport::default();

        if pending.is_empty() {
            debug!("nothing to sync");
        } else {
            info!(count = pending.len(), "sync run started");
        }

        for event in &pending {
            let outcome = self.process(event).await;
            report.record(outcome);
        }

        if self.opts.purge_after_sync {
            match self.store.purge_synced() {
                Ok(n) => report.purged = n,
                Err(e) => warn!(error = %e, "purge after sync failed"),
            }
        }

        if report.attempted > 0 {
            info!(
                synced = report.synced,
                failed = report.failed(),
                purged = report.purged,
                "sync run finished"
            );
            self.store.audit("sync", "", &report.summary());
        }

        Ok(report)
    }

    /// Sync a single event. Never returns an error: failures are recorded
    /// on the event and reported as the outcome.
    pub async fn process(&self, event: &PendingEvent) -> EventOutcome {
        let photo = match self.upload_photo(event).await {
            Ok(step) => step,
            Err(msg) => {
                warn!(event_id = event.id, employee_id = %event.employee_id, error = %msg, "photo upload failed");
                self.note_failure(event, &format!("upload: {msg}"));
                return EventOutcome::UploadFailed;
            }
        };

        let missing = matches!(photo, PhotoStep::Missing);
        let photo_ref = match photo {
            PhotoStep::Uploaded(p) => Some(p),
            _ => None,
        };

        let timestamp = match self.opts.timestamp_source {
            TimestampSource::Device => event.captured_utc(),
            TimestampSource::Server => None,
        };

        let record = NewRemoteRecord::new(
            event.employee_id.clone(),
            event.action,
            timestamp,
            photo_ref,
            event.capture_key(),
        );

        let remote_id = match self.documents.append(&record).await {
            Ok(id) => id,
            Err(e) => {
                warn!(event_id = event.id, employee_id = %event.employee_id, error = %e, "record write failed");
                self.note_failure(event, &format!("write: {e}"));
                return EventOutcome::WriteFailed;
            }
        };

        if let Err(e) = self.store.mark_synced(event.id, Some(&remote_id)) {
            error!(event_id = event.id, remote_id = %remote_id, error = %e, "record written but not marked synced");
            return EventOutcome::ConfirmFailed;
        }

        // only now is the photo referenced by a confirmed record
        if self.opts.delete_local_photo
            && record.has_photo()
            && let Some(path) = &event.local_photo_path
            && let Err(e) = fs::remove_file(path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %path.display(), error = %e, "could not delete synced photo");
        }

        debug!(event_id = event.id, remote_id = %remote_id, action = %event.action, "event synced");

        if missing {
            EventOutcome::SyncedWithoutPhoto
        } else {
            EventOutcome::Synced
        }
    }

    async fn upload_photo(&self, event: &PendingEvent) -> Result<PhotoStep, String> {
        let Some(path) = &event.local_photo_path else {
            return Ok(PhotoStep::None);
        };

        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(event_id = event.id, path = %path.display(), "staged photo missing, syncing without it");
                return Ok(PhotoStep::Missing);
            }
            Err(e) => return Err(e.to_string()),
        };

        let ext = image_extension(&bytes)
            .or_else(|| extension_of(path))
            .unwrap_or("jpg");
        let key = blob_key(
            &self.opts.blob_prefix,
            &event.employee_id,
            event.captured_at,
            &self.opts.tz,
            ext,
        );

        let url = self
            .blobs
            .upload(&key, bytes)
            .await
            .map_err(|e| e.to_string())?;

        debug!(event_id = event.id, key = %key, "photo uploaded");
        Ok(PhotoStep::Uploaded(PhotoRef { key, url }))
    }

    fn note_failure(&self, event: &PendingEvent, message: &str) {
        if let Err(e) = self.store.record_failure(event.id, message) {
            warn!(event_id = event.id, error = %e, "could not record sync failure");
        }
    }
}

fn extension_of(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        _ => None,
    }
}
