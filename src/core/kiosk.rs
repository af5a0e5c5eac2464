//! Wiring: build the store, remote and services from a `Config`.

use crate::config::Config;
use crate::core::capture::CaptureService;
use crate::core::resolver::ActionResolver;
use crate::core::stager::MediaStager;
use crate::core::store::PendingStore;
use crate::core::sync::{SyncOptions, Synchronizer};
use crate::core::trigger::SyncTrigger;
use crate::errors::AppResult;
use crate::remote::Remote;
use chrono::FixedOffset;
use std::time::Duration;

pub struct Kiosk {
    pub cfg: Config,
    pub tz: FixedOffset,
    pub store: PendingStore,
    pub remote: Remote,
}

impl Kiosk {
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let remote = Remote::from_config(&cfg.remote)?;
        Self::with_remote(cfg, remote)
    }

    pub fn with_remote(cfg: &Config, remote: Remote) -> AppResult<Self> {
        Ok(Self {
            tz: cfg.tz()?,
            store: PendingStore::open(&cfg.database)?,
            cfg: cfg.clone(),
            remote,
        })
    }

    pub fn synchronizer(&self) -> AppResult<Synchronizer> {
        Ok(Synchronizer::new(
            self.store.clone(),
            &self.remote,
            SyncOptions::from_config(&self.cfg)?,
        ))
    }

    pub fn capture_service(&self) -> CaptureService {
        let mut resolver = ActionResolver::new(
            self.remote.documents.clone(),
            self.tz,
            self.cfg.capture.lookback_days,
        );
        if self.cfg.capture.consider_pending {
            resolver = resolver.with_pending(self.store.clone());
        }

        CaptureService::new(
            self.remote.employees.clone(),
            resolver,
            self.store.clone(),
            MediaStager::new(crate::utils::path::expand_tilde(&self.cfg.photo_dir)),
            self.cfg.capture.pin_length,
        )
    }

    /// Start the background scheduler. Must be called inside a tokio runtime.
    pub fn start_trigger(&self) -> AppResult<SyncTrigger> {
        let interval = Duration::from_secs(self.cfg.sync.interval_minutes.max(1) * 60);
        let retry = Duration::from_secs(self.cfg.sync.retry_delay_secs.max(1));
        Ok(SyncTrigger::start(self.synchronizer()?, interval, retry))
    }
}
