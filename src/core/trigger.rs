//! Background scheduling of sync runs.
//!
//! Runs happen on request (after each capture), on a fixed interval and,
//! after a failed run, once more after `retry_delay`. Requests arriving
//! while a run is in progress collapse into a single follow-up run, so at
//! most one run is ever active.

use crate::core::sync::{SyncReport, Synchronizer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Completed { run: u64, report: SyncReport },
    Failed { run: u64, error: String },
}

impl RunStatus {
    pub fn run(&self) -> u64 {
        match self {
            RunStatus::Idle => 0,
            RunStatus::Completed { run, .. } | RunStatus::Failed { run, .. } => *run,
        }
    }
}

/// Cloneable handle for asking the trigger to run soon.
#[derive(Clone)]
pub struct TriggerHandle {
    notify: Arc<Notify>,
}

impl TriggerHandle {
    pub fn request(&self) {
        self.notify.notify_one();
    }
}

pub struct SyncTrigger {
    notify: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<RunStatus>,
    task: JoinHandle<()>,
}

impl SyncTrigger {
    /// Spawn the scheduler on the current runtime. The first interval tick
    /// fires immediately, so leftovers from a previous session go out at
    /// startup.
    pub fn start(sync: Synchronizer, interval: Duration, retry_delay: Duration) -> Self {
        let notify = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(RunStatus::Idle);

        let task = tokio::spawn(run_loop(
            sync,
            notify.clone(),
            shutdown_rx,
            status_tx,
            interval,
            retry_delay,
        ));

        Self {
            notify,
            shutdown: shutdown_tx,
            status: status_rx,
            task,
        }
    }

    pub fn handle(&self) -> TriggerHandle {
        TriggerHandle {
            notify: self.notify.clone(),
        }
    }

    pub fn request(&self) {
        self.notify.notify_one();
    }

    pub fn subscribe(&self) -> watch::Receiver<RunStatus> {
        self.status.clone()
    }

    /// Stop scheduling and wait for an in-flight run to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "sync task ended abnormally");
        }
    }
}

async fn run_loop(
    sync: Synchronizer,
    notify: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
    status: watch::Sender<RunStatus>,
    interval: Duration,
    retry_delay: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut retry_at: Option<Instant> = None;
    let mut run: u64 = 0;

    loop {
        let deadline = retry_at;
        let retry = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => debug!("interval sync"),
            _ = notify.notified() => debug!("requested sync"),
            _ = retry => debug!("retrying failed sync"),
        }

        if *shutdown.borrow() {
            break;
        }

        run += 1;
        match sync.run().await {
            Ok(report) => {
                retry_at = None;
                status.send_replace(RunStatus::Completed { run, report });
            }
            Err(e) => {
                warn!(run, error = %e, "sync run failed, will retry");
                retry_at = Some(Instant::now() + retry_delay);
                status.send_replace(RunStatus::Failed {
                    run,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(runs = run, "sync trigger stopped");
}
