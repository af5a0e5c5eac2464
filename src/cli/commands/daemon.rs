use crate::config::Config;
use crate::core::kiosk::Kiosk;
use crate::core::trigger::RunStatus;
use crate::errors::{AppError, AppResult};
use crate::ui::messages;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let kiosk = Kiosk::open(cfg)?;

    super::runtime()?.block_on(async {
        let trigger = kiosk.start_trigger()?;
        let mut status = trigger.subscribe();

        messages::info(format!(
            "Syncing every {} min (retry after {} s). Press Ctrl-C to stop.",
            cfg.sync.interval_minutes, cfg.sync.retry_delay_secs
        ));

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = status.borrow_and_update().clone();
                    match current {
                        RunStatus::Completed { run, report } if report.attempted > 0 => {
                            messages::info(format!("Run {run}: {}", report.summary()));
                        }
                        RunStatus::Failed { run, error } => {
                            messages::warning(format!("Run {run} failed: {error}"));
                        }
                        _ => {}
                    }
                }
            }
        }

        messages::info("Stopping…");
        trigger.shutdown().await;
        Ok::<_, AppError>(())
    })
}
