use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::kiosk::Kiosk;
use crate::errors::{AppError, AppResult};
use crate::ui::messages;
use chrono::Utc;
use tracing::warn;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Capture {
        pin,
        photo,
        no_sync,
    } = cmd
    {
        let kiosk = Kiosk::open(cfg)?;
        let service = kiosk.capture_service();

        super::runtime()?.block_on(async {
            let captured = service.capture(pin, photo.as_deref(), Utc::now()).await?;

            messages::success(captured.greeting());
            messages::detail("Event", captured.event.id);
            messages::detail("Action", captured.event.action);
            messages::detail("Time", captured.event.captured_local(&kiosk.tz));

            if *no_sync {
                messages::info("Queued for the next sync");
                return Ok(());
            }

            // the capture is already durable; a failed run is retried later
            match kiosk.synchronizer()?.run().await {
                Ok(report) if report.failed() == 0 => {
                    messages::info(format!("Synced ({})", report.summary()));
                }
                Ok(report) => {
                    messages::warning(format!("Queued, sync incomplete ({})", report.summary()));
                }
                Err(e) => {
                    warn!(error = %e, "sync after capture failed");
                    messages::warning("Queued, sync will be retried");
                }
            }
            Ok::<_, AppError>(())
        })
    } else {
        Ok(())
    }
}
