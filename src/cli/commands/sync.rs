use crate::config::Config;
use crate::core::kiosk::Kiosk;
use crate::core::sync::SyncReport;
use crate::errors::AppResult;
use crate::ui::messages;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let kiosk = Kiosk::open(cfg)?;
    let sync = kiosk.synchronizer()?;

    let report = super::runtime()?.block_on(sync.run())?;
    print_report(&report);
    Ok(())
}

/// Operator summary of one sync run.
pub(crate) fn print_report(report: &SyncReport) {
    if report.attempted == 0 {
        messages::info("Nothing to sync");
        return;
    }

    if report.failed() == 0 {
        messages::success(format!("Sync completed: {}", report.summary()));
    } else {
        messages::warning(format!("Sync incomplete: {}", report.summary()));
    }

    messages::detail("Synced", report.synced);
    if report.synced_without_photo > 0 {
        messages::detail("Without photo", report.synced_without_photo);
    }
    if report.upload_failed > 0 {
        messages::detail("Upload failed", report.upload_failed);
    }
    if report.write_failed > 0 {
        messages::detail("Write failed", report.write_failed);
    }
    if report.confirm_failed > 0 {
        messages::detail("Not confirmed", report.confirm_failed);
    }
    if report.purged > 0 {
        messages::detail("Purged", report.purged);
    }
}
