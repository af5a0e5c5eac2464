use crate::config::Config;
use crate::core::store::PendingStore;
use crate::errors::AppResult;
use crate::ui::messages;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let store = PendingStore::open(&cfg.database)?;
    let removed = store.purge_synced()?;

    if removed > 0 {
        store.audit("purge", "", &format!("{removed} synced event(s) removed"));
    }
    messages::success(format!("Purged {removed} synced event(s)"));
    Ok(())
}
