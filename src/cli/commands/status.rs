use crate::config::{Config, RemoteKind};
use crate::core::store::PendingStore;
use crate::errors::AppResult;
use crate::ui::messages;

pub fn handle(cfg: &Config) -> AppResult<()> {
    let store = PendingStore::open(&cfg.database)?;
    let (pending, synced) = store.counts()?;

    let remote = match cfg.remote.kind {
        RemoteKind::Dir => format!("dir {}", cfg.remote.path.as_deref().unwrap_or("-")),
        RemoteKind::Http => format!("http {}", cfg.remote.url.as_deref().unwrap_or("-")),
    };

    messages::header("kioskclock status");
    messages::detail("Pending", pending);
    messages::detail("Synced (kept)", synced);
    messages::detail("Database", &cfg.database);
    messages::detail("Photos", &cfg.photo_dir);
    messages::detail("Remote", remote);
    messages::detail("UTC offset", &cfg.utc_offset);
    messages::detail(
        "Sync interval",
        format!("{} min", cfg.sync.interval_minutes),
    );

    Ok(())
}
