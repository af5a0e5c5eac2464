use crate::cli::parser::Cli;
use crate::config::{Config, RemoteKind};
use crate::core::store::PendingStore;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::path::expand_tilde;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped with `--test`)
///  - the photo staging directory
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing kioskclock…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", cfg.database);
    println!("📷 Photos     : {}", cfg.photo_dir);

    let store = PendingStore::open(&cfg.database)?;
    store.audit(
        "init",
        "",
        &format!("Database initialized at {}", cfg.database),
    );
    messages::success(format!("Database initialized at {}", cfg.database));

    if cfg.remote.kind == RemoteKind::Dir
        && let Some(path) = &cfg.remote.path
        && !expand_tilde(path).is_dir()
    {
        messages::warning(format!(
            "Remote directory {} does not exist yet; captures will fail until it is available",
            path
        ));
    }

    println!("🎉 kioskclock initialization completed!");
    Ok(())
}
