use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::store::PendingStore;
use crate::errors::AppResult;
use crate::utils::colors::{colorize_action, colorize_optional, colorize_sync_state};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Pending { all } = cmd {
        let store = PendingStore::open(&cfg.database)?;
        let tz = cfg.tz()?;

        let events = if *all {
            store.list_all()?
        } else {
            store.list_unsynced()?
        };

        if events.is_empty() {
            println!("No pending events.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("ID", 3),
            Column::new("EMPLOYEE", 8),
            Column::new("ACTION", 9),
            Column::new("CAPTURED", 19),
            Column::new("PHOTO", 5),
            Column::new("STATE", 7),
            Column::new("TRIES", 5),
            Column::new("LAST ERROR", 10),
        ]);

        for ev in &events {
            let photo = if ev.local_photo_path.is_some() { "yes" } else { "no" };
            table.add_row(vec![
                ev.id.to_string(),
                ev.employee_id.clone(),
                colorize_action(ev.action.to_db_str(), ev.action.is_in()),
                ev.captured_local(&tz),
                photo.to_string(),
                colorize_sync_state(ev.synced),
                ev.attempts.to_string(),
                colorize_optional(ev.last_error.as_deref()),
            ]);
        }

        print!("{}", table.render());
        println!("\n{} event(s)", events.len());
    }

    Ok(())
}
