use crate::db::pool::DbPool;
use crate::db::queries::count_by_status;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use chrono::{FixedOffset, TimeZone, Utc};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str, tz: &FixedOffset) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) QUEUE COUNTS
    //
    let (pending, synced) = count_by_status(&pool.conn)?;
    println!("{}• Pending events:{} {}{}{}", CYAN, RESET, YELLOW, pending, RESET);
    println!("{}• Synced (not purged):{} {}{}{}", CYAN, RESET, GREEN, synced, RESET);

    //
    // 3) OLDEST PENDING CAPTURE
    //
    let oldest: Option<i64> = pool
        .conn
        .query_row(
            "SELECT MIN(captured_at) FROM pending_events WHERE synced = 0",
            [],
            |row| row.get::<_, Option<i64>>(0),
        )
        .optional()?
        .flatten();

    let fmt_oldest = oldest
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .map(|dt| dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    println!("{}• Oldest pending capture:{} {}", CYAN, RESET, fmt_oldest);

    //
    // 4) RETRIES
    //
    let max_attempts: i64 = pool.conn.query_row(
        "SELECT COALESCE(MAX(attempts), 0) FROM pending_events WHERE synced = 0",
        [],
        |row| row.get(0),
    )?;
    if max_attempts > 0 {
        println!("{}• Most retried event:{} {} attempts", CYAN, RESET, max_attempts);
    }

    println!();
    Ok(())
}
