use crate::db::log::{LogEntry, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, MAGENTA, RED, RESET, YELLOW, display_width};
use unicode_width::UnicodeWidthChar;

const OP_MAX: usize = 60;

/// ANSI color for an operation name.
fn color_for_operation(op: &str) -> &'static str {
    match op {
        "capture" => GREEN,
        "sync" => CYAN,
        "purge" => RED,
        "init" => YELLOW,
        "migration_applied" => MAGENTA,
        _ => "",
    }
}

/// "operation (target)", truncated to `OP_MAX` terminal columns.
fn op_target(entry: &LogEntry) -> String {
    let plain = if entry.target.is_empty() {
        entry.operation.clone()
    } else {
        format!("{} ({})", entry.operation, entry.target)
    };

    if display_width(&plain) <= OP_MAX {
        return plain;
    }

    let mut s = String::new();
    let mut used = 0;
    for c in plain.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > OP_MAX - 3 {
            break;
        }
        used += w;
        s.push(c);
    }
    s.push_str("...");
    s
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;
        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let dates: Vec<String> = entries
            .iter()
            .map(|e| {
                chrono::DateTime::parse_from_rfc3339(&e.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| e.date.clone())
            })
            .collect();
        let labels: Vec<String> = entries.iter().map(op_target).collect();

        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = dates.iter().map(|d| display_width(d)).max().unwrap_or(10);
        let op_w = labels.iter().map(|l| display_width(l)).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for ((entry, date), label) in entries.iter().zip(&dates).zip(&labels) {
            let color = color_for_operation(&entry.operation);
            let padding = " ".repeat(op_w.saturating_sub(display_width(label)));

            // only the operation word is colored
            let colored = match label.split_once(' ') {
                Some((op, rest)) => format!("{color}{op}{RESET} {rest}"),
                None => format!("{color}{label}{RESET}"),
            };

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                entry.id, date, colored, padding, entry.message
            );
        }

        Ok(())
    }
}
