//! ANSI color helper utilities for terminal output.
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use unicode_width::UnicodeWidthStr;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const MAGENTA: &str = "\x1b[35m";

/// Clock-in in green, clock-out in red.
pub fn colorize_action(value: &str, is_in: bool) -> String {
    if is_in {
        format!("{GREEN}{value}{RESET}")
    } else {
        format!("{RED}{value}{RESET}")
    }
}

/// Grey placeholder for absent values.
pub fn colorize_optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => format!("{GREY}--{RESET}"),
    }
}

/// Sync state column: pending in yellow, synced in green.
pub fn colorize_sync_state(synced: bool) -> String {
    if synced {
        format!("{GREEN}synced{RESET}")
    } else {
        format!("{YELLOW}pending{RESET}")
    }
}

fn ansi_escape() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1B\[[0-9;]*[mK]").ok()).as_ref()
}

pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    match ansi_escape() {
        Some(re) => re.replace_all(s, ""),
        None => Cow::Borrowed(s),
    }
}

/// Terminal columns taken by `s`: escapes removed, wide glyphs count twice.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_ref())
}
