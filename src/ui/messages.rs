use std::fmt;
use std::sync::OnceLock;

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

/// Honour https://no-color.org: plain text when `NO_COLOR` is set.
fn styled(color: &'static str) -> (&'static str, &'static str, &'static str) {
    static PLAIN: OnceLock<bool> = OnceLock::new();
    if *PLAIN.get_or_init(|| std::env::var_os("NO_COLOR").is_some()) {
        ("", "", "")
    } else {
        (color, BOLD, RESET)
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    let (c, b, r) = styled(FG_BLUE);
    println!("{}{}{} {}{}", c, b, ICON_INFO, r, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    let (c, b, r) = styled(FG_GREEN);
    println!("{}{}{} {}{}", c, b, ICON_OK, r, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    let (c, b, r) = styled(FG_YELLOW);
    println!("{}{}{} {}{}", c, b, ICON_WARN, r, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    let (c, b, r) = styled(FG_RED);
    eprintln!("{}{}{} {}{}", c, b, ICON_ERR, r, msg);
}

/// Indented key/value line under a header.
pub fn detail<K: fmt::Display, V: fmt::Display>(key: K, value: V) {
    println!("   {:<18} {}", format!("{key}:"), value);
}

/// Formatted section header
pub fn header<T: fmt::Display>(msg: T) {
    let (c, b, r) = styled(FG_BLUE);
    println!("{}{}====================== {}\n{}", c, b, msg, r);
}
