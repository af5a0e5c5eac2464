//! Diagnostic logging for the background pieces (sync runs, trigger).
//! Operator-facing output stays in `ui::messages`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `kioskclock=debug`.
pub const LOG_ENV: &str = "KIOSKCLOCK_LOG";

/// Install the global subscriber, writing to stderr.
/// `verbosity`: 0 → warn, 1 → info, 2+ → debug; `KIOSKCLOCK_LOG` wins when set.
pub fn init(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
