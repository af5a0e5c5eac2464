use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for kioskclock
/// Kiosk clock-in/clock-out capture with offline queue and background sync
#[derive(Parser)]
#[command(
    name = "kioskclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Kiosk clock-in/out capture: queue events locally and sync them to the remote store",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Diagnostic verbosity (-v info, -vv debug)
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Record a clock-in or clock-out for the employee owning the PIN
    Capture {
        #[arg(long = "pin", help = "Employee PIN")]
        pin: String,

        #[arg(long = "photo", value_name = "FILE", help = "Photo taken at the kiosk (JPEG or PNG)")]
        photo: Option<PathBuf>,

        #[arg(long = "no-sync", help = "Only queue the event, do not sync now")]
        no_sync: bool,
    },

    /// Push pending events to the remote store once
    Sync,

    /// Keep syncing in the background (interval and retry) until Ctrl-C
    Daemon,

    /// List events waiting for sync
    Pending {
        #[arg(long = "all", help = "Include events already synced")]
        all: bool,
    },

    /// Delete events already confirmed by the remote store
    Purge,

    /// Show queue counts and database information
    Status,

    /// Show or check the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}
