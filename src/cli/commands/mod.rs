pub mod capture;
pub mod config;
pub mod daemon;
pub mod db;
pub mod init;
pub mod log;
pub mod pending;
pub mod purge;
pub mod status;
pub mod sync;

use crate::errors::AppResult;
use tokio::runtime::Runtime;

/// Runtime for the commands that talk to the remote store.
fn runtime() -> AppResult<Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
