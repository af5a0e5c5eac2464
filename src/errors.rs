//! Unified application error type.
//! All modules (db, core, remote, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use crate::remote::RemoteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Pending event not found: {0}")]
    EventNotFound(i64),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid clock action: {0}")]
    InvalidAction(String),

    #[error("Invalid UTC offset: {0}")]
    InvalidOffset(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Capture errors (shown to the operator)
    // ---------------------------
    #[error("Enter a {0}-digit PIN")]
    InvalidPin(usize),

    #[error("Invalid PIN")]
    UnknownPin,

    #[error("Inactive employee: {0}")]
    InactiveEmployee(String),

    #[error("Invalid photo {0}: {1}")]
    InvalidPhoto(String, String),

    #[error("{0} failed: {1}")]
    Lookup(&'static str, RemoteError),

    // ---------------------------
    // Remote store errors
    // ---------------------------
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
