//! Remote collaborators: the authoritative document store for clock
//! records, the blob sink for photos and the employee directory.
//!
//! The core only sees the traits below. Backends:
//! - `memory::MemoryRemote`: in-process, with fault injection (tests only)
//! - [`dir::DirRemote`]: a directory (local disk or mounted share)
//! - [`http::HttpRemote`]: a JSON/HTTP service

pub mod dir;
pub mod http;
#[cfg(test)]
pub mod memory;

use crate::config::{RemoteConfig, RemoteKind};
use crate::errors::{AppError, AppResult};
use crate::models::employee::Employee;
use crate::models::remote_record::{NewRemoteRecord, RemoteEventRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for RemoteError {
    fn from(e: io::Error) -> Self {
        RemoteError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Protocol(e.to_string())
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Append-only collection of clock records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a new record and return the identifier the store assigned.
    async fn append(&self, record: &NewRemoteRecord) -> RemoteResult<String>;

    /// Most recent record for `employee_id` with `timestamp >= since`.
    async fn latest_for(
        &self,
        employee_id: &str,
        since: DateTime<Utc>,
    ) -> RemoteResult<Option<RemoteEventRecord>>;
}

/// Key-addressed object storage. Uploading to an existing key overwrites it.
#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Store `bytes` at `key` and return a durable reference (URL).
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> RemoteResult<String>;
}

/// Read-only employee master data.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_by_pin(&self, pin: &str) -> RemoteResult<Option<Employee>>;
}

/// The three collaborators, as configured for this kiosk.
#[derive(Clone)]
pub struct Remote {
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobSink>,
    pub employees: Arc<dyn EmployeeDirectory>,
}

impl Remote {
    /// One backend object serving all three roles.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: DocumentStore + BlobSink + EmployeeDirectory + 'static,
    {
        Self {
            documents: backend.clone(),
            blobs: backend.clone(),
            employees: backend,
        }
    }

    pub fn from_config(cfg: &RemoteConfig) -> AppResult<Self> {
        match cfg.kind {
            RemoteKind::Dir => {
                let path = cfg.path.as_deref().ok_or_else(|| {
                    AppError::Config("remote.path is required for kind 'dir'".into())
                })?;
                Ok(Self::from_backend(Arc::new(dir::DirRemote::new(
                    crate::utils::path::expand_tilde(path),
                ))))
            }
            RemoteKind::Http => {
                let url = cfg.url.as_deref().ok_or_else(|| {
                    AppError::Config("remote.url is required for kind 'http'".into())
                })?;
                let client = http::HttpRemote::new(url, cfg.token.clone(), cfg.timeout_secs)?;
                Ok(Self::from_backend(Arc::new(client)))
            }
        }
    }
}
