//! Directory-backed remote.
//!
//! Layout under the root:
//!   logs.jsonl       one stored record per line
//!   employees.json   array of employee documents
//!   blobs/<key>      uploaded photos
//!
//! The root must already exist; a missing root (unmounted share, unplugged
//! drive) is reported as `Unavailable`, like a network outage.

use super::{BlobSink, DocumentStore, EmployeeDirectory, RemoteError, RemoteResult};
use crate::models::employee::Employee;
use crate::models::remote_record::{NewRemoteRecord, RemoteEventRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Component, Path, PathBuf};
use tokio::sync::Mutex;

const LOGS_FILE: &str = "logs.jsonl";
const EMPLOYEES_FILE: &str = "employees.json";
const BLOBS_DIR: &str = "blobs";

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    id: String,
    #[serde(flatten)]
    record: RemoteEventRecord,
}

pub struct DirRemote {
    root: PathBuf,
    // serializes appends from this process
    write_lock: Mutex<()>,
}

impl DirRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn ensure_root(&self) -> RemoteResult<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(RemoteError::Unavailable(format!(
                "{} is not reachable",
                self.root.display()
            )))
        }
    }

    fn read_records(&self) -> RemoteResult<Vec<StoredRecord>> {
        let path = self.root.join(LOGS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&path)?);
        let mut out = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            out.push(serde_json::from_str(&line)?);
        }
        Ok(out)
    }

    /// All stored records in append order.
    pub fn records(&self) -> RemoteResult<Vec<RemoteEventRecord>> {
        self.ensure_root()?;
        Ok(self.read_records()?.into_iter().map(|s| s.record).collect())
    }

    fn blob_path(&self, key: &str) -> RemoteResult<PathBuf> {
        let rel = Path::new(key);
        let safe = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(RemoteError::Rejected(format!("invalid blob key '{key}'")));
        }
        Ok(self.root.join(BLOBS_DIR).join(rel))
    }
}

#[async_trait]
impl DocumentStore for DirRemote {
    async fn append(&self, record: &NewRemoteRecord) -> RemoteResult<String> {
        self.ensure_root()?;
        let _guard = self.write_lock.lock().await;

        let id = format!("log-{:06}", self.read_records()?.len() + 1);
        let stored = StoredRecord {
            id: id.clone(),
            record: record.clone().into_record(Utc::now()),
        };
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(LOGS_FILE))?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        Ok(id)
    }

    async fn latest_for(
        &self,
        employee_id: &str,
        since: DateTime<Utc>,
    ) -> RemoteResult<Option<RemoteEventRecord>> {
        self.ensure_root()?;

        Ok(self
            .read_records()?
            .into_iter()
            .map(|s| s.record)
            .filter(|r| r.employee_id == employee_id && r.timestamp >= since)
            .max_by_key(|r| r.timestamp))
    }
}

#[async_trait]
impl BlobSink for DirRemote {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> RemoteResult<String> {
        self.ensure_root()?;
        let path = self.blob_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // write-then-rename: readers never see half an object
        let tmp = path.with_extension("part");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        let abs = fs::canonicalize(&path)?;
        Ok(format!("file://{}", abs.display()))
    }
}

#[async_trait]
impl EmployeeDirectory for DirRemote {
    async fn find_by_pin(&self, pin: &str) -> RemoteResult<Option<Employee>> {
        self.ensure_root()?;

        let path = self.root.join(EMPLOYEES_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let employees: Vec<Employee> = serde_json::from_str(&content)?;
        Ok(employees.into_iter().find(|e| e.pin == pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::action::ClockAction;
    use chrono::TimeZone;

    #[tokio::test]
    async fn missing_root_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(tmp.path().join("not-mounted"));

        let rec = NewRemoteRecord::new("E1", ClockAction::ClockIn, None, None, "k");
        let err = remote.append(&rec).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
    }

    #[tokio::test]
    async fn append_then_query_latest() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(tmp.path());

        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 1, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        for (t, a) in [(t1, ClockAction::ClockIn), (t2, ClockAction::ClockOut)] {
            let rec = NewRemoteRecord::new("E1", a, Some(t), None, "k");
            remote.append(&rec).await.unwrap();
        }

        let latest = remote.latest_for("E1", t1).await.unwrap().unwrap();
        assert_eq!(latest.action, ClockAction::ClockOut);
        assert!(remote.latest_for("E2", t1).await.unwrap().is_none());
        assert_eq!(remote.records().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn upload_overwrites_same_key() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(tmp.path());

        let key = "logs/E1/2025-03/1740790800000.jpg";
        let first = remote.upload(key, vec![1, 2, 3]).await.unwrap();
        let second = remote.upload(key, vec![4, 5]).await.unwrap();

        assert_eq!(first, second);
        let stored = fs::read(tmp.path().join("blobs").join(key)).unwrap();
        assert_eq!(stored, vec![4, 5]);
    }

    #[tokio::test]
    async fn rejects_escaping_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(tmp.path());

        let err = remote.upload("../outside.jpg", vec![1]).await.unwrap_err();
        assert!(matches!(err, RemoteError::Rejected(_)));
    }
}
