//! In-process remote with switches to make individual calls fail.

use super::{BlobSink, DocumentStore, EmployeeDirectory, RemoteError, RemoteResult};
use crate::models::employee::Employee;
use crate::models::remote_record::{NewRemoteRecord, RemoteEventRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    records: Vec<(String, RemoteEventRecord)>,
    blobs: HashMap<String, Vec<u8>>,
    employees: Vec<Employee>,
    offline: bool,
    fail_uploads: bool,
    fail_writes_for: HashSet<String>,
    append_calls: usize,
    upload_calls: usize,
}

#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn add_employee(&self, employee: Employee) {
        self.lock().employees.push(employee);
    }

    /// Seed confirmed history, as if written by an earlier sync.
    pub fn add_record(&self, record: RemoteEventRecord) {
        let mut st = self.lock();
        let id = format!("doc-{}", st.records.len() + 1);
        st.records.push((id, record));
    }

    /// Every call fails with `Unavailable` while offline.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.lock().fail_uploads = fail;
    }

    /// Reject record writes for one employee.
    pub fn fail_writes_for(&self, employee_id: &str) {
        self.lock().fail_writes_for.insert(employee_id.to_string());
    }

    pub fn clear_write_failures(&self) {
        self.lock().fail_writes_for.clear();
    }

    /// Stored records in append order.
    pub fn records(&self) -> Vec<RemoteEventRecord> {
        self.lock().records.iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(key).cloned()
    }

    pub fn append_calls(&self) -> usize {
        self.lock().append_calls
    }

    pub fn upload_calls(&self) -> usize {
        self.lock().upload_calls
    }
}

#[async_trait]
impl DocumentStore for MemoryRemote {
    async fn append(&self, record: &NewRemoteRecord) -> RemoteResult<String> {
        let mut st = self.lock();
        st.append_calls += 1;

        if st.offline {
            return Err(RemoteError::Unavailable("offline".into()));
        }
        if st.fail_writes_for.contains(&record.employee_id) {
            return Err(RemoteError::Rejected(format!(
                "write refused for {}",
                record.employee_id
            )));
        }

        let id = format!("doc-{}", st.records.len() + 1);
        st.records
            .push((id.clone(), record.clone().into_record(Utc::now())));
        Ok(id)
    }

    async fn latest_for(
        &self,
        employee_id: &str,
        since: DateTime<Utc>,
    ) -> RemoteResult<Option<RemoteEventRecord>> {
        let st = self.lock();
        if st.offline {
            return Err(RemoteError::Unavailable("offline".into()));
        }

        Ok(st
            .records
            .iter()
            .map(|(_, r)| r)
            .filter(|r| r.employee_id == employee_id && r.timestamp >= since)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }
}

#[async_trait]
impl BlobSink for MemoryRemote {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> RemoteResult<String> {
        let mut st = self.lock();
        st.upload_calls += 1;

        if st.offline || st.fail_uploads {
            return Err(RemoteError::Unavailable("upload failed".into()));
        }

        st.blobs.insert(key.to_string(), bytes);
        Ok(format!("memory://{key}"))
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryRemote {
    async fn find_by_pin(&self, pin: &str) -> RemoteResult<Option<Employee>> {
        let st = self.lock();
        if st.offline {
            return Err(RemoteError::Unavailable("offline".into()));
        }
        Ok(st.employees.iter().find(|e| e.pin == pin).cloned())
    }
}
