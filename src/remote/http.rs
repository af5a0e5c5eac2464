//! JSON/HTTP remote.
//!
//!   POST {base}/logs                                   → {"id": "..."}
//!   GET  {base}/logs?employeeID=&since=&limit=1        → [record, ...] newest first
//!   PUT  {base}/blobs/{key}                            → {"url": "..."} (optional body)
//!   GET  {base}/employees?pin=                         → [employee, ...]

use super::{BlobSink, DocumentStore, EmployeeDirectory, RemoteError, RemoteResult};
use crate::errors::{AppError, AppResult};
use crate::models::employee::Employee;
use crate::models::remote_record::{NewRemoteRecord, RemoteEventRecord};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Unreserved URL characters stay; `%` in a key is sent as `%25`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// `blobs/<key>` with every key segment escaped, so the server decodes the exact key.
fn blob_path(key: &str) -> String {
    let segments: Vec<String> = key
        .split('/')
        .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
        .collect();
    format!("blobs/{}", segments.join("/"))
}

pub struct HttpRemote {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct CreatedDoc {
    id: String,
}

#[derive(Deserialize)]
struct UploadedBlob {
    url: String,
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Protocol(e.to_string())
        } else {
            // timeouts, refused connections, DNS, TLS
            RemoteError::Unavailable(e.to_string())
        }
    }
}

impl HttpRemote {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> RemoteResult<Response> {
        let resp = self.auth(req).send().await?;
        check_status(resp).await
    }
}

async fn check_status(resp: Response) -> RemoteResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let msg = format!("{status}: {}", body.trim());

    Err(match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(msg),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => RemoteError::Unavailable(msg),
        s if s.is_server_error() => RemoteError::Unavailable(msg),
        _ => RemoteError::Rejected(msg),
    })
}

#[async_trait]
impl DocumentStore for HttpRemote {
    async fn append(&self, record: &NewRemoteRecord) -> RemoteResult<String> {
        let resp = self.send(self.client.post(self.url("logs")).json(record)).await?;
        let created: CreatedDoc = resp.json().await?;
        Ok(created.id)
    }

    async fn latest_for(
        &self,
        employee_id: &str,
        since: DateTime<Utc>,
    ) -> RemoteResult<Option<RemoteEventRecord>> {
        let since = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        let req = self.client.get(self.url("logs")).query(&[
            ("employeeID", employee_id),
            ("since", since.as_str()),
            ("order", "desc"),
            ("limit", "1"),
        ]);

        let records: Vec<RemoteEventRecord> = self.send(req).await?.json().await?;
        Ok(records.into_iter().max_by_key(|r| r.timestamp))
    }
}

fn content_type(key: &str) -> &'static str {
    if key.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

#[async_trait]
impl BlobSink for HttpRemote {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> RemoteResult<String> {
        let url = self.url(&blob_path(key));
        let req = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type(key))
            .body(bytes);

        let resp = self.send(req).await?;
        let body = resp.bytes().await?;

        // servers may answer with an empty body; the object URL is then the key URL
        if body.is_empty() {
            return Ok(url);
        }
        let uploaded: UploadedBlob = serde_json::from_slice(&body)?;
        Ok(uploaded.url)
    }
}

#[async_trait]
impl EmployeeDirectory for HttpRemote {
    async fn find_by_pin(&self, pin: &str) -> RemoteResult<Option<Employee>> {
        let req = self.client.get(self.url("employees")).query(&[("pin", pin)]);
        let employees: Vec<Employee> = self.send(req).await?.json().await?;
        Ok(employees.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let remote = HttpRemote::new("https://clock.example.com/api/", None, 10).unwrap();
        assert_eq!(remote.url("logs"), "https://clock.example.com/api/logs");
    }

    #[test]
    fn blob_keys_are_escaped_once_more_on_the_wire() {
        assert_eq!(
            blob_path("logs/E1/2025-02/1738339200000.jpg"),
            "blobs/logs/E1/2025-02/1738339200000.jpg"
        );
        assert_eq!(blob_path("logs/E%2E1/2025-02/7.jpg"), "blobs/logs/E%252E1/2025-02/7.jpg");
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        // port 9 (discard) on localhost is closed on CI machines
        let remote = HttpRemote::new("http://127.0.0.1:9", None, 2).unwrap();
        let err = remote.find_by_pin("123456").await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
    }
}
