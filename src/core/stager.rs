//! Copy captured photos into the kiosk's private photo directory and
//! derive their blob keys.

use crate::errors::{AppError, AppResult};
use chrono::{FixedOffset, TimeZone, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Everything but `[A-Za-z0-9_-]` is escaped; `%` itself included.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

pub struct MediaStager {
    photo_dir: PathBuf,
}

impl MediaStager {
    pub fn new(photo_dir: impl Into<PathBuf>) -> Self {
        Self {
            photo_dir: photo_dir.into(),
        }
    }

    pub fn photo_dir(&self) -> &Path {
        &self.photo_dir
    }

    /// Read `source` and stage it for the given capture.
    pub fn stage(&self, employee_id: &str, captured_at: i64, source: &Path) -> AppResult<PathBuf> {
        let bytes = fs::read(source).map_err(|e| {
            AppError::InvalidPhoto(source.display().to_string(), e.to_string())
        })?;
        self.stage_bytes(employee_id, captured_at, &bytes)
            .map_err(|e| match e {
                AppError::InvalidPhoto(_, why) => {
                    AppError::InvalidPhoto(source.display().to_string(), why)
                }
                other => other,
            })
    }

    /// Write `bytes` to `<photo_dir>/<employee>_<captured_at>.<ext>`.
    /// The file is written under a temporary name and renamed, so a crash
    /// never leaves a truncated photo behind the final name.
    pub fn stage_bytes(
        &self,
        employee_id: &str,
        captured_at: i64,
        bytes: &[u8],
    ) -> AppResult<PathBuf> {
        let ext = image_extension(bytes)
            .ok_or_else(|| AppError::InvalidPhoto("<bytes>".into(), "not a JPEG or PNG".into()))?;

        fs::create_dir_all(&self.photo_dir)?;

        let name = format!("{}_{}.{}", path_segment(employee_id), captured_at, ext);
        let target = self.photo_dir.join(&name);
        let tmp = self.photo_dir.join(format!("{name}.part"));

        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &target)?;

        debug!(path = %target.display(), size = bytes.len(), "photo staged");
        Ok(target)
    }
}

/// Detect the image format from its leading bytes.
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(JPEG_MAGIC) {
        Some("jpg")
    } else if bytes.starts_with(PNG_MAGIC) {
        Some("png")
    } else {
        None
    }
}

/// Blob key for a captured photo: `<prefix>/<employee>/<YYYY-MM>/<captured_at>.<ext>`.
/// The month is taken in the kiosk's zone. Only event fields go in, so a
/// retried upload lands on the same key.
pub fn blob_key(
    prefix: &str,
    employee_id: &str,
    captured_at: i64,
    tz: &FixedOffset,
    ext: &str,
) -> String {
    let month = Utc
        .timestamp_millis_opt(captured_at)
        .single()
        .map(|dt| dt.with_timezone(tz).format("%Y-%m").to_string())
        .unwrap_or_else(|| "0000-00".to_string());

    let prefix = prefix.trim_matches('/');
    let rest = format!("{}/{}/{}.{}", path_segment(employee_id), month, captured_at, ext);
    if prefix.is_empty() {
        rest
    } else {
        format!("{prefix}/{rest}")
    }
}

/// Percent-encode an id into a single path component. Distinct ids never
/// share a segment; the empty id becomes a lone `%`, which no encoding yields.
fn path_segment(s: &str) -> String {
    if s.is_empty() {
        return "%".to_string();
    }
    utf8_percent_encode(s, SEGMENT).to_string()
}
