use super::action::ClockAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clock record as stored in the remote document collection.
/// Field names follow the collection's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEventRecord {
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    pub action: ClockAction,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "photoIn", default, skip_serializing_if = "Option::is_none")]
    pub photo_ref_in: Option<String>,
    #[serde(rename = "photoOut", default, skip_serializing_if = "Option::is_none")]
    pub photo_ref_out: Option<String>,
    #[serde(rename = "photoInPath", default, skip_serializing_if = "Option::is_none")]
    pub photo_in_path: Option<String>,
    #[serde(rename = "photoOutPath", default, skip_serializing_if = "Option::is_none")]
    pub photo_out_path: Option<String>,
    #[serde(rename = "captureKey", default, skip_serializing_if = "Option::is_none")]
    pub capture_key: Option<String>,
}

/// Record submitted by the kiosk. `timestamp = None` asks the store to
/// assign its own clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRemoteRecord {
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    pub action: ClockAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "photoIn", skip_serializing_if = "Option::is_none")]
    pub photo_ref_in: Option<String>,
    #[serde(rename = "photoOut", skip_serializing_if = "Option::is_none")]
    pub photo_ref_out: Option<String>,
    #[serde(rename = "photoInPath", skip_serializing_if = "Option::is_none")]
    pub photo_in_path: Option<String>,
    #[serde(rename = "photoOutPath", skip_serializing_if = "Option::is_none")]
    pub photo_out_path: Option<String>,
    #[serde(rename = "captureKey")]
    pub capture_key: String,
}

/// An uploaded photo: where it lives and how to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub key: String,
    pub url: String,
}

impl NewRemoteRecord {
    /// Build a record, tagging the photo by action: clock-in photos go to
    /// the `In` fields, clock-out photos to the `Out` fields.
    pub fn new(
        employee_id: impl Into<String>,
        action: ClockAction,
        timestamp: Option<DateTime<Utc>>,
        photo: Option<PhotoRef>,
        capture_key: impl Into<String>,
    ) -> Self {
        let mut rec = Self {
            employee_id: employee_id.into(),
            action,
            timestamp,
            photo_ref_in: None,
            photo_ref_out: None,
            photo_in_path: None,
            photo_out_path: None,
            capture_key: capture_key.into(),
        };

        if let Some(p) = photo {
            match action {
                ClockAction::ClockIn => {
                    rec.photo_ref_in = Some(p.url);
                    rec.photo_in_path = Some(p.key);
                }
                ClockAction::ClockOut => {
                    rec.photo_ref_out = Some(p.url);
                    rec.photo_out_path = Some(p.key);
                }
            }
        }

        rec
    }

    pub fn has_photo(&self) -> bool {
        self.photo_ref_in.is_some() || self.photo_ref_out.is_some()
    }

    /// Materialize as the stored form, using `now` when the store must
    /// assign the timestamp.
    pub fn into_record(self, now: DateTime<Utc>) -> RemoteEventRecord {
        RemoteEventRecord {
            employee_id: self.employee_id,
            action: self.action,
            timestamp: self.timestamp.unwrap_or(now),
            photo_ref_in: self.photo_ref_in,
            photo_ref_out: self.photo_ref_out,
            photo_in_path: self.photo_in_path,
            photo_out_path: self.photo_out_path,
            capture_key: Some(self.capture_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> PhotoRef {
        PhotoRef {
            key: "logs/E1/2025-01/1.jpg".into(),
            url: "file:///blobs/logs/E1/2025-01/1.jpg".into(),
        }
    }

    #[test]
    fn clock_in_photo_goes_to_in_fields() {
        let rec = NewRemoteRecord::new("E1", ClockAction::ClockIn, None, Some(photo()), "k");
        assert!(rec.photo_ref_in.is_some());
        assert!(rec.photo_in_path.is_some());
        assert!(rec.photo_ref_out.is_none());
        assert!(rec.photo_out_path.is_none());
    }

    #[test]
    fn clock_out_photo_goes_to_out_fields() {
        let rec = NewRemoteRecord::new("E1", ClockAction::ClockOut, None, Some(photo()), "k");
        assert!(rec.photo_ref_in.is_none());
        assert_eq!(rec.photo_out_path.as_deref(), Some("logs/E1/2025-01/1.jpg"));
    }

    #[test]
    fn wire_names_follow_collection_format() {
        let rec = NewRemoteRecord::new("E1", ClockAction::ClockIn, None, None, "E1:1:clock_in");
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["employeeID"], "E1");
        assert_eq!(v["action"], "clock_in");
        assert_eq!(v["captureKey"], "E1:1:clock_in");
        assert!(v.get("timestamp").is_none());
        assert!(v.get("photoIn").is_none());
    }
}
