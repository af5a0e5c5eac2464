use serde::{Deserialize, Serialize};

/// Employee master record, read-only on the kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    pub pin: String, // digits kept as text (leading zeros)
    #[serde(default)]
    pub store: String,
    /// Older documents have no status field; they count as active.
    #[serde(rename = "employedStatus", default = "default_employed")]
    pub employed_status: bool,
}

fn default_employed() -> bool {
    true
}

impl Employee {
    /// "First Last", or "Employee" when both are blank.
    pub fn full_name(&self) -> String {
        let name = [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            "Employee".to_string()
        } else {
            name
        }
    }
}
