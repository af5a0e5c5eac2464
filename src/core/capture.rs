//! PIN entry → employee lookup → next action → staged photo → queued event.

use crate::core::resolver::ActionResolver;
use crate::core::stager::MediaStager;
use crate::core::store::PendingStore;
use crate::core::trigger::TriggerHandle;
use crate::errors::{AppError, AppResult};
use crate::models::employee::Employee;
use crate::models::pending_event::{NewPendingEvent, PendingEvent};
use crate::remote::EmployeeDirectory;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// A queued capture and who it belongs to.
#[derive(Debug, Clone)]
pub struct Captured {
    pub event: PendingEvent,
    pub employee: Employee,
}

impl Captured {
    /// Operator-facing confirmation, e.g. "Ana Cruz clocked in".
    pub fn greeting(&self) -> String {
        format!(
            "{} {}",
            self.employee.full_name(),
            self.event.action.describe()
        )
    }
}

pub struct CaptureService {
    employees: Arc<dyn EmployeeDirectory>,
    resolver: ActionResolver,
    store: PendingStore,
    stager: MediaStager,
    pin_length: usize,
    trigger: Option<TriggerHandle>,
}

impl CaptureService {
    pub fn new(
        employees: Arc<dyn EmployeeDirectory>,
        resolver: ActionResolver,
        store: PendingStore,
        stager: MediaStager,
        pin_length: usize,
    ) -> Self {
        Self {
            employees,
            resolver,
            store,
            stager,
            pin_length,
            trigger: None,
        }
    }

    /// Ask this trigger for a sync after every successful capture.
    pub fn with_trigger(mut self, handle: TriggerHandle) -> Self {
        self.trigger = Some(handle);
        self
    }

    pub async fn capture(
        &self,
        pin: &str,
        photo: Option<&Path>,
        now: DateTime<Utc>,
    ) -> AppResult<Captured> {
        validate_pin(pin, self.pin_length)?;

        let employee = self
            .employees
            .find_by_pin(pin)
            .await
            .map_err(|e| AppError::Lookup("Employee lookup", e))?
            .ok_or(AppError::UnknownPin)?;

        if !employee.employed_status {
            return Err(AppError::InactiveEmployee(employee.full_name()));
        }

        let action = self.resolver.resolve(&employee.employee_id, now).await?;
        let captured_at = now.timestamp_millis();

        let mut new_event = NewPendingEvent::new(employee.employee_id.clone(), action, captured_at);
        let staged = match photo {
            Some(src) => {
                let path = self.stager.stage(&employee.employee_id, captured_at, src)?;
                new_event = new_event.with_photo(&path);
                Some(path)
            }
            None => None,
        };

        let event = match self.store.insert(&new_event) {
            Ok(ev) => ev,
            Err(e) => {
                if let Some(path) = &staged
                    && let Err(rm) = fs::remove_file(path)
                {
                    warn!(path = %path.display(), error = %rm, "could not remove orphaned photo");
                }
                return Err(e);
            }
        };

        info!(
            event_id = event.id,
            employee_id = %event.employee_id,
            action = %event.action,
            photo = staged.is_some(),
            "capture queued"
        );
        self.store.audit(
            "capture",
            &event.employee_id,
            &format!("{} at {}", event.action, event.captured_at),
        );

        if let Some(trigger) = &self.trigger {
            trigger.request();
        }

        Ok(Captured { event, employee })
    }
}

/// A PIN is exactly `len` ASCII digits.
pub fn validate_pin(pin: &str, len: usize) -> AppResult<()> {
    if pin.len() == len && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::InvalidPin(len))
    }
}
