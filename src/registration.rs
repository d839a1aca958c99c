//! Write-time punch registration.
//!
//! Manual registration stores the kind the caller chose. Recognized
//! registration happens after the face-recognition service has resolved an
//! employee: the kind is classified from the punches already stored for the
//! employee's local day and the punch is tagged with the `FACIAL` terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::{ClassificationRule, KindPresence, classify_presence};
use crate::calendar::LocalCalendar;
use crate::error::EngineResult;
use crate::models::{Employee, FACIAL_TERMINAL, NewPunch, PunchKind};
use crate::store::{EmployeeDirectory, PunchStore};

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Id assigned by the store.
    pub punch_id: Uuid,
    /// The employee who punched.
    pub employee_id: String,
    /// The stored kind.
    pub kind: PunchKind,
    /// The stored instant.
    pub timestamp: DateTime<Utc>,
    /// The transition that chose the kind, for recognized registrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<ClassificationRule>,
}

/// A recognition candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Employee id.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Reference photo URL.
    pub photo_url: String,
}

/// Stores a punch whose kind was chosen by the caller.
pub fn register_manual(store: &dyn PunchStore, punch: NewPunch) -> EngineResult<Registration> {
    let employee_id = punch.employee_id.clone();
    let kind = punch.kind;
    let timestamp = punch.timestamp;

    let punch_id = store.insert(punch)?;
    info!(
        punch_id = %punch_id,
        employee_id = %employee_id,
        kind = %kind,
        "Manual punch registered"
    );

    Ok(Registration {
        punch_id,
        employee_id,
        kind,
        timestamp,
        rule: None,
    })
}

/// Classifies and stores a punch for a recognized employee.
///
/// The day is the local calendar day of `timestamp`.
pub fn register_recognized(
    store: &dyn PunchStore,
    calendar: &LocalCalendar,
    employee_id: &str,
    timestamp: DateTime<Utc>,
    location_label: Option<String>,
) -> EngineResult<Registration> {
    let (start, end) = calendar.day_bounds(calendar.local_date(timestamp))?;
    let existing = store.query_range(employee_id, start, end)?;
    let (kind, rule) = classify_presence(KindPresence::from_punches(&existing));
    debug!(
        employee_id = %employee_id,
        existing = existing.len(),
        rule = ?rule,
        "Classified recognized punch"
    );

    let punch_id = store.insert(NewPunch {
        employee_id: employee_id.to_string(),
        kind,
        timestamp,
        location_label,
        terminal: Some(FACIAL_TERMINAL.to_string()),
    })?;
    info!(
        punch_id = %punch_id,
        employee_id = %employee_id,
        kind = %kind,
        "Recognized punch registered"
    );

    Ok(Registration {
        punch_id,
        employee_id: employee_id.to_string(),
        kind,
        timestamp,
        rule: Some(rule),
    })
}

/// Active employees that have a reference photo.
pub fn recognition_roster(directory: &dyn EmployeeDirectory) -> EngineResult<Vec<RosterEntry>> {
    Ok(directory
        .list_active()?
        .into_iter()
        .filter(Employee::has_facial_photo)
        .filter_map(|e| {
            Some(RosterEntry {
                id: e.id,
                name: e.name,
                photo_url: e.photo_url?,
            })
        })
        .collect())
}
