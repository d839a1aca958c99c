//! Request types for the attendance engine API.
//!
//! Kinds and timestamps arrive as text and are validated when converted into
//! domain types, so malformed values surface as `INVALID_PUNCH` errors rather
//! than JSON rejections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::LocalCalendar;
use crate::error::{EngineError, EngineResult};
use crate::models::{NewPunch, RawPunch};

fn require_employee_id(employee_id: &str) -> EngineResult<()> {
    if employee_id.trim().is_empty() {
        return Err(EngineError::invalid_punch("employee_id", "must not be empty"));
    }
    Ok(())
}

/// Request body for `POST /punches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualPunchRequest {
    /// The employee who punched.
    pub employee_id: String,
    /// The kind chosen by the caller (e.g. `"ENTRADA"`).
    pub kind: String,
    /// RFC 3339 or naive local timestamp.
    pub timestamp: String,
    /// Free-text location.
    #[serde(default)]
    pub location_label: Option<String>,
    /// Terminal tag.
    #[serde(default)]
    pub terminal: Option<String>,
}

impl ManualPunchRequest {
    /// Validates the request into a punch ready for insertion.
    pub fn into_new_punch(self, calendar: &LocalCalendar) -> EngineResult<NewPunch> {
        require_employee_id(&self.employee_id)?;
        Ok(NewPunch {
            employee_id: self.employee_id,
            kind: self.kind.parse()?,
            timestamp: calendar.parse_timestamp(&self.timestamp)?,
            location_label: self.location_label,
            terminal: self.terminal,
        })
    }
}

/// Request body for `POST /punches/recognized`.
///
/// Sent once the recognition service has matched a face to an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedPunchRequest {
    /// The recognized employee.
    pub employee_id: String,
    /// When the face was captured; the server clock is used when absent.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Free-text location.
    #[serde(default)]
    pub location_label: Option<String>,
}

impl RecognizedPunchRequest {
    /// Checks the employee id is present.
    pub fn validate(&self) -> EngineResult<()> {
        require_employee_id(&self.employee_id)
    }
}

/// Request body for `POST /classify` and `POST /summarize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchListRequest {
    /// The day's punches, in any order.
    #[serde(default)]
    pub punches: Vec<RawPunch>,
}

/// Query string for `GET /employees/{id}/day`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayQuery {
    /// The local day; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Query string for `GET /employees/{id}/month`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthQuery {
    /// Any date in the month; the current month when absent.
    #[serde(default)]
    pub reference: Option<NaiveDate>,
}

/// The span of punches an export covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPeriod {
    /// The reference date only.
    #[default]
    Day,
    /// The calendar month containing the reference date.
    Month,
}

/// Request body for `POST /export`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Reference date; today when absent.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Span of punches to include.
    #[serde(default)]
    pub period: ExportPeriod,
    /// Restricts the export to these employees, in this order. All active employees when absent.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
    /// Adds each sheet rendered as CSV text.
    #[serde(default)]
    pub include_csv: bool,
}
