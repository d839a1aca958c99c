//! Response types for the attendance engine API.
//!
//! This module defines the response bodies, the error response structure and
//! the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{ClassificationRule, DaySummary, Sheet};
use crate::error::EngineError;
use crate::models::{
    AdjustmentHours, AttendanceSummary, AuditStep, AuditWarning, Punch, PunchKind,
};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an employee not found error response.
    pub fn employee_not_found(id: &str) -> Self {
        Self::with_details(
            "EMPLOYEE_NOT_FOUND",
            format!("Employee not found: {}", id),
            format!("No employee with id '{}' is known to the directory", id),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::InvalidConfig { field, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Invalid configuration",
                    format!("{}: {}", field, message),
                ),
            },
            EngineError::InvalidPunch { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_PUNCH",
                    format!("Invalid punch field '{}': {}", field, message),
                    "The punch data contains invalid information",
                ),
            },
            EngineError::EmployeeNotFound { id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::employee_not_found(&id),
            },
            EngineError::StoreUnavailable { message } => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::with_details(
                    "STORE_UNAVAILABLE",
                    "A backing store could not be reached",
                    message,
                ),
            },
            EngineError::ExportFailed { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("EXPORT_FAILED", "Export failed", message),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message,
                ),
            },
        }
    }
}

/// An [`AttendanceSummary`] with its display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Worked minutes.
    pub worked_minutes: i64,
    /// Worked time as `"{h}h {mm}min"`.
    pub worked_label: String,
    /// Worked time in decimal hours.
    pub worked_hours: Decimal,
    /// Number of late clock-ins.
    pub lateness_count: u32,
    /// Signed balance in minutes.
    pub balance_minutes: i64,
    /// Signed balance label.
    pub balance_label: String,
}

impl From<AttendanceSummary> for SummaryResponse {
    fn from(summary: AttendanceSummary) -> Self {
        Self {
            worked_minutes: summary.worked_minutes,
            worked_label: summary.worked_label(),
            worked_hours: summary.worked_hours(),
            lateness_count: summary.lateness_count,
            balance_minutes: summary.balance_minutes,
            balance_label: summary.balance_label(),
        }
    }
}

/// Response body for `POST /punches` and `POST /punches/recognized`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// Id assigned by the store.
    pub punch_id: Uuid,
    /// The employee who punched.
    pub employee_id: String,
    /// The stored kind.
    pub kind: PunchKind,
    /// The kind's display label.
    pub label: String,
    /// The stored instant.
    pub timestamp: DateTime<Utc>,
    /// The transition that chose the kind, for recognized punches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<ClassificationRule>,
}

/// Response body for `POST /classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyResponse {
    /// The kind the next punch would get.
    pub kind: PunchKind,
    /// The kind's display label.
    pub label: String,
    /// The transition that chose it.
    pub rule: ClassificationRule,
}

/// Response body for `POST /summarize` and `GET /employees/{id}/day`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummaryResponse {
    /// The employee, when the day was read from the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// The local day, when the day was read from the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// The day's punches, ascending by timestamp.
    pub punches: Vec<Punch>,
    /// The day's figures.
    pub summary: SummaryResponse,
    /// How the figures were reached.
    pub audit_steps: Vec<AuditStep>,
    /// Anomalies in the punch set.
    pub warnings: Vec<AuditWarning>,
}

/// One day of a monthly response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayResponse {
    /// The local day.
    pub date: NaiveDate,
    /// The day as `DD/MM/YYYY`.
    pub display_date: String,
    /// Number of punches on the day.
    pub punch_count: usize,
    /// The day's figures.
    pub summary: SummaryResponse,
}

impl From<DaySummary> for DayResponse {
    fn from(day: DaySummary) -> Self {
        Self {
            date: day.date,
            display_date: day.display_date,
            punch_count: day.punch_count,
            summary: day.summary.into(),
        }
    }
}

/// Response body for `GET /employees/{id}/month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyResponse {
    /// The employee.
    pub employee_id: String,
    /// The reference date the month was derived from.
    pub reference: NaiveDate,
    /// First day of the month.
    pub month_start: NaiveDate,
    /// First day of the next month, exclusive.
    pub next_month_start: NaiveDate,
    /// Days with punches, ascending by date.
    pub days: Vec<DayResponse>,
    /// Sum of the daily figures.
    pub totals: SummaryResponse,
}

/// Response body for `GET /recognition/roster`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    /// Active employees with a reference photo.
    pub employees: Vec<crate::registration::RosterEntry>,
}

/// One exported sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetResponse {
    /// The tab name.
    pub name: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
    /// The sheet as CSV, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
}

impl From<Sheet> for SheetResponse {
    fn from(sheet: Sheet) -> Self {
        Self {
            name: sheet.name,
            headers: sheet.headers,
            rows: sheet.rows,
            csv: None,
        }
    }
}

/// Response body for `POST /export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    /// Workbook name.
    pub name: String,
    /// The export's reference date.
    pub reference_date: NaiveDate,
    /// The summary sheet followed by one sheet per employee.
    pub sheets: Vec<SheetResponse>,
    /// Adjustment columns as decimal hours, for exported employees that have them.
    pub adjustment_hours: Vec<AdjustmentHours>,
}
