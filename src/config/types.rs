//! Configuration types for attendance reconciliation.
//!
//! This module contains the strongly-typed configuration structures. The
//! `*File` structs mirror the YAML files one-to-one; [`EngineConfig`] holds
//! the validated values the engine works with.

use chrono::NaiveTime;
use serde::Deserialize;

use crate::calendar::LocalCalendar;
use crate::models::{AdjustmentFields, Employee};

/// Default lateness cutoff, 08:00.
pub fn default_lateness_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("Valid cutoff time")
}

/// Default expected worked minutes per day (8 hours).
pub const DEFAULT_EXPECTED_DAILY_MINUTES: i64 = 480;

/// Default maximum tab-name length of the target spreadsheet format.
pub const DEFAULT_TAB_NAME_LIMIT: usize = 31;

/// Smallest accepted tab-name limit; room for a one-letter name plus ` (n)`.
pub const MIN_TAB_NAME_LIMIT: usize = 4;

/// Default prefix of exported workbook names.
pub const DEFAULT_WORKBOOK_PREFIX: &str = "frequencia";

/// Thresholds used by the daily attendance calculation.
///
/// # Example
///
/// ```
/// use attendance_engine::config::AttendancePolicy;
///
/// let policy = AttendancePolicy::default();
/// assert_eq!(policy.expected_daily_minutes, 480);
/// assert_eq!(policy.lateness_cutoff.to_string(), "08:00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePolicy {
    /// A clock-in whose local time, truncated to the minute, is after this is late.
    pub lateness_cutoff: NaiveTime,
    /// Minutes an employee is expected to work per day.
    pub expected_daily_minutes: i64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            lateness_cutoff: default_lateness_cutoff(),
            expected_daily_minutes: DEFAULT_EXPECTED_DAILY_MINUTES,
        }
    }
}

fn default_tab_name_limit() -> usize {
    DEFAULT_TAB_NAME_LIMIT
}

fn default_workbook_prefix() -> String {
    DEFAULT_WORKBOOK_PREFIX.to_string()
}

/// Export formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportSettings {
    /// Maximum number of characters in a sheet tab name.
    #[serde(default = "default_tab_name_limit")]
    pub tab_name_limit: usize,
    /// Prefix of the workbook name, followed by the reference date.
    #[serde(default = "default_workbook_prefix")]
    pub workbook_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            tab_name_limit: DEFAULT_TAB_NAME_LIMIT,
            workbook_prefix: DEFAULT_WORKBOOK_PREFIX.to_string(),
        }
    }
}

fn default_cutoff_text() -> String {
    "08:00".to_string()
}

fn default_expected_minutes() -> i64 {
    DEFAULT_EXPECTED_DAILY_MINUTES
}

fn default_calendar_text() -> String {
    "local".to_string()
}

/// Structure of `policy.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    /// Lateness cutoff as `HH:MM`.
    #[serde(default = "default_cutoff_text")]
    pub lateness_cutoff: String,
    /// Expected worked minutes per day.
    #[serde(default = "default_expected_minutes")]
    pub expected_daily_minutes: i64,
    /// `local`, `utc`, or a fixed offset like `-03:00`.
    #[serde(default = "default_calendar_text")]
    pub calendar: String,
    /// Export settings.
    #[serde(default)]
    pub export: ExportSettings,
}

/// Structure of the optional `roster.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterFile {
    /// Employees to seed the directory with.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Adjustment fields to seed the adjustment store with.
    #[serde(default)]
    pub adjustments: Vec<AdjustmentFields>,
}

/// The complete, validated engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    policy: AttendancePolicy,
    calendar: LocalCalendar,
    export: ExportSettings,
    roster: RosterFile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(
            AttendancePolicy::default(),
            LocalCalendar::system(),
            ExportSettings::default(),
            RosterFile::default(),
        )
    }
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        policy: AttendancePolicy,
        calendar: LocalCalendar,
        export: ExportSettings,
        roster: RosterFile,
    ) -> Self {
        Self {
            policy,
            calendar,
            export,
            roster,
        }
    }

    /// Returns the attendance policy.
    pub fn policy(&self) -> &AttendancePolicy {
        &self.policy
    }

    /// Returns the deployment calendar.
    pub fn calendar(&self) -> &LocalCalendar {
        &self.calendar
    }

    /// Returns the export settings.
    pub fn export(&self) -> &ExportSettings {
        &self.export
    }

    /// Returns the seed roster.
    pub fn roster(&self) -> &RosterFile {
        &self.roster
    }
}
