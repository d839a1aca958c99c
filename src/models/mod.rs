//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod employee;
mod punch;
mod summary;

pub use adjustment::{
    AdjustmentFields, AdjustmentHours, OvertimeDistribution, parse_clock_hours,
    parse_clock_minutes,
};
pub use employee::Employee;
pub use punch::{FACIAL_TERMINAL, NewPunch, Punch, PunchKind, RawPunch, parse_punches};
pub use summary::{
    AttendanceSummary, AuditStep, AuditWarning, ZERO_DURATION_LABEL, format_balance,
    format_duration,
};
