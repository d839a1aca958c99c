//! Attendance summary models.
//!
//! This module contains [`AttendanceSummary`], the derived figures for a set
//! of punches, together with the audit structures recorded while computing it.

use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label used for a zero duration and for a zero balance.
pub const ZERO_DURATION_LABEL: &str = "0h 00min";

/// Worked time, lateness and balance derived from a set of punches.
///
/// Never persisted: it is recomputed from the punches on every query.
///
/// # Example
///
/// ```
/// use attendance_engine::models::AttendanceSummary;
///
/// let summary = AttendanceSummary {
///     worked_minutes: 495,
///     lateness_count: 1,
///     balance_minutes: 15,
/// };
/// assert_eq!(summary.worked_label(), "8h 15min");
/// assert_eq!(summary.balance_label(), "+0h 15min");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Worked minutes, never negative.
    pub worked_minutes: i64,
    /// Number of late clock-ins.
    pub lateness_count: u32,
    /// Worked minutes minus expected minutes ("banco de horas").
    pub balance_minutes: i64,
}

impl AttendanceSummary {
    /// `"{h}h {mm}min"` for the worked time.
    pub fn worked_label(&self) -> String {
        format_duration(self.worked_minutes)
    }

    /// Signed balance label, `"0h 00min"` when exactly zero.
    pub fn balance_label(&self) -> String {
        format_balance(self.balance_minutes)
    }

    /// Worked time in decimal hours rounded to two places.
    pub fn worked_hours(&self) -> Decimal {
        (Decimal::from(self.worked_minutes) / Decimal::from(60)).round_dp(2)
    }
}

impl Add for AttendanceSummary {
    type Output = AttendanceSummary;

    fn add(self, rhs: AttendanceSummary) -> AttendanceSummary {
        AttendanceSummary {
            worked_minutes: self.worked_minutes + rhs.worked_minutes,
            lateness_count: self.lateness_count + rhs.lateness_count,
            balance_minutes: self.balance_minutes + rhs.balance_minutes,
        }
    }
}

impl std::iter::Sum for AttendanceSummary {
    fn sum<I: Iterator<Item = AttendanceSummary>>(iter: I) -> Self {
        iter.fold(AttendanceSummary::default(), Add::add)
    }
}

/// Formats a minute count as `"{h}h {mm}min"`, ignoring its sign.
///
/// # Example
///
/// ```
/// use attendance_engine::models::format_duration;
///
/// assert_eq!(format_duration(0), "0h 00min");
/// assert_eq!(format_duration(61), "1h 01min");
/// assert_eq!(format_duration(-125), "2h 05min");
/// ```
pub fn format_duration(minutes: i64) -> String {
    let abs = minutes.unsigned_abs();
    format!("{}h {:02}min", abs / 60, abs % 60)
}

/// Formats a balance with an explicit `+`/`-` sign, or the neutral zero label.
pub fn format_balance(minutes: i64) -> String {
    match minutes {
        0 => ZERO_DURATION_LABEL.to_string(),
        m if m > 0 => format!("+{}", format_duration(m)),
        m => format!("-{}", format_duration(m)),
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag punch sets that were reconciled but look suspicious, such
/// as a clock-in without a clock-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}
