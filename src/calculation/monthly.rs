//! Monthly attendance aggregation.
//!
//! Groups a month's punches by local calendar day and runs the daily
//! calculation on each group. Days are keyed by [`NaiveDate`], so they come
//! out in calendar order regardless of how their display strings sort.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{LocalCalendar, month_dates};
use crate::config::AttendancePolicy;
use crate::error::EngineResult;
use crate::models::{AttendanceSummary, Punch};

use super::daily_summary::summarize;

/// Formats a date as `DD/MM/YYYY` for display.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats an instant as local `HH:MM`.
pub fn format_clock_time(instant: DateTime<Utc>, calendar: &LocalCalendar) -> String {
    calendar.local_time(instant).format("%H:%M").to_string()
}

/// Groups punches by their local calendar date.
///
/// Inside each day, punches keep the order they were given in.
pub fn group_by_day(punches: &[Punch], calendar: &LocalCalendar) -> BTreeMap<NaiveDate, Vec<Punch>> {
    let mut days: BTreeMap<NaiveDate, Vec<Punch>> = BTreeMap::new();
    for punch in punches {
        days.entry(calendar.local_date(punch.timestamp))
            .or_default()
            .push(punch.clone());
    }
    days
}

/// One day's summary inside a monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The local calendar date.
    pub date: NaiveDate,
    /// The date as `DD/MM/YYYY`.
    pub display_date: String,
    /// Number of punches on the day.
    pub punch_count: usize,
    /// The day's figures.
    pub summary: AttendanceSummary,
}

/// A calendar month of punches grouped by day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    /// The date the month was derived from.
    pub reference: NaiveDate,
    /// First day of the month.
    pub month_start: NaiveDate,
    /// First day of the following month (exclusive bound).
    pub next_month_start: NaiveDate,
    days: BTreeMap<NaiveDate, Vec<Punch>>,
}

impl MonthlyReport {
    /// Punches grouped by day, ascending by date.
    pub fn days(&self) -> &BTreeMap<NaiveDate, Vec<Punch>> {
        &self.days
    }

    /// Number of days with at least one punch.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Total number of punches in the month.
    pub fn punch_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Runs the daily calculation on every day, ascending by date.
    pub fn day_summaries(
        &self,
        policy: &AttendancePolicy,
        calendar: &LocalCalendar,
    ) -> Vec<DaySummary> {
        self.days
            .iter()
            .map(|(date, punches)| DaySummary {
                date: *date,
                display_date: format_display_date(*date),
                punch_count: punches.len(),
                summary: summarize(punches, policy, calendar),
            })
            .collect()
    }

    /// Sum of the daily summaries. Days without punches contribute nothing.
    pub fn totals(&self, policy: &AttendancePolicy, calendar: &LocalCalendar) -> AttendanceSummary {
        self.days
            .values()
            .map(|punches| summarize(punches, policy, calendar))
            .sum()
    }
}

/// Aggregates the punches that fall inside the month containing `reference`.
///
/// The window runs from local midnight of the first day of the month to local
/// midnight of the first day of the next month, exclusive. With no reference,
/// the current month in `calendar` is used.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::aggregate_month;
/// use attendance_engine::calendar::LocalCalendar;
/// use attendance_engine::models::{Punch, PunchKind};
/// use chrono::NaiveDate;
///
/// let calendar = LocalCalendar::utc();
/// let at = |t: &str| calendar.parse_timestamp(t).unwrap();
/// let punches = vec![
///     Punch::new("emp_001", PunchKind::Entrada, at("2024-03-10T08:00:00")),
///     Punch::new("emp_001", PunchKind::Entrada, at("2024-03-02T08:00:00")),
///     Punch::new("emp_001", PunchKind::Entrada, at("2024-04-01T00:00:00")),
/// ];
///
/// let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let report = aggregate_month(&punches, Some(reference), &calendar).unwrap();
/// let days: Vec<_> = report.days().keys().map(|d| d.to_string()).collect();
/// assert_eq!(days, vec!["2024-03-02", "2024-03-10"]);
/// ```
pub fn aggregate_month(
    punches: &[Punch],
    reference: Option<NaiveDate>,
    calendar: &LocalCalendar,
) -> EngineResult<MonthlyReport> {
    let reference = reference.unwrap_or_else(|| calendar.today());
    let (month_start, next_month_start) = month_dates(reference)?;
    let (start, end) = calendar.month_bounds(reference)?;

    let in_month: Vec<Punch> = punches
        .iter()
        .filter(|p| p.timestamp >= start && p.timestamp < end)
        .cloned()
        .collect();

    Ok(MonthlyReport {
        reference,
        month_start,
        next_month_start,
        days: group_by_day(&in_month, calendar),
    })
}
