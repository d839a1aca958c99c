//! Calculation logic for the attendance engine.
//!
//! This module contains the punch classifier, the daily summary calculation
//! with its audit trail, monthly aggregation by local calendar day, and the
//! projection of all of it onto an exportable workbook.

mod classifier;
mod daily_summary;
mod export;
mod monthly;

pub use classifier::{ClassificationRule, KindPresence, classify, classify_kinds, classify_presence};
pub use daily_summary::{
    DailySummaryResult, DayAnchors, calculate_daily_summary, is_late, sort_punches, summarize,
};
pub use export::{
    AttendanceWorkbook, DetailRow, EmployeeSheet, ExportProjector, NO_PUNCHES_LABEL,
    SUMMARY_SHEET_NAME, Sheet, SummaryRow, truncate_tab_name,
};
pub use monthly::{
    DaySummary, MonthlyReport, aggregate_month, format_clock_time, format_display_date,
    group_by_day,
};
