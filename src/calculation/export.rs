//! Spreadsheet export projection.
//!
//! Maps punches, their daily summaries and the manually entered adjustment
//! fields onto a workbook: one summary sheet with a row per employee, and one
//! detail sheet per employee with a row per day that has punches.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::LocalCalendar;
use crate::config::{AttendancePolicy, ExportSettings};
use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentFields, AttendanceSummary, Employee, Punch, PunchKind};

use super::daily_summary::{sort_punches, summarize};
use super::monthly::{format_clock_time, format_display_date, group_by_day};

/// Name of the summary sheet.
pub const SUMMARY_SHEET_NAME: &str = "Resumo";

/// Text shown in the punches column when an employee has none.
pub const NO_PUNCHES_LABEL: &str = "Sem marcações";

const SUMMARY_HEADERS: [&str; 7] = [
    "Nome",
    "Cargo",
    "Equipe",
    "Horas Trabalhadas",
    "Atrasos",
    "Banco de Horas",
    "Marcações",
];

const DETAIL_HEADERS: [&str; 10] = [
    "Nome",
    "Data",
    "Entrada",
    "Entrada Almoço",
    "Volta Almoço",
    "Saída",
    "Hora Diária",
    "H.E",
    "Atrasos",
    "A.N",
];

/// Characters spreadsheet tab names may not contain.
const FORBIDDEN_TAB_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// One row of the summary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// The employee this row describes.
    pub employee_id: String,
    /// Employee name.
    pub name: String,
    /// Job name, blank if unknown.
    pub job: String,
    /// Team (location) name, blank if unknown.
    pub team: String,
    /// Totals over the export window.
    pub totals: AttendanceSummary,
    /// Punches as `"{label}: HH:MM"` joined by `"; "`.
    pub punches: String,
}

impl SummaryRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.job.clone(),
            self.team.clone(),
            self.totals.worked_label(),
            self.totals.lateness_count.to_string(),
            self.totals.balance_label(),
            self.punches.clone(),
        ]
    }
}

/// One row of an employee's detail sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    /// Employee name.
    pub name: String,
    /// The day this row covers.
    pub date: NaiveDate,
    /// The day as `DD/MM/YYYY`.
    pub display_date: String,
    /// `HH:MM` of the first punch of each kind, in [`PunchKind::ALL`] order; blank if absent.
    pub times: [String; 4],
    /// The adjustment fields, copied verbatim: daily, overtime, delay, night premium.
    pub adjustments: [String; 4],
    /// True for the placeholder row of an employee without punches.
    pub placeholder: bool,
}

impl DetailRow {
    /// The formatted time of `kind`, blank if it did not occur.
    pub fn time_of(&self, kind: PunchKind) -> &str {
        &self.times[kind.index()]
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(DETAIL_HEADERS.len());
        cells.push(self.name.clone());
        cells.push(self.display_date.clone());
        cells.extend(self.times.iter().cloned());
        cells.extend(self.adjustments.iter().cloned());
        cells
    }
}

/// An employee's detail sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSheet {
    /// The employee this sheet describes.
    pub employee_id: String,
    /// The tab name, truncated and unique within the workbook.
    pub tab_name: String,
    /// One row per day with punches, ascending by date.
    pub rows: Vec<DetailRow>,
}

/// A plain grid ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// The tab name.
    pub name: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Writes the sheet as CSV, headers first.
    pub fn write_csv<W: Write>(&self, writer: W) -> EngineResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let to_export_error = |e: csv::Error| EngineError::ExportFailed {
            message: format!("sheet '{}': {}", self.name, e),
        };

        csv_writer
            .write_record(&self.headers)
            .map_err(to_export_error)?;
        for row in &self.rows {
            csv_writer.write_record(row).map_err(to_export_error)?;
        }
        csv_writer.flush().map_err(|e| EngineError::ExportFailed {
            message: format!("sheet '{}': {}", self.name, e),
        })
    }
}

/// The projected workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceWorkbook {
    /// Workbook name, e.g. `frequencia_15-03-2024`.
    pub name: String,
    /// The export's reference date.
    pub reference_date: NaiveDate,
    /// Summary rows, in input employee order.
    pub summary: Vec<SummaryRow>,
    /// Detail sheets, in input employee order.
    pub employee_sheets: Vec<EmployeeSheet>,
}

impl AttendanceWorkbook {
    /// All sheets as grids, summary first.
    pub fn sheets(&self) -> Vec<Sheet> {
        let mut sheets = Vec::with_capacity(self.employee_sheets.len() + 1);
        sheets.push(Sheet {
            name: SUMMARY_SHEET_NAME.to_string(),
            headers: SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: self.summary.iter().map(SummaryRow::cells).collect(),
        });
        for sheet in &self.employee_sheets {
            sheets.push(Sheet {
                name: sheet.tab_name.clone(),
                headers: DETAIL_HEADERS.iter().map(|h| h.to_string()).collect(),
                rows: sheet.rows.iter().map(DetailRow::cells).collect(),
            });
        }
        sheets
    }
}

/// Truncates a tab name to `limit` characters and strips forbidden characters.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::truncate_tab_name;
///
/// let name = "Bruno Henrique de Oliveira Albuquerque";
/// assert_eq!(truncate_tab_name(name, 31), "Bruno Henrique de Oliveira Albu");
/// assert_eq!(truncate_tab_name("Ana/Souza", 31), "Ana_Souza");
/// ```
pub fn truncate_tab_name(name: &str, limit: usize) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_TAB_CHARS.contains(&c) { '_' } else { c })
        .take(limit)
        .collect()
}

/// Picks a tab name no longer than `limit` characters that is not in `used`.
///
/// Collisions get a ` (n)` suffix, shortened to `(n)` or a bare `n` when the
/// limit leaves no room. If every candidate is taken the truncated name is
/// returned as is.
fn unique_tab_name(name: &str, limit: usize, used: &mut HashSet<String>) -> String {
    let base = truncate_tab_name(name, limit).trim_end().to_string();
    if !base.is_empty() && used.insert(base.clone()) {
        return base;
    }

    let mut n: u64 = 2;
    while n.to_string().len() <= limit {
        let suffix = format!(" ({})", n);
        let keep = limit.saturating_sub(suffix.len());
        let mut candidate = format!("{}{}", truncate_tab_name(name, keep).trim_end(), suffix)
            .trim_start()
            .to_string();
        if candidate.chars().count() > limit {
            candidate = n.to_string();
        }
        if used.insert(candidate.clone()) {
            return candidate;
        }
        match n.checked_add(1) {
            Some(next) => n = next,
            None => break,
        }
    }

    base
}

/// Projects attendance data onto an [`AttendanceWorkbook`].
#[derive(Debug, Clone, Copy)]
pub struct ExportProjector<'a> {
    policy: &'a AttendancePolicy,
    calendar: &'a LocalCalendar,
    settings: &'a ExportSettings,
}

impl<'a> ExportProjector<'a> {
    /// Creates a projector with the given policy, calendar and settings.
    pub fn new(
        policy: &'a AttendancePolicy,
        calendar: &'a LocalCalendar,
        settings: &'a ExportSettings,
    ) -> Self {
        Self {
            policy,
            calendar,
            settings,
        }
    }

    /// Builds the workbook.
    ///
    /// `punches` holds every punch of the export window per employee id;
    /// employees missing from `punches` or `adjustments` are treated as having
    /// none. Rows and sheets follow the order of `employees`.
    pub fn project(
        &self,
        employees: &[Employee],
        punches: &HashMap<String, Vec<Punch>>,
        adjustments: &HashMap<String, AdjustmentFields>,
        reference_date: NaiveDate,
    ) -> AttendanceWorkbook {
        let mut used_tabs = HashSet::new();
        used_tabs.insert(SUMMARY_SHEET_NAME.to_string());

        let mut summary = Vec::with_capacity(employees.len());
        let mut employee_sheets = Vec::with_capacity(employees.len());

        for employee in employees {
            let employee_punches = punches
                .get(&employee.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let employee_adjustments = adjustments.get(&employee.id);

            summary.push(self.summary_row(employee, employee_punches));
            employee_sheets.push(EmployeeSheet {
                employee_id: employee.id.clone(),
                tab_name: unique_tab_name(
                    &employee.name,
                    self.settings.tab_name_limit,
                    &mut used_tabs,
                ),
                rows: self.detail_rows(
                    employee,
                    employee_punches,
                    employee_adjustments,
                    reference_date,
                ),
            });
        }

        AttendanceWorkbook {
            name: format!(
                "{}_{}",
                self.settings.workbook_prefix,
                reference_date.format("%d-%m-%Y")
            ),
            reference_date,
            summary,
            employee_sheets,
        }
    }

    fn summary_row(&self, employee: &Employee, punches: &[Punch]) -> SummaryRow {
        let totals: AttendanceSummary = group_by_day(punches, self.calendar)
            .values()
            .map(|day| summarize(day, self.policy, self.calendar))
            .sum();

        let listed = sort_punches(punches)
            .iter()
            .map(|p| {
                format!(
                    "{}: {}",
                    p.kind.label(),
                    format_clock_time(p.timestamp, self.calendar)
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        SummaryRow {
            employee_id: employee.id.clone(),
            name: employee.name.clone(),
            job: employee.job_name.clone().unwrap_or_default(),
            team: employee.location_name.clone().unwrap_or_default(),
            totals,
            punches: if listed.is_empty() {
                NO_PUNCHES_LABEL.to_string()
            } else {
                listed
            },
        }
    }

    fn detail_rows(
        &self,
        employee: &Employee,
        punches: &[Punch],
        adjustments: Option<&AdjustmentFields>,
        reference_date: NaiveDate,
    ) -> Vec<DetailRow> {
        let adjustment_columns = adjustments
            .map(|a| a.columns().map(str::to_string))
            .unwrap_or_default();

        let mut rows: Vec<DetailRow> = group_by_day(punches, self.calendar)
            .into_iter()
            .map(|(date, day)| {
                let sorted = sort_punches(&day);
                let times = PunchKind::ALL.map(|kind| {
                    sorted
                        .iter()
                        .find(|p| p.kind == kind)
                        .map(|p| format_clock_time(p.timestamp, self.calendar))
                        .unwrap_or_default()
                });
                DetailRow {
                    name: employee.name.clone(),
                    date,
                    display_date: format_display_date(date),
                    times,
                    adjustments: adjustment_columns.clone(),
                    placeholder: false,
                }
            })
            .collect();

        if rows.is_empty() {
            rows.push(DetailRow {
                name: employee.name.clone(),
                date: reference_date,
                display_date: format_display_date(reference_date),
                times: Default::default(),
                adjustments: adjustment_columns,
                placeholder: true,
            });
        }

        rows
    }
}
