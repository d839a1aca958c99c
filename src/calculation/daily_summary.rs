//! Daily attendance calculation.
//!
//! Turns one day's punches into worked minutes, a lateness count and the
//! balance against the expected day. Punch sets may be unordered, incomplete
//! or contain duplicates; each segment that can be computed is computed and
//! the rest contributes nothing.

use chrono::{DateTime, Timelike, Utc};

use crate::calendar::LocalCalendar;
use crate::config::AttendancePolicy;
use crate::models::{AttendanceSummary, AuditStep, AuditWarning, Punch, PunchKind};

const MS_PER_MINUTE: i64 = 60_000;

/// The punches that anchor a day's time segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayAnchors<'a> {
    /// First clock-in.
    pub entrada: Option<&'a Punch>,
    /// First lunch-out.
    pub entrada_almoco: Option<&'a Punch>,
    /// First lunch-in.
    pub volta_almoco: Option<&'a Punch>,
    /// Last clock-out.
    pub saida: Option<&'a Punch>,
}

impl<'a> DayAnchors<'a> {
    /// Picks anchors from punches already sorted by timestamp.
    ///
    /// The clock-out is the last SAIDA; every other anchor is the first of its kind.
    pub fn select(sorted: &'a [Punch]) -> Self {
        let first = |kind: PunchKind| sorted.iter().find(|p| p.kind == kind);
        Self {
            entrada: first(PunchKind::Entrada),
            entrada_almoco: first(PunchKind::EntradaAlmoco),
            volta_almoco: first(PunchKind::VoltaAlmoco),
            saida: sorted.iter().rev().find(|p| p.kind == PunchKind::Saida),
        }
    }
}

/// The result of a daily calculation, including audit steps and warnings.
#[derive(Debug, Clone)]
pub struct DailySummaryResult {
    /// The computed figures.
    pub summary: AttendanceSummary,
    /// The audit steps recording this calculation, in order.
    pub audit_steps: Vec<AuditStep>,
    /// Anomalies found in the punch set.
    pub warnings: Vec<AuditWarning>,
}

/// Sorts punches ascending by timestamp.
///
/// The sort is stable: punches with identical timestamps keep their input order.
pub fn sort_punches(punches: &[Punch]) -> Vec<Punch> {
    let mut sorted = punches.to_vec();
    sorted.sort_by_key(|p| p.timestamp);
    sorted
}

/// Returns true if a clock-in at `instant` is late under `policy`.
///
/// Seconds are ignored: with an 08:00 cutoff, 08:00:59 is on time and 08:01 is late.
pub fn is_late(instant: DateTime<Utc>, policy: &AttendancePolicy, calendar: &LocalCalendar) -> bool {
    let local = calendar.local_time(instant);
    let cutoff = policy.lateness_cutoff;
    (local.hour(), local.minute()) > (cutoff.hour(), cutoff.minute())
}

/// Positive span between two optional anchors, in milliseconds.
fn span_ms(start: Option<&Punch>, end: Option<&Punch>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) if end.timestamp > start.timestamp => {
            (end.timestamp - start.timestamp).num_milliseconds()
        }
        _ => 0,
    }
}

/// Rounds milliseconds to the nearest minute, halves rounding up.
fn round_to_minutes(ms: i64) -> i64 {
    (ms + MS_PER_MINUTE / 2).div_euclid(MS_PER_MINUTE)
}

struct Computation<'a> {
    anchors: DayAnchors<'a>,
    work_ms: i64,
    lunch_ms: i64,
    summary: AttendanceSummary,
}

fn compute<'a>(
    sorted: &'a [Punch],
    policy: &AttendancePolicy,
    calendar: &LocalCalendar,
) -> Computation<'a> {
    let anchors = DayAnchors::select(sorted);

    let work_ms = span_ms(anchors.entrada, anchors.saida);
    let lunch_ms = span_ms(anchors.entrada_almoco, anchors.volta_almoco);
    let worked_minutes = round_to_minutes(work_ms - lunch_ms).max(0);

    let lateness_count = sorted
        .iter()
        .filter(|p| p.kind == PunchKind::Entrada && is_late(p.timestamp, policy, calendar))
        .count() as u32;

    Computation {
        anchors,
        work_ms,
        lunch_ms,
        summary: AttendanceSummary {
            worked_minutes,
            lateness_count,
            balance_minutes: worked_minutes - policy.expected_daily_minutes,
        },
    }
}

/// Summarizes one day's punches.
///
/// An empty slice yields worked 0, lateness 0 and a neutral balance. The
/// input order does not matter except between punches sharing a timestamp.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::summarize;
/// use attendance_engine::calendar::LocalCalendar;
/// use attendance_engine::config::AttendancePolicy;
/// use attendance_engine::models::{Punch, PunchKind};
///
/// let calendar = LocalCalendar::utc();
/// let at = |t: &str| calendar.parse_timestamp(&format!("2024-03-15T{}", t)).unwrap();
/// let punches = vec![
///     Punch::new("emp_001", PunchKind::Saida, at("17:00")),
///     Punch::new("emp_001", PunchKind::Entrada, at("08:00")),
///     Punch::new("emp_001", PunchKind::VoltaAlmoco, at("13:00")),
///     Punch::new("emp_001", PunchKind::EntradaAlmoco, at("12:00")),
/// ];
///
/// let summary = summarize(&punches, &AttendancePolicy::default(), &calendar);
/// assert_eq!(summary.worked_minutes, 480);
/// assert_eq!(summary.lateness_count, 0);
/// assert_eq!(summary.balance_label(), "0h 00min");
/// ```
pub fn summarize(
    punches: &[Punch],
    policy: &AttendancePolicy,
    calendar: &LocalCalendar,
) -> AttendanceSummary {
    if punches.is_empty() {
        return AttendanceSummary::default();
    }
    let sorted = sort_punches(punches);
    compute(&sorted, policy, calendar).summary
}

/// Summarizes one day's punches and records how the figures were reached.
pub fn calculate_daily_summary(
    punches: &[Punch],
    policy: &AttendancePolicy,
    calendar: &LocalCalendar,
    start_step_number: u32,
) -> DailySummaryResult {
    if punches.is_empty() {
        return DailySummaryResult {
            summary: AttendanceSummary::default(),
            audit_steps: vec![AuditStep {
                step_number: start_step_number,
                rule_id: "empty_day".to_string(),
                rule_name: "Empty Punch Set".to_string(),
                input: serde_json::json!({ "punch_count": 0 }),
                output: serde_json::json!({ "worked_minutes": 0, "lateness_count": 0, "balance": "0h 00min" }),
                reasoning: "No punches recorded; all figures are zero".to_string(),
            }],
            warnings: Vec::new(),
        };
    }

    let sorted = sort_punches(punches);
    let computation = compute(&sorted, policy, calendar);
    let anchors = computation.anchors;
    let summary = computation.summary;
    let mut step = start_step_number;
    let mut audit_steps = Vec::new();

    let anchor_time = |punch: Option<&Punch>| {
        punch
            .map(|p| calendar.local_datetime(p.timestamp).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    };

    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "anchor_selection".to_string(),
        rule_name: "Segment Anchor Selection".to_string(),
        input: serde_json::json!({ "punch_count": sorted.len() }),
        output: serde_json::json!({
            "entrada": anchor_time(anchors.entrada),
            "entrada_almoco": anchor_time(anchors.entrada_almoco),
            "volta_almoco": anchor_time(anchors.volta_almoco),
            "saida": anchor_time(anchors.saida),
        }),
        reasoning: "First ENTRADA, ENTRADA_ALMOCO and VOLTA_ALMOCO; last SAIDA".to_string(),
    });
    step += 1;

    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "worked_time".to_string(),
        rule_name: "Worked Time Minus Lunch".to_string(),
        input: serde_json::json!({
            "work_ms": computation.work_ms,
            "lunch_ms": computation.lunch_ms,
        }),
        output: serde_json::json!({ "worked_minutes": summary.worked_minutes }),
        reasoning: format!(
            "Worked {} after deducting {} of lunch",
            summary.worked_label(),
            crate::models::format_duration(round_to_minutes(computation.lunch_ms))
        ),
    });
    step += 1;

    let cutoff = policy.lateness_cutoff.format("%H:%M").to_string();
    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "lateness".to_string(),
        rule_name: "Late Clock-In Count".to_string(),
        input: serde_json::json!({ "cutoff": cutoff }),
        output: serde_json::json!({ "lateness_count": summary.lateness_count }),
        reasoning: format!(
            "{} clock-in(s) after {}",
            summary.lateness_count, cutoff
        ),
    });
    step += 1;

    audit_steps.push(AuditStep {
        step_number: step,
        rule_id: "balance".to_string(),
        rule_name: "Hour Bank Balance".to_string(),
        input: serde_json::json!({
            "worked_minutes": summary.worked_minutes,
            "expected_minutes": policy.expected_daily_minutes,
        }),
        output: serde_json::json!({
            "balance_minutes": summary.balance_minutes,
            "balance": summary.balance_label(),
        }),
        reasoning: format!(
            "{} worked minus {} expected",
            summary.worked_label(),
            crate::models::format_duration(policy.expected_daily_minutes)
        ),
    });

    DailySummaryResult {
        summary,
        audit_steps,
        warnings: detect_warnings(&sorted, &anchors),
    }
}

fn detect_warnings(sorted: &[Punch], anchors: &DayAnchors<'_>) -> Vec<AuditWarning> {
    let mut warnings = Vec::new();

    match (anchors.entrada, anchors.saida) {
        (Some(_), None) => warnings.push(AuditWarning {
            code: "MISSING_SAIDA".to_string(),
            message: "Clock-in without clock-out; work segment not counted".to_string(),
        }),
        (None, Some(_)) => warnings.push(AuditWarning {
            code: "MISSING_ENTRADA".to_string(),
            message: "Clock-out without clock-in; work segment not counted".to_string(),
        }),
        (Some(entrada), Some(saida)) if saida.timestamp <= entrada.timestamp => {
            warnings.push(AuditWarning {
                code: "SAIDA_BEFORE_ENTRADA".to_string(),
                message: "Clock-out is not after clock-in; work segment not counted".to_string(),
            })
        }
        _ => {}
    }

    if anchors.entrada_almoco.is_some() != anchors.volta_almoco.is_some() {
        warnings.push(AuditWarning {
            code: "UNPAIRED_LUNCH".to_string(),
            message: "Lunch has only one punch; no lunch deducted".to_string(),
        });
    }

    for kind in PunchKind::ALL {
        let count = sorted.iter().filter(|p| p.kind == kind).count();
        if count > 1 {
            warnings.push(AuditWarning {
                code: "DUPLICATE_KIND".to_string(),
                message: format!("{} punches of kind {}", count, kind),
            });
        }
    }

    warnings
}
