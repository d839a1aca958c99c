//! Manually entered payroll adjustment fields.
//!
//! Adjustment fields are typed in elsewhere as free-form `HH:MM(:SS)` text
//! and copied verbatim into exports. The engine only reads them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How overtime hours are distributed between the 50% and 100% bands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OvertimeDistribution {
    /// Overtime paid at +50%.
    #[default]
    #[serde(rename = "50")]
    Fifty,
    /// Overtime paid at +100%.
    #[serde(rename = "100")]
    Hundred,
}

/// Per-employee adjustment values layered onto exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentFields {
    /// The employee these adjustments belong to.
    pub employee_id: String,
    /// Daily-rate hours ("Hora Diária").
    #[serde(default)]
    pub daily_hours: String,
    /// Overtime hours ("H.E").
    #[serde(default)]
    pub overtime_hours: String,
    /// Delay hours ("Atrasos").
    #[serde(default)]
    pub delay_hours: String,
    /// Night-shift premium hours ("A.N").
    #[serde(default)]
    pub night_premium_hours: String,
    /// Overtime band.
    #[serde(default)]
    pub overtime_distribution: OvertimeDistribution,
}

impl AdjustmentFields {
    /// The four exported values in column order: daily, overtime, delay, night premium.
    pub fn columns(&self) -> [&str; 4] {
        [
            &self.daily_hours,
            &self.overtime_hours,
            &self.delay_hours,
            &self.night_premium_hours,
        ]
    }

    /// The four columns as decimal hours, alongside the overtime band.
    ///
    /// Blank columns are zero hours; text that is not `HH:MM(:SS)` is `None`.
    pub fn hours(&self) -> AdjustmentHours {
        let parse = |text: &str| parse_clock_hours(text).ok();
        AdjustmentHours {
            employee_id: self.employee_id.clone(),
            daily_hours: parse(&self.daily_hours),
            overtime_hours: parse(&self.overtime_hours),
            delay_hours: parse(&self.delay_hours),
            night_premium_hours: parse(&self.night_premium_hours),
            overtime_distribution: self.overtime_distribution,
        }
    }
}

/// Numeric view of an employee's [`AdjustmentFields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentHours {
    /// The employee these adjustments belong to.
    pub employee_id: String,
    /// Daily-rate hours.
    pub daily_hours: Option<Decimal>,
    /// Overtime hours.
    pub overtime_hours: Option<Decimal>,
    /// Delay hours.
    pub delay_hours: Option<Decimal>,
    /// Night-shift premium hours.
    pub night_premium_hours: Option<Decimal>,
    /// Overtime band.
    pub overtime_distribution: OvertimeDistribution,
}

/// Parses `HH:MM` or `HH:MM:SS` text into whole minutes.
///
/// Seconds are truncated. Blank text is zero minutes.
///
/// # Example
///
/// ```
/// use attendance_engine::models::parse_clock_minutes;
///
/// assert_eq!(parse_clock_minutes("01:30").unwrap(), 90);
/// assert_eq!(parse_clock_minutes("10:05:59").unwrap(), 605);
/// assert_eq!(parse_clock_minutes("").unwrap(), 0);
/// assert!(parse_clock_minutes("1h30").is_err());
/// ```
pub fn parse_clock_minutes(text: &str) -> EngineResult<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let invalid = || EngineError::CalculationError {
        message: format!("expected HH:MM or HH:MM:SS, got '{}'", text),
    };

    let parts: Vec<&str> = text.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        numbers.push(part.parse::<i64>().map_err(|_| invalid())?);
    }

    let minutes = numbers[1];
    let seconds = numbers.get(2).copied().unwrap_or(0);
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    numbers[0]
        .checked_mul(60)
        .and_then(|hours| hours.checked_add(minutes))
        .ok_or_else(invalid)
}

/// Parses `HH:MM(:SS)` text into decimal hours rounded to two places.
///
/// # Example
///
/// ```
/// use attendance_engine::models::parse_clock_hours;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_clock_hours("07:20").unwrap(), Decimal::new(733, 2));
/// ```
pub fn parse_clock_hours(text: &str) -> EngineResult<Decimal> {
    let minutes = parse_clock_minutes(text)?;
    Ok((Decimal::from(minutes) / Decimal::from(60)).round_dp(2))
}
