//! Local calendar projection for punch instants.
//!
//! Punches are stored as UTC instants, while every attendance rule is
//! expressed in the deployment's local calendar: the day a punch belongs to,
//! the wall-clock time compared against the lateness cutoff, and the month
//! window of a report. [`LocalCalendar`] is the single place where that
//! projection happens.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};

use crate::error::{EngineError, EngineResult};

/// Number of 15 minute steps tried when a local midnight falls into a DST gap.
const MAX_GAP_STEPS: u32 = 8;

/// Naive formats accepted for timestamps without an explicit offset.
const NAIVE_TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The time zone a [`LocalCalendar`] projects into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    /// The zone of the running process, including its DST rules.
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

/// Calendar used to derive local dates, wall-clock times and day/month windows.
///
/// # Example
///
/// ```
/// use attendance_engine::calendar::LocalCalendar;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let calendar = LocalCalendar::from_config_str("-03:00").unwrap();
/// let instant = calendar.parse_timestamp("2024-03-15T02:30:00Z").unwrap();
///
/// // 02:30 UTC is still the 14th in Sao Paulo.
/// assert_eq!(calendar.local_date(instant), NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
/// assert_eq!(calendar.local_time(instant), NaiveTime::from_hms_opt(23, 30, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    zone: CalendarZone,
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::system()
    }
}

impl LocalCalendar {
    /// Calendar in the process's local time zone.
    pub fn system() -> Self {
        Self {
            zone: CalendarZone::Local,
        }
    }

    /// Calendar with a fixed UTC offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            zone: CalendarZone::Fixed(offset),
        }
    }

    /// Calendar pinned to UTC.
    pub fn utc() -> Self {
        Self::fixed(FixedOffset::east_opt(0).expect("zero offset is valid"))
    }

    /// Returns the zone this calendar projects into.
    pub fn zone(&self) -> CalendarZone {
        self.zone
    }

    /// Builds a calendar from its configuration spelling.
    ///
    /// Accepts `local`, `utc`/`z`, or a signed offset such as `-03:00` or `+0530`.
    pub fn from_config_str(value: &str) -> EngineResult<Self> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(Self::system()),
            "utc" | "z" => return Ok(Self::utc()),
            _ => {}
        }

        let invalid = || EngineError::InvalidConfig {
            field: "calendar".to_string(),
            message: format!(
                "expected 'local', 'utc' or an offset like '-03:00', got '{}'",
                value
            ),
        };

        trimmed.parse::<FixedOffset>().map(Self::fixed).map_err(|_| invalid())
    }

    /// Projects an instant onto the local wall clock.
    pub fn local_datetime(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self.zone {
            CalendarZone::Local => instant.with_timezone(&Local).naive_local(),
            CalendarZone::Fixed(offset) => instant.with_timezone(&offset).naive_local(),
        }
    }

    /// The local calendar date an instant falls on.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    /// The local wall-clock time of an instant.
    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveTime {
        self.local_datetime(instant).time()
    }

    /// Today's date in this calendar.
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Resolves a local wall-clock reading to an instant.
    ///
    /// Ambiguous readings (DST fold) resolve to the earliest instant; readings
    /// inside a DST gap move forward to the first valid instant.
    pub fn to_instant(&self, local: NaiveDateTime) -> EngineResult<DateTime<Utc>> {
        let resolved = match self.zone {
            CalendarZone::Local => resolve_forward(&Local, local),
            CalendarZone::Fixed(offset) => resolve_forward(&offset, local),
        };
        resolved.ok_or_else(|| EngineError::CalculationError {
            message: format!("local time {} does not exist in the calendar zone", local),
        })
    }

    /// The instant of local midnight starting `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> EngineResult<DateTime<Utc>> {
        self.to_instant(date.and_time(NaiveTime::MIN))
    }

    /// `[start, end)` instants covering the local calendar day `date`.
    ///
    /// The end is the next calendar day's local midnight, so days spanning a
    /// DST change are 23 or 25 hours long.
    pub fn day_bounds(&self, date: NaiveDate) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
        let next = date.succ_opt().ok_or_else(|| EngineError::CalculationError {
            message: format!("no calendar day after {}", date),
        })?;
        Ok((self.start_of_day(date)?, self.start_of_day(next)?))
    }

    /// `[start, end)` instants covering the calendar month containing `reference`.
    pub fn month_bounds(
        &self,
        reference: NaiveDate,
    ) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
        let (first, next_first) = month_dates(reference)?;
        Ok((self.start_of_day(first)?, self.start_of_day(next_first)?))
    }

    /// Parses a punch timestamp.
    ///
    /// RFC 3339 strings carry their own offset; naive `YYYY-MM-DD[T ]HH:MM[:SS]`
    /// strings are read as local wall-clock time in this calendar.
    pub fn parse_timestamp(&self, text: &str) -> EngineResult<DateTime<Utc>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::invalid_punch("timestamp", "timestamp is empty"));
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Ok(parsed.with_timezone(&Utc));
        }

        NAIVE_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .ok_or_else(|| {
                EngineError::invalid_punch("timestamp", format!("unparsable timestamp '{}'", text))
            })
            .and_then(|local| self.to_instant(local))
    }
}

/// First day of the month containing `reference`, and first day of the next month.
pub fn month_dates(reference: NaiveDate) -> EngineResult<(NaiveDate, NaiveDate)> {
    let first = reference
        .with_day(1)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("cannot take the first day of {}", reference),
        })?;
    let next_first =
        first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no month after {}", first),
            })?;
    Ok((first, next_first))
}

fn resolve_forward<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let mut candidate = local;
    for _ in 0..=MAX_GAP_STEPS {
        if let Some(resolved) = zone.from_local_datetime(&candidate).earliest() {
            return Some(resolved.with_timezone(&Utc));
        }
        candidate += Duration::minutes(15);
    }
    None
}
