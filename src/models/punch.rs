//! Punch model and related types.
//!
//! A punch is one timestamped attendance event of a fixed kind. Punches are
//! immutable once created: the kind is decided at registration time and is
//! never re-derived afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::LocalCalendar;
use crate::error::{EngineError, EngineResult};

/// Terminal tag recorded on punches registered through face recognition.
pub const FACIAL_TERMINAL: &str = "FACIAL";

/// The semantic slot a punch occupies in the working day.
///
/// # Example
///
/// ```
/// use attendance_engine::models::PunchKind;
///
/// let kind: PunchKind = "VOLTA_ALMOCO".parse().unwrap();
/// assert_eq!(kind, PunchKind::VoltaAlmoco);
/// assert_eq!(kind.label(), "Retorno almoço");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchKind {
    /// Clock-in at the start of the day.
    Entrada,
    /// Leaving for lunch.
    EntradaAlmoco,
    /// Returning from lunch.
    VoltaAlmoco,
    /// Clock-out at the end of the day.
    Saida,
}

impl PunchKind {
    /// All kinds in the order they occur in a canonical day.
    pub const ALL: [PunchKind; 4] = [
        PunchKind::Entrada,
        PunchKind::EntradaAlmoco,
        PunchKind::VoltaAlmoco,
        PunchKind::Saida,
    ];

    /// The wire name (`ENTRADA`, `ENTRADA_ALMOCO`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchKind::Entrada => "ENTRADA",
            PunchKind::EntradaAlmoco => "ENTRADA_ALMOCO",
            PunchKind::VoltaAlmoco => "VOLTA_ALMOCO",
            PunchKind::Saida => "SAIDA",
        }
    }

    /// The human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PunchKind::Entrada => "Entrada",
            PunchKind::EntradaAlmoco => "Saída almoço",
            PunchKind::VoltaAlmoco => "Retorno almoço",
            PunchKind::Saida => "Saída",
        }
    }

    /// Position of this kind in [`PunchKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            PunchKind::Entrada => 0,
            PunchKind::EntradaAlmoco => 1,
            PunchKind::VoltaAlmoco => 2,
            PunchKind::Saida => 3,
        }
    }
}

impl fmt::Display for PunchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PunchKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENTRADA" => Ok(PunchKind::Entrada),
            "ENTRADA_ALMOCO" => Ok(PunchKind::EntradaAlmoco),
            "VOLTA_ALMOCO" => Ok(PunchKind::VoltaAlmoco),
            "SAIDA" => Ok(PunchKind::Saida),
            _ => Err(EngineError::invalid_punch(
                "kind",
                format!("unknown punch kind '{}'", s),
            )),
        }
    }
}

/// A stored attendance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// The employee who punched.
    pub employee_id: String,
    /// The slot this punch occupies.
    pub kind: PunchKind,
    /// The authoritative instant of the punch.
    pub timestamp: DateTime<Utc>,
    /// Free-text description of where the punch happened.
    #[serde(default)]
    pub location_label: Option<String>,
    /// The terminal or flow that produced the punch (e.g. `FACIAL`).
    #[serde(default)]
    pub terminal: Option<String>,
}

impl Punch {
    /// Creates a punch with a fresh id and no location or terminal.
    pub fn new(employee_id: impl Into<String>, kind: PunchKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            kind,
            timestamp,
            location_label: None,
            terminal: None,
        }
    }
}

/// A punch about to be inserted into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPunch {
    /// The employee who punched.
    pub employee_id: String,
    /// The slot this punch occupies.
    pub kind: PunchKind,
    /// The instant of the punch.
    pub timestamp: DateTime<Utc>,
    /// Free-text description of where the punch happened.
    pub location_label: Option<String>,
    /// The terminal or flow that produced the punch.
    pub terminal: Option<String>,
}

/// An untyped punch record as received from outside the engine.
///
/// Converting it with [`RawPunch::into_punch`] is where malformed input is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    /// Identifier, generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// The employee who punched.
    #[serde(default)]
    pub employee_id: String,
    /// The kind as text.
    pub kind: String,
    /// The timestamp as text.
    pub timestamp: String,
    /// Free-text location.
    #[serde(default)]
    pub location_label: Option<String>,
    /// Terminal tag.
    #[serde(default)]
    pub terminal: Option<String>,
}

impl RawPunch {
    /// Validates the record and converts it into a [`Punch`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPunch`] for an unknown kind or an
    /// unparsable timestamp.
    pub fn into_punch(self, calendar: &LocalCalendar) -> EngineResult<Punch> {
        let kind: PunchKind = self.kind.parse()?;
        let timestamp = calendar.parse_timestamp(&self.timestamp)?;
        Ok(Punch {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            employee_id: self.employee_id,
            kind,
            timestamp,
            location_label: self.location_label,
            terminal: self.terminal,
        })
    }
}

/// Converts a batch of raw records, failing on the first malformed one.
pub fn parse_punches(raw: Vec<RawPunch>, calendar: &LocalCalendar) -> EngineResult<Vec<Punch>> {
    raw.into_iter().map(|r| r.into_punch(calendar)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: &str, timestamp: &str) -> RawPunch {
        RawPunch {
            id: None,
            employee_id: "emp_001".to_string(),
            kind: kind.to_string(),
            timestamp: timestamp.to_string(),
            location_label: None,
            terminal: None,
        }
    }

    #[test]
    fn test_kind_parses_wire_names_case_insensitively() {
        assert_eq!("ENTRADA".parse::<PunchKind>().unwrap(), PunchKind::Entrada);
        assert_eq!(" saida ".parse::<PunchKind>().unwrap(), PunchKind::Saida);
        assert_eq!(
            "entrada_almoco".parse::<PunchKind>().unwrap(),
            PunchKind::EntradaAlmoco
        );
    }

    #[test]
    fn test_unknown_kind_is_invalid_punch() {
        match "PAUSA".parse::<PunchKind>() {
            Err(EngineError::InvalidPunch { field, message }) => {
                assert_eq!(field, "kind");
                assert!(message.contains("PAUSA"));
            }
            other => panic!("expected InvalidPunch, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_serializes_as_wire_name() {
        let json = serde_json::to_string(&PunchKind::VoltaAlmoco).unwrap();
        assert_eq!(json, "\"VOLTA_ALMOCO\"");
        let back: PunchKind = serde_json::from_str("\"ENTRADA_ALMOCO\"").unwrap();
        assert_eq!(back, PunchKind::EntradaAlmoco);
    }

    #[test]
    fn test_kind_index_matches_all_order() {
        for (i, kind) in PunchKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_raw_punch_into_punch() {
        let calendar = LocalCalendar::utc();
        let punch = raw("SAIDA", "2024-03-15T17:00:00")
            .into_punch(&calendar)
            .unwrap();
        assert_eq!(punch.kind, PunchKind::Saida);
        assert_eq!(punch.employee_id, "emp_001");
        assert_eq!(punch.timestamp.to_rfc3339(), "2024-03-15T17:00:00+00:00");
    }

    #[test]
    fn test_parse_punches_stops_at_first_bad_record() {
        let calendar = LocalCalendar::utc();
        let result = parse_punches(
            vec![
                raw("ENTRADA", "2024-03-15T08:00:00"),
                raw("ENTRADA", "not a time"),
            ],
            &calendar,
        );
        assert!(matches!(result, Err(EngineError::InvalidPunch { field, .. }) if field == "timestamp"));
    }
}
