//! Punch classification.
//!
//! Decides which slot a new punch occupies from the kinds already punched
//! today. The sequence ENTRADA → ENTRADA_ALMOCO → VOLTA_ALMOCO → SAIDA is a
//! small state machine keyed on which kinds are present; it is written out as
//! a transition table so every edge, including the fallback, is visible.
//!
//! Timestamps are not consulted: a punch set registered out of wall-clock
//! order classifies exactly like an ordered one.

use serde::{Deserialize, Serialize};

use crate::models::{Punch, PunchKind};

/// Which punch kinds are present in a day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindPresence([bool; 4]);

impl KindPresence {
    /// Collects presence flags from a sequence of kinds.
    pub fn from_kinds<I: IntoIterator<Item = PunchKind>>(kinds: I) -> Self {
        let mut flags = [false; 4];
        for kind in kinds {
            flags[kind.index()] = true;
        }
        Self(flags)
    }

    /// Collects presence flags from punches.
    pub fn from_punches(punches: &[Punch]) -> Self {
        Self::from_kinds(punches.iter().map(|p| p.kind))
    }

    /// Returns true if at least one punch of `kind` is present.
    pub fn has(&self, kind: PunchKind) -> bool {
        self.0[kind.index()]
    }
}

/// The transition that produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    /// No clock-in yet.
    MissingEntrada,
    /// Clocked in, lunch not started.
    MissingEntradaAlmoco,
    /// Lunch started, not returned.
    MissingVoltaAlmoco,
    /// Clocked in, not clocked out.
    MissingSaida,
    /// Every slot filled, or an inconsistent combination: start over.
    Fallback,
}

struct Transition {
    requires: Option<PunchKind>,
    lacks: PunchKind,
    next: PunchKind,
    rule: ClassificationRule,
}

/// Evaluated top to bottom; the first matching row wins.
const TRANSITIONS: [Transition; 4] = [
    Transition {
        requires: None,
        lacks: PunchKind::Entrada,
        next: PunchKind::Entrada,
        rule: ClassificationRule::MissingEntrada,
    },
    Transition {
        requires: Some(PunchKind::Entrada),
        lacks: PunchKind::EntradaAlmoco,
        next: PunchKind::EntradaAlmoco,
        rule: ClassificationRule::MissingEntradaAlmoco,
    },
    Transition {
        requires: Some(PunchKind::EntradaAlmoco),
        lacks: PunchKind::VoltaAlmoco,
        next: PunchKind::VoltaAlmoco,
        rule: ClassificationRule::MissingVoltaAlmoco,
    },
    Transition {
        requires: Some(PunchKind::Entrada),
        lacks: PunchKind::Saida,
        next: PunchKind::Saida,
        rule: ClassificationRule::MissingSaida,
    },
];

const FALLBACK: PunchKind = PunchKind::Entrada;

/// Returns the next kind and the transition that chose it.
pub fn classify_presence(presence: KindPresence) -> (PunchKind, ClassificationRule) {
    TRANSITIONS
        .iter()
        .find(|t| t.requires.is_none_or(|k| presence.has(k)) && !presence.has(t.lacks))
        .map(|t| (t.next, t.rule))
        .unwrap_or((FALLBACK, ClassificationRule::Fallback))
}

/// Classifies a new punch given today's existing punches.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::classify;
/// use attendance_engine::models::{Punch, PunchKind};
/// use chrono::Utc;
///
/// assert_eq!(classify(&[]), PunchKind::Entrada);
///
/// let today = vec![Punch::new("emp_001", PunchKind::Entrada, Utc::now())];
/// assert_eq!(classify(&today), PunchKind::EntradaAlmoco);
/// ```
pub fn classify(existing_today: &[Punch]) -> PunchKind {
    classify_presence(KindPresence::from_punches(existing_today)).0
}

/// Classifies from kinds alone.
pub fn classify_kinds<I: IntoIterator<Item = PunchKind>>(kinds: I) -> PunchKind {
    classify_presence(KindPresence::from_kinds(kinds)).0
}
