//! The chronicle: append-only log of committed narrative history.
//!
//! Every subsystem writes here on a validated success path; nothing ever
//! reads its own writes back for logic. Ordering is insertion order, which
//! is chronological by construction.

use crate::factions::{Faction, Standing};
use serde::{Deserialize, Serialize};

/// What a chronicle entry records. One tagged union; the payload lives on
/// the variant that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChronicleEvent {
    /// A mission was undertaken and concluded.
    Mission { name: String, outcome: String },
    /// A hinge moment: an identity-defining, irreversible choice.
    Hinge { character: String },
    /// A faction's standing moved.
    FactionShift {
        faction: Faction,
        before: Standing,
        after: Standing,
    },
    /// A dormant consequence landed, or leverage pressure played out.
    Consequence { source: String },
    /// Established canon: lore committed by the narrator.
    Canon,
}

impl ChronicleEvent {
    /// The payload-free tag, for filtering.
    pub fn tag(&self) -> EventTag {
        match self {
            ChronicleEvent::Mission { .. } => EventTag::Mission,
            ChronicleEvent::Hinge { .. } => EventTag::Hinge,
            ChronicleEvent::FactionShift { .. } => EventTag::FactionShift,
            ChronicleEvent::Consequence { .. } => EventTag::Consequence,
            ChronicleEvent::Canon => EventTag::Canon,
        }
    }
}

/// Entry type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTag {
    Mission,
    Hinge,
    FactionShift,
    Consequence,
    Canon,
}

/// One committed narrative event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    /// Session the event was committed in.
    pub session: u32,
    /// What happened.
    pub event: ChronicleEvent,
    /// Human-readable summary for the narrator.
    pub summary: String,
    /// Wall-clock timestamp (unix seconds as a string).
    pub timestamp: String,
    /// Permanent entries are pinned in narrator context forever.
    pub is_permanent: bool,
}

/// The append-only history log. No deletion, no edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chronicle {
    entries: Vec<ChronicleEntry>,
}

impl Chronicle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed event. O(1); the only mutator.
    pub fn append(
        &mut self,
        session: u32,
        event: ChronicleEvent,
        summary: impl Into<String>,
        is_permanent: bool,
    ) -> &ChronicleEntry {
        self.entries.push(ChronicleEntry {
            session,
            event,
            summary: summary.into(),
            timestamp: unix_timestamp(),
            is_permanent,
        });
        self.entries.last().expect("entry just pushed")
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ChronicleEntry] {
        &self.entries
    }

    /// Entries committed in a given session.
    pub fn for_session(&self, session: u32) -> Vec<&ChronicleEntry> {
        self.entries.iter().filter(|e| e.session == session).collect()
    }

    /// Entries of one kind.
    pub fn of_kind(&self, tag: EventTag) -> Vec<&ChronicleEntry> {
        self.entries.iter().filter(|e| e.event.tag() == tag).collect()
    }

    /// Permanent entries only.
    pub fn permanent(&self) -> Vec<&ChronicleEntry> {
        self.entries.iter().filter(|e| e.is_permanent).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current wall-clock time as unix seconds.
pub(crate) fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut chronicle = Chronicle::new();
        chronicle.append(1, ChronicleEvent::Canon, "The city stands", true);
        chronicle.append(
            1,
            ChronicleEvent::Mission {
                name: "First job".to_string(),
                outcome: "success".to_string(),
            },
            "First job done",
            false,
        );
        chronicle.append(
            2,
            ChronicleEvent::Hinge {
                character: "Vess".to_string(),
            },
            "Vess took the mark",
            true,
        );

        let summaries: Vec<_> = chronicle.entries().iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec!["The city stands", "First job done", "Vess took the mark"]
        );
    }

    #[test]
    fn test_filter_by_session_and_kind() {
        let mut chronicle = Chronicle::new();
        chronicle.append(1, ChronicleEvent::Canon, "lore", true);
        chronicle.append(
            2,
            ChronicleEvent::Consequence {
                source: "thread".to_string(),
            },
            "it landed",
            false,
        );
        chronicle.append(
            2,
            ChronicleEvent::Hinge {
                character: "Vess".to_string(),
            },
            "hinge",
            true,
        );

        assert_eq!(chronicle.for_session(2).len(), 2);
        assert_eq!(chronicle.of_kind(EventTag::Canon).len(), 1);
        assert_eq!(chronicle.of_kind(EventTag::Mission).len(), 0);
        assert_eq!(chronicle.permanent().len(), 2);
    }
}
