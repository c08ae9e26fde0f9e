//! Avoidance tracking: significant situations the player chose not to face.
//!
//! Avoided situations age with the session counter and are flagged overdue
//! for prioritization. Surfacing is strictly one-way; a second surface call
//! is a reported failure so the narrator knows the attempt was redundant.

use crate::threads::Severity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Age (in sessions) past which an avoided situation is flagged overdue.
/// Prioritization only; nothing is enforced.
pub const OVERDUE_AGE: u32 = 3;

/// Unique identifier for an avoided situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvoidanceId(Uuid);

impl AvoidanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AvoidanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AvoidanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A situation the player walked away from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvoidedSituation {
    pub id: AvoidanceId,

    /// What the player did not engage with.
    pub situation: String,

    /// What was at stake at the time.
    pub what_was_at_stake: String,

    /// What ignoring it may cost.
    pub potential_consequence: String,

    pub severity: Severity,

    pub created_session: u32,

    /// One-way flag: false until surfaced, then true forever.
    pub surfaced: bool,

    /// Session the situation was surfaced in. Set exactly once.
    pub surfaced_session: Option<u32>,
}

impl AvoidedSituation {
    /// Sessions elapsed since the situation was logged.
    pub fn age(&self, current_session: u32) -> u32 {
        current_session.saturating_sub(self.created_session)
    }

    /// Overdue situations should be surfaced soon.
    pub fn is_overdue(&self, current_session: u32) -> bool {
        self.age(current_session) >= OVERDUE_AGE
    }
}

/// An unsurfaced situation annotated with its derived urgency fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAvoidance {
    pub id: AvoidanceId,
    pub situation: String,
    pub potential_consequence: String,
    pub severity: Severity,
    pub age: u32,
    pub overdue: bool,
}

/// Store of avoided situations for one campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvoidanceTracker {
    situations: Vec<AvoidedSituation>,
}

impl AvoidanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a situation the player chose not to engage.
    pub fn log(
        &mut self,
        situation: impl Into<String>,
        what_was_at_stake: impl Into<String>,
        potential_consequence: impl Into<String>,
        severity: Severity,
        session: u32,
    ) -> &AvoidedSituation {
        self.situations.push(AvoidedSituation {
            id: AvoidanceId::new(),
            situation: situation.into(),
            what_was_at_stake: what_was_at_stake.into(),
            potential_consequence: potential_consequence.into(),
            severity,
            created_session: session,
            surfaced: false,
            surfaced_session: None,
        });
        self.situations.last().expect("situation just pushed")
    }

    /// Surface a situation into play.
    ///
    /// Fails (returns `None`) when the id is unknown or the situation was
    /// already surfaced; surfacing is one-way and non-idempotent by design.
    pub fn surface(&mut self, id: AvoidanceId, session: u32) -> Option<&AvoidedSituation> {
        let situation = self
            .situations
            .iter_mut()
            .find(|s| s.id == id && !s.surfaced)?;
        situation.surfaced = true;
        situation.surfaced_session = Some(session);
        Some(situation)
    }

    /// All unsurfaced situations, Major first, annotated with derived age
    /// and overdue flags.
    pub fn pending(&self, current_session: u32) -> Vec<PendingAvoidance> {
        let mut pending: Vec<PendingAvoidance> = self
            .situations
            .iter()
            .filter(|s| !s.surfaced)
            .map(|s| PendingAvoidance {
                id: s.id,
                situation: s.situation.clone(),
                potential_consequence: s.potential_consequence.clone(),
                severity: s.severity,
                age: s.age(current_session),
                overdue: s.is_overdue(current_session),
            })
            .collect();
        pending.sort_by(|a, b| b.severity.cmp(&a.severity));
        pending
    }

    pub fn get(&self, id: AvoidanceId) -> Option<&AvoidedSituation> {
        self.situations.iter().find(|s| s.id == id)
    }

    /// Every situation ever logged, surfaced or not.
    pub fn all(&self) -> &[AvoidedSituation] {
        &self.situations
    }
}
