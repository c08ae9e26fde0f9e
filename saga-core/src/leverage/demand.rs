//! Leverage demands and their urgency lifecycle.
//!
//! A demand is a concrete, faction-issued ask tied to existing leverage.
//! Deadlines are stored as absolute sessions, computed once at creation
//! from a relative offset; urgency is derived on read, never stored.

use super::{EnhancementId, LeverageWeight};
use crate::factions::Faction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DemandId(Uuid);

impl DemandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DemandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DemandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the character answered a demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandResponse {
    /// Do what was asked; leverage eases one step.
    Comply,
    /// Refuse outright; leverage tightens one step.
    Resist,
    /// Bargain; leverage holds where it is.
    Negotiate,
}

impl DemandResponse {
    pub fn name(&self) -> &'static str {
        match self {
            DemandResponse::Comply => "comply",
            DemandResponse::Resist => "resist",
            DemandResponse::Negotiate => "negotiate",
        }
    }

    /// Parse from a command-surface string (case-insensitive).
    pub fn parse(s: &str) -> Option<DemandResponse> {
        match s.trim().to_lowercase().as_str() {
            "comply" => Some(DemandResponse::Comply),
            "resist" => Some(DemandResponse::Resist),
            "negotiate" => Some(DemandResponse::Negotiate),
            _ => None,
        }
    }
}

/// How a faction turns the screw on an unanswered demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationKind {
    /// Queue a dormant thread built from the demand's consequence list.
    QueueConsequence,
    /// Step the leverage weight up one tier.
    IncreaseWeight,
    /// The faction acts in the world; chronicle entry only.
    FactionAction,
}

impl EscalationKind {
    pub fn name(&self) -> &'static str {
        match self {
            EscalationKind::QueueConsequence => "queue_consequence",
            EscalationKind::IncreaseWeight => "increase_weight",
            EscalationKind::FactionAction => "faction_action",
        }
    }
}

/// A concrete, faction-issued ask tied to existing leverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageDemand {
    pub id: DemandId,

    /// The faction doing the asking (the enhancement's source).
    pub faction: Faction,

    pub enhancement_id: EnhancementId,

    /// What is being asked.
    pub demand: String,

    /// What the faction holds over the character.
    pub threat_basis: Vec<String>,

    /// Narrative deadline, if the faction named one.
    pub deadline_text: Option<String>,

    /// Absolute session the deadline falls on. Computed at creation from a
    /// relative "sessions from now" offset.
    pub deadline_session: Option<u32>,

    /// What the faction says will happen on refusal.
    pub consequences: Vec<String>,

    pub created_session: u32,

    /// The leverage weight at the moment the demand was issued.
    pub weight: LeverageWeight,
}

impl LeverageDemand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        faction: Faction,
        enhancement_id: EnhancementId,
        demand: impl Into<String>,
        weight: LeverageWeight,
        threat_basis: Vec<String>,
        deadline_text: Option<String>,
        deadline_sessions: Option<u32>,
        consequences: Vec<String>,
        current_session: u32,
    ) -> Self {
        Self {
            id: DemandId::new(),
            faction,
            enhancement_id,
            demand: demand.into(),
            threat_basis,
            deadline_text,
            deadline_session: deadline_sessions.map(|d| current_session + d),
            consequences,
            created_session: current_session,
            weight,
        }
    }

    /// Derived urgency for the narrator's attention queue.
    pub fn urgency(&self, current_session: u32) -> DemandUrgency {
        let age = current_session.saturating_sub(self.created_session);
        match self.deadline_session {
            Some(deadline) if current_session > deadline => DemandUrgency {
                tier: UrgencyTier::Critical,
                score: 1000 + age,
            },
            Some(deadline) if current_session == deadline => DemandUrgency {
                tier: UrgencyTier::Urgent,
                score: 500 + age,
            },
            _ => DemandUrgency {
                tier: UrgencyTier::Pending,
                score: self.weight.urgency_bonus() + age,
            },
        }
    }
}

/// Urgency tier for a pending demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyTier {
    /// Deadline blown.
    Critical,
    /// Deadline is this session.
    Urgent,
    /// No deadline pressure yet.
    Pending,
}

impl UrgencyTier {
    pub fn name(&self) -> &'static str {
        match self {
            UrgencyTier::Critical => "critical",
            UrgencyTier::Urgent => "urgent",
            UrgencyTier::Pending => "pending",
        }
    }
}

/// Derived urgency: tier plus a sortable score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandUrgency {
    pub tier: UrgencyTier,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand_with_deadline(created: u32, deadline_sessions: Option<u32>) -> LeverageDemand {
        LeverageDemand::new(
            Faction::GildedSyndicate,
            EnhancementId::new(),
            "Carry a sealed crate past the Watch",
            LeverageWeight::Medium,
            vec!["They paid for the surgeon".to_string()],
            deadline_sessions.map(|_| "before the moon turns".to_string()),
            deadline_sessions,
            vec!["The surgeon's bill comes due".to_string()],
            created,
        )
    }

    #[test]
    fn test_deadline_is_absolute_at_creation() {
        let demand = demand_with_deadline(4, Some(2));
        assert_eq!(demand.deadline_session, Some(6));
    }

    #[test]
    fn test_urgency_pending_uses_weight_bonus() {
        let demand = demand_with_deadline(3, None);
        let urgency = demand.urgency(5);
        assert_eq!(urgency.tier, UrgencyTier::Pending);
        // Medium bonus 50 + age 2
        assert_eq!(urgency.score, 52);
    }

    #[test]
    fn test_urgency_at_deadline_is_urgent() {
        let demand = demand_with_deadline(2, Some(3));
        let urgency = demand.urgency(5);
        assert_eq!(urgency.tier, UrgencyTier::Urgent);
        assert_eq!(urgency.score, 503);
    }

    #[test]
    fn test_urgency_past_deadline_is_critical() {
        let demand = demand_with_deadline(2, Some(1));
        let urgency = demand.urgency(6);
        assert_eq!(urgency.tier, UrgencyTier::Critical);
        assert_eq!(urgency.score, 1004);
    }

    #[test]
    fn test_critical_outranks_every_pending_score() {
        let heavy_pending = demand_with_deadline(1, None);
        let overdue = demand_with_deadline(1, Some(1));
        assert!(overdue.urgency(3).score > heavy_pending.urgency(3).score);
    }
}
