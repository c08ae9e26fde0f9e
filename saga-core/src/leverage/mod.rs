//! The leverage engine: enhancements, the power factions hold through
//! them, and the demand lifecycle that power produces.
//!
//! Accepting an enhancement is identity-defining; the granting faction
//! keeps leverage over the character from then on. Leverage has a weight
//! tier and carries at most one active demand at a time.

mod demand;
mod reputation;

pub use demand::{
    DemandId, DemandResponse, DemandUrgency, EscalationKind, LeverageDemand, UrgencyTier,
};
pub use reputation::{refusal_standing, RefusalStanding, RefusedEnhancement};

use crate::factions::Faction;
use crate::keywords::{self, MAX_CACHED_KEYWORDS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnhancementId(Uuid);

impl EnhancementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EnhancementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EnhancementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The pressure tier of a faction's leverage.
///
/// A one-directional step function with saturating bounds; no raw index
/// arithmetic anywhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum LeverageWeight {
    #[default]
    Light,
    Medium,
    Heavy,
}

impl LeverageWeight {
    /// One step heavier, capped at Heavy.
    pub fn step_up(self) -> LeverageWeight {
        match self {
            LeverageWeight::Light => LeverageWeight::Medium,
            LeverageWeight::Medium | LeverageWeight::Heavy => LeverageWeight::Heavy,
        }
    }

    /// One step lighter, floored at Light.
    pub fn step_down(self) -> LeverageWeight {
        match self {
            LeverageWeight::Heavy => LeverageWeight::Medium,
            LeverageWeight::Medium | LeverageWeight::Light => LeverageWeight::Light,
        }
    }

    /// Contribution to demand urgency when no deadline applies.
    pub fn urgency_bonus(&self) -> u32 {
        match self {
            LeverageWeight::Light => 0,
            LeverageWeight::Medium => 50,
            LeverageWeight::Heavy => 100,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LeverageWeight::Light => "Light",
            LeverageWeight::Medium => "Medium",
            LeverageWeight::Heavy => "Heavy",
        }
    }

    /// Parse from a command-surface string (case-insensitive).
    pub fn parse(s: &str) -> Option<LeverageWeight> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(LeverageWeight::Light),
            "medium" => Some(LeverageWeight::Medium),
            "heavy" => Some(LeverageWeight::Heavy),
            _ => None,
        }
    }
}

impl std::fmt::Display for LeverageWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The ongoing leverage state attached to one enhancement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leverage {
    pub weight: LeverageWeight,

    /// At most one active demand at any time. Hard invariant: `call` fails
    /// while this is `Some`.
    pub pending_demand: Option<LeverageDemand>,

    /// How often the character has complied with demands.
    pub compliance_count: u32,

    /// How often the character has resisted.
    pub resistance_count: u32,

    /// Session this enhancement last produced a hint, to rate-limit hint
    /// generation to once per session per enhancement.
    pub last_hinted_session: Option<u32>,
}

/// A faction-granted enhancement and the leverage that came with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enhancement {
    pub id: EnhancementId,
    pub name: String,

    /// The granting faction. Structurally restricted: two factions can
    /// never appear here (checked at grant time).
    pub source: Faction,

    pub benefit: String,
    pub cost: String,

    pub granted_session: u32,

    /// Keywords cached at grant time from name, benefit and cost.
    pub leverage_keywords: Vec<String>,

    pub leverage: Leverage,
}

impl Enhancement {
    pub fn new(
        name: impl Into<String>,
        source: Faction,
        benefit: impl Into<String>,
        cost: impl Into<String>,
        granted_session: u32,
    ) -> Self {
        let name = name.into();
        let benefit = benefit.into();
        let cost = cost.into();
        let leverage_keywords = keywords::extract_capped(
            &format!("{name} {benefit} {cost}"),
            MAX_CACHED_KEYWORDS,
        );
        Self {
            id: EnhancementId::new(),
            name,
            source,
            benefit,
            cost,
            granted_session,
            leverage_keywords,
            leverage: Leverage::default(),
        }
    }

    /// Whether this enhancement may produce a hint this session.
    ///
    /// Suppressed while a demand is already pending, and rate-limited to
    /// one hint per session.
    pub fn hint_eligible(&self, current_session: u32) -> bool {
        self.leverage.pending_demand.is_none()
            && self.leverage.last_hinted_session != Some(current_session)
    }
}

/// A hint that player input brushed against faction leverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageHint {
    pub enhancement_id: EnhancementId,
    pub enhancement_name: String,
    pub character: String,
    pub faction: Faction,
    pub weight: LeverageWeight,
    /// |overlap| / |cached keywords|, in (0, 1].
    pub score: f32,
    pub matched_keywords: Vec<String>,
}
