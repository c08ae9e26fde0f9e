//! Factions and the standing ledger.
//!
//! Standing is a 5-point ordinal disposition per faction. It is never set
//! directly: the only mutator is a bounded `shift` that clamps to the scale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The powers of the city. A closed set: narrative content references these
/// by name, so new factions are a code change, not data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Faction {
    /// The Arcanum: the chartered college of magic.
    Arcanum,
    /// The Iron Covenant: militant smith-priests.
    IronCovenant,
    /// The Gilded Syndicate: organized crime wearing a merchant's face.
    GildedSyndicate,
    /// The City Watch.
    CityWatch,
    /// The Ember Temple: the established faith.
    EmberTemple,
    /// The Night Market: smugglers and fixers.
    NightMarket,
    /// The Crimson Court: the old nobility.
    CrimsonCourt,
    /// The Free Blades: mercenary companies.
    FreeBlades,
    /// The Deep Wardens: keepers of the undercity.
    DeepWardens,
    /// The commons: the unorganized populace.
    Commons,
    /// The outcasts: those outside every charter.
    Outcasts,
}

impl Faction {
    /// All factions, in ledger order.
    pub fn all() -> &'static [Faction] {
        &[
            Faction::Arcanum,
            Faction::IronCovenant,
            Faction::GildedSyndicate,
            Faction::CityWatch,
            Faction::EmberTemple,
            Faction::NightMarket,
            Faction::CrimsonCourt,
            Faction::FreeBlades,
            Faction::DeepWardens,
            Faction::Commons,
            Faction::Outcasts,
        ]
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Faction::Arcanum => "the Arcanum",
            Faction::IronCovenant => "the Iron Covenant",
            Faction::GildedSyndicate => "the Gilded Syndicate",
            Faction::CityWatch => "the City Watch",
            Faction::EmberTemple => "the Ember Temple",
            Faction::NightMarket => "the Night Market",
            Faction::CrimsonCourt => "the Crimson Court",
            Faction::FreeBlades => "the Free Blades",
            Faction::DeepWardens => "the Deep Wardens",
            Faction::Commons => "the commons",
            Faction::Outcasts => "the outcasts",
        }
    }

    /// Whether this faction can grant enhancements.
    ///
    /// The commons and the outcasts hold no enhancement infrastructure;
    /// a grant attributed to either is a domain error, not bad data.
    pub fn can_grant_enhancements(&self) -> bool {
        !matches!(self, Faction::Commons | Faction::Outcasts)
    }

    /// Parse a faction from a command-surface string (case-insensitive,
    /// accepts the enum identifier or the display name).
    pub fn parse(s: &str) -> Option<Faction> {
        let needle = s.trim().to_lowercase();
        Faction::all().iter().copied().find(|f| {
            format!("{f:?}").to_lowercase() == needle
                || f.name().to_lowercase() == needle
                || f.name()
                    .to_lowercase()
                    .strip_prefix("the ")
                    .is_some_and(|n| n == needle)
        })
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A faction's disposition toward the player, on a 5-point ordinal scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Standing {
    Hostile,
    Unfriendly,
    #[default]
    Neutral,
    Friendly,
    Allied,
}

impl Standing {
    /// Position on the scale, always within [0, 4].
    pub fn index(&self) -> i32 {
        match self {
            Standing::Hostile => 0,
            Standing::Unfriendly => 1,
            Standing::Neutral => 2,
            Standing::Friendly => 3,
            Standing::Allied => 4,
        }
    }

    /// Standing at a clamped scale position.
    pub fn from_index(index: i32) -> Standing {
        match index.clamp(0, 4) {
            0 => Standing::Hostile,
            1 => Standing::Unfriendly,
            2 => Standing::Neutral,
            3 => Standing::Friendly,
            _ => Standing::Allied,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Standing::Hostile => "Hostile",
            Standing::Unfriendly => "Unfriendly",
            Standing::Neutral => "Neutral",
            Standing::Friendly => "Friendly",
            Standing::Allied => "Allied",
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The result of a standing shift: before and after, for the chronicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingShift {
    pub faction: Faction,
    pub before: Standing,
    pub after: Standing,
}

/// Ordinal standing per faction. Every faction starts Neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionLedger {
    standings: BTreeMap<Faction, Standing>,
}

impl FactionLedger {
    pub fn new() -> Self {
        Self {
            standings: Faction::all()
                .iter()
                .map(|&f| (f, Standing::Neutral))
                .collect(),
        }
    }

    /// Current standing for a faction.
    pub fn standing(&self, faction: Faction) -> Standing {
        self.standings.get(&faction).copied().unwrap_or_default()
    }

    /// Apply a bounded shift. Any delta is accepted; the resulting index
    /// saturates at the ends of the scale and never wraps.
    pub fn shift(&mut self, faction: Faction, delta: i32) -> StandingShift {
        let before = self.standing(faction);
        let after = Standing::from_index(before.index().saturating_add(delta));
        self.standings.insert(faction, after);
        StandingShift {
            faction,
            before,
            after,
        }
    }

    /// All standings in ledger order.
    pub fn standings(&self) -> impl Iterator<Item = (Faction, Standing)> + '_ {
        self.standings.iter().map(|(&f, &s)| (f, s))
    }
}

impl Default for FactionLedger {
    fn default() -> Self {
        Self::new()
    }
}
