//! Refused enhancements and the reputation they earn.
//!
//! Refusals accumulate per character and are never removed. The reputation
//! title is derived on read; nothing here is stored beyond the refusals
//! themselves.

use crate::factions::Faction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// An enhancement the character turned down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusedEnhancement {
    pub id: Uuid,
    pub name: String,
    pub source: Faction,
    pub benefit: String,
    pub reason: String,
    pub refused_session: u32,
}

impl RefusedEnhancement {
    pub fn new(
        name: impl Into<String>,
        source: Faction,
        benefit: impl Into<String>,
        reason: impl Into<String>,
        refused_session: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            source,
            benefit: benefit.into(),
            reason: reason.into(),
            refused_session,
        }
    }
}

/// What the city makes of a character who keeps saying no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefusalStanding {
    /// No refusals; nobody has noticed.
    Unremarked,
    /// One refusal: whispers, no title yet.
    Whispered,
    /// Two refusals: known as "the Unbought".
    Unbought,
    /// Three or more refusals: known as "the Undaunted".
    Undaunted,
    /// Three or more refusals of the same faction: "Defiant of" that
    /// faction. Takes priority over the generic title.
    Defiant(Faction),
}

impl RefusalStanding {
    /// The earned title, if any. `Whispered` is a hint, not a title.
    pub fn title(&self) -> Option<String> {
        match self {
            RefusalStanding::Unremarked | RefusalStanding::Whispered => None,
            RefusalStanding::Unbought => Some("the Unbought".to_string()),
            RefusalStanding::Undaunted => Some("the Undaunted".to_string()),
            RefusalStanding::Defiant(faction) => Some(format!("Defiant of {}", faction.name())),
        }
    }
}

/// Derive the character's refusal reputation from their refusal record.
pub fn refusal_standing(refused: &[RefusedEnhancement]) -> RefusalStanding {
    if refused.len() >= 3 {
        let mut per_faction: HashMap<Faction, usize> = HashMap::new();
        for refusal in refused {
            *per_faction.entry(refusal.source).or_default() += 1;
        }
        if let Some((&faction, _)) = per_faction.iter().find(|(_, &count)| count >= 3) {
            return RefusalStanding::Defiant(faction);
        }
        return RefusalStanding::Undaunted;
    }
    match refused.len() {
        0 => RefusalStanding::Unremarked,
        1 => RefusalStanding::Whispered,
        _ => RefusalStanding::Unbought,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refusal(source: Faction) -> RefusedEnhancement {
        RefusedEnhancement::new("A gift", source, "power", "principles", 1)
    }

    #[test]
    fn test_no_refusals_unremarked() {
        assert_eq!(refusal_standing(&[]), RefusalStanding::Unremarked);
    }

    #[test]
    fn test_one_refusal_is_only_a_whisper() {
        let standing = refusal_standing(&[refusal(Faction::Arcanum)]);
        assert_eq!(standing, RefusalStanding::Whispered);
        assert!(standing.title().is_none());
    }

    #[test]
    fn test_two_refusals_unbought() {
        let standing = refusal_standing(&[
            refusal(Faction::Arcanum),
            refusal(Faction::CityWatch),
        ]);
        assert_eq!(standing, RefusalStanding::Unbought);
        assert_eq!(standing.title().as_deref(), Some("the Unbought"));
    }

    #[test]
    fn test_three_mixed_refusals_undaunted() {
        let standing = refusal_standing(&[
            refusal(Faction::Arcanum),
            refusal(Faction::CityWatch),
            refusal(Faction::NightMarket),
        ]);
        assert_eq!(standing, RefusalStanding::Undaunted);
    }

    #[test]
    fn test_three_same_faction_defiant_wins() {
        let standing = refusal_standing(&[
            refusal(Faction::CrimsonCourt),
            refusal(Faction::CrimsonCourt),
            refusal(Faction::CrimsonCourt),
        ]);
        assert_eq!(standing, RefusalStanding::Defiant(Faction::CrimsonCourt));
        assert_eq!(
            standing.title().as_deref(),
            Some("Defiant of the Crimson Court")
        );
    }

    #[test]
    fn test_defiant_priority_with_extra_refusals() {
        // Four refusals, three of one faction: Defiant, not Undaunted.
        let standing = refusal_standing(&[
            refusal(Faction::EmberTemple),
            refusal(Faction::EmberTemple),
            refusal(Faction::Arcanum),
            refusal(Faction::EmberTemple),
        ]);
        assert_eq!(standing, RefusalStanding::Defiant(Faction::EmberTemple));
    }
}
