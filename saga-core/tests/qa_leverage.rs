//! QA tests for the leverage lifecycle.
//!
//! These exercise the full grant -> call -> resolve/escalate flow through
//! the command surface, the way a narrator-facing dispatcher drives it.
//! Run with: `cargo test -p saga-core --test qa_leverage`

use saga_core::{
    Campaign, Command, DemandResponse, EngineError, ErrorKind, EscalationKind, Faction,
    LeverageWeight, Outcome, RefusalStanding,
};

fn campaign_with(character: &str) -> Campaign {
    let mut campaign = Campaign::new("QA Campaign");
    campaign
        .execute(Command::AddCharacter {
            name: character.to_string(),
        })
        .expect("add character");
    campaign
}

fn grant(campaign: &mut Campaign, character: &str, source: Faction) -> saga_core::EnhancementId {
    let outcome = campaign
        .execute(Command::GrantEnhancement {
            character: character.to_string(),
            name: "Night Market marker".to_string(),
            source,
            benefit: "Credit with every fence in the lower city".to_string(),
            cost: "A marker that can be called at any time".to_string(),
        })
        .expect("grant");
    match outcome {
        Outcome::EnhancementGranted { enhancement_id, .. } => enhancement_id,
        other => panic!("unexpected outcome: {other:?}"),
    }
}

// =============================================================================
// Scenario: grant from a capable faction
// =============================================================================

#[test]
fn test_grant_succeeds_with_light_weight_and_permanent_hinge() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::NightMarket);

    let sheet = campaign.character("Vess").expect("character");
    let enhancement = sheet.enhancements.iter().find(|e| e.id == id).expect("enhancement");
    assert_eq!(enhancement.leverage.weight, LeverageWeight::Light);
    assert!(enhancement.leverage.pending_demand.is_none());

    let permanent = campaign.chronicle.permanent();
    assert_eq!(permanent.len(), 1, "grant writes one permanent hinge entry");
}

// =============================================================================
// Scenario: grant from an incapable faction
// =============================================================================

#[test]
fn test_grant_from_incapable_faction_is_a_named_domain_error() {
    let mut campaign = campaign_with("Vess");
    let err = campaign
        .execute(Command::GrantEnhancement {
            character: "Vess".to_string(),
            name: "Mob goodwill".to_string(),
            source: Faction::Commons,
            benefit: "The crowd looks away".to_string(),
            cost: "Nothing named".to_string(),
        })
        .expect_err("commons cannot grant");

    assert!(matches!(err, EngineError::FactionCannotGrant { .. }));
    assert_eq!(err.kind(), ErrorKind::DomainRule);
    assert!(campaign.character("Vess").unwrap().enhancements.is_empty());
    assert!(campaign.chronicle.is_empty(), "chronicle unchanged on failure");
}

// =============================================================================
// Scenario: call at Medium, resist, end at Heavy
// =============================================================================

#[test]
fn test_call_medium_resist_lands_heavy() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::NightMarket);

    campaign
        .execute(Command::CallLeverage {
            enhancement_id: id,
            demand: "Carry a sealed crate past the Watch".to_string(),
            weight: LeverageWeight::Medium,
            threat_basis: vec!["They paid for the surgeon".to_string()],
            deadline: None,
            deadline_sessions: None,
            consequences: vec![],
        })
        .expect("call");

    let outcome = campaign
        .execute(Command::ResolveLeverage {
            enhancement_id: id,
            response: DemandResponse::Resist,
            outcome: "Vess dropped the crate in the harbor".to_string(),
        })
        .expect("resolve");

    let Outcome::LeverageResolved(resolution) = outcome else {
        panic!("unexpected outcome");
    };
    assert_eq!(resolution.weight_after, LeverageWeight::Heavy);
    assert_eq!(resolution.resistance_count, 1);

    let sheet = campaign.character("Vess").unwrap();
    let enhancement = sheet.enhancements.iter().find(|e| e.id == id).unwrap();
    assert!(enhancement.leverage.pending_demand.is_none());
}

// =============================================================================
// Invariants: weight bounds and demand exclusion
// =============================================================================

#[test]
fn test_repeated_resist_never_passes_heavy() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::GildedSyndicate);

    for i in 0..5 {
        campaign
            .execute(Command::CallLeverage {
                enhancement_id: id,
                demand: format!("Demand {i}"),
                weight: LeverageWeight::Heavy,
                threat_basis: vec![],
                deadline: None,
                deadline_sessions: None,
                consequences: vec![],
            })
            .expect("call");
        campaign
            .execute(Command::ResolveLeverage {
                enhancement_id: id,
                response: DemandResponse::Resist,
                outcome: "refused again".to_string(),
            })
            .expect("resolve");
    }

    let sheet = campaign.character("Vess").unwrap();
    let enhancement = &sheet.enhancements[0];
    assert_eq!(enhancement.leverage.weight, LeverageWeight::Heavy);
    assert_eq!(enhancement.leverage.resistance_count, 5);
}

#[test]
fn test_repeated_comply_never_drops_below_light() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::GildedSyndicate);

    for i in 0..5 {
        campaign
            .execute(Command::CallLeverage {
                enhancement_id: id,
                demand: format!("Demand {i}"),
                weight: LeverageWeight::Light,
                threat_basis: vec![],
                deadline: None,
                deadline_sessions: None,
                consequences: vec![],
            })
            .expect("call");
        campaign
            .execute(Command::ResolveLeverage {
                enhancement_id: id,
                response: DemandResponse::Comply,
                outcome: "did as told".to_string(),
            })
            .expect("resolve");
    }

    let sheet = campaign.character("Vess").unwrap();
    let enhancement = &sheet.enhancements[0];
    assert_eq!(enhancement.leverage.weight, LeverageWeight::Light);
    assert_eq!(enhancement.leverage.compliance_count, 5);
}

#[test]
fn test_call_while_pending_fails_without_mutation() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::CityWatch);

    campaign
        .execute(Command::CallLeverage {
            enhancement_id: id,
            demand: "Report on the Syndicate".to_string(),
            weight: LeverageWeight::Medium,
            threat_basis: vec![],
            deadline: None,
            deadline_sessions: None,
            consequences: vec![],
        })
        .expect("first call");

    let before = campaign.clone();
    let err = campaign
        .execute(Command::CallLeverage {
            enhancement_id: id,
            demand: "A second ask".to_string(),
            weight: LeverageWeight::Heavy,
            threat_basis: vec![],
            deadline: None,
            deadline_sessions: None,
            consequences: vec![],
        })
        .expect_err("one demand at a time");

    assert!(matches!(err, EngineError::DemandAlreadyPending { .. }));
    assert_eq!(campaign, before, "failed call must not mutate state");
}

#[test]
fn test_negotiate_holds_weight() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::CrimsonCourt);

    campaign
        .execute(Command::CallLeverage {
            enhancement_id: id,
            demand: "Attend the masque as our guest".to_string(),
            weight: LeverageWeight::Medium,
            threat_basis: vec![],
            deadline: None,
            deadline_sessions: None,
            consequences: vec![],
        })
        .expect("call");

    let Outcome::LeverageResolved(resolution) = campaign
        .execute(Command::ResolveLeverage {
            enhancement_id: id,
            response: DemandResponse::Negotiate,
            outcome: "Vess sent a proxy".to_string(),
        })
        .expect("resolve")
    else {
        panic!("unexpected outcome");
    };

    assert_eq!(resolution.weight_before, LeverageWeight::Medium);
    assert_eq!(resolution.weight_after, LeverageWeight::Medium);
}

// =============================================================================
// Escalation
// =============================================================================

#[test]
fn test_escalation_paths() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::IronCovenant);

    campaign
        .execute(Command::CallLeverage {
            enhancement_id: id,
            demand: "Surrender the forge plans".to_string(),
            weight: LeverageWeight::Medium,
            threat_basis: vec![],
            deadline: None,
            deadline_sessions: None,
            consequences: vec!["The Covenant reclaims its gift by force".to_string()],
        })
        .expect("call");

    // IncreaseWeight steps Medium -> Heavy.
    campaign
        .execute(Command::EscalateDemand {
            enhancement_id: id,
            escalation: EscalationKind::IncreaseWeight,
        })
        .expect("escalate");
    assert_eq!(
        campaign.character("Vess").unwrap().enhancements[0].leverage.weight,
        LeverageWeight::Heavy
    );

    // At Heavy, the same escalation is a reported no-op note, not an error.
    let Outcome::DemandEscalated(result) = campaign
        .execute(Command::EscalateDemand {
            enhancement_id: id,
            escalation: EscalationKind::IncreaseWeight,
        })
        .expect("escalate at cap")
    else {
        panic!("unexpected outcome");
    };
    assert!(result.note.is_some());

    // QueueConsequence spawns a dormant thread from the demand.
    let Outcome::DemandEscalated(result) = campaign
        .execute(Command::EscalateDemand {
            enhancement_id: id,
            escalation: EscalationKind::QueueConsequence,
        })
        .expect("escalate")
    else {
        panic!("unexpected outcome");
    };
    let thread_id = result.queued_thread.expect("thread queued");
    assert!(campaign.threads.get(thread_id).is_some());

    // FactionAction leaves everything but the chronicle untouched.
    let chronicle_len = campaign.chronicle.len();
    campaign
        .execute(Command::EscalateDemand {
            enhancement_id: id,
            escalation: EscalationKind::FactionAction,
        })
        .expect("escalate");
    assert_eq!(campaign.chronicle.len(), chronicle_len + 1);

    // The demand survives every escalation.
    assert_eq!(campaign.pending_demands().len(), 1);
}

#[test]
fn test_escalate_without_demand_fails() {
    let mut campaign = campaign_with("Vess");
    let id = grant(&mut campaign, "Vess", Faction::IronCovenant);

    let err = campaign
        .execute(Command::EscalateDemand {
            enhancement_id: id,
            escalation: EscalationKind::FactionAction,
        })
        .expect_err("no demand to escalate");
    assert!(matches!(err, EngineError::NoDemandPending { .. }));
}

// =============================================================================
// Refusals and reputation
// =============================================================================

#[test]
fn test_refusal_reputation_ladder() {
    let mut campaign = campaign_with("Vess");

    let refuse = |campaign: &mut Campaign, n: u32, source: Faction| -> RefusalStanding {
        match campaign
            .execute(Command::RefuseEnhancement {
                character: "Vess".to_string(),
                name: format!("Offer {n}"),
                source,
                benefit: "power".to_string(),
                reason: "principles".to_string(),
            })
            .expect("refuse")
        {
            Outcome::EnhancementRefused { reputation, .. } => reputation,
            other => panic!("unexpected outcome: {other:?}"),
        }
    };

    assert_eq!(refuse(&mut campaign, 1, Faction::Arcanum), RefusalStanding::Whispered);
    assert_eq!(refuse(&mut campaign, 2, Faction::CityWatch), RefusalStanding::Unbought);
    assert_eq!(
        refuse(&mut campaign, 3, Faction::EmberTemple),
        RefusalStanding::Undaunted
    );
}

#[test]
fn test_defiant_title_beats_undaunted() {
    let mut campaign = campaign_with("Vess");
    for n in 0..3 {
        campaign
            .execute(Command::RefuseEnhancement {
                character: "Vess".to_string(),
                name: format!("Court offer {n}"),
                source: Faction::CrimsonCourt,
                benefit: "a title".to_string(),
                reason: "the price is a leash".to_string(),
            })
            .expect("refuse");
    }

    let standing = campaign.character("Vess").unwrap().refusal_standing();
    assert_eq!(standing, RefusalStanding::Defiant(Faction::CrimsonCourt));
    assert_eq!(
        standing.title().as_deref(),
        Some("Defiant of the Crimson Court")
    );
}
