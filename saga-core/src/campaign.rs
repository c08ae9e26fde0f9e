//! The campaign aggregate: single owner of all narrative state.
//!
//! Every engine operation runs against one in-memory `Campaign`, mutated
//! synchronously. Operations validate first and commit second; on any error
//! the aggregate is untouched. Successful mutations append their chronicle
//! entry inside the same call.

use crate::avoidance::{AvoidanceId, AvoidanceTracker, AvoidedSituation, PendingAvoidance};
use crate::chronicle::{Chronicle, ChronicleEvent};
use crate::command::EngineError;
use crate::factions::{Faction, FactionLedger, StandingShift};
use crate::keywords::{self, MIN_KEYWORD_OVERLAP};
use crate::leverage::{
    refusal_standing, DemandId, DemandResponse, DemandUrgency, Enhancement, EnhancementId,
    EscalationKind, LeverageDemand, LeverageHint, LeverageWeight, RefusalStanding,
    RefusedEnhancement, UrgencyTier,
};
use crate::threads::{DormantThread, Severity, ThreadId, ThreadMatch, ThreadRegistry};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identifier for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(Uuid);

impl CampaignId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One player character and everything factions hold over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    pub enhancements: Vec<Enhancement>,
    pub refused: Vec<RefusedEnhancement>,
}

impl CharacterSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enhancements: Vec::new(),
            refused: Vec::new(),
        }
    }

    /// Reputation derived from the refusal record. Never stored.
    pub fn refusal_standing(&self) -> RefusalStanding {
        refusal_standing(&self.refused)
    }
}

/// A pending demand annotated for the narrator's attention queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDemand {
    pub character: String,
    pub enhancement_id: EnhancementId,
    pub enhancement_name: String,
    pub faction: Faction,
    pub demand_id: DemandId,
    pub demand: String,
    pub urgency: DemandUrgency,
}

/// The result of resolving a demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageResolution {
    pub enhancement_id: EnhancementId,
    pub response: DemandResponse,
    pub weight_before: LeverageWeight,
    pub weight_after: LeverageWeight,
    pub compliance_count: u32,
    pub resistance_count: u32,
}

/// The result of escalating a demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationResult {
    pub kind: EscalationKind,
    /// Set when the escalation was a recognized no-op (weight already at
    /// Heavy). Not an error; the demand stays pending either way.
    pub note: Option<String>,
    /// The dormant thread queued by `QueueConsequence`.
    pub queued_thread: Option<ThreadId>,
}

/// The complete narrative state of one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,

    /// Session counter; starts at 1 and only ever advances.
    pub current_session: u32,

    pub characters: Vec<CharacterSheet>,
    pub ledger: FactionLedger,
    pub threads: ThreadRegistry,
    pub avoidance: AvoidanceTracker,
    pub chronicle: Chronicle,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            current_session: 1,
            characters: Vec::new(),
            ledger: FactionLedger::new(),
            threads: ThreadRegistry::new(),
            avoidance: AvoidanceTracker::new(),
            chronicle: Chronicle::new(),
        }
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// Add a character to the roster. Names are unique, case-insensitive.
    pub fn add_character(&mut self, name: impl Into<String>) -> Result<(), EngineError> {
        let name = name.into();
        if self.character(&name).is_some() {
            return Err(EngineError::DuplicateCharacter { name });
        }
        debug!(character = %name, "character added");
        self.characters.push(CharacterSheet::new(name));
        Ok(())
    }

    /// Look up a character by name (case-insensitive).
    pub fn character(&self, name: &str) -> Option<&CharacterSheet> {
        self.characters
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn character_index(&self, name: &str) -> Result<usize, EngineError> {
        self.characters
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::CharacterNotFound {
                name: name.to_string(),
            })
    }

    /// Find an enhancement anywhere on the roster.
    fn locate_enhancement(&self, id: EnhancementId) -> Result<(usize, usize), EngineError> {
        for (ci, character) in self.characters.iter().enumerate() {
            if let Some(ei) = character.enhancements.iter().position(|e| e.id == id) {
                return Ok((ci, ei));
            }
        }
        Err(EngineError::EnhancementNotFound { id })
    }

    // =========================================================================
    // Enhancements and leverage
    // =========================================================================

    /// Grant an enhancement to a character.
    ///
    /// Fails when the source faction structurally cannot grant. Acceptance
    /// is a hinge moment: the chronicle entry is permanent.
    pub fn grant_enhancement(
        &mut self,
        character: &str,
        name: impl Into<String>,
        source: Faction,
        benefit: impl Into<String>,
        cost: impl Into<String>,
    ) -> Result<EnhancementId, EngineError> {
        let ci = self.character_index(character)?;
        if !source.can_grant_enhancements() {
            return Err(EngineError::FactionCannotGrant { faction: source });
        }

        let session = self.current_session;
        let enhancement = Enhancement::new(name, source, benefit, cost, session);
        let id = enhancement.id;
        let character_name = self.characters[ci].name.clone();
        let summary = format!(
            "{} accepted \"{}\" from {}; the debt is open-ended",
            character_name, enhancement.name, source
        );
        info!(character = %character_name, enhancement = %enhancement.name, faction = %source, "enhancement granted");

        self.characters[ci].enhancements.push(enhancement);
        self.chronicle.append(
            session,
            ChronicleEvent::Hinge {
                character: character_name,
            },
            summary,
            true,
        );
        Ok(id)
    }

    /// Record a refused enhancement and return the reputation it leaves.
    ///
    /// Refusal is independent of granting and is also a permanent hinge.
    pub fn refuse_enhancement(
        &mut self,
        character: &str,
        name: impl Into<String>,
        source: Faction,
        benefit: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<RefusalStanding, EngineError> {
        let ci = self.character_index(character)?;
        let session = self.current_session;
        let refusal = RefusedEnhancement::new(name, source, benefit, reason, session);
        let character_name = self.characters[ci].name.clone();
        let summary = format!(
            "{} refused \"{}\" from {}: {}",
            character_name, refusal.name, source, refusal.reason
        );

        self.characters[ci].refused.push(refusal);
        let standing = self.characters[ci].refusal_standing();
        self.chronicle.append(
            session,
            ChronicleEvent::Hinge {
                character: character_name,
            },
            summary,
            true,
        );
        Ok(standing)
    }

    /// Issue a demand against an enhancement's leverage.
    ///
    /// Fails while another demand is pending: at most one active demand per
    /// enhancement, ever.
    #[allow(clippy::too_many_arguments)]
    pub fn call_leverage(
        &mut self,
        enhancement_id: EnhancementId,
        demand: impl Into<String>,
        weight: LeverageWeight,
        threat_basis: Vec<String>,
        deadline_text: Option<String>,
        deadline_sessions: Option<u32>,
        consequences: Vec<String>,
    ) -> Result<DemandId, EngineError> {
        let (ci, ei) = self.locate_enhancement(enhancement_id)?;
        if self.characters[ci].enhancements[ei]
            .leverage
            .pending_demand
            .is_some()
        {
            return Err(EngineError::DemandAlreadyPending {
                enhancement: self.characters[ci].enhancements[ei].name.clone(),
            });
        }

        let session = self.current_session;
        let source = self.characters[ci].enhancements[ei].source;
        let character_name = self.characters[ci].name.clone();
        let demand = LeverageDemand::new(
            source,
            enhancement_id,
            demand,
            weight,
            threat_basis,
            deadline_text,
            deadline_sessions,
            consequences,
            session,
        );
        let demand_id = demand.id;
        let summary = format!(
            "{} calls in its leverage over {}: {}",
            source, character_name, demand.demand
        );
        info!(faction = %source, character = %character_name, weight = %weight, "leverage called");

        let leverage = &mut self.characters[ci].enhancements[ei].leverage;
        leverage.pending_demand = Some(demand);
        leverage.weight = weight;
        self.chronicle.append(
            session,
            ChronicleEvent::Consequence {
                source: source.name().to_string(),
            },
            summary,
            false,
        );
        Ok(demand_id)
    }

    /// Answer a pending demand.
    ///
    /// Comply steps the weight down (floored at Light), resist steps it up
    /// (capped at Heavy), negotiate holds. All three clear the demand and
    /// make the enhancement hintable again.
    pub fn resolve_leverage(
        &mut self,
        enhancement_id: EnhancementId,
        response: DemandResponse,
        outcome: impl Into<String>,
    ) -> Result<LeverageResolution, EngineError> {
        let (ci, ei) = self.locate_enhancement(enhancement_id)?;
        if self.characters[ci].enhancements[ei]
            .leverage
            .pending_demand
            .is_none()
        {
            return Err(EngineError::NoDemandPending {
                enhancement: self.characters[ci].enhancements[ei].name.clone(),
            });
        }

        let session = self.current_session;
        let character_name = self.characters[ci].name.clone();
        let source = self.characters[ci].enhancements[ei].source;
        let leverage = &mut self.characters[ci].enhancements[ei].leverage;
        let weight_before = leverage.weight;

        match response {
            DemandResponse::Comply => {
                leverage.compliance_count += 1;
                leverage.weight = leverage.weight.step_down();
            }
            DemandResponse::Resist => {
                leverage.resistance_count += 1;
                leverage.weight = leverage.weight.step_up();
            }
            DemandResponse::Negotiate => {}
        }
        leverage.pending_demand = None;
        leverage.last_hinted_session = None;

        let resolution = LeverageResolution {
            enhancement_id,
            response,
            weight_before,
            weight_after: leverage.weight,
            compliance_count: leverage.compliance_count,
            resistance_count: leverage.resistance_count,
        };
        let summary = format!(
            "{} answered {}'s demand ({}): {}",
            character_name,
            source,
            response.name(),
            outcome.into()
        );
        debug!(character = %character_name, response = response.name(), "demand resolved");
        self.chronicle.append(
            session,
            ChronicleEvent::Consequence {
                source: source.name().to_string(),
            },
            summary,
            false,
        );
        Ok(resolution)
    }

    /// Escalate an unanswered demand. The demand stays pending.
    pub fn escalate_demand(
        &mut self,
        enhancement_id: EnhancementId,
        kind: EscalationKind,
    ) -> Result<EscalationResult, EngineError> {
        let (ci, ei) = self.locate_enhancement(enhancement_id)?;
        let Some(demand) = self.characters[ci].enhancements[ei]
            .leverage
            .pending_demand
            .clone()
        else {
            return Err(EngineError::NoDemandPending {
                enhancement: self.characters[ci].enhancements[ei].name.clone(),
            });
        };

        let session = self.current_session;
        let character_name = self.characters[ci].name.clone();
        let source = self.characters[ci].enhancements[ei].source;
        let mut result = EscalationResult {
            kind,
            note: None,
            queued_thread: None,
        };

        let summary = match kind {
            EscalationKind::QueueConsequence => {
                let consequence = if demand.consequences.is_empty() {
                    format!("{} makes good on its threats over the ignored demand", source)
                } else {
                    demand.consequences.join("; ")
                };
                let severity = match demand.weight {
                    LeverageWeight::Light => Severity::Minor,
                    LeverageWeight::Medium => Severity::Moderate,
                    LeverageWeight::Heavy => Severity::Major,
                };
                let thread = DormantThread::new(
                    format!("Ignored demand from {}", source),
                    demand.demand.clone(),
                    consequence,
                    severity,
                    session,
                );
                let thread_id = thread.id;
                self.threads.queue_thread(thread);
                result.queued_thread = Some(thread_id);
                format!(
                    "{}'s ignored demand on {} hardens into a waiting consequence",
                    source, character_name
                )
            }
            EscalationKind::IncreaseWeight => {
                let leverage = &mut self.characters[ci].enhancements[ei].leverage;
                if leverage.weight == LeverageWeight::Heavy {
                    result.note =
                        Some("leverage is already at its heaviest; nothing changed".to_string());
                    format!(
                        "{} leans harder on {}, but its grip is already absolute",
                        source, character_name
                    )
                } else {
                    leverage.weight = leverage.weight.step_up();
                    format!(
                        "{} tightens its grip on {} ({} leverage now)",
                        source, character_name, leverage.weight
                    )
                }
            }
            EscalationKind::FactionAction => format!(
                "{} moves openly against {} over the unanswered demand",
                source, character_name
            ),
        };
        info!(faction = %source, kind = kind.name(), "demand escalated");

        self.chronicle.append(
            session,
            ChronicleEvent::Consequence {
                source: source.name().to_string(),
            },
            summary,
            false,
        );
        Ok(result)
    }

    /// All pending demands across the roster, most urgent first.
    pub fn pending_demands(&self) -> Vec<PendingDemand> {
        let current = self.current_session;
        let mut demands: Vec<PendingDemand> = self
            .characters
            .iter()
            .flat_map(|character| {
                character.enhancements.iter().filter_map(|enhancement| {
                    let demand = enhancement.leverage.pending_demand.as_ref()?;
                    Some(PendingDemand {
                        character: character.name.clone(),
                        enhancement_id: enhancement.id,
                        enhancement_name: enhancement.name.clone(),
                        faction: enhancement.source,
                        demand_id: demand.id,
                        demand: demand.demand.clone(),
                        urgency: demand.urgency(current),
                    })
                })
            })
            .collect();
        demands.sort_by(|a, b| b.urgency.score.cmp(&a.urgency.score));
        demands
    }

    /// Pending demands at or past their deadline.
    pub fn check_deadlines(&self) -> Vec<PendingDemand> {
        self.pending_demands()
            .into_iter()
            .filter(|d| matches!(d.urgency.tier, UrgencyTier::Critical | UrgencyTier::Urgent))
            .collect()
    }

    /// Match player input against enhancement leverage keywords.
    ///
    /// Enhancements with a pending demand, or already hinted this session,
    /// are suppressed. The only mutation is the per-session hint stamp on
    /// each reported enhancement.
    pub fn check_leverage_hints(&mut self, player_input: &str) -> Vec<LeverageHint> {
        let input_keywords = keywords::extract(player_input);
        let current = self.current_session;
        let mut hints = Vec::new();

        for character in &mut self.characters {
            for enhancement in &mut character.enhancements {
                if !enhancement.hint_eligible(current) {
                    continue;
                }
                let matched = keywords::overlap(&enhancement.leverage_keywords, &input_keywords);
                if matched.len() < MIN_KEYWORD_OVERLAP {
                    continue;
                }
                enhancement.leverage.last_hinted_session = Some(current);
                hints.push(LeverageHint {
                    enhancement_id: enhancement.id,
                    enhancement_name: enhancement.name.clone(),
                    character: character.name.clone(),
                    faction: enhancement.source,
                    weight: enhancement.leverage.weight,
                    score: matched.len() as f32 / enhancement.leverage_keywords.len() as f32,
                    matched_keywords: matched,
                });
            }
        }

        hints.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hints
    }

    // =========================================================================
    // Dormant threads
    // =========================================================================

    /// Queue a dormant thread for a future consequence.
    pub fn queue_thread(
        &mut self,
        origin: impl Into<String>,
        trigger_condition: impl Into<String>,
        consequence: impl Into<String>,
        severity: Severity,
    ) -> ThreadId {
        let session = self.current_session;
        let thread = self
            .threads
            .queue(origin, trigger_condition, consequence, severity, session);
        debug!(thread = %thread.id, severity = severity.name(), "thread queued");
        thread.id
    }

    /// Match player input against active threads. Read-only.
    pub fn check_triggers(&self, player_input: &str) -> Vec<ThreadMatch> {
        self.threads.check_triggers(player_input)
    }

    /// Surface a dormant thread into play, removing it exactly once.
    ///
    /// The chronicle entry is permanent only for Major threads.
    pub fn surface_thread(
        &mut self,
        id: ThreadId,
        activation_context: impl Into<String>,
    ) -> Result<DormantThread, EngineError> {
        let thread = self
            .threads
            .surface(id)
            .ok_or(EngineError::ThreadNotFound { id })?;
        let session = self.current_session;
        let summary = format!("{} ({})", thread.consequence, activation_context.into());
        info!(thread = %thread.id, severity = thread.severity.name(), "thread surfaced");
        self.chronicle.append(
            session,
            ChronicleEvent::Consequence {
                source: thread.origin.clone(),
            },
            summary,
            thread.severity == Severity::Major,
        );
        Ok(thread)
    }

    // =========================================================================
    // Avoidance
    // =========================================================================

    /// Record a situation the player chose not to engage.
    pub fn log_avoidance(
        &mut self,
        situation: impl Into<String>,
        what_was_at_stake: impl Into<String>,
        potential_consequence: impl Into<String>,
        severity: Severity,
    ) -> AvoidanceId {
        let session = self.current_session;
        let logged = self
            .avoidance
            .log(situation, what_was_at_stake, potential_consequence, severity, session);
        debug!(avoidance = %logged.id, "avoidance logged");
        logged.id
    }

    /// Surface an avoided situation into play.
    ///
    /// Unknown ids and repeat calls are distinct, reported failures.
    pub fn surface_avoidance(
        &mut self,
        id: AvoidanceId,
        what_happened: impl Into<String>,
    ) -> Result<AvoidedSituation, EngineError> {
        match self.avoidance.get(id) {
            None => return Err(EngineError::AvoidanceNotFound { id }),
            Some(s) if s.surfaced => return Err(EngineError::AvoidanceAlreadySurfaced { id }),
            Some(_) => {}
        }
        let session = self.current_session;
        let surfaced = self
            .avoidance
            .surface(id, session)
            .expect("checked unsurfaced above")
            .clone();
        let summary = format!("{}: {}", surfaced.situation, what_happened.into());
        self.chronicle.append(
            session,
            ChronicleEvent::Consequence {
                source: "avoidance".to_string(),
            },
            summary,
            surfaced.severity == Severity::Major,
        );
        Ok(surfaced)
    }

    /// Unsurfaced situations, Major first, with derived age/overdue.
    pub fn pending_avoidances(&self) -> Vec<PendingAvoidance> {
        self.avoidance.pending(self.current_session)
    }

    // =========================================================================
    // Factions and chronicle
    // =========================================================================

    /// Shift a faction's standing; the only way standing ever moves.
    pub fn shift_standing(&mut self, faction: Faction, delta: i32) -> StandingShift {
        let shift = self.ledger.shift(faction, delta);
        let summary = format!(
            "Standing with {} moved {} -> {}",
            faction, shift.before, shift.after
        );
        info!(faction = %faction, before = %shift.before, after = %shift.after, "standing shifted");
        self.chronicle.append(
            self.current_session,
            ChronicleEvent::FactionShift {
                faction,
                before: shift.before,
                after: shift.after,
            },
            summary,
            false,
        );
        shift
    }

    /// Record a concluded mission.
    pub fn record_mission(&mut self, name: impl Into<String>, outcome: impl Into<String>) {
        let name = name.into();
        let outcome = outcome.into();
        let summary = format!("Mission \"{name}\": {outcome}");
        self.chronicle.append(
            self.current_session,
            ChronicleEvent::Mission { name, outcome },
            summary,
            false,
        );
    }

    /// Commit narrator canon to the chronicle. Canon is permanent.
    pub fn record_canon(&mut self, summary: impl Into<String>) {
        self.chronicle
            .append(self.current_session, ChronicleEvent::Canon, summary, true);
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Advance to the next session and reset per-session scratch.
    pub fn advance_session(&mut self) -> u32 {
        self.current_session += 1;
        self.reset_for_session();
        info!(campaign = %self.name, session = self.current_session, "session advanced");
        self.current_session
    }

    /// Clear per-session scratch state.
    ///
    /// All of it lives on the aggregate; there are no module-level caches.
    pub fn reset_for_session(&mut self) {
        for character in &mut self.characters {
            for enhancement in &mut character.enhancements {
                enhancement.leverage.last_hinted_session = None;
            }
        }
    }
}
