//! The narrator-facing operation surface.
//!
//! Commands form a closed tagged union with a single exhaustive match in
//! `Campaign::execute`, so every operation has exactly one handler by
//! construction. Outcomes mirror the union with structured success records;
//! errors carry a three-way taxonomy (domain rule, not found, idempotency) so
//! callers can tell "bad reference" from "bad timing".

use crate::avoidance::{AvoidanceId, AvoidedSituation, PendingAvoidance};
use crate::campaign::{Campaign, EscalationResult, LeverageResolution, PendingDemand};
use crate::factions::{Faction, StandingShift};
use crate::leverage::{
    DemandId, DemandResponse, EnhancementId, EscalationKind, LeverageWeight, RefusalStanding,
};
use crate::threads::{DormantThread, Severity, ThreadId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classes of engine failure, per caller-facing taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation is structurally or temporally illegal right now.
    DomainRule,
    /// The reference does not resolve to anything.
    NotFound,
    /// The operation already happened and cannot happen again.
    Idempotency,
}

/// Errors from engine operations. All are local and recoverable; the
/// aggregate is never mutated on an error path.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("{faction} cannot grant enhancements")]
    FactionCannotGrant { faction: Faction },

    #[error("enhancement \"{enhancement}\" already has a pending demand")]
    DemandAlreadyPending { enhancement: String },

    #[error("enhancement \"{enhancement}\" has no pending demand")]
    NoDemandPending { enhancement: String },

    #[error("character \"{name}\" already exists")]
    DuplicateCharacter { name: String },

    #[error("no character named \"{name}\"")]
    CharacterNotFound { name: String },

    #[error("no enhancement with id {id}")]
    EnhancementNotFound { id: EnhancementId },

    #[error("no active dormant thread with id {id}")]
    ThreadNotFound { id: ThreadId },

    #[error("no avoided situation with id {id}")]
    AvoidanceNotFound { id: AvoidanceId },

    #[error("avoided situation {id} was already surfaced")]
    AvoidanceAlreadySurfaced { id: AvoidanceId },
}

impl EngineError {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::FactionCannotGrant { .. }
            | EngineError::DemandAlreadyPending { .. }
            | EngineError::NoDemandPending { .. }
            | EngineError::DuplicateCharacter { .. } => ErrorKind::DomainRule,
            EngineError::CharacterNotFound { .. }
            | EngineError::EnhancementNotFound { .. }
            | EngineError::ThreadNotFound { .. }
            | EngineError::AvoidanceNotFound { .. } => ErrorKind::NotFound,
            EngineError::AvoidanceAlreadySurfaced { .. } => ErrorKind::Idempotency,
        }
    }
}

/// Every operation the narrator can issue against a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    AddCharacter {
        name: String,
    },
    GrantEnhancement {
        character: String,
        name: String,
        source: Faction,
        benefit: String,
        cost: String,
    },
    RefuseEnhancement {
        character: String,
        name: String,
        source: Faction,
        benefit: String,
        reason: String,
    },
    CallLeverage {
        enhancement_id: EnhancementId,
        demand: String,
        weight: LeverageWeight,
        #[serde(default)]
        threat_basis: Vec<String>,
        #[serde(default)]
        deadline: Option<String>,
        /// Relative "sessions from now"; made absolute at creation.
        #[serde(default)]
        deadline_sessions: Option<u32>,
        #[serde(default)]
        consequences: Vec<String>,
    },
    ResolveLeverage {
        enhancement_id: EnhancementId,
        response: DemandResponse,
        outcome: String,
    },
    EscalateDemand {
        enhancement_id: EnhancementId,
        escalation: EscalationKind,
    },
    QueueThread {
        origin: String,
        trigger_condition: String,
        consequence: String,
        severity: Severity,
    },
    SurfaceThread {
        thread_id: ThreadId,
        activation_context: String,
    },
    LogAvoidance {
        situation: String,
        what_was_at_stake: String,
        potential_consequence: String,
        severity: Severity,
    },
    SurfaceAvoidance {
        avoidance_id: AvoidanceId,
        what_happened: String,
    },
    ShiftStanding {
        faction: Faction,
        delta: i32,
    },
    RecordMission {
        name: String,
        outcome: String,
    },
    RecordCanon {
        summary: String,
    },
    AdvanceSession,
}

/// Structured success records, one per command variant. This is the wire
/// contract for any dispatcher wrapping the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    CharacterAdded {
        name: String,
    },
    EnhancementGranted {
        enhancement_id: EnhancementId,
        character: String,
        faction: Faction,
    },
    EnhancementRefused {
        character: String,
        faction: Faction,
        reputation: RefusalStanding,
    },
    LeverageCalled {
        demand_id: DemandId,
        enhancement_id: EnhancementId,
        weight: LeverageWeight,
    },
    LeverageResolved(LeverageResolution),
    DemandEscalated(EscalationResult),
    ThreadQueued {
        thread_id: ThreadId,
        trigger_keywords: Vec<String>,
    },
    ThreadSurfaced {
        thread: DormantThread,
        permanent: bool,
    },
    AvoidanceLogged {
        avoidance_id: AvoidanceId,
    },
    AvoidanceSurfaced {
        situation: AvoidedSituation,
    },
    StandingShifted(StandingShift),
    MissionRecorded {
        name: String,
    },
    CanonRecorded,
    SessionAdvanced {
        session: u32,
    },
}

impl Campaign {
    /// Execute one narrator command against this campaign.
    ///
    /// Validate-then-commit: an `Err` leaves the aggregate exactly as it
    /// was.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, EngineError> {
        match command {
            Command::AddCharacter { name } => {
                self.add_character(name.clone())?;
                Ok(Outcome::CharacterAdded { name })
            }
            Command::GrantEnhancement {
                character,
                name,
                source,
                benefit,
                cost,
            } => {
                let enhancement_id =
                    self.grant_enhancement(&character, name, source, benefit, cost)?;
                Ok(Outcome::EnhancementGranted {
                    enhancement_id,
                    character,
                    faction: source,
                })
            }
            Command::RefuseEnhancement {
                character,
                name,
                source,
                benefit,
                reason,
            } => {
                let reputation =
                    self.refuse_enhancement(&character, name, source, benefit, reason)?;
                Ok(Outcome::EnhancementRefused {
                    character,
                    faction: source,
                    reputation,
                })
            }
            Command::CallLeverage {
                enhancement_id,
                demand,
                weight,
                threat_basis,
                deadline,
                deadline_sessions,
                consequences,
            } => {
                let demand_id = self.call_leverage(
                    enhancement_id,
                    demand,
                    weight,
                    threat_basis,
                    deadline,
                    deadline_sessions,
                    consequences,
                )?;
                Ok(Outcome::LeverageCalled {
                    demand_id,
                    enhancement_id,
                    weight,
                })
            }
            Command::ResolveLeverage {
                enhancement_id,
                response,
                outcome,
            } => {
                let resolution = self.resolve_leverage(enhancement_id, response, outcome)?;
                Ok(Outcome::LeverageResolved(resolution))
            }
            Command::EscalateDemand {
                enhancement_id,
                escalation,
            } => {
                let result = self.escalate_demand(enhancement_id, escalation)?;
                Ok(Outcome::DemandEscalated(result))
            }
            Command::QueueThread {
                origin,
                trigger_condition,
                consequence,
                severity,
            } => {
                let thread_id =
                    self.queue_thread(origin, trigger_condition, consequence, severity);
                let trigger_keywords = self
                    .threads
                    .get(thread_id)
                    .map(|t| t.trigger_keywords.clone())
                    .unwrap_or_default();
                Ok(Outcome::ThreadQueued {
                    thread_id,
                    trigger_keywords,
                })
            }
            Command::SurfaceThread {
                thread_id,
                activation_context,
            } => {
                let thread = self.surface_thread(thread_id, activation_context)?;
                let permanent = thread.severity == Severity::Major;
                Ok(Outcome::ThreadSurfaced { thread, permanent })
            }
            Command::LogAvoidance {
                situation,
                what_was_at_stake,
                potential_consequence,
                severity,
            } => {
                let avoidance_id = self.log_avoidance(
                    situation,
                    what_was_at_stake,
                    potential_consequence,
                    severity,
                );
                Ok(Outcome::AvoidanceLogged { avoidance_id })
            }
            Command::SurfaceAvoidance {
                avoidance_id,
                what_happened,
            } => {
                let situation = self.surface_avoidance(avoidance_id, what_happened)?;
                Ok(Outcome::AvoidanceSurfaced { situation })
            }
            Command::ShiftStanding { faction, delta } => {
                Ok(Outcome::StandingShifted(self.shift_standing(faction, delta)))
            }
            Command::RecordMission { name, outcome } => {
                self.record_mission(name.clone(), outcome);
                Ok(Outcome::MissionRecorded { name })
            }
            Command::RecordCanon { summary } => {
                self.record_canon(summary);
                Ok(Outcome::CanonRecorded)
            }
            Command::AdvanceSession => Ok(Outcome::SessionAdvanced {
                session: self.advance_session(),
            }),
        }
    }

    /// Pending-demand attention queue, most urgent first.
    ///
    /// Exposed next to `execute` so dispatchers get the whole read surface
    /// from one place.
    pub fn attention_queue(&self) -> Vec<PendingDemand> {
        self.pending_demands()
    }

    /// Unsurfaced avoidances, Major first.
    pub fn avoidance_queue(&self) -> Vec<PendingAvoidance> {
        self.pending_avoidances()
    }
}
