//! Narrative state engine for persistent, session-based campaigns.
//!
//! This crate provides:
//! - Dormant threads: queued consequences with keyword trigger matching
//! - The leverage engine: enhancement grants, demands, and escalation
//! - Avoidance tracking for the things players choose not to face
//! - A faction standing ledger and an append-only chronicle
//! - Whole-campaign snapshot persistence with atomic writes
//!
//! # Quick Start
//!
//! ```ignore
//! use saga_core::{CampaignSession, SessionConfig, Command};
//! use saga_core::{Faction, LeverageWeight};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = CampaignSession::new(
//!         SessionConfig::new("Emberfall").with_character("Vess"),
//!     )?;
//!
//!     session
//!         .execute(Command::GrantEnhancement {
//!             character: "Vess".into(),
//!             name: "Wardstone Sigil".into(),
//!             source: Faction::Arcanum,
//!             benefit: "Passage through warded doors".into(),
//!             cost: "A favor owed to the provost".into(),
//!         })
//!         .await?;
//!
//!     let hints = session.leverage_hints("I slip past the warded doors").await;
//!     println!("{hints:?}");
//!
//!     session.save("emberfall.json").await?;
//!     Ok(())
//! }
//! ```

pub mod avoidance;
pub mod campaign;
pub mod chronicle;
pub mod command;
pub mod dice;
pub mod factions;
pub mod keywords;
pub mod leverage;
pub mod persist;
pub mod session;
pub mod threads;

// Primary public API
pub use campaign::{Campaign, CampaignId, CharacterSheet, PendingDemand};
pub use command::{Command, EngineError, ErrorKind, Outcome};
pub use factions::{Faction, FactionLedger, Standing, StandingShift};
pub use leverage::{
    DemandResponse, Enhancement, EnhancementId, EscalationKind, LeverageWeight, RefusalStanding,
};
pub use persist::{SaveMetadata, SavedCampaign};
pub use session::{CampaignSession, SessionConfig, SessionError};
pub use threads::{DormantThread, Severity, ThreadId, ThreadMatch};
