//! CampaignSession - the primary public API for running a campaign.
//!
//! One session owns one campaign behind a read-write lock: every mutating
//! operation serializes on the write half, while read-only hint queries may
//! run concurrently on the read half. There is no cross-campaign shared
//! state; advisory readers can never observe a half-applied mutation.

use crate::avoidance::PendingAvoidance;
use crate::campaign::{Campaign, PendingDemand};
use crate::command::{Command, EngineError, Outcome};
use crate::leverage::LeverageHint;
use crate::persist::{auto_save_path, PersistError, SavedCampaign};
use crate::threads::ThreadMatch;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Configuration for creating a new campaign session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Campaign name.
    pub campaign_name: String,

    /// Characters on the roster from the start.
    pub characters: Vec<String>,

    /// Directory for autosaves, if autosaving is wanted.
    pub autosave_dir: Option<PathBuf>,
}

impl SessionConfig {
    /// Create a new session config with a campaign name.
    pub fn new(campaign_name: impl Into<String>) -> Self {
        Self {
            campaign_name: campaign_name.into(),
            ..Self::default()
        }
    }

    /// Add a starting character.
    pub fn with_character(mut self, name: impl Into<String>) -> Self {
        self.characters.push(name.into());
        self
    }

    /// Enable autosaving into a directory.
    pub fn with_autosave_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.autosave_dir = Some(dir.into());
        self
    }
}

/// A running campaign session.
pub struct CampaignSession {
    campaign: Arc<RwLock<Campaign>>,
    autosave_path: Option<PathBuf>,
}

impl CampaignSession {
    /// Create a new session with the given configuration.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let mut campaign = Campaign::new(&config.campaign_name);
        for name in &config.characters {
            campaign.add_character(name.clone())?;
        }
        let autosave_path = config
            .autosave_dir
            .map(|dir| auto_save_path(dir, &config.campaign_name));

        Ok(Self {
            campaign: Arc::new(RwLock::new(campaign)),
            autosave_path,
        })
    }

    /// Resume a session from a snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let saved = SavedCampaign::load_json(path).await?;
        Ok(Self {
            campaign: Arc::new(RwLock::new(saved.campaign)),
            autosave_path: None,
        })
    }

    /// Execute a narrator command. Mutations are serialized: this takes the
    /// campaign's exclusive lock for the duration of the call.
    pub async fn execute(&self, command: Command) -> Result<Outcome, SessionError> {
        let mut campaign = self.campaign.write().await;
        Ok(campaign.execute(command)?)
    }

    /// Match player input against dormant threads. Read-only; may run
    /// concurrently with other readers.
    pub async fn thread_hints(&self, player_input: &str) -> Vec<ThreadMatch> {
        self.campaign.read().await.check_triggers(player_input)
    }

    /// Match player input against enhancement leverage. Takes the write
    /// lock: reported hints are stamped for the per-session rate limit.
    pub async fn leverage_hints(&self, player_input: &str) -> Vec<LeverageHint> {
        self.campaign.write().await.check_leverage_hints(player_input)
    }

    /// The global attention queue of pending demands, most urgent first.
    pub async fn pending_demands(&self) -> Vec<PendingDemand> {
        self.campaign.read().await.pending_demands()
    }

    /// Pending demands at or past their deadline.
    pub async fn check_deadlines(&self) -> Vec<PendingDemand> {
        self.campaign.read().await.check_deadlines()
    }

    /// Unsurfaced avoidances, Major first.
    pub async fn pending_avoidances(&self) -> Vec<PendingAvoidance> {
        self.campaign.read().await.pending_avoidances()
    }

    /// Save the campaign to a specific path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let snapshot = self.campaign.read().await.clone();
        SavedCampaign::new(snapshot).save_json(path).await?;
        Ok(())
    }

    /// Save to the configured autosave path, if one was set.
    pub async fn autosave(&self) -> Result<bool, SessionError> {
        match &self.autosave_path {
            Some(path) => {
                self.save(path).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// A point-in-time copy of the aggregate for inspection.
    pub async fn snapshot(&self) -> Campaign {
        self.campaign.read().await.clone()
    }
}
