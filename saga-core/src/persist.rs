//! Campaign persistence: whole-aggregate snapshots.
//!
//! A save is one JSON document per campaign. Writes are atomic
//! (write-temp-then-rename) and keep a one-generation backup of the
//! previous snapshot, so a crash mid-write can never leave a campaign with
//! a truncated file. Loads migrate old snapshot versions in place.

use crate::campaign::Campaign;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid save format: {0}")]
    InvalidFormat(String),

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
///
/// Version 1 stored a pending demand as parallel `demand_*` fields
/// flattened onto the leverage record; version 2 uses the tagged
/// `pending_demand` object. Version 1 files are migrated at load.
const SAVE_VERSION: u32 = 2;

/// A saved campaign with all state needed to resume play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCampaign {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created (unix seconds as a string).
    pub saved_at: String,

    /// The complete campaign aggregate.
    pub campaign: Campaign,

    /// Metadata about the save.
    pub metadata: SaveMetadata,
}

/// Metadata about the save file, for listing without a full load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub campaign_name: String,
    pub session: u32,
    pub character_count: usize,
    pub chronicle_entries: usize,
    #[serde(default)]
    pub saved_at: String,
}

impl SavedCampaign {
    /// Create a new saved campaign from the aggregate.
    pub fn new(campaign: Campaign) -> Self {
        let saved_at = crate::chronicle::unix_timestamp();
        let metadata = SaveMetadata {
            campaign_name: campaign.name.clone(),
            session: campaign.current_session,
            character_count: campaign.characters.len(),
            chronicle_entries: campaign.chronicle.len(),
            saved_at: saved_at.clone(),
        };

        Self {
            version: SAVE_VERSION,
            saved_at,
            campaign,
            metadata,
        }
    }

    /// Save to a JSON file, atomically.
    ///
    /// The document is written to a temp file and renamed into place; an
    /// existing snapshot is first rotated to `<path>.bak`.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;

        let tmp_path = sibling_path(path, "tmp");
        fs::write(&tmp_path, content).await?;

        if fs::try_exists(path).await? {
            let backup_path = sibling_path(path, "bak");
            fs::rename(path, &backup_path).await?;
            debug!(backup = %backup_path.display(), "previous snapshot rotated");
        }
        fs::rename(&tmp_path, path).await?;
        info!(path = %path.display(), campaign = %self.metadata.campaign_name, "campaign saved");
        Ok(())
    }

    /// Load from a JSON file, migrating old versions at load time.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let mut value: Value = serde_json::from_str(&content)?;

        let found = value
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| PersistError::InvalidFormat("missing version field".to_string()))?
            as u32;

        match found {
            1 => {
                warn!("migrating version 1 snapshot in memory");
                migrate_v1(&mut value)?;
            }
            SAVE_VERSION => {}
            _ => {
                return Err(PersistError::VersionMismatch {
                    expected: SAVE_VERSION,
                    found,
                })
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Read just the metadata without deserializing the full aggregate.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        if partial.version > SAVE_VERSION || partial.version == 0 {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }
        Ok(partial.metadata)
    }
}

/// Collapse the version-1 parallel demand fields into `pending_demand`.
///
/// V1 leverage records carried `demand_text`, `demand_threats`,
/// `demand_deadline`, `demand_deadline_session`, `demand_consequences` and
/// `demand_session` alongside the live fields. A non-null `demand_text`
/// meant an active demand.
fn migrate_v1(value: &mut Value) -> Result<(), PersistError> {
    let characters = value
        .pointer_mut("/campaign/characters")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| PersistError::InvalidFormat("missing characters".to_string()))?;

    for character in characters {
        let Some(enhancements) = character
            .get_mut("enhancements")
            .and_then(Value::as_array_mut)
        else {
            continue;
        };
        for enhancement in enhancements {
            let source = enhancement.get("source").cloned().unwrap_or(Value::Null);
            let enhancement_id = enhancement.get("id").cloned().unwrap_or(Value::Null);
            let Some(leverage) = enhancement.get_mut("leverage").and_then(Value::as_object_mut)
            else {
                continue;
            };

            let demand_text = leverage.remove("demand_text").unwrap_or(Value::Null);
            let threats = leverage.remove("demand_threats").unwrap_or(Value::Null);
            let deadline = leverage.remove("demand_deadline").unwrap_or(Value::Null);
            let deadline_session = leverage
                .remove("demand_deadline_session")
                .unwrap_or(Value::Null);
            let consequences = leverage.remove("demand_consequences").unwrap_or(Value::Null);
            let created = leverage.remove("demand_session").unwrap_or(Value::Null);

            if demand_text.is_null() {
                leverage.insert("pending_demand".to_string(), Value::Null);
                continue;
            }

            let weight = leverage.get("weight").cloned().unwrap_or(Value::Null);
            let demand = serde_json::json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "faction": source,
                "enhancement_id": enhancement_id,
                "demand": demand_text,
                "threat_basis": if threats.is_null() { serde_json::json!([]) } else { threats },
                "deadline_text": deadline,
                "deadline_session": deadline_session,
                "consequences": if consequences.is_null() { serde_json::json!([]) } else { consequences },
                "created_session": if created.is_null() { serde_json::json!(1) } else { created },
                "weight": weight,
            });
            leverage.insert("pending_demand".to_string(), demand);
        }
    }

    value["version"] = serde_json::json!(SAVE_VERSION);
    Ok(())
}

/// Information about a save file.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: String,
    pub metadata: SaveMetadata,
}

/// List all campaign save files in a directory.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let mut saves = Vec::new();
    let dir = dir.as_ref();
    if !fs::try_exists(dir).await? {
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedCampaign::peek_metadata(&path).await {
                saves.push(SaveInfo {
                    path: path.to_string_lossy().to_string(),
                    metadata,
                });
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.campaign_name.cmp(&b.metadata.campaign_name));
    Ok(saves)
}

/// Auto-save path for a campaign, with a filesystem-safe name.
pub fn auto_save_path(base_dir: impl AsRef<Path>, campaign_name: &str) -> PathBuf {
    let sanitized = campaign_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    base_dir.as_ref().join(format!("{sanitized}_autosave.json"))
}

/// A sibling of `path` with an extra extension appended.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    name.push('.');
    name.push_str(suffix);
    path.with_file_name(name)
}
