//! Pre-switch backups
//!
//! One snapshot per artifact active in the target mode. A snapshot that
//! cannot be taken (most commonly: the artifact file does not exist yet) is
//! recorded as a per-kind failure and logged; it never aborts the switch, it
//! only shrinks what rollback can later restore.

use crate::error::SwitchError;
use crate::fs::ArtifactFs;
use crate::model::{ToolKind, ToolMode};
use crate::store::ConfigStore;

/// Per-kind result of the backing-up step
#[derive(Debug)]
pub struct BackupOutcome {
    pub kind: ToolKind,
    pub backup_id: Option<String>,
    pub error: Option<SwitchError>,
}

pub async fn backup_current(
    store: &dyn ConfigStore,
    fs: &dyn ArtifactFs,
    mode: ToolMode,
) -> Vec<BackupOutcome> {
    let reason = format!("pre-switch backup for mode {mode}");
    let mut outcomes = Vec::new();
    for &kind in mode.active_kinds() {
        let outcome = match fs.read(kind).await {
            Ok(content) => match store.insert_backup(kind, &content, &reason).await {
                Ok(backup) => BackupOutcome {
                    kind,
                    backup_id: Some(backup.id),
                    error: None,
                },
                Err(e) => BackupOutcome {
                    kind,
                    backup_id: None,
                    error: Some(SwitchError::Backup {
                        kind,
                        reason: format!("{e:#}"),
                    }),
                },
            },
            Err(e) => BackupOutcome {
                kind,
                backup_id: None,
                error: Some(SwitchError::Backup {
                    kind,
                    reason: format!("{e:#}"),
                }),
            },
        };
        if let Some(error) = &outcome.error {
            tracing::warn!(kind = %kind, error = %error, "artifact backup failed, continuing");
        } else {
            tracing::debug!(kind = %kind, backup_id = ?outcome.backup_id, "artifact backed up");
        }
        outcomes.push(outcome);
    }
    outcomes
}

/// Id of the last successful snapshot, for the result's `backup_id` field
pub fn latest_backup_id(outcomes: &[BackupOutcome]) -> Option<String> {
    outcomes
        .iter()
        .rev()
        .find_map(|o| o.backup_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RootedArtifactFs;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_missing_artifact_is_nonfatal_per_kind_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RootedArtifactFs::new(dir.path());
        fs.write(ToolKind::Claude, "{\"env\":{}}").await.unwrap();
        let store = MemoryStore::new();

        let outcomes = backup_current(&store, &fs, ToolMode::Both).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].backup_id.is_some());
        assert!(outcomes[1].backup_id.is_none());
        assert!(matches!(
            outcomes[1].error,
            Some(SwitchError::Backup {
                kind: ToolKind::Codex,
                ..
            })
        ));
        assert_eq!(latest_backup_id(&outcomes), outcomes[0].backup_id);
    }

    #[tokio::test]
    async fn test_backup_content_matches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RootedArtifactFs::new(dir.path());
        fs.write(ToolKind::Codex, "model = \"old\"\n").await.unwrap();
        let store = MemoryStore::new();

        let outcomes = backup_current(&store, &fs, ToolMode::CodexOnly).await;
        let id = outcomes[0].backup_id.as_ref().unwrap();
        let backup = store.backup(id).await.unwrap().unwrap();
        assert_eq!(backup.content, "model = \"old\"\n");
        assert!(backup.reason.contains("codex_only"));
    }
}
