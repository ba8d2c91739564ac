//! Best-effort rollback
//!
//! Restores each active artifact from its latest snapshot after a failed
//! apply/verify/commit. Kinds without a snapshot are skipped (the backing-up
//! step already logged why). The caller logs a rollback failure; it never
//! replaces the original failure as the reported cause.

use crate::error::SwitchError;
use crate::fs::ArtifactFs;
use crate::model::{ToolKind, ToolMode};
use crate::render::RenderedArtifact;
use crate::store::ConfigStore;

use super::apply;

/// Restore artifacts for `mode` from their latest backups. Returns the kinds
/// actually restored.
pub async fn rollback(
    store: &dyn ConfigStore,
    fs: &dyn ArtifactFs,
    mode: ToolMode,
) -> Result<Vec<ToolKind>, SwitchError> {
    let mut restored = Vec::new();
    for &kind in mode.active_kinds() {
        let backup = store
            .latest_backup(kind)
            .await
            .map_err(|e| SwitchError::Rollback(format!("loading {kind} backup: {e:#}")))?;
        let Some(backup) = backup else {
            tracing::warn!(kind = %kind, "no backup to restore, leaving artifact as written");
            continue;
        };
        // Restore through the regular apply path, without re-backing-up.
        let restored_artifact = RenderedArtifact {
            kind,
            format: kind.format(),
            content: backup.content.clone(),
        };
        apply::apply_one(store, fs, &restored_artifact, false)
            .await
            .map_err(|e| SwitchError::Rollback(format!("restoring {kind} artifact: {e}")))?;
        tracing::info!(kind = %kind, backup_id = %backup.id, "artifact restored from backup");
        restored.push(kind);
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RootedArtifactFs;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_rollback_restores_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RootedArtifactFs::new(dir.path());
        let store = MemoryStore::new();
        store
            .insert_backup(ToolKind::Claude, "{\"stale\":1}", "r")
            .await
            .unwrap();
        store
            .insert_backup(ToolKind::Claude, "{\"good\":1}", "r")
            .await
            .unwrap();
        fs.write(ToolKind::Claude, "{\"broken\":1}").await.unwrap();

        let restored = rollback(&store, &fs, ToolMode::ClaudeOnly).await.unwrap();
        assert_eq!(restored, vec![ToolKind::Claude]);
        assert_eq!(fs.read(ToolKind::Claude).await.unwrap(), "{\"good\":1}");
    }

    #[tokio::test]
    async fn test_rollback_skips_kinds_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RootedArtifactFs::new(dir.path());
        let store = MemoryStore::new();
        store
            .insert_backup(ToolKind::Codex, "model = \"old\"\n", "r")
            .await
            .unwrap();
        fs.write(ToolKind::Claude, "{\"new\":1}").await.unwrap();
        fs.write(ToolKind::Codex, "model = \"new\"\n").await.unwrap();

        let restored = rollback(&store, &fs, ToolMode::Both).await.unwrap();
        assert_eq!(restored, vec![ToolKind::Codex]);
        // Claude had no snapshot: its freshly written artifact stays.
        assert_eq!(fs.read(ToolKind::Claude).await.unwrap(), "{\"new\":1}");
        assert_eq!(fs.read(ToolKind::Codex).await.unwrap(), "model = \"old\"\n");
    }
}
