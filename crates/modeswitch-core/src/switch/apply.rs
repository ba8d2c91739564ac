//! Applying rendered artifacts to disk
//!
//! Writes are sequential and any failure is fatal to the step: a half
//! applied set is exactly what the rollback path exists to undo.

use crate::error::SwitchError;
use crate::fs::ArtifactFs;
use crate::model::ToolKind;
use crate::render::RenderedArtifact;
use crate::store::ConfigStore;

pub async fn apply_all(
    fs: &dyn ArtifactFs,
    artifacts: &[RenderedArtifact],
) -> Result<Vec<ToolKind>, SwitchError> {
    let mut applied = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        fs.write(artifact.kind, &artifact.content)
            .await
            .map_err(|e| SwitchError::Apply {
                kind: artifact.kind,
                reason: format!("{e:#}"),
            })?;
        tracing::info!(
            kind = %artifact.kind,
            path = %fs.path(artifact.kind).display(),
            bytes = artifact.content.len(),
            "artifact applied"
        );
        applied.push(artifact.kind);
    }
    Ok(applied)
}

/// Write a single artifact outside the full pipeline, optionally snapshotting
/// the current file first. Used by the standalone apply command.
pub async fn apply_one(
    store: &dyn ConfigStore,
    fs: &dyn ArtifactFs,
    artifact: &RenderedArtifact,
    create_backup: bool,
) -> Result<Option<String>, SwitchError> {
    let mut backup_id = None;
    if create_backup {
        if let Ok(content) = fs.read(artifact.kind).await {
            let backup = store
                .insert_backup(artifact.kind, &content, "pre-apply backup")
                .await
                .map_err(|e| SwitchError::Store(format!("{e:#}")))?;
            backup_id = Some(backup.id);
        }
    }
    fs.write(artifact.kind, &artifact.content)
        .await
        .map_err(|e| SwitchError::Apply {
            kind: artifact.kind,
            reason: format!("{e:#}"),
        })?;
    Ok(backup_id)
}
