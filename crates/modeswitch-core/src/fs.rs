//! Artifact filesystem seam
//!
//! The pipeline never touches paths directly; it goes through [`ArtifactFs`]
//! so tests and previews can run against a scratch root instead of the real
//! home directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::model::ToolKind;
use crate::paths;

/// Read/write access to the per-tool configuration artifacts
#[async_trait]
pub trait ArtifactFs: Send + Sync {
    /// Absolute path the artifact for `kind` lives at
    fn path(&self, kind: ToolKind) -> PathBuf;

    /// Current artifact content; errors if the file is missing or unreadable
    async fn read(&self, kind: ToolKind) -> Result<String>;

    /// Replace the artifact, creating parent directories as needed
    async fn write(&self, kind: ToolKind, content: &str) -> Result<()>;
}

async fn read_at(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn write_at(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Real artifact locations under the user's home directory
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeArtifactFs;

#[async_trait]
impl ArtifactFs for HomeArtifactFs {
    fn path(&self, kind: ToolKind) -> PathBuf {
        match kind {
            ToolKind::Claude => paths::claude_settings_path(),
            ToolKind::Codex => paths::codex_config_path(),
        }
    }

    async fn read(&self, kind: ToolKind) -> Result<String> {
        read_at(&self.path(kind)).await
    }

    async fn write(&self, kind: ToolKind, content: &str) -> Result<()> {
        write_at(&self.path(kind), content).await
    }
}

/// Artifacts rooted under an arbitrary directory, mirroring the home layout.
/// Used by tests and dry runs.
#[derive(Debug, Clone)]
pub struct RootedArtifactFs {
    root: PathBuf,
}

impl RootedArtifactFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactFs for RootedArtifactFs {
    fn path(&self, kind: ToolKind) -> PathBuf {
        match kind {
            ToolKind::Claude => self.root.join(".claude").join("settings.json"),
            ToolKind::Codex => self.root.join(".codex").join("config.toml"),
        }
    }

    async fn read(&self, kind: ToolKind) -> Result<String> {
        read_at(&self.path(kind)).await
    }

    async fn write(&self, kind: ToolKind, content: &str) -> Result<()> {
        write_at(&self.path(kind), content).await
    }
}
