//! JSON-file registry store
//!
//! One JSON document holds providers, templates, backups, mode rows and the
//! mode pointer. The whole registry is rewritten after each mutation; at the
//! size this file reaches that is cheaper than partial updates and keeps the
//! on-disk shape trivially inspectable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::model::{ClaudeProvider, CodexProvider, ToolKind, ToolMode};
use crate::template::{builtin, CapabilityTemplate};

use super::{
    default_mode_configs, Backup, ConfigStore, ModeConfig, ModeConfigUpdate, ModeStatus,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Registry {
    #[serde(default)]
    claude_providers: Vec<ClaudeProvider>,
    #[serde(default)]
    codex_providers: Vec<CodexProvider>,
    #[serde(default)]
    templates: Vec<CapabilityTemplate>,
    #[serde(default)]
    backups: Vec<Backup>,
    #[serde(default)]
    mode_configs: Vec<ModeConfig>,
    #[serde(default)]
    status: ModeStatus,
}

/// Durable [`ConfigStore`] backed by a single registry file
pub struct FileStore {
    path: PathBuf,
    registry: Mutex<Registry>,
}

impl FileStore {
    /// Open the registry at `path`, seeding the built-in template catalog and
    /// default mode rows on first use.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let registry = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("malformed registry at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "seeding new registry");
                Registry {
                    templates: builtin::all(),
                    mode_configs: default_mode_configs(),
                    ..Registry::default()
                }
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read registry at {}", path.display()))
            }
        };
        let store = Self {
            path,
            registry: Mutex::new(registry),
        };
        store.persist(&*store.registry.lock().await).await?;
        Ok(store)
    }

    async fn persist(&self, registry: &Registry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(registry)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("failed to write registry at {}", self.path.display()))
    }

    pub async fn insert_claude_provider(&self, provider: ClaudeProvider) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.claude_providers.push(provider);
        self.persist(&registry).await
    }

    pub async fn insert_codex_provider(&self, provider: CodexProvider) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.codex_providers.push(provider);
        self.persist(&registry).await
    }

    pub async fn insert_template(&self, template: CapabilityTemplate) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.templates.push(template);
        self.persist(&registry).await
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn claude_provider(&self, id: i64) -> Result<Option<ClaudeProvider>> {
        let registry = self.registry.lock().await;
        Ok(registry.claude_providers.iter().find(|p| p.id == id).cloned())
    }

    async fn codex_provider(&self, id: i64) -> Result<Option<CodexProvider>> {
        let registry = self.registry.lock().await;
        Ok(registry.codex_providers.iter().find(|p| p.id == id).cloned())
    }

    async fn list_claude_providers(&self) -> Result<Vec<ClaudeProvider>> {
        Ok(self.registry.lock().await.claude_providers.clone())
    }

    async fn list_codex_providers(&self) -> Result<Vec<CodexProvider>> {
        Ok(self.registry.lock().await.codex_providers.clone())
    }

    async fn template(&self, id: i64) -> Result<Option<CapabilityTemplate>> {
        let registry = self.registry.lock().await;
        Ok(registry.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn list_templates(&self, tool: Option<ToolKind>) -> Result<Vec<CapabilityTemplate>> {
        let registry = self.registry.lock().await;
        Ok(registry
            .templates
            .iter()
            .filter(|t| tool.is_none_or(|k| t.tool == k))
            .cloned()
            .collect())
    }

    async fn insert_backup(&self, kind: ToolKind, content: &str, reason: &str) -> Result<Backup> {
        let backup = Backup {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.to_string(),
            reason: reason.to_string(),
            created_at: Utc::now(),
        };
        let mut registry = self.registry.lock().await;
        registry.backups.push(backup.clone());
        self.persist(&registry).await?;
        Ok(backup)
    }

    async fn latest_backup(&self, kind: ToolKind) -> Result<Option<Backup>> {
        let registry = self.registry.lock().await;
        Ok(registry
            .backups
            .iter()
            .filter(|b| b.kind == kind)
            .max_by_key(|b| b.created_at)
            .cloned())
    }

    async fn backup(&self, id: &str) -> Result<Option<Backup>> {
        let registry = self.registry.lock().await;
        Ok(registry.backups.iter().find(|b| b.id == id).cloned())
    }

    async fn list_mode_configs(&self) -> Result<Vec<ModeConfig>> {
        Ok(self.registry.lock().await.mode_configs.clone())
    }

    async fn get_mode_by_name(&self, name: &str) -> Result<Option<ModeConfig>> {
        let registry = self.registry.lock().await;
        Ok(registry.mode_configs.iter().find(|m| m.name == name).cloned())
    }

    async fn update_mode_by_id(
        &self,
        id: i64,
        update: ModeConfigUpdate,
    ) -> Result<Option<ModeConfig>> {
        let mut registry = self.registry.lock().await;
        let Some(config) = registry.mode_configs.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            config.name = name;
        }
        if let Some(description) = update.description {
            config.description = Some(description);
        }
        if let Some(is_active) = update.is_active {
            config.is_active = is_active;
        }
        let updated = config.clone();
        self.persist(&registry).await?;
        Ok(Some(updated))
    }

    async fn switch_mode(&self, mode: ToolMode) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.status = ModeStatus {
            current_mode: Some(mode),
            is_transitioning: false,
        };
        for config in &mut registry.mode_configs {
            config.is_active = config.mode == mode;
        }
        self.persist(&registry).await
    }

    async fn set_transitioning(&self, value: bool) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.status.is_transitioning = value;
        self.persist(&registry).await
    }

    async fn mode_status(&self) -> Result<ModeStatus> {
        Ok(self.registry.lock().await.status.clone())
    }
}
