//! In-memory store for tests and previews

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::model::{ClaudeProvider, CodexProvider, ToolKind, ToolMode};
use crate::template::{builtin, CapabilityTemplate};

use super::{
    default_mode_configs, Backup, ConfigStore, ModeConfig, ModeConfigUpdate, ModeStatus,
};

#[derive(Debug, Default)]
struct Inner {
    claude_providers: Vec<ClaudeProvider>,
    codex_providers: Vec<CodexProvider>,
    templates: Vec<CapabilityTemplate>,
    backups: Vec<Backup>,
    mode_configs: Vec<ModeConfig>,
    status: ModeStatus,
}

/// Non-durable [`ConfigStore`]; state lives behind a plain mutex
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the built-in template catalog and the default
    /// mode rows
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().unwrap();
            inner.templates = builtin::all();
            inner.mode_configs = default_mode_configs();
        }
        store
    }

    pub fn insert_claude_provider(&self, provider: ClaudeProvider) {
        self.inner.lock().unwrap().claude_providers.push(provider);
    }

    pub fn insert_codex_provider(&self, provider: CodexProvider) {
        self.inner.lock().unwrap().codex_providers.push(provider);
    }

    pub fn insert_template(&self, template: CapabilityTemplate) {
        self.inner.lock().unwrap().templates.push(template);
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn claude_provider(&self, id: i64) -> Result<Option<ClaudeProvider>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.claude_providers.iter().find(|p| p.id == id).cloned())
    }

    async fn codex_provider(&self, id: i64) -> Result<Option<CodexProvider>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.codex_providers.iter().find(|p| p.id == id).cloned())
    }

    async fn list_claude_providers(&self) -> Result<Vec<ClaudeProvider>> {
        Ok(self.inner.lock().unwrap().claude_providers.clone())
    }

    async fn list_codex_providers(&self) -> Result<Vec<CodexProvider>> {
        Ok(self.inner.lock().unwrap().codex_providers.clone())
    }

    async fn template(&self, id: i64) -> Result<Option<CapabilityTemplate>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn list_templates(&self, tool: Option<ToolKind>) -> Result<Vec<CapabilityTemplate>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
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
        self.inner.lock().unwrap().backups.push(backup.clone());
        Ok(backup)
    }

    async fn latest_backup(&self, kind: ToolKind) -> Result<Option<Backup>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .backups
            .iter()
            .filter(|b| b.kind == kind)
            .max_by_key(|b| b.created_at)
            .cloned())
    }

    async fn backup(&self, id: &str) -> Result<Option<Backup>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.backups.iter().find(|b| b.id == id).cloned())
    }

    async fn list_mode_configs(&self) -> Result<Vec<ModeConfig>> {
        Ok(self.inner.lock().unwrap().mode_configs.clone())
    }

    async fn get_mode_by_name(&self, name: &str) -> Result<Option<ModeConfig>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.mode_configs.iter().find(|m| m.name == name).cloned())
    }

    async fn update_mode_by_id(
        &self,
        id: i64,
        update: ModeConfigUpdate,
    ) -> Result<Option<ModeConfig>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(config) = inner.mode_configs.iter_mut().find(|m| m.id == id) else {
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
        Ok(Some(config.clone()))
    }

    async fn switch_mode(&self, mode: ToolMode) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.status = ModeStatus {
            current_mode: Some(mode),
            is_transitioning: false,
        };
        for config in &mut inner.mode_configs {
            config.is_active = config.mode == mode;
        }
        Ok(())
    }

    async fn set_transitioning(&self, value: bool) -> Result<()> {
        self.inner.lock().unwrap().status.is_transitioning = value;
        Ok(())
    }

    async fn mode_status(&self) -> Result<ModeStatus> {
        Ok(self.inner.lock().unwrap().status.clone())
    }
}
