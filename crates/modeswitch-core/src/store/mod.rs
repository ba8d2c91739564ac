//! Persistence collaborator
//!
//! The pipeline reads providers, templates and backups through the
//! [`ConfigStore`] trait and commits the durable mode pointer through it.
//! [`MemoryStore`] backs tests; [`FileStore`] keeps a JSON registry under
//! `~/.modeswitch` for real installs.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ClaudeProvider, CodexProvider, ToolKind, ToolMode};
use crate::template::CapabilityTemplate;

/// Immutable snapshot of one artifact taken before a switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,
    pub kind: ToolKind,
    pub content: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// A selectable mode row, as presented to the UI layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeConfig {
    pub id: i64,
    pub name: String,
    pub mode: ToolMode,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
}

/// Partial update of a mode row; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModeConfigUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// The durable mode pointer plus the in-flight flag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModeStatus {
    pub current_mode: Option<ToolMode>,
    pub is_transitioning: bool,
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn claude_provider(&self, id: i64) -> Result<Option<ClaudeProvider>>;
    async fn codex_provider(&self, id: i64) -> Result<Option<CodexProvider>>;
    async fn list_claude_providers(&self) -> Result<Vec<ClaudeProvider>>;
    async fn list_codex_providers(&self) -> Result<Vec<CodexProvider>>;

    async fn template(&self, id: i64) -> Result<Option<CapabilityTemplate>>;
    /// Templates, optionally filtered to one tool
    async fn list_templates(&self, tool: Option<ToolKind>) -> Result<Vec<CapabilityTemplate>>;

    /// Record a new snapshot and return it with its generated id
    async fn insert_backup(&self, kind: ToolKind, content: &str, reason: &str) -> Result<Backup>;
    /// Most recent snapshot for `kind`, if any
    async fn latest_backup(&self, kind: ToolKind) -> Result<Option<Backup>>;
    async fn backup(&self, id: &str) -> Result<Option<Backup>>;

    async fn list_mode_configs(&self) -> Result<Vec<ModeConfig>>;
    async fn get_mode_by_name(&self, name: &str) -> Result<Option<ModeConfig>>;
    async fn update_mode_by_id(
        &self,
        id: i64,
        update: ModeConfigUpdate,
    ) -> Result<Option<ModeConfig>>;

    /// Atomically set the durable pointer to `mode` and clear the
    /// transitioning flag
    async fn switch_mode(&self, mode: ToolMode) -> Result<()>;
    /// Raise or clear the transitioning flag without moving the pointer.
    /// Set at pipeline entry; cleared by `switch_mode` on success or
    /// explicitly after a failed switch.
    async fn set_transitioning(&self, value: bool) -> Result<()>;
    async fn mode_status(&self) -> Result<ModeStatus>;
}

/// Default mode rows seeded into a fresh registry
pub(crate) fn default_mode_configs() -> Vec<ModeConfig> {
    vec![
        ModeConfig {
            id: 1,
            name: "claude_only".to_string(),
            mode: ToolMode::ClaudeOnly,
            description: Some("Claude Code only".to_string()),
            is_active: false,
        },
        ModeConfig {
            id: 2,
            name: "codex_only".to_string(),
            mode: ToolMode::CodexOnly,
            description: Some("Codex only".to_string()),
            is_active: false,
        },
        ModeConfig {
            id: 3,
            name: "both".to_string(),
            mode: ToolMode::Both,
            description: Some("Claude Code and Codex together".to_string()),
            is_active: false,
        },
    ]
}
