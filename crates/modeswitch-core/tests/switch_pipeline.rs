//! End-to-end switch pipeline scenarios against an in-memory store and a
//! tempdir-rooted artifact filesystem.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use modeswitch_core::fs::{ArtifactFs, RootedArtifactFs};
use modeswitch_core::model::{ClaudeProvider, CodexProvider, ToolKind, ToolMode};
use modeswitch_core::store::{ConfigStore, MemoryStore};
use modeswitch_core::{SwitchOrchestrator, SwitchRequest};

fn claude_provider(id: i64) -> ClaudeProvider {
    ClaudeProvider {
        id,
        name: "Anthropic Relay".to_string(),
        base_url: "https://relay.example.com".to_string(),
        token: "sk-ant-test".to_string(),
        timeout_ms: Some(30_000),
        disable_traffic: None,
        category: Default::default(),
        opus_model: None,
        sonnet_model: Some("claude-sonnet-4-5".to_string()),
        haiku_model: None,
    }
}

fn codex_provider(id: i64) -> CodexProvider {
    CodexProvider {
        id,
        name: "OpenAI Relay".to_string(),
        base_url: "https://api.openai.com/v1".to_string(),
        token: "sk-test".to_string(),
        category: Default::default(),
        wire_api: Default::default(),
        requires_openai_auth: true,
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::seeded();
    store.insert_claude_provider(claude_provider(7));
    store.insert_codex_provider(codex_provider(9));
    Arc::new(store)
}

fn both_request() -> SwitchRequest {
    let mut request = SwitchRequest::new(ToolMode::Both);
    request.claude_provider_id = Some(7);
    request.codex_provider_id = Some(9);
    request
}

#[tokio::test]
async fn test_end_to_end_both_mode() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store();
    let fs = Arc::new(RootedArtifactFs::new(dir.path()));
    let orchestrator = SwitchOrchestrator::new(store.clone(), fs.clone());

    let result = orchestrator.switch(both_request()).await;
    assert!(result.success, "{}", result.message);
    assert_eq!(
        result.steps_completed,
        vec![
            "validating",
            "resolving",
            "backing_up",
            "rendering",
            "applying",
            "verifying_applied",
            "committing_mode",
        ]
    );
    assert_eq!(result.applied_kinds, vec![ToolKind::Claude, ToolKind::Codex]);

    // Both artifacts are on disk and well-formed.
    let claude: serde_json::Value =
        serde_json::from_str(&fs.read(ToolKind::Claude).await.unwrap()).unwrap();
    assert_eq!(claude["env"]["ANTHROPIC_BASE_URL"], "https://relay.example.com");
    toml::from_str::<toml::Value>(&fs.read(ToolKind::Codex).await.unwrap()).unwrap();

    // The pointer committed and the transition flag is clear.
    let status = store.mode_status().await.unwrap();
    assert_eq!(status.current_mode, Some(ToolMode::Both));
    assert!(!status.is_transitioning);
}

#[tokio::test]
async fn test_missing_provider_id_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = SwitchOrchestrator::new(
        seeded_store(),
        Arc::new(RootedArtifactFs::new(dir.path())),
    );

    let result = orchestrator
        .switch(SwitchRequest::new(ToolMode::CodexOnly))
        .await;
    assert!(!result.success);
    assert!(result.steps_completed.is_empty());
    assert!(result.error.unwrap().contains("codex_provider_id"));
}

#[tokio::test]
async fn test_lookup_failure_leaves_disk_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = SwitchOrchestrator::new(
        seeded_store(),
        Arc::new(RootedArtifactFs::new(dir.path())),
    );

    let mut request = SwitchRequest::new(ToolMode::ClaudeOnly);
    request.claude_provider_id = Some(404);
    let result = orchestrator.switch(request).await;

    assert!(!result.success);
    assert!(result.message.starts_with("resolving failed:"));
    assert_eq!(result.steps_completed, vec!["validating"]);
    assert!(!dir.path().join(".claude").exists());
    assert!(!dir.path().join(".codex").exists());
}

/// Artifact filesystem that refuses writes for one kind, to force a failure
/// in the middle of the applying step.
struct FailingWriteFs {
    inner: RootedArtifactFs,
    fail_kind: ToolKind,
}

#[async_trait]
impl ArtifactFs for FailingWriteFs {
    fn path(&self, kind: ToolKind) -> PathBuf {
        self.inner.path(kind)
    }

    async fn read(&self, kind: ToolKind) -> Result<String> {
        self.inner.read(kind).await
    }

    async fn write(&self, kind: ToolKind, content: &str) -> Result<()> {
        if kind == self.fail_kind {
            bail!("disk full");
        }
        self.inner.write(kind, content).await
    }
}

#[tokio::test]
async fn test_failed_apply_rolls_back_to_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store();

    // First switch establishes the baseline Claude artifact.
    let fs = Arc::new(RootedArtifactFs::new(dir.path()));
    let orchestrator = SwitchOrchestrator::new(store.clone(), fs.clone());
    let mut first = SwitchRequest::new(ToolMode::ClaudeOnly);
    first.claude_provider_id = Some(7);
    assert!(orchestrator.switch(first).await.success);
    let baseline = fs.read(ToolKind::Claude).await.unwrap();

    // Second switch renders a different Claude artifact but dies writing the
    // Codex one.
    let failing = Arc::new(FailingWriteFs {
        inner: RootedArtifactFs::new(dir.path()),
        fail_kind: ToolKind::Codex,
    });
    let orchestrator = SwitchOrchestrator::new(store.clone(), failing);
    let mut second = both_request();
    second.variables =
        HashMap::from([("API_TIMEOUT_MS".to_string(), "999".to_string())]);
    let result = orchestrator.switch(second).await;

    assert!(!result.success);
    assert!(result.message.starts_with("applying failed:"), "{}", result.message);
    assert_eq!(
        result.steps_completed,
        vec!["validating", "resolving", "backing_up", "rendering"]
    );
    // Claude was overwritten mid-apply, then restored from its snapshot.
    assert_eq!(fs.read(ToolKind::Claude).await.unwrap(), baseline);
    // The pointer still names the last successful mode.
    let status = store.mode_status().await.unwrap();
    assert_eq!(status.current_mode, Some(ToolMode::ClaudeOnly));
}

#[tokio::test]
async fn test_backup_disabled_still_runs_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store();
    let orchestrator = SwitchOrchestrator::new(
        store.clone(),
        Arc::new(RootedArtifactFs::new(dir.path())),
    );

    let mut request = both_request();
    request.create_backup = false;
    let result = orchestrator.switch(request).await;

    assert!(result.success);
    assert!(result.backup_id.is_none());
    assert!(result.steps_completed.contains(&"backing_up".to_string()));
    assert!(store.latest_backup(ToolKind::Claude).await.unwrap().is_none());
}

/// Store wrapper that slows provider lookups down so a second switch can
/// observe the single-flight gate.
struct SlowStore {
    inner: Arc<MemoryStore>,
}

#[async_trait]
impl ConfigStore for SlowStore {
    async fn claude_provider(&self, id: i64) -> Result<Option<ClaudeProvider>> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.inner.claude_provider(id).await
    }

    async fn codex_provider(&self, id: i64) -> Result<Option<CodexProvider>> {
        self.inner.codex_provider(id).await
    }

    async fn list_claude_providers(&self) -> Result<Vec<ClaudeProvider>> {
        self.inner.list_claude_providers().await
    }

    async fn list_codex_providers(&self) -> Result<Vec<CodexProvider>> {
        self.inner.list_codex_providers().await
    }

    async fn template(
        &self,
        id: i64,
    ) -> Result<Option<modeswitch_core::template::CapabilityTemplate>> {
        self.inner.template(id).await
    }

    async fn list_templates(
        &self,
        tool: Option<ToolKind>,
    ) -> Result<Vec<modeswitch_core::template::CapabilityTemplate>> {
        self.inner.list_templates(tool).await
    }

    async fn insert_backup(
        &self,
        kind: ToolKind,
        content: &str,
        reason: &str,
    ) -> Result<modeswitch_core::store::Backup> {
        self.inner.insert_backup(kind, content, reason).await
    }

    async fn latest_backup(&self, kind: ToolKind) -> Result<Option<modeswitch_core::store::Backup>> {
        self.inner.latest_backup(kind).await
    }

    async fn backup(&self, id: &str) -> Result<Option<modeswitch_core::store::Backup>> {
        self.inner.backup(id).await
    }

    async fn list_mode_configs(&self) -> Result<Vec<modeswitch_core::store::ModeConfig>> {
        self.inner.list_mode_configs().await
    }

    async fn get_mode_by_name(
        &self,
        name: &str,
    ) -> Result<Option<modeswitch_core::store::ModeConfig>> {
        self.inner.get_mode_by_name(name).await
    }

    async fn update_mode_by_id(
        &self,
        id: i64,
        update: modeswitch_core::store::ModeConfigUpdate,
    ) -> Result<Option<modeswitch_core::store::ModeConfig>> {
        self.inner.update_mode_by_id(id, update).await
    }

    async fn switch_mode(&self, mode: ToolMode) -> Result<()> {
        self.inner.switch_mode(mode).await
    }

    async fn set_transitioning(&self, value: bool) -> Result<()> {
        self.inner.set_transitioning(value).await
    }

    async fn mode_status(&self) -> Result<modeswitch_core::store::ModeStatus> {
        self.inner.mode_status().await
    }
}

#[tokio::test]
async fn test_second_concurrent_switch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let inner = seeded_store();
    let store = Arc::new(SlowStore { inner: inner.clone() });
    let orchestrator = Arc::new(SwitchOrchestrator::new(
        store,
        Arc::new(RootedArtifactFs::new(dir.path())),
    ));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.switch(both_request()).await })
    };
    // Let the first switch take the gate and park in the slow lookup.
    tokio::time::sleep(Duration::from_millis(50)).await;
    // The in-flight switch is visible through the status surface.
    assert!(inner.mode_status().await.unwrap().is_transitioning);
    let second = orchestrator.switch(both_request()).await;

    assert!(!second.success);
    assert_eq!(second.message, "a mode switch is already in progress");
    assert!(second.steps_completed.is_empty());

    let first = first.await.unwrap();
    assert!(first.success, "{}", first.message);
    assert!(!inner.mode_status().await.unwrap().is_transitioning);
}
