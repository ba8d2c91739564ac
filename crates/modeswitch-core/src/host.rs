//! Host command dispatch
//!
//! Generic `invoke(command, args)` surface for embedding shells (desktop
//! runtime, IPC bridge). Every operation answers with the same envelope:
//! `{success, data?, message?}`. Unknown commands and bad argument shapes
//! come back as failed envelopes, never as panics or transport errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fs::ArtifactFs;
use crate::model::ToolKind;
use crate::store::{ConfigStore, ModeConfigUpdate};
use crate::switch::{SwitchOrchestrator, SwitchRequest};

/// Response envelope for every dispatched command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResponse {
    fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Command host wiring a store, an artifact filesystem and the orchestrator
pub struct Host {
    store: Arc<dyn ConfigStore>,
    fs: Arc<dyn ArtifactFs>,
    orchestrator: SwitchOrchestrator,
}

impl Host {
    pub fn new(store: Arc<dyn ConfigStore>, fs: Arc<dyn ArtifactFs>) -> Self {
        let orchestrator = SwitchOrchestrator::new(store.clone(), fs.clone());
        Self {
            store,
            fs,
            orchestrator,
        }
    }

    pub async fn invoke(&self, command: &str, args: Value) -> CommandResponse {
        tracing::debug!(command, "host command invoked");
        match command {
            "get_mode_by_name" => self.get_mode_by_name(args).await,
            "list_mode_configs" => self.list_mode_configs().await,
            "update_mode_by_id" => self.update_mode_by_id(args).await,
            "switch_mode" => self.switch_mode(args).await,
            "get_mode_status" => self.get_mode_status().await,
            "rollback_mode" => self.rollback_mode(args).await,
            "list_claude_providers" => {
                respond(self.store.list_claude_providers().await)
            }
            "list_codex_providers" => {
                respond(self.store.list_codex_providers().await)
            }
            "list_templates" => self.list_templates(args).await,
            other => CommandResponse::fail(format!("unknown command '{other}'")),
        }
    }

    async fn get_mode_by_name(&self, args: Value) -> CommandResponse {
        let Some(name) = args.get("name").and_then(Value::as_str) else {
            return CommandResponse::fail("missing argument 'name'");
        };
        respond(self.store.get_mode_by_name(name).await)
    }

    async fn list_mode_configs(&self) -> CommandResponse {
        respond(self.store.list_mode_configs().await)
    }

    async fn update_mode_by_id(&self, args: Value) -> CommandResponse {
        let Some(id) = args.get("id").and_then(Value::as_i64) else {
            return CommandResponse::fail("missing argument 'id'");
        };
        let fields = args.get("fields").cloned().unwrap_or_else(|| json!({}));
        let update: ModeConfigUpdate = match serde_json::from_value(fields) {
            Ok(update) => update,
            Err(e) => return CommandResponse::fail(format!("bad 'fields' shape: {e}")),
        };
        match self.store.update_mode_by_id(id, update).await {
            Ok(Some(config)) => respond(Ok(config)),
            Ok(None) => CommandResponse::fail(format!("mode config {id} not found")),
            Err(e) => CommandResponse::fail(format!("{e:#}")),
        }
    }

    async fn switch_mode(&self, args: Value) -> CommandResponse {
        let request: SwitchRequest = match serde_json::from_value(args) {
            Ok(request) => request,
            Err(e) => return CommandResponse::fail(format!("bad switch request: {e}")),
        };
        let result = self.orchestrator.switch(request).await;
        let success = result.success;
        let message = result.message.clone();
        match serde_json::to_value(result) {
            Ok(data) => CommandResponse {
                success,
                data: Some(data),
                message: Some(message),
            },
            Err(e) => CommandResponse::fail(format!("{e}")),
        }
    }

    async fn get_mode_status(&self) -> CommandResponse {
        respond(self.store.mode_status().await)
    }

    /// Restore a single artifact from a specific backup id
    async fn rollback_mode(&self, args: Value) -> CommandResponse {
        let Some(backup_id) = args.get("backup_id").and_then(Value::as_str) else {
            return CommandResponse::fail("missing argument 'backup_id'");
        };
        let backup = match self.store.backup(backup_id).await {
            Ok(Some(backup)) => backup,
            Ok(None) => return CommandResponse::fail(format!("backup {backup_id} not found")),
            Err(e) => return CommandResponse::fail(format!("{e:#}")),
        };
        match self.fs.write(backup.kind, &backup.content).await {
            Ok(()) => {
                tracing::info!(backup_id, kind = %backup.kind, "artifact restored by command");
                CommandResponse::ok(json!(true))
            }
            Err(e) => CommandResponse::fail(format!("{e:#}")),
        }
    }

    async fn list_templates(&self, args: Value) -> CommandResponse {
        let tool = match args.get("tool").and_then(Value::as_str) {
            Some("claude") => Some(ToolKind::Claude),
            Some("codex") => Some(ToolKind::Codex),
            Some(other) => return CommandResponse::fail(format!("unknown tool '{other}'")),
            None => None,
        };
        respond(self.store.list_templates(tool).await)
    }
}

fn respond<T: Serialize>(result: anyhow::Result<T>) -> CommandResponse {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(data) => CommandResponse::ok(data),
            Err(e) => CommandResponse::fail(format!("{e}")),
        },
        Err(e) => CommandResponse::fail(format!("{e:#}")),
    }
}
