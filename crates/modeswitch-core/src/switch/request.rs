//! Switch request/result types and the pipeline trace

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SwitchError;
use crate::model::{ToolKind, ToolMode};

/// Caller's instruction to move the workstation to a target mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchRequest {
    pub target_mode: ToolMode,
    /// Required when the target mode includes Claude
    #[serde(default)]
    pub claude_provider_id: Option<i64>,
    /// Required when the target mode includes Codex
    #[serde(default)]
    pub codex_provider_id: Option<i64>,
    /// Explicit template selection; `None` selects every template matching
    /// the mode's tools and the current platform
    #[serde(default)]
    pub template_ids: Option<Vec<i64>>,
    #[serde(default = "default_true")]
    pub create_backup: bool,
    /// Extra substitution variables; win over the defaults on conflict
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl SwitchRequest {
    pub fn new(target_mode: ToolMode) -> Self {
        Self {
            target_mode,
            claude_provider_id: None,
            codex_provider_id: None,
            template_ids: None,
            create_backup: true,
            variables: HashMap::new(),
        }
    }
}

/// Field-level request validation, before anything is fetched or written
pub fn validate_request(request: &SwitchRequest) -> Result<(), SwitchError> {
    if request.target_mode.includes(ToolKind::Claude) && request.claude_provider_id.is_none() {
        return Err(SwitchError::Validation(format!(
            "claude_provider_id is required for mode {}",
            request.target_mode
        )));
    }
    if request.target_mode.includes(ToolKind::Codex) && request.codex_provider_id.is_none() {
        return Err(SwitchError::Validation(format!(
            "codex_provider_id is required for mode {}",
            request.target_mode
        )));
    }
    if let Some(ids) = &request.template_ids {
        if ids.is_empty() {
            return Err(SwitchError::Validation(
                "template_ids must be omitted or non-empty".to_string(),
            ));
        }
    }
    Ok(())
}

/// Pipeline steps in execution order. The ordering is load-bearing: rollback
/// engages only for failures at `Applying` or later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Validating,
    Resolving,
    BackingUp,
    Rendering,
    Applying,
    VerifyingApplied,
    CommittingMode,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Validating => "validating",
            Step::Resolving => "resolving",
            Step::BackingUp => "backing_up",
            Step::Rendering => "rendering",
            Step::Applying => "applying",
            Step::VerifyingApplied => "verifying_applied",
            Step::CommittingMode => "committing_mode",
        }
    }
}

/// Accumulates the steps that ran to completion, for the result's audit trail
#[derive(Debug, Default)]
pub struct PipelineTrace {
    completed: Vec<Step>,
}

impl PipelineTrace {
    pub fn complete(&mut self, step: Step) {
        tracing::debug!(step = step.name(), "pipeline step completed");
        self.completed.push(step);
    }

    pub fn names(&self) -> Vec<String> {
        self.completed.iter().map(|s| s.name().to_string()).collect()
    }
}

/// Outcome of a switch attempt. Failures are reported here, never as an
/// `Err` from the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchResult {
    pub success: bool,
    pub message: String,
    /// Latest pre-switch backup id, when one was taken
    pub backup_id: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub steps_completed: Vec<String>,
    pub duration_ms: u64,
    /// Tool kinds whose artifacts were written
    pub applied_kinds: Vec<ToolKind>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_provider_for_each_active_tool() {
        let mut request = SwitchRequest::new(ToolMode::Both);
        request.claude_provider_id = Some(1);
        let err = validate_request(&request).unwrap_err();
        assert!(err.to_string().contains("codex_provider_id"));

        request.codex_provider_id = Some(2);
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_validate_ignores_inactive_tool_provider() {
        let mut request = SwitchRequest::new(ToolMode::CodexOnly);
        request.codex_provider_id = Some(2);
        // No claude id needed when Claude is not part of the mode.
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_template_selection() {
        let mut request = SwitchRequest::new(ToolMode::ClaudeOnly);
        request.claude_provider_id = Some(1);
        request.template_ids = Some(vec![]);
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_step_order_backs_rollback_scope() {
        assert!(Step::Rendering < Step::Applying);
        assert!(Step::Applying <= Step::Applying);
        assert!(Step::CommittingMode > Step::Applying);
    }
}
