//! The switch pipeline
//!
//! [`SwitchOrchestrator::switch`] runs the full sequence: validate the
//! request, resolve providers and templates, snapshot the current artifacts,
//! render fresh ones, apply them, verify what was written, then commit the
//! durable mode pointer. It always returns a [`SwitchResult`]; failures are
//! folded into it, with a best-effort rollback when disk was already touched.

pub mod apply;
pub mod backup;
pub mod request;
pub mod resolver;
pub mod rollback;

pub use request::{SwitchRequest, SwitchResult};
pub use resolver::UnresolvedTemplatePolicy;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::error::SwitchError;
use crate::fs::ArtifactFs;
use crate::model::ToolKind;
use crate::store::ConfigStore;
use crate::validate;

use request::{validate_request, PipelineTrace, Step};

pub struct SwitchOrchestrator {
    store: Arc<dyn ConfigStore>,
    fs: Arc<dyn ArtifactFs>,
    policy: UnresolvedTemplatePolicy,
    /// Single-permit gate: one switch at a time per process
    gate: tokio::sync::Mutex<()>,
}

impl SwitchOrchestrator {
    pub fn new(store: Arc<dyn ConfigStore>, fs: Arc<dyn ArtifactFs>) -> Self {
        Self {
            store,
            fs,
            policy: UnresolvedTemplatePolicy::default(),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedTemplatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run a mode switch to completion. Never returns `Err`: every failure
    /// is reported through the result.
    pub async fn switch(&self, request: SwitchRequest) -> SwitchResult {
        let started = Instant::now();
        let Ok(_guard) = self.gate.try_lock() else {
            return SwitchResult {
                success: false,
                message: "a mode switch is already in progress".to_string(),
                backup_id: None,
                applied_at: None,
                steps_completed: Vec::new(),
                duration_ms: started.elapsed().as_millis() as u64,
                applied_kinds: Vec::new(),
                error: Some("busy".to_string()),
            };
        };

        tracing::info!(mode = %request.target_mode, "mode switch started");
        // Flag the transition so mode_status reports it while the pipeline
        // runs; switch_mode clears it on commit, the failure path below
        // clears it otherwise.
        if let Err(e) = self.store.set_transitioning(true).await {
            tracing::warn!(error = %format!("{e:#}"), "could not flag transition start");
        }
        let mut trace = PipelineTrace::default();
        match self.run(&request, &mut trace).await {
            Ok((backup_id, applied_kinds)) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                tracing::info!(mode = %request.target_mode, duration_ms, "mode switch completed");
                SwitchResult {
                    success: true,
                    message: format!("switched to mode {}", request.target_mode),
                    backup_id,
                    applied_at: Some(Utc::now()),
                    steps_completed: trace.names(),
                    duration_ms,
                    applied_kinds,
                    error: None,
                }
            }
            Err((step, error)) => {
                tracing::error!(step = step.name(), error = %error, "mode switch failed");
                if let Err(e) = self.store.set_transitioning(false).await {
                    tracing::warn!(error = %format!("{e:#}"), "could not clear transition flag");
                }
                if step >= Step::Applying {
                    match rollback::rollback(&*self.store, &*self.fs, request.target_mode).await {
                        Ok(restored) => {
                            tracing::info!(restored = ?restored, "rolled back after failure");
                        }
                        Err(rollback_error) => {
                            tracing::error!(error = %rollback_error, "rollback failed");
                        }
                    }
                }
                SwitchResult {
                    success: false,
                    message: format!("{} failed: {error}", step.name()),
                    backup_id: None,
                    applied_at: None,
                    steps_completed: trace.names(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    applied_kinds: Vec::new(),
                    error: Some(error.to_string()),
                }
            }
        }
    }

    async fn run(
        &self,
        request: &SwitchRequest,
        trace: &mut PipelineTrace,
    ) -> Result<(Option<String>, Vec<ToolKind>), (Step, SwitchError)> {
        validate_request(request).map_err(|e| (Step::Validating, e))?;
        trace.complete(Step::Validating);

        let inputs = resolver::resolve(&*self.store, request, self.policy)
            .await
            .map_err(|e| (Step::Resolving, e))?;
        trace.complete(Step::Resolving);

        // Backup failures are per-kind and non-fatal; they only shrink what
        // rollback can restore.
        let backup_id = if request.create_backup {
            let outcomes =
                backup::backup_current(&*self.store, &*self.fs, request.target_mode).await;
            backup::latest_backup_id(&outcomes)
        } else {
            None
        };
        trace.complete(Step::BackingUp);

        let artifacts = crate::render::render_for_mode(
            request.target_mode,
            &inputs,
            &request.variables,
            Utc::now(),
        )
        .map_err(|e| (Step::Rendering, e))?;
        trace.complete(Step::Rendering);

        let applied_kinds = apply::apply_all(&*self.fs, &artifacts)
            .await
            .map_err(|e| (Step::Applying, e))?;
        trace.complete(Step::Applying);

        for artifact in &artifacts {
            validate::validate(artifact).map_err(|e| (Step::VerifyingApplied, e))?;
        }
        trace.complete(Step::VerifyingApplied);

        self.store
            .switch_mode(request.target_mode)
            .await
            .map_err(|e| (Step::CommittingMode, SwitchError::Commit(format!("{e:#}"))))?;
        trace.complete(Step::CommittingMode);

        Ok((backup_id, applied_kinds))
    }
}
