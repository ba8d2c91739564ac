//! Error taxonomy for the switch pipeline
//!
//! Every fatal variant aborts the remaining pipeline steps and triggers a
//! best-effort rollback; `Backup` is accumulated per artifact kind and never
//! fatal on its own. Nothing here escapes `SwitchOrchestrator::switch` — the
//! orchestrator folds errors into the returned `SwitchResult`.

use crate::model::ToolKind;

#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    /// Bad request shape (missing provider id, unknown mode)
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced provider or template id does not exist
    #[error("component lookup failed: {0}")]
    ComponentLookup(String),

    /// Snapshot of the current artifact failed (per-kind, non-fatal)
    #[error("backup of {kind} artifact failed: {reason}")]
    Backup { kind: ToolKind, reason: String },

    /// Rendering one artifact failed; aborts the whole rendering step
    #[error("rendering {kind} artifact failed: {reason}")]
    Render { kind: ToolKind, reason: String },

    /// Writing one artifact failed; aborts the whole applying step
    #[error("applying {kind} artifact failed: {reason}")]
    Apply { kind: ToolKind, reason: String },

    /// Applied content is not well-formed for its format
    #[error("verification of {kind} artifact failed: {reason}")]
    Verification { kind: ToolKind, reason: String },

    /// The durable mode-pointer commit failed; the pointer was not updated
    #[error("mode commit failed: {0}")]
    Commit(String),

    /// Rollback is best-effort: this variant is logged, never surfaced as
    /// the operation's failure cause
    #[error("rollback failed: {0}")]
    Rollback(String),

    /// Persistence collaborator failure outside the commit step
    #[error("store error: {0}")]
    Store(String),
}
