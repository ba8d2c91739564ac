//! modeswitch core library
//!
//! Switches a workstation between mutually exclusive AI-tool operating modes
//! (Claude only, Codex only, or both) by regenerating each tool's on-disk
//! configuration from provider records and capability-server templates.
//!
//! The pipeline lives in [`switch`]: validate the request, resolve the
//! referenced components, snapshot the current artifacts, render fresh ones,
//! apply them, verify what was written, and only then commit the mode
//! pointer. Any failure triggers a best-effort rollback from the latest
//! backups. Presentation layers (CLI, desktop shell) stay thin: they build a
//! [`switch::SwitchRequest`] and read back the [`switch::SwitchResult`].

pub mod error;
pub mod fs;
pub mod host;
pub mod model;
pub mod paths;
pub mod render;
pub mod store;
pub mod switch;
pub mod template;
pub mod validate;

pub use error::SwitchError;
pub use model::{ClaudeProvider, CodexProvider, ToolKind, ToolMode};
pub use switch::{SwitchOrchestrator, SwitchRequest, SwitchResult};
