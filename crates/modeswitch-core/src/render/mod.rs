//! Artifact rendering
//!
//! Builds the per-tool configuration artifacts from a provider record and a
//! set of capability templates, then runs the rendered text through the
//! variable engine. Rendering never touches disk; the artifacts for a mode
//! are produced together or not at all, because the apply step expects a
//! complete set.

mod claude;
mod codex;

pub use codex::{FlatDoc, FlatValue};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SwitchError;
use crate::model::{ClaudeProvider, CodexProvider, Platform, ToolKind, ToolMode};
use crate::template::{engine, CapabilityTemplate, ServerDescriptor};

/// Serialization scheme of a rendered artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// JSON settings document (Claude)
    Structured,
    /// Flat key/section document (Codex)
    Flat,
}

impl ToolKind {
    pub fn format(&self) -> ArtifactFormat {
        match self {
            ToolKind::Claude => ArtifactFormat::Structured,
            ToolKind::Codex => ArtifactFormat::Flat,
        }
    }
}

/// One rendered, serialized configuration destined for a specific tool.
/// Never persisted on its own: it is applied to disk or discarded.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub kind: ToolKind,
    pub format: ArtifactFormat,
    pub content: String,
}

/// Provider and template records the renderer draws from
#[derive(Debug, Clone, Default)]
pub struct RenderInputs {
    pub claude: Option<ClaudeProvider>,
    pub codex: Option<CodexProvider>,
    pub templates: Vec<CapabilityTemplate>,
}

/// Render every artifact the target mode needs.
///
/// A failure for either tool aborts the whole step.
pub fn render_for_mode(
    mode: ToolMode,
    inputs: &RenderInputs,
    caller_variables: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> Result<Vec<RenderedArtifact>, SwitchError> {
    let mut artifacts = Vec::new();
    for &kind in mode.active_kinds() {
        let descriptors = descriptors_for(kind, &inputs.templates)
            .map_err(|e| SwitchError::Render { kind, reason: format!("{e:#}") })?;

        let (raw, provider_name, provider_url) = match kind {
            ToolKind::Claude => {
                let provider = inputs.claude.as_ref().ok_or_else(|| SwitchError::Render {
                    kind,
                    reason: "no claude provider resolved".to_string(),
                })?;
                let raw = claude::render(provider, &descriptors, caller_variables)
                    .map_err(|e| SwitchError::Render { kind, reason: format!("{e:#}") })?;
                (raw, provider.name.clone(), provider.base_url.clone())
            }
            ToolKind::Codex => {
                let provider = inputs.codex.as_ref().ok_or_else(|| SwitchError::Render {
                    kind,
                    reason: "no codex provider resolved".to_string(),
                })?;
                let raw = codex::render(provider, &descriptors, caller_variables);
                (raw, provider.name.clone(), provider.base_url.clone())
            }
        };

        let mut variables =
            default_variables(&provider_name, &provider_url, kind, descriptors.len(), now);
        // Caller variables win on conflict.
        for (name, value) in caller_variables {
            variables.insert(name.clone(), value.clone());
        }

        let content = engine::substitute(&raw, &variables);
        tracing::debug!(
            kind = %kind,
            bytes = content.len(),
            servers = descriptors.len(),
            "rendered artifact"
        );
        artifacts.push(RenderedArtifact { kind, format: kind.format(), content });
    }
    Ok(artifacts)
}

/// Variables every rendered artifact can reference
fn default_variables(
    provider_name: &str,
    provider_url: &str,
    kind: ToolKind,
    template_count: usize,
    now: DateTime<Utc>,
) -> HashMap<String, String> {
    HashMap::from([
        ("provider_name".to_string(), provider_name.to_string()),
        ("provider_url".to_string(), provider_url.to_string()),
        ("provider_type".to_string(), kind.as_str().to_string()),
        ("template_count".to_string(), template_count.to_string()),
        ("generated_at".to_string(), now.to_rfc3339()),
        ("platform".to_string(), Platform::current().as_str().to_string()),
    ])
}

fn descriptors_for(
    kind: ToolKind,
    templates: &[CapabilityTemplate],
) -> anyhow::Result<Vec<ServerDescriptor>> {
    templates
        .iter()
        .filter(|t| t.tool == kind)
        .map(|t| t.descriptor())
        .collect()
}
