//! Component resolution
//!
//! Turns the ids in a validated request into full provider and template
//! records. Providers for the active tools are fetched concurrently with the
//! template lookup; any missing record is a lookup failure before a single
//! byte hits disk.

use crate::error::SwitchError;
use crate::model::{Platform, ToolKind};
use crate::render::RenderInputs;
use crate::store::ConfigStore;
use crate::switch::request::SwitchRequest;
use crate::template::CapabilityTemplate;

/// What to do when an explicitly requested template id does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedTemplatePolicy {
    /// Fail the switch (default)
    #[default]
    Error,
    /// Drop the explicit selection and use every template matching the
    /// mode's tools and the current platform
    FallbackToMatching,
}

pub async fn resolve(
    store: &dyn ConfigStore,
    request: &SwitchRequest,
    policy: UnresolvedTemplatePolicy,
) -> Result<RenderInputs, SwitchError> {
    let mode = request.target_mode;
    let (claude, codex, templates) = tokio::join!(
        fetch_claude(store, request),
        fetch_codex(store, request),
        fetch_templates(store, request, policy),
    );
    let inputs = RenderInputs {
        claude: claude?,
        codex: codex?,
        templates: templates?,
    };
    tracing::debug!(
        mode = %mode,
        templates = inputs.templates.len(),
        "components resolved"
    );
    Ok(inputs)
}

async fn fetch_claude(
    store: &dyn ConfigStore,
    request: &SwitchRequest,
) -> Result<Option<crate::model::ClaudeProvider>, SwitchError> {
    let Some(id) = request.claude_provider_id else {
        return Ok(None);
    };
    if !request.target_mode.includes(ToolKind::Claude) {
        return Ok(None);
    }
    store
        .claude_provider(id)
        .await
        .map_err(|e| SwitchError::Store(format!("{e:#}")))?
        .map(Some)
        .ok_or_else(|| SwitchError::ComponentLookup(format!("claude provider {id} not found")))
}

async fn fetch_codex(
    store: &dyn ConfigStore,
    request: &SwitchRequest,
) -> Result<Option<crate::model::CodexProvider>, SwitchError> {
    let Some(id) = request.codex_provider_id else {
        return Ok(None);
    };
    if !request.target_mode.includes(ToolKind::Codex) {
        return Ok(None);
    }
    store
        .codex_provider(id)
        .await
        .map_err(|e| SwitchError::Store(format!("{e:#}")))?
        .map(Some)
        .ok_or_else(|| SwitchError::ComponentLookup(format!("codex provider {id} not found")))
}

async fn fetch_templates(
    store: &dyn ConfigStore,
    request: &SwitchRequest,
    policy: UnresolvedTemplatePolicy,
) -> Result<Vec<CapabilityTemplate>, SwitchError> {
    match &request.template_ids {
        Some(ids) => {
            let mut templates = Vec::with_capacity(ids.len());
            for &id in ids {
                match store
                    .template(id)
                    .await
                    .map_err(|e| SwitchError::Store(format!("{e:#}")))?
                {
                    Some(template) => templates.push(template),
                    None => match policy {
                        UnresolvedTemplatePolicy::Error => {
                            return Err(SwitchError::ComponentLookup(format!(
                                "template {id} not found"
                            )));
                        }
                        UnresolvedTemplatePolicy::FallbackToMatching => {
                            tracing::warn!(
                                template_id = id,
                                "requested template missing, falling back to matching set"
                            );
                            return matching_templates(store, request).await;
                        }
                    },
                }
            }
            Ok(templates)
        }
        None => matching_templates(store, request).await,
    }
}

/// Implicit selection: every stored template for a tool active in the target
/// mode, on the current platform
async fn matching_templates(
    store: &dyn ConfigStore,
    request: &SwitchRequest,
) -> Result<Vec<CapabilityTemplate>, SwitchError> {
    let all = store
        .list_templates(None)
        .await
        .map_err(|e| SwitchError::Store(format!("{e:#}")))?;
    let platform = Platform::current();
    Ok(all
        .into_iter()
        .filter(|t| request.target_mode.includes(t.tool) && t.platform == platform)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaudeProvider, CodexProvider, ToolMode};
    use crate::store::MemoryStore;

    fn claude_provider(id: i64) -> ClaudeProvider {
        ClaudeProvider {
            id,
            name: "A".to_string(),
            base_url: "https://a.example.com".to_string(),
            token: "t".to_string(),
            timeout_ms: None,
            disable_traffic: None,
            category: Default::default(),
            opus_model: None,
            sonnet_model: None,
            haiku_model: None,
        }
    }

    fn codex_provider(id: i64) -> CodexProvider {
        CodexProvider {
            id,
            name: "B".to_string(),
            base_url: "https://b.example.com/v1".to_string(),
            token: "t".to_string(),
            category: Default::default(),
            wire_api: Default::default(),
            requires_openai_auth: false,
        }
    }

    fn request(mode: ToolMode) -> SwitchRequest {
        let mut r = SwitchRequest::new(mode);
        r.claude_provider_id = Some(1);
        r.codex_provider_id = Some(2);
        r
    }

    #[tokio::test]
    async fn test_resolve_implicit_templates_filtered_by_mode_and_platform() {
        let store = MemoryStore::seeded();
        store.insert_claude_provider(claude_provider(1));
        let inputs = resolve(
            &store,
            &request(ToolMode::ClaudeOnly),
            UnresolvedTemplatePolicy::Error,
        )
        .await
        .unwrap();
        assert!(inputs.claude.is_some());
        assert!(inputs.codex.is_none());
        assert!(!inputs.templates.is_empty());
        assert!(inputs.templates.iter().all(|t| {
            t.tool == crate::model::ToolKind::Claude && t.platform == Platform::current()
        }));
    }

    #[tokio::test]
    async fn test_resolve_missing_provider_is_lookup_error() {
        let store = MemoryStore::seeded();
        store.insert_claude_provider(claude_provider(1));
        let err = resolve(
            &store,
            &request(ToolMode::Both),
            UnresolvedTemplatePolicy::Error,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SwitchError::ComponentLookup(_)));
        assert!(err.to_string().contains("codex provider 2"));
    }

    #[tokio::test]
    async fn test_resolve_missing_template_respects_policy() {
        let store = MemoryStore::seeded();
        store.insert_codex_provider(codex_provider(2));
        let mut r = request(ToolMode::CodexOnly);
        r.template_ids = Some(vec![999]);

        let err = resolve(&store, &r, UnresolvedTemplatePolicy::Error)
            .await
            .unwrap_err();
        assert!(matches!(err, SwitchError::ComponentLookup(_)));

        let inputs = resolve(&store, &r, UnresolvedTemplatePolicy::FallbackToMatching)
            .await
            .unwrap();
        assert!(!inputs.templates.is_empty());
        assert!(inputs
            .templates
            .iter()
            .all(|t| t.tool == crate::model::ToolKind::Codex));
    }
}
