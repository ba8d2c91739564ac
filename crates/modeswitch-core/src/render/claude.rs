//! Claude settings renderer (structured format)
//!
//! Produces the `~/.claude/settings.json` document: install metadata and
//! feature-gate defaults, one `mcpServers` entry per capability server, and
//! an `env` map carrying the provider endpoint, auth secret, model aliases,
//! and any explicitly requested overrides.

use std::collections::HashMap;

use anyhow::Result;
use serde_json::{json, Map, Value};

use crate::model::ClaudeProvider;
use crate::template::ServerDescriptor;

/// Env override keys copied through only when the caller supplies them
const TIMEOUT_KEY: &str = "API_TIMEOUT_MS";
const TRAFFIC_KEY: &str = "CLAUDE_CODE_DISABLE_NONESSENTIAL_TRAFFIC";

pub fn render(
    provider: &ClaudeProvider,
    descriptors: &[ServerDescriptor],
    caller_variables: &HashMap<String, String>,
) -> Result<String> {
    let mut servers = Map::new();
    for descriptor in descriptors {
        let env: Map<String, Value> = descriptor
            .env
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        servers.insert(
            descriptor.name.clone(),
            json!({
                "type": descriptor.server_type.as_deref().unwrap_or("stdio"),
                "command": descriptor.command,
                "args": descriptor.args,
                "env": env,
            }),
        );
    }

    let mut env = Map::new();
    env.insert("ANTHROPIC_BASE_URL".to_string(), json!(provider.base_url));
    env.insert("ANTHROPIC_AUTH_TOKEN".to_string(), json!(provider.token));
    if let Some(model) = &provider.opus_model {
        env.insert("ANTHROPIC_DEFAULT_OPUS_MODEL".to_string(), json!(model));
    }
    if let Some(model) = &provider.sonnet_model {
        env.insert("ANTHROPIC_DEFAULT_SONNET_MODEL".to_string(), json!(model));
    }
    if let Some(model) = &provider.haiku_model {
        env.insert("ANTHROPIC_DEFAULT_HAIKU_MODEL".to_string(), json!(model));
    }
    if let Some(timeout) = provider.timeout_ms {
        env.insert(TIMEOUT_KEY.to_string(), json!(timeout.to_string()));
    }
    if provider.disable_traffic == Some(true) {
        env.insert(TRAFFIC_KEY.to_string(), json!("1"));
    }
    for key in [TIMEOUT_KEY, TRAFFIC_KEY] {
        if let Some(value) = caller_variables.get(key) {
            env.insert(key.to_string(), json!(value));
        }
    }

    let settings = json!({
        "installMethod": "modeswitch",
        "autoUpdates": false,
        "hasCompletedOnboarding": true,
        "isQualifiedForDataSharing": false,
        "mcpServers": Value::Object(servers),
        "env": Value::Object(env),
    });

    Ok(serde_json::to_string_pretty(&settings)?)
}
