//! Capability-server templates
//!
//! A template stores one MCP server descriptor as opaque text in its native
//! encoding: a JSON fragment for Claude, a `[mcp_servers.<name>]` TOML block
//! for Codex. [`CapabilityTemplate::descriptor`] recovers a typed
//! [`ServerDescriptor`] with a real parser per encoding, so nothing (args
//! included) is lost to ad-hoc line scanning.

pub mod builtin;
pub mod engine;

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Platform, ToolKind};

/// A reusable descriptor of an auxiliary MCP server integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityTemplate {
    pub id: i64,
    pub name: String,
    /// Which tool's artifact this template renders into
    pub tool: ToolKind,
    #[serde(default = "Platform::current")]
    pub platform: Platform,
    /// Raw descriptor in the template's native encoding
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Typed capability-server descriptor recovered from template content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Server name as written in the fragment (the config key, not the
    /// template's display name)
    pub name: String,
    pub server_type: Option<String>,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub startup_timeout_ms: Option<u64>,
}

/// Serde shape shared by both fragment encodings
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type")]
    server_type: Option<String>,
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    startup_timeout_ms: Option<u64>,
}

impl RawDescriptor {
    fn into_descriptor(self, name: String) -> ServerDescriptor {
        ServerDescriptor {
            name,
            server_type: self.server_type,
            command: self.command,
            args: self.args,
            env: self.env,
            startup_timeout_ms: self.startup_timeout_ms,
        }
    }
}

impl CapabilityTemplate {
    /// Parse the raw content into a typed descriptor
    pub fn descriptor(&self) -> Result<ServerDescriptor> {
        match self.tool {
            ToolKind::Claude => parse_claude_fragment(&self.content),
            ToolKind::Codex => parse_codex_fragment(&self.content),
        }
        .with_context(|| format!("template '{}'", self.name))
    }
}

/// Parse a Claude JSON fragment: `{ "<name>": { "command": ..., ... } }`
fn parse_claude_fragment(content: &str) -> Result<ServerDescriptor> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("descriptor is not valid JSON")?;
    let object = value
        .as_object()
        .context("descriptor must be a JSON object")?;
    let (name, body) = object
        .iter()
        .next()
        .context("descriptor object is empty")?;
    let raw: RawDescriptor =
        serde_json::from_value(body.clone()).context("malformed server entry")?;
    Ok(raw.into_descriptor(name.clone()))
}

/// Parse a Codex TOML fragment: `[mcp_servers.<name>]` followed by keys
fn parse_codex_fragment(content: &str) -> Result<ServerDescriptor> {
    let value: toml::Value = toml::from_str(content).context("descriptor is not valid TOML")?;
    let table = match value.get("mcp_servers") {
        Some(nested) => nested
            .as_table()
            .context("mcp_servers must be a TOML table")?,
        None => value.as_table().context("descriptor must be a TOML table")?,
    };
    let Some((name, body)) = table.iter().next() else {
        bail!("descriptor table is empty");
    };
    let raw: RawDescriptor = body
        .clone()
        .try_into()
        .context("malformed server entry")?;
    Ok(raw.into_descriptor(name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(tool: ToolKind, content: &str) -> CapabilityTemplate {
        CapabilityTemplate {
            id: 1,
            name: "Test".to_string(),
            tool,
            platform: Platform::Unix,
            content: content.to_string(),
            description: None,
            category: None,
        }
    }

    #[test]
    fn test_parse_claude_fragment() {
        let t = template(
            ToolKind::Claude,
            r#"{
  "context7": {
    "type": "stdio",
    "command": "npx",
    "args": ["-y", "@upstash/context7-mcp"],
    "env": {}
  }
}"#,
        );
        let d = t.descriptor().unwrap();
        assert_eq!(d.name, "context7");
        assert_eq!(d.server_type.as_deref(), Some("stdio"));
        assert_eq!(d.command, "npx");
        assert_eq!(d.args, vec!["-y", "@upstash/context7-mcp"]);
        assert!(d.env.is_empty());
    }

    #[test]
    fn test_parse_codex_fragment_keeps_args() {
        let t = template(
            ToolKind::Codex,
            r#"[mcp_servers.serena]
startup_timeout_ms = 20000
args = [
    "--from",
    "git+https://github.com/oraios/serena",
    "serena",
    "start-mcp-server",
]
command = "uvx"
type = "stdio""#,
        );
        let d = t.descriptor().unwrap();
        assert_eq!(d.name, "serena");
        assert_eq!(d.command, "uvx");
        // The old regex-based scan dropped args; the typed parser must not.
        assert_eq!(d.args.len(), 4);
        assert_eq!(d.startup_timeout_ms, Some(20_000));
    }

    #[test]
    fn test_parse_codex_fragment_with_env() {
        let t = template(
            ToolKind::Codex,
            r#"[mcp_servers.exa]
type = "stdio"
command = "npx"
args = [ "-y", "exa-mcp" ]
env = { EXA_API_KEY = "${EXA_API_KEY}" }"#,
        );
        let d = t.descriptor().unwrap();
        assert_eq!(d.env.get("EXA_API_KEY").unwrap(), "${EXA_API_KEY}");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(template(ToolKind::Claude, "not json").descriptor().is_err());
        assert!(template(ToolKind::Codex, "also = not\n[valid")
            .descriptor()
            .is_err());
        assert!(template(ToolKind::Claude, "{}").descriptor().is_err());
    }
}
