//! Built-in capability-template catalog
//!
//! Seeded into a fresh registry so a new install can render useful configs
//! without authoring templates first. Claude fragments are JSON, Codex
//! fragments are TOML blocks; both stay in the encoding their tool consumes.

use crate::model::{Platform, ToolKind};
use crate::template::CapabilityTemplate;

fn t(
    id: i64,
    name: &str,
    tool: ToolKind,
    platform: Platform,
    content: &str,
    description: &str,
    category: &str,
) -> CapabilityTemplate {
    CapabilityTemplate {
        id,
        name: name.to_string(),
        tool,
        platform,
        content: content.to_string(),
        description: Some(description.to_string()),
        category: Some(category.to_string()),
    }
}

/// All built-in templates, every platform included
pub fn all() -> Vec<CapabilityTemplate> {
    vec![
        t(
            1,
            "Context7",
            ToolKind::Claude,
            Platform::Unix,
            r#"{
  "context7": {
    "type": "stdio",
    "command": "npx",
    "args": ["-y", "@upstash/context7-mcp"],
    "env": {}
  }
}"#,
            "Library documentation aggregator",
            "documentation",
        ),
        t(
            2,
            "Sequential Thinking",
            ToolKind::Claude,
            Platform::Unix,
            r#"{
  "sequential-thinking": {
    "type": "stdio",
    "command": "npx",
    "args": ["-y", "@modelcontextprotocol/server-sequential-thinking"],
    "env": {}
  }
}"#,
            "Structured reasoning tool",
            "tools",
        ),
        t(
            3,
            "Memory",
            ToolKind::Claude,
            Platform::Unix,
            r#"{
  "memory": {
    "type": "stdio",
    "command": "npx",
    "args": ["-y", "@modelcontextprotocol/server-memory"],
    "env": {}
  }
}"#,
            "Persistent memory server",
            "tools",
        ),
        t(
            4,
            "Context7",
            ToolKind::Codex,
            Platform::Unix,
            r#"[mcp_servers.context7]
type = "stdio"
command = "npx"
args = [ "-y", "@upstash/context7-mcp" ]"#,
            "Library documentation aggregator",
            "documentation",
        ),
        t(
            5,
            "Chrome DevTools",
            ToolKind::Codex,
            Platform::Unix,
            r#"[mcp_servers.chrome-devtools]
type = "stdio"
command = "npx"
args = [ "chrome-devtools-mcp@latest" ]"#,
            "Chrome DevTools bridge",
            "development",
        ),
        t(
            6,
            "MCP DeepWiki",
            ToolKind::Codex,
            Platform::Unix,
            r#"[mcp_servers.mcp-deepwiki]
startup_timeout_ms = 20000
type = "stdio"
command = "npx"
args = [ "-y", "mcp-deepwiki@latest" ]"#,
            "Deep knowledge aggregation",
            "knowledge",
        ),
        t(
            7,
            "Context7",
            ToolKind::Claude,
            Platform::Windows,
            r#"{
  "context7": {
    "type": "stdio",
    "command": "npx.cmd",
    "args": ["-y", "@upstash/context7-mcp"],
    "env": {}
  }
}"#,
            "Library documentation aggregator (Windows)",
            "documentation",
        ),
        t(
            8,
            "Context7",
            ToolKind::Codex,
            Platform::Windows,
            r#"[mcp_servers.context7]
type = "stdio"
command = "npx.cmd"
args = [ "-y", "@upstash/context7-mcp" ]"#,
            "Library documentation aggregator (Windows)",
            "documentation",
        ),
    ]
}
