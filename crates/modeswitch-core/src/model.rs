//! Domain model
//!
//! Tool identities, operating modes, and the provider records the switch
//! pipeline reads. Providers are owned by the persistence collaborator and
//! are read-only here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The tool identity an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Claude,
    Codex,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Claude => "claude",
            ToolKind::Codex => "codex",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The combination of tools currently configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    ClaudeOnly,
    CodexOnly,
    Both,
}

impl ToolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::ClaudeOnly => "claude_only",
            ToolMode::CodexOnly => "codex_only",
            ToolMode::Both => "both",
        }
    }

    /// Tool kinds active in this mode, in apply order
    pub fn active_kinds(&self) -> &'static [ToolKind] {
        match self {
            ToolMode::ClaudeOnly => &[ToolKind::Claude],
            ToolMode::CodexOnly => &[ToolKind::Codex],
            ToolMode::Both => &[ToolKind::Claude, ToolKind::Codex],
        }
    }

    pub fn includes(&self, kind: ToolKind) -> bool {
        self.active_kinds().contains(&kind)
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude_only" => Ok(ToolMode::ClaudeOnly),
            "codex_only" => Ok(ToolMode::CodexOnly),
            "both" => Ok(ToolMode::Both),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// Host platform tag used to select capability templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Unix => "unix",
            Platform::Windows => "windows",
        }
    }
}

/// Billing/category tag carried over from the provider registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    #[default]
    Paid,
    PublicWelfare,
}

/// Wire protocol a Codex provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WireApi {
    #[default]
    Responses,
    Chat,
}

impl WireApi {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireApi::Responses => "responses",
            WireApi::Chat => "chat",
        }
    }
}

/// An Anthropic-compatible provider for Claude Code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeProvider {
    pub id: i64,
    pub name: String,
    /// API base URL (without trailing slash)
    pub base_url: String,
    /// Auth secret, injected into the generated settings env map
    pub token: String,
    /// Request timeout override in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Opt the generated config out of non-essential traffic
    #[serde(default)]
    pub disable_traffic: Option<bool>,
    #[serde(default)]
    pub category: ProviderCategory,
    #[serde(default)]
    pub opus_model: Option<String>,
    #[serde(default)]
    pub sonnet_model: Option<String>,
    #[serde(default)]
    pub haiku_model: Option<String>,
}

/// An OpenAI-compatible provider for Codex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodexProvider {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub token: String,
    #[serde(default)]
    pub category: ProviderCategory,
    #[serde(default)]
    pub wire_api: WireApi,
    #[serde(default)]
    pub requires_openai_auth: bool,
}
