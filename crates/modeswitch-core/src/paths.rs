//! Centralized path utilities
//!
//! All application paths in one place for consistency

use std::path::PathBuf;

/// Get the modeswitch config directory (~/.modeswitch)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".modeswitch")
}

/// Get the registry file (~/.modeswitch/registry.json)
/// Holds providers, templates, backups and the mode pointer.
pub fn registry_path() -> PathBuf {
    config_dir().join("registry.json")
}

/// Get the Claude Code settings file (~/.claude/settings.json)
pub fn claude_settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
        .join("settings.json")
}

/// Get the Codex config file (~/.codex/config.toml)
pub fn codex_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".codex")
        .join("config.toml")
}
