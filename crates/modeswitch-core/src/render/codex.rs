//! Codex config renderer (flat format)
//!
//! The flat artifact is built as a [`FlatDoc`]: an ordered list of scalar
//! assignments followed by ordered typed sections, serialized in one pass.
//! That keeps key and section ordering explicit instead of interleaving
//! string pushes, and makes the emitted shape testable on its own.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::model::CodexProvider;
use crate::template::ServerDescriptor;

/// A typed value in the flat format
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Str(String),
    Bool(bool),
    Int(u64),
    Array(Vec<String>),
}

impl FlatValue {
    fn emit(&self, out: &mut String) {
        match self {
            FlatValue::Str(s) => {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        _ => out.push(c),
                    }
                }
                out.push('"');
            }
            FlatValue::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            FlatValue::Int(n) => {
                let _ = write!(out, "{n}");
            }
            FlatValue::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    FlatValue::Str(item.clone()).emit(out);
                }
                out.push_str(" ]");
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlatSection {
    pub name: String,
    pub entries: Vec<(String, FlatValue)>,
}

/// Ordered flat document: scalars first, then one block per section
#[derive(Debug, Clone, Default)]
pub struct FlatDoc {
    scalars: Vec<(String, FlatValue)>,
    sections: Vec<FlatSection>,
}

impl FlatDoc {
    pub fn scalar(&mut self, key: &str, value: FlatValue) -> &mut Self {
        self.scalars.push((key.to_string(), value));
        self
    }

    pub fn section(&mut self, name: String, entries: Vec<(String, FlatValue)>) -> &mut Self {
        self.sections.push(FlatSection { name, entries });
        self
    }

    /// Single serialization pass over the whole document
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.scalars {
            out.push_str(key);
            out.push_str(" = ");
            value.emit(&mut out);
            out.push('\n');
        }
        for section in &self.sections {
            out.push('\n');
            let _ = writeln!(out, "[{}]", section.name);
            for (key, value) in &section.entries {
                out.push_str(key);
                out.push_str(" = ");
                value.emit(&mut out);
                out.push('\n');
            }
        }
        out
    }
}

/// Section/key-safe identifier derived from a display name
fn sanitize_key(name: &str) -> String {
    let mut key = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else if !key.ends_with('-') && !key.is_empty() {
            key.push('-');
        }
    }
    key.trim_end_matches('-').to_string()
}

pub fn render(
    provider: &CodexProvider,
    descriptors: &[ServerDescriptor],
    caller_variables: &HashMap<String, String>,
) -> String {
    let mut provider_key = sanitize_key(&provider.name);
    // Names with no ASCII alphanumerics sanitize to nothing; fall back to the
    // record id so the section header and model_provider stay non-empty.
    if provider_key.is_empty() {
        provider_key = format!("provider-{}", provider.id);
    }
    let model = caller_variables
        .get("model")
        .cloned()
        .unwrap_or_else(|| "gpt-5-codex".to_string());
    let effort = caller_variables
        .get("model_reasoning_effort")
        .cloned()
        .unwrap_or_else(|| "high".to_string());
    let disable_storage = caller_variables
        .get("disable_response_storage")
        .map(|v| v == "true")
        .unwrap_or(false);

    let mut doc = FlatDoc::default();
    doc.scalar("model", FlatValue::Str(model))
        .scalar("model_reasoning_effort", FlatValue::Str(effort))
        .scalar("disable_response_storage", FlatValue::Bool(disable_storage))
        .scalar("preferred_auth_method", FlatValue::Str("apikey".to_string()))
        .scalar("model_provider", FlatValue::Str(provider_key.clone()));

    doc.section(
        format!("model_providers.{provider_key}"),
        vec![
            ("name".to_string(), FlatValue::Str(provider.name.clone())),
            ("base_url".to_string(), FlatValue::Str(provider.base_url.clone())),
            (
                "wire_api".to_string(),
                FlatValue::Str(provider.wire_api.as_str().to_string()),
            ),
            (
                "requires_openai_auth".to_string(),
                FlatValue::Bool(provider.requires_openai_auth),
            ),
        ],
    );

    for descriptor in descriptors {
        let mut entries = Vec::new();
        if let Some(server_type) = &descriptor.server_type {
            entries.push(("type".to_string(), FlatValue::Str(server_type.clone())));
        }
        entries.push(("command".to_string(), FlatValue::Str(descriptor.command.clone())));
        entries.push(("args".to_string(), FlatValue::Array(descriptor.args.clone())));
        if let Some(timeout) = descriptor.startup_timeout_ms {
            entries.push(("startup_timeout_ms".to_string(), FlatValue::Int(timeout)));
        }
        for (key, value) in &descriptor.env {
            entries.push((format!("env.{key}"), FlatValue::Str(value.clone())));
        }
        doc.section(format!("mcp_servers.{}", descriptor.name), entries);
    }

    doc.render()
}
