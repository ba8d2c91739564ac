//! Post-apply artifact validation
//!
//! Structural sanity check per output format, run against the content that
//! was just applied (not a fresh disk read) so rendering bugs are caught
//! before the mode pointer commits.

use crate::error::SwitchError;
use crate::model::ToolKind;
use crate::render::{ArtifactFormat, RenderedArtifact};

pub fn validate(artifact: &RenderedArtifact) -> Result<(), SwitchError> {
    match artifact.format {
        ArtifactFormat::Structured => validate_structured(artifact.kind, &artifact.content),
        ArtifactFormat::Flat => validate_flat(artifact.kind, &artifact.content),
    }
}

/// Structured content must parse as a JSON object
fn validate_structured(kind: ToolKind, content: &str) -> Result<(), SwitchError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| SwitchError::Verification {
            kind,
            reason: format!("not well-formed JSON: {e}"),
        })?;
    if !value.is_object() {
        return Err(SwitchError::Verification {
            kind,
            reason: "top-level value is not an object".to_string(),
        });
    }
    Ok(())
}

/// Line-by-line scan of the flat format.
///
/// Blank and comment lines are skipped; `[section]` lines must be bracket
/// balanced; `key = value` lines need a non-empty key and a quoted string,
/// boolean, unsigned integer, or array value. Multi-line arrays are tracked
/// so continuation lines are not misflagged.
fn validate_flat(kind: ToolKind, content: &str) -> Result<(), SwitchError> {
    let mut array_depth: i32 = 0;
    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if array_depth > 0 {
            array_depth += bracket_delta(line);
            if array_depth < 0 {
                return Err(flat_error(kind, line_no, "unbalanced array close"));
            }
            continue;
        }
        if line.starts_with('[') {
            if !line.ends_with(']') || line.len() < 3 {
                return Err(flat_error(kind, line_no, "malformed section header"));
            }
            // Every dotted segment must be non-empty: `[model_providers.]`
            // is rejected by the consuming tool's parser.
            let inner = &line[1..line.len() - 1];
            if inner.split('.').any(|segment| segment.trim().is_empty()) {
                return Err(flat_error(kind, line_no, "empty section name segment"));
            }
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(flat_error(kind, line_no, "expected `key = value`"));
        };
        if key.trim().is_empty() {
            return Err(flat_error(kind, line_no, "empty key"));
        }
        let value = value.trim();
        if value.is_empty() {
            return Err(flat_error(kind, line_no, "empty value"));
        }
        if value.starts_with('[') {
            array_depth = bracket_delta(value);
            if array_depth < 0 {
                return Err(flat_error(kind, line_no, "unbalanced array close"));
            }
            continue;
        }
        if !is_scalar_value(value) {
            return Err(flat_error(
                kind,
                line_no,
                "value must be a quoted string, boolean, or unsigned integer",
            ));
        }
    }
    if array_depth != 0 {
        return Err(SwitchError::Verification {
            kind,
            reason: "unterminated array at end of file".to_string(),
        });
    }
    Ok(())
}

fn is_scalar_value(value: &str) -> bool {
    if value == "true" || value == "false" {
        return true;
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return true;
        }
    }
    false
}

fn bracket_delta(line: &str) -> i32 {
    let mut delta = 0i32;
    let mut in_string = false;
    for c in line.chars() {
        match c {
            '"' => in_string = !in_string,
            '[' if !in_string => delta += 1,
            ']' if !in_string => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn flat_error(kind: ToolKind, line_no: usize, reason: &str) -> SwitchError {
    SwitchError::Verification {
        kind,
        reason: format!("line {line_no}: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(content: &str) -> RenderedArtifact {
        RenderedArtifact {
            kind: ToolKind::Codex,
            format: ArtifactFormat::Flat,
            content: content.to_string(),
        }
    }

    fn structured(content: &str) -> RenderedArtifact {
        RenderedArtifact {
            kind: ToolKind::Claude,
            format: ArtifactFormat::Structured,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_structured_accepts_object() {
        assert!(validate(&structured("{\"env\": {}}")).is_ok());
    }

    #[test]
    fn test_structured_rejects_non_object_and_garbage() {
        assert!(validate(&structured("[1, 2]")).is_err());
        assert!(validate(&structured("{ not json")).is_err());
    }

    #[test]
    fn test_flat_accepts_typical_config() {
        let content = "model = \"gpt-5-codex\"\ndisable_response_storage = false\n\n\
                       # providers\n[model_providers.relay]\nname = \"Relay\"\n\
                       startup_timeout_ms = 20000\nargs = [ \"-y\", \"x\" ]\n";
        assert!(validate(&flat(content)).is_ok());
    }

    #[test]
    fn test_flat_accepts_multiline_array() {
        let content = "args = [\n    \"--from\",\n    \"serena\",\n]\ncommand = \"uvx\"\n";
        assert!(validate(&flat(content)).is_ok());
    }

    #[test]
    fn test_flat_rejects_unquoted_scalar_with_line_number() {
        let content = "model = \"ok\"\nwire_api = responses\n";
        let err = validate(&flat(content)).unwrap_err();
        match err {
            SwitchError::Verification { reason, .. } => {
                assert!(reason.contains("line 2"), "reason was: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flat_rejects_empty_key_and_bad_section() {
        assert!(validate(&flat(" = \"v\"\n")).is_err());
        assert!(validate(&flat("[unclosed\n")).is_err());
        assert!(validate(&flat("free text line\n")).is_err());
    }

    #[test]
    fn test_flat_rejects_empty_section_segment() {
        assert!(validate(&flat("[model_providers.]\nname = \"x\"\n")).is_err());
        assert!(validate(&flat("[a..b]\n")).is_err());
        assert!(validate(&flat("[.leading]\n")).is_err());
        assert!(validate(&flat("[model_providers.ok]\nname = \"x\"\n")).is_ok());
    }

    #[test]
    fn test_flat_rejects_unterminated_array() {
        assert!(validate(&flat("args = [\n  \"a\",\n")).is_err());
    }
}
