//! Template variable engine
//!
//! Pure text substitution over two placeholder spellings: `{{ name }}`
//! (whitespace-tolerant) and `${name}`. Replacement targets are disjoint per
//! name, so application order never matters and substitution is idempotent
//! for a fixed variable set. `extract_variables` backs the preview-before-
//! apply flow and must stay in lockstep with `substitute`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static MUSTACHE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("static regex")
});

static DOLLAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_.\-]+)\}").expect("static regex"));

/// Replace every `{{ name }}` and `${name}` occurrence, globally and
/// case-sensitively, with the variable's value.
pub fn substitute(text: &str, variables: &HashMap<String, String>) -> String {
    let mut out = MUSTACHE_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned();
    out = DOLLAR_RE
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            match variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned();
    out
}

/// Names referenced by either placeholder spelling, deduplicated, in
/// first-appearance order.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in MUSTACHE_RE.captures_iter(text).chain(DOLLAR_RE.captures_iter(text)) {
        let name = caps[1].trim().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
