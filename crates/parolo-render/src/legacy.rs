//! Legacy `{name}` placeholder formatting.
//!
//! `{key}` is replaced by the value of `key`; `{{` and `}}` produce literal
//! braces. A field may carry a `!conversion` or `:spec` suffix, which is
//! accepted and ignored. Dotted fields (`{user.name}`) walk into objects.
//! With no variables at all the text is returned untouched.

use std::sync::LazyLock;

use parolo_core::{ParoloError, Result};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static FIELD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").unwrap());

/// Substitute `{key}` placeholders in `text` from `vars`.
pub fn format(text: &str, vars: &Map<String, Value>) -> Result<String> {
    if vars.is_empty() {
        return Ok(text.to_owned());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in FIELD_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacement(&caps, vars)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Placeholder fields referenced by `text`, in order of first appearance.
pub fn fields(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in FIELD_PATTERN.captures_iter(text) {
        if let Some(field) = caps.get(1) {
            let key = field_key(field.as_str()).to_owned();
            if !key.is_empty() && !seen.contains(&key) {
                seen.push(key);
            }
        }
    }
    seen
}

fn replacement(caps: &Captures<'_>, vars: &Map<String, Value>) -> Result<String> {
    let Some(field) = caps.get(1) else {
        return match &caps[0] {
            "{{" => Ok("{".to_owned()),
            "}}" => Ok("}".to_owned()),
            "}" => Err(ParoloError::Template(
                "single '}' encountered in format string".to_owned(),
            )),
            _ => Err(ParoloError::Template(
                "single '{' encountered in format string".to_owned(),
            )),
        };
    };

    let path = field_key(field.as_str());
    if path.is_empty() || path.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ParoloError::Template(format!(
            "positional field {{{}}} needs a named key",
            field.as_str()
        )));
    }

    let mut parts = path.split('.');
    let head = parts.next().unwrap_or(path);
    let mut value = vars
        .get(head)
        .ok_or_else(|| ParoloError::MissingKey(head.to_owned()))?;
    for part in parts {
        value = value
            .get(part)
            .ok_or_else(|| ParoloError::MissingKey(path.to_owned()))?;
    }
    Ok(display(value))
}

/// The key portion of a field, without conversion or format spec. Spaces are
/// part of the key: `{ name }` looks up `" name "`.
fn field_key(field: &str) -> &str {
    let end = field.find(['!', ':']).unwrap_or(field.len());
    &field[..end]
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
