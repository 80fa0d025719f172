// Dialog template context and the two helpers the browser template uses.

use serde::Serialize;
use serde_json::Value;

use crate::model::NpcRecord;

/// Data handed to the host's dialog template: `{ npcs, campaigns }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogContext {
    pub npcs: Vec<NpcRecord>,
    pub campaigns: Vec<String>,
}

/// `truncate` helper: the first `length` characters plus `...` when the
/// string is longer; `""` for anything that is not a string.
pub fn truncate(value: Option<&Value>, length: usize) -> String {
    match value {
        Some(Value::String(s)) => truncate_str(s, length),
        _ => String::new(),
    }
}

/// Character-based truncation of a plain string.
pub fn truncate_str(s: &str, length: usize) -> String {
    match s.char_indices().nth(length) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// `hasValue` helper: true iff `value` is a string with non-whitespace content.
pub fn has_value(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}
