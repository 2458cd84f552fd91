//! Message formatting
//!
//! A log call takes any number of parts. Text passes through untouched;
//! structured values are rendered on one line, inspect style, with nesting
//! and container length bounded so huge values cannot flood the output.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Containers nested deeper than this are abbreviated
pub const MAX_DEPTH: usize = 3;

/// Entries shown per array or object before the rest is summarised
pub const MAX_ENTRIES: usize = 100;

/// One piece of a log message
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePart {
    Text(String),
    Value(Value),
}

impl MessagePart {
    /// Part holding any serializable value
    pub fn value<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Value(value),
            Err(e) => {
                warn!(error = %e, "MessagePart::value: value is not serializable");
                Self::Text("[Unserializable]".to_string())
            }
        }
    }

    /// Render this part as it appears in the message
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Value(Value::String(text)) => text.clone(),
            Self::Value(value) => inspect(value),
        }
    }
}

impl From<&str> for MessagePart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MessagePart {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Value> for MessagePart {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// A complete log message, rendered as its parts joined by single spaces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message(Vec<MessagePart>);

impl Message {
    pub fn parts(&self) -> &[MessagePart] {
        &self.0
    }

    pub fn render(&self) -> String {
        self.0.iter().map(MessagePart::render).collect::<Vec<_>>().join(" ")
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Self(vec![value.into()])
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Self(vec![value.into()])
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self(vec![value.into()])
    }
}

impl From<MessagePart> for Message {
    fn from(value: MessagePart) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<MessagePart>> for Message {
    fn from(value: Vec<MessagePart>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[MessagePart; N]> for Message {
    fn from(value: [MessagePart; N]) -> Self {
        Self(value.into())
    }
}

/// Single-line structural rendering of a value
pub fn inspect(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(&b.to_string()),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_quoted(out, s),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(_) if depth > MAX_DEPTH => out.push_str("[Array]"),
        Value::Array(items) => {
            out.push_str("[ ");
            for (i, item) in items.iter().take(MAX_ENTRIES).enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth + 1);
            }
            write_remainder(out, items.len());
            out.push_str(" ]");
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(_) if depth > MAX_DEPTH => out.push_str("[Object]"),
        Value::Object(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().take(MAX_ENTRIES).enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_key(out, key);
                out.push_str(": ");
                write_value(out, item, depth + 1);
            }
            write_remainder(out, map.len());
            out.push_str(" }");
        }
    }
}

fn write_remainder(out: &mut String, len: usize) {
    if len > MAX_ENTRIES {
        let more = len - MAX_ENTRIES;
        out.push_str(&format!(", ... {more} more item{}", if more == 1 { "" } else { "s" }));
    }
}

fn write_key(out: &mut String, key: &str) {
    let bare = !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if bare {
        out.push_str(key);
    } else {
        write_quoted(out, key);
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
}
