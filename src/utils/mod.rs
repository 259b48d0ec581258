use serde_json::Value;
use teloxide::utils::markdown;

pub use teloxide::utils::markdown::escape_code;

/// Escapes text for use outside code blocks in a MarkdownV2 message.
///
/// `markdown::escape` leaves backslashes alone, but MarkdownV2 treats them as
/// escapes too.
pub fn escape_markdown(text: &str) -> String {
    markdown::escape(&text.replace('\\', "\\\\"))
}

/// Indented JSON as shown in the dashboard blocks.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Strings are shown bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}
