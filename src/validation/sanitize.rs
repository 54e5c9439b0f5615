//! Text sanitization primitives.

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

/// Characters removed outright after markup stripping.
pub const STRIPPED_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Pattern matching markup-like fragments (`<...>`).
pub const TAG_PATTERN: &str = r"<[^>]*>";

/// Render any JSON value as text. `null` becomes the empty string.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| stringify(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Strip markup and dangerous characters, trim, and cap at `max_chars` characters.
///
/// The result never contains `<` or `>` and is a fixed point: sanitizing it
/// again returns it unchanged.
pub fn sanitize(input: &str, tag: &Regex, max_chars: usize) -> String {
    let without_tags = tag.replace_all(input, "");
    let cleaned: String = without_tags
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();

    let trimmed = cleaned.trim();
    match trimmed.char_indices().nth(max_chars) {
        // truncation can expose trailing whitespace
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Produce a filesystem-friendly name: word characters, Latin-1 letters,
/// spaces and hyphens survive, whitespace runs become `-`, lower-cased and
/// capped at 50 characters.
pub fn safe_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric()
                || *c == '_'
                || *c == '-'
                || c.is_whitespace()
                || ('\u{C0}'..='\u{FF}').contains(c)
        })
        .collect();

    let joined = kept.split_whitespace().collect::<Vec<_>>().join("-");
    let name: String = joined.to_lowercase().chars().take(50).collect();
    if name.is_empty() {
        "curriculo".to_string()
    } else {
        name
    }
}
