//! Best-effort recovery of JSON from free-form model replies.
//!
//! Precedence:
//!
//! 1. A fenced code block tagged `json`. When present, its content is the
//!    answer and must parse.
//! 2. The whole reply, if it already is valid JSON.
//! 3. The greedy span from the first `{` to the last `}`. When a `[` opens
//!    before any `{`, the `[`..`]` span is tried first and the brace span
//!    second. An object that opens first is never replaced by an array
//!    nested inside it.

use crate::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json[ \t]*\r?\n?(.*?)```").expect("fenced block pattern is valid")
});

/// Extract and parse the JSON payload of a model reply.
pub fn extract_json(text: &str) -> Result<Value> {
    if let Some(captures) = FENCED_JSON.captures(text) {
        let inner = captures.get(1).map_or("", |m| m.as_str()).trim();
        return serde_json::from_str(inner)
            .map_err(|e| Error::Parse(format!("fenced json block: {e}")));
    }

    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let mut last_error = None;
    for span in candidate_spans(trimmed) {
        match serde_json::from_str(span) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    Err(Error::Parse(match last_error {
        Some(e) => e.to_string(),
        None => "no JSON found in model output".to_string(),
    }))
}

fn candidate_spans(text: &str) -> Vec<&str> {
    let object = greedy_span(text, '{', '}');
    let array = greedy_span(text, '[', ']');

    let array_first = match (text.find('{'), text.find('[')) {
        (Some(brace), Some(bracket)) => bracket < brace,
        (None, Some(_)) => true,
        _ => false,
    };

    if array_first {
        [array, object].into_iter().flatten().collect()
    } else {
        object.into_iter().collect()
    }
}

fn greedy_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_block_inside_prose() {
        let reply = "Sure! Here is the data:\n```json\n{\"a\":1}\n```\nLet me know.";
        assert_eq!(extract_json(reply).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn fenced_block_tag_is_case_insensitive() {
        let reply = "```JSON\n[1, 2]\n```";
        assert_eq!(extract_json(reply).unwrap(), json!([1, 2]));
    }

    #[test]
    fn fenced_block_wins_over_other_braces() {
        let reply = "Ignore {this}.\n```json\n{\"b\":2}\n```";
        assert_eq!(extract_json(reply).unwrap(), json!({"b": 2}));
    }

    #[test]
    fn malformed_fenced_block_is_a_parse_error() {
        let reply = "```json\n{\"a\": }\n```";
        assert!(matches!(extract_json(reply), Err(Error::Parse(_))));
    }

    #[test]
    fn bare_json_reply() {
        assert_eq!(
            extract_json("  [{\"id\": \"x\"}]  ").unwrap(),
            json!([{"id": "x"}])
        );
    }

    #[test]
    fn greedy_braces_in_prose() {
        let reply = "The result is {\"title\": \"Nurse\", \"nested\": {\"x\": 1}} as requested.";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!({"title": "Nurse", "nested": {"x": 1}})
        );
    }

    #[test]
    fn array_in_prose_is_not_cut_to_its_first_object() {
        let reply = "Paths: [{\"title\": \"A\"}, {\"title\": \"B\"}] -- done";
        assert_eq!(
            extract_json(reply).unwrap(),
            json!([{"title": "A"}, {"title": "B"}])
        );
    }

    #[test]
    fn bracketed_prose_falls_back_to_object() {
        let reply = "[note] answer: {\"a\": true}";
        assert_eq!(extract_json(reply).unwrap(), json!({"a": true}));
    }

    #[test]
    fn malformed_object_does_not_fall_back_to_nested_array() {
        let reply = "{\"careers\": [1, 2], \"note\": \"x\"} (see {above}";
        assert!(matches!(extract_json(reply), Err(Error::Parse(_))));
    }

    #[test]
    fn no_json_is_a_parse_error() {
        assert!(matches!(
            extract_json("I cannot help with that."),
            Err(Error::Parse(_))
        ));
    }
}
