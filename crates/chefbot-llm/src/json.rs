//! Lenient JSON extraction from model replies.

use crate::error::{LlmError, Result};
use serde_json::Value;

/// Parses the JSON value embedded in a model reply.
///
/// The whole (trimmed) reply is tried first. Otherwise the span from the
/// first `{` to the last `}` is parsed, then the span from the first `[` to
/// the last `]`. A span that is found but does not parse is an error; the
/// next delimiter pair is not tried.
pub fn extract_json(raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(candidate) = delimited(raw, open, close) {
            return serde_json::from_str(candidate).map_err(LlmError::from);
        }
    }

    Err(LlmError::NoJson)
}

fn delimited(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_json("  {\"a\": 1}\n").unwrap(), json!({"a": 1}));
        assert_eq!(extract_json("42").unwrap(), json!(42));
    }

    #[test]
    fn test_object_inside_prose() {
        let raw = "Voici le plan :\n```json\n{\"steps\": [{\"id\": 1}]}\n```\nBon appétit";
        assert_eq!(extract_json(raw).unwrap(), json!({"steps": [{"id": 1}]}));
    }

    #[test]
    fn test_array_fallback() {
        let raw = "Liste: [1, 2, 3] fin";
        assert_eq!(extract_json(raw).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_broken_object_does_not_fall_back_to_array() {
        let raw = "{ pas du json } [1, 2]";
        assert!(matches!(extract_json(raw), Err(LlmError::Json(_))));
    }

    #[test]
    fn test_no_json() {
        let err = extract_json("Je ne sais pas.").unwrap_err();
        assert!(matches!(err, LlmError::NoJson));
        assert_eq!(err.to_string(), "JSON introuvable dans la réponse");

        assert!(matches!(extract_json("} avant {"), Err(LlmError::NoJson)));
    }
}
