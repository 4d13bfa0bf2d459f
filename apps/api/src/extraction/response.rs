//! Pulls the rule object out of free-form model output.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("no JSON object in model response")]
    NoObject,

    #[error("malformed JSON object in model response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parses the first top-level JSON object in `text`.
///
/// Parsing starts at the first `{` and stops at the end of that object, so
/// prose or code fences around it are ignored.
pub fn first_json_object(text: &str) -> Result<Map<String, Value>, ResponseError> {
    let start = text.find('{').ok_or(ResponseError::NoObject)?;
    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<Map<String, Value>>()
        .next()
        .ok_or(ResponseError::NoObject)?
        .map_err(ResponseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let object = first_json_object(r#"{"margin": {"top": 4}}"#).unwrap();
        assert_eq!(object["margin"]["top"], 4);
    }

    #[test]
    fn test_object_wrapped_in_prose_and_fences() {
        let text = "Here are the rules:\n```json\n{\"paper\": {\"size\": \"A4\"}}\n```\nLet me know {if} you need more.";
        let object = first_json_object(text).unwrap();
        assert_eq!(object["paper"]["size"], "A4");
    }

    #[test]
    fn test_nested_braces_in_strings() {
        let object = first_json_object(r#"{"title": "A {curly} title", "n": 1} trailing"#).unwrap();
        assert_eq!(object["title"], "A {curly} title");
    }

    #[test]
    fn test_no_object() {
        assert!(matches!(
            first_json_object("I could not find any rules."),
            Err(ResponseError::NoObject)
        ));
    }

    #[test]
    fn test_malformed_object() {
        assert!(matches!(
            first_json_object(r#"{"margin": {"top": 4,}}"#),
            Err(ResponseError::Malformed(_))
        ));
    }
}
