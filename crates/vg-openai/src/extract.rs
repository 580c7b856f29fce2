//! Pulling text and JSON out of Responses replies

use crate::error::{ClientError, ClientResult};
use crate::types::ResponsesReply;

/// Concatenate every `output_text` fragment of every `message` item
///
/// Fragments are joined with a single space and the result is trimmed.
/// Replies without messages yield an empty string.
pub fn extract_response_text(reply: &ResponsesReply) -> String {
    let parts: Vec<&str> = reply
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| item.content.iter())
        .filter(|part| part.kind == "output_text")
        .filter_map(|part| part.text.as_deref())
        .collect();

    parts.join(" ").trim().to_string()
}

/// The slice from the first `{` to the last `}`, if that is a non-empty span
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse model output as JSON, salvaging an object wrapped in prose
pub fn parse_json_object(text: &str) -> ClientResult<serde_json::Value> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) => {
            let candidate = extract_first_json_object(text).ok_or_else(|| {
                ClientError::MalformedResponse {
                    reason: err.to_string(),
                }
            })?;
            Ok(serde_json::from_str(candidate)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(value: serde_json::Value) -> ResponsesReply {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_joins_message_fragments() {
        let r = reply(json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "Guten"},
                    {"type": "refusal", "refusal": "nein"},
                    {"type": "output_text", "text": "Morgen! "}
                ]},
                {"type": "message", "content": [{"type": "output_text", "text": "Radio läuft."}]}
            ]
        }));
        assert_eq!(extract_response_text(&r), "Guten Morgen!  Radio läuft.");
    }

    #[test]
    fn test_extract_without_output() {
        assert_eq!(extract_response_text(&reply(json!({}))), "");
        assert_eq!(
            extract_response_text(&reply(json!({"output": [{"type": "message"}]}))),
            ""
        );
    }

    #[test]
    fn test_first_json_object() {
        assert_eq!(
            extract_first_json_object("Klar: {\"a\": {\"b\": 1}} fertig"),
            Some("{\"a\": {\"b\": 1}}")
        );
        assert_eq!(extract_first_json_object("kein json"), None);
        assert_eq!(extract_first_json_object("} verkehrt {"), None);
    }

    #[test]
    fn test_parse_json_object_salvages_prose() {
        assert_eq!(
            parse_json_object("{\"greeting\": \"Hi\"}").unwrap(),
            json!({"greeting": "Hi"})
        );
        assert_eq!(
            parse_json_object("Hier bitte:\n{\"greeting\": \"Hi\"}\nViel Spaß").unwrap(),
            json!({"greeting": "Hi"})
        );
        assert!(matches!(
            parse_json_object("nur Text"),
            Err(ClientError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_json_object("{kaputt}"),
            Err(ClientError::MalformedResponse { .. })
        ));
    }
}
