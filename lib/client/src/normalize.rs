//! Turning execution responses into displayable text.
//!
//! The execute endpoint has answered in several shapes over time: an
//! envelope with `data`, an object with `response`, a bare string or an
//! arbitrary object. All of them go through [`execution_content`].

use serde_json::Value as JsonValue;

/// Extracts the content of an execution response.
///
/// Precedence: `data` when present and non-null, then `response`, then
/// the body itself. Strings are returned verbatim, anything else is
/// pretty-printed JSON. A `null` body yields an empty string.
#[must_use]
pub fn execution_content(body: &JsonValue) -> String {
    let payload = ["data", "response"]
        .into_iter()
        .find_map(|key| body.get(key).filter(|value| !value.is_null()))
        .unwrap_or(body);
    render(payload)
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_wins_over_response() {
        let body = json!({ "success": true, "data": "from data", "response": "from response" });
        assert_eq!(execution_content(&body), "from data");
    }

    #[test]
    fn null_data_falls_through_to_response() {
        let body = json!({ "data": null, "response": "answer" });
        assert_eq!(execution_content(&body), "answer");
    }

    #[test]
    fn bare_string_is_verbatim() {
        assert_eq!(execution_content(&json!("plain answer")), "plain answer");
    }

    #[test]
    fn structured_payload_is_pretty_printed() {
        let body = json!({ "data": { "price": 187.5 } });
        assert_eq!(execution_content(&body), "{\n  \"price\": 187.5\n}");
    }

    #[test]
    fn whole_body_when_no_known_key() {
        let body = json!({ "result": 42 });
        assert_eq!(execution_content(&body), "{\n  \"result\": 42\n}");
    }

    #[test]
    fn null_body_is_empty() {
        assert_eq!(execution_content(&JsonValue::Null), "");
    }
}
