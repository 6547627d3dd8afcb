//! JSON response format: the system prompt requesting it and the validator
//! checking what actually came back.
//!
//! Models are not guaranteed to honor formatting instructions, so
//! [`validate_json_response`] is total: any input yields `Valid` or `Invalid`,
//! never a panic or an error the caller has to recover from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const JSON_SYSTEM_PROMPT: &str = r#"You must answer ONLY with a JSON object. Do not use any other text, explanations or formatting.
Your answer must be valid JSON that can be parsed directly.

Example of a correct answer:
{"status": "success", "data": {"content": "Your answer here"}, "error": null}

Example of an error answer:
{"status": "error", "data": null, "error": "Error description"}

Example of JSON for structured data:
{
  "name": "John Doe",
  "age": 30,
  "isStudent": false,
  "courses": [
    "History",
    "Math"
  ],
  "address": {
    "street": "123 Main St",
    "city": "Anytown"
  }
}

Make sure the JSON is syntactically correct and contains all required fields."#;

/// Fixed instruction directing the model to answer as a bare envelope object.
pub fn json_system_prompt() -> &'static str {
    JSON_SYSTEM_PROMPT
}

/// Wraps raw user text with the JSON instruction. The caller decides whether
/// to take this path; text-format messages go out unmodified.
pub fn format_prompt_for_json(user_text: &str) -> String {
    format!(
        "{}\n\nUser request:\n{}\n\nAnswer in JSON format:",
        json_system_prompt(),
        user_text
    )
}

/// The structured shape requested of the model in JSON mode.
///
/// Invariant (enforced by the validator, not the type): exactly one of
/// `data`/`error` is present, consistent with `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    pub data: Option<Value>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(Envelope),
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }
}

/// Strict structural check of a model reply against the envelope shape.
pub fn validate_json_response(raw_text: &str) -> ValidationResult {
    let value: Value = match serde_json::from_str(raw_text.trim()) {
        Ok(v) => v,
        Err(e) => return ValidationResult::Invalid(format!("invalid JSON: {}", e)),
    };

    let object = match value.as_object() {
        Some(o) => o,
        None => return ValidationResult::Invalid("response is not a JSON object".to_string()),
    };

    for field in ["status", "data", "error"] {
        if !object.contains_key(field) {
            return ValidationResult::Invalid(format!("missing required field: {}", field));
        }
    }

    let status = match object.get("status").and_then(Value::as_str) {
        Some(s @ ("success" | "error")) => s,
        Some(other) => return ValidationResult::Invalid(format!("invalid status: {:?}", other)),
        None => return ValidationResult::Invalid("status must be a string".to_string()),
    };

    let data = &object["data"];
    let error = &object["error"];
    match status {
        "success" => {
            if data.is_null() {
                return ValidationResult::Invalid(
                    "status is \"success\" but data is null".to_string(),
                );
            }
            if !error.is_null() {
                return ValidationResult::Invalid(
                    "status is \"success\" but error is set".to_string(),
                );
            }
        }
        _ => {
            if !error.is_string() {
                return ValidationResult::Invalid(
                    "status is \"error\" but error is not a string".to_string(),
                );
            }
            if !data.is_null() {
                return ValidationResult::Invalid(
                    "status is \"error\" but data is set".to_string(),
                );
            }
        }
    }

    ValidationResult::Valid(Envelope {
        status: status.to_string(),
        data: (!data.is_null()).then(|| data.clone()),
        error: error.as_str().map(str::to_string),
        metadata: object.get("metadata").filter(|m| !m.is_null()).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_success_envelope() {
        let raw = r#"{"status":"success","data":{"content":"4"},"error":null}"#;
        match validate_json_response(raw) {
            ValidationResult::Valid(envelope) => {
                assert_eq!(envelope.status, "success");
                assert_eq!(envelope.data, Some(json!({"content": "4"})));
                assert_eq!(envelope.error, None);
            }
            ValidationResult::Invalid(reason) => panic!("expected valid, got: {}", reason),
        }
    }

    #[test]
    fn accepts_error_envelope() {
        let raw = r#"{"status":"error","data":null,"error":"model refused"}"#;
        let result = validate_json_response(raw);
        assert!(result.is_valid(), "got {:?}", result);
    }

    #[test]
    fn accepts_surrounding_whitespace_and_metadata() {
        let raw = "  \n{\"status\":\"success\",\"data\":{},\"error\":null,\"metadata\":{\"latency_ms\":12}}\n";
        match validate_json_response(raw) {
            ValidationResult::Valid(envelope) => {
                assert_eq!(envelope.metadata, Some(json!({"latency_ms": 12})));
            }
            ValidationResult::Invalid(reason) => panic!("expected valid, got: {}", reason),
        }
    }

    #[test]
    fn total_over_arbitrary_input() {
        let inputs = [
            "",
            "   ",
            "plain prose, definitely not JSON",
            "{",
            r#"{"status":"success","data":{"#,
            "[1, 2, 3]",
            "42",
            "\"a string\"",
            "null",
            "{}",
        ];
        for input in inputs {
            match validate_json_response(input) {
                ValidationResult::Invalid(_) => {}
                ValidationResult::Valid(envelope) => {
                    panic!("expected invalid for {:?}, got {:?}", input, envelope)
                }
            }
        }
    }

    #[test]
    fn rejects_missing_fields() {
        let result = validate_json_response(r#"{"status":"success","data":{"x":1}}"#);
        assert_eq!(
            result,
            ValidationResult::Invalid("missing required field: error".to_string())
        );
    }

    #[test]
    fn rejects_unknown_status() {
        let result = validate_json_response(r#"{"status":"ok","data":{"x":1},"error":null}"#);
        assert!(matches!(result, ValidationResult::Invalid(reason) if reason.contains("status")));
    }

    #[test]
    fn rejects_non_string_status() {
        let result = validate_json_response(r#"{"status":200,"data":{"x":1},"error":null}"#);
        assert!(!result.is_valid());
    }

    #[test]
    fn success_with_error_set_violates_exclusivity() {
        let raw = r#"{"status":"success","data":{"x":1},"error":"also an error"}"#;
        assert!(!validate_json_response(raw).is_valid());
    }

    #[test]
    fn error_with_data_set_violates_exclusivity() {
        let raw = r#"{"status":"error","data":{"x":1},"error":"boom"}"#;
        assert!(!validate_json_response(raw).is_valid());
    }

    #[test]
    fn success_with_null_data_is_invalid() {
        let raw = r#"{"status":"success","data":null,"error":null}"#;
        assert!(!validate_json_response(raw).is_valid());
    }

    #[test]
    fn json_prompt_wraps_user_text() {
        let prompt = format_prompt_for_json("What is 2+2?");
        assert!(prompt.starts_with(json_system_prompt()));
        assert!(prompt.contains("What is 2+2?"));
        assert!(prompt.ends_with("Answer in JSON format:"));
    }
}
