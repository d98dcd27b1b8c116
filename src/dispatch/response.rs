//! Per-request outcomes.
//!
//! Wire shapes consumed by the invoking transport layer:
//! `{"status":"ok","data":...}` or `{"status":"error","error":{"code":...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DispatchError;

/// Success outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessOutcome {
    /// Always "ok"
    pub status: String,
    /// Handler return value
    pub data: Value,
}

impl SuccessOutcome {
    /// Create a success outcome
    pub fn new(data: Value) -> Self {
        Self {
            status: "ok".to_string(),
            data,
        }
    }
}

/// Error outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutcome {
    /// Always "error"
    pub status: String,
    /// Error body: code plus nested detail
    pub error: Value,
}

impl ErrorOutcome {
    /// Create from a dispatch error
    pub fn from_error(err: &DispatchError) -> Self {
        Self {
            status: "error".to_string(),
            error: err.to_value(),
        }
    }
}

/// Unified per-request outcome, index-aligned with the input requests.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Handler completed
    Success(SuccessOutcome),
    /// Some pipeline step failed
    Error(ErrorOutcome),
}

impl Outcome {
    /// Create a success outcome
    pub fn success(data: Value) -> Self {
        Outcome::Success(SuccessOutcome::new(data))
    }

    /// Create an error outcome
    pub fn error(err: &DispatchError) -> Self {
        Outcome::Error(ErrorOutcome::from_error(err))
    }

    /// Check if this is a success outcome
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Handler data for a success outcome
    pub fn data(&self) -> Option<&Value> {
        match self {
            Outcome::Success(outcome) => Some(&outcome.data),
            Outcome::Error(_) => None,
        }
    }

    /// Error code string for an error outcome
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Error(outcome) => outcome.error.get("code").and_then(Value::as_str),
        }
    }

    /// Renders the outcome as its wire value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("Outcome serialization cannot fail")
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Outcome serialization cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape() {
        let outcome = Outcome::success(json!({"sum": 3}));
        let value = outcome.to_value();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["data"]["sum"], 3);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_error_wire_shape() {
        let outcome = Outcome::error(&DispatchError::action_not_found("math", "mul"));
        let value = outcome.to_value();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], "ACTION_NOT_FOUND");
        assert_eq!(outcome.error_code(), Some("ACTION_NOT_FOUND"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_data_accessor() {
        assert_eq!(Outcome::success(json!(7)).data(), Some(&json!(7)));
        assert_eq!(
            Outcome::error(&DispatchError::service_field_missing()).data(),
            None
        );
    }
}
