//! Dispatch error codes and the handler error carrier.
//!
//! Error codes:
//! - SERVICE_FIELD_MISSING / ACTION_FIELD_MISSING
//! - SERVICE_NOT_FOUND / ACTION_NOT_FOUND
//! - PARAMETER_VALIDATION_ERROR (carries the nested validation error)
//! - SERVICE_CALL_ERROR (carries the handler's error payload)

use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

use crate::schema::ErrorNode;

/// Dispatch-stage error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchCode {
    /// Request has no service field
    ServiceFieldMissing,
    /// Request has no action field
    ActionFieldMissing,
    /// Service key absent from the registry
    ServiceNotFound,
    /// Action key absent under an existing service
    ActionNotFound,
    /// Request arguments failed schema validation
    ParameterValidation,
    /// Handler signaled failure
    ServiceCall,
}

impl DispatchCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DispatchCode::ServiceFieldMissing => "SERVICE_FIELD_MISSING",
            DispatchCode::ActionFieldMissing => "ACTION_FIELD_MISSING",
            DispatchCode::ServiceNotFound => "SERVICE_NOT_FOUND",
            DispatchCode::ActionNotFound => "ACTION_NOT_FOUND",
            DispatchCode::ParameterValidation => "PARAMETER_VALIDATION_ERROR",
            DispatchCode::ServiceCall => "SERVICE_CALL_ERROR",
        }
    }
}

impl fmt::Display for DispatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A per-request dispatch failure.
///
/// The message is for logs and Display; the wire body is the code plus
/// the structured detail, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchError {
    code: DispatchCode,
    message: String,
    detail: Option<Value>,
}

impl DispatchError {
    /// Request has no service field
    pub fn service_field_missing() -> Self {
        Self {
            code: DispatchCode::ServiceFieldMissing,
            message: "Service field is missing from request".into(),
            detail: None,
        }
    }

    /// Request has no action field
    pub fn action_field_missing() -> Self {
        Self {
            code: DispatchCode::ActionFieldMissing,
            message: "Action field is missing from request".into(),
            detail: None,
        }
    }

    /// No such service registered
    pub fn service_not_found(service: &str) -> Self {
        Self {
            code: DispatchCode::ServiceNotFound,
            message: format!("Service '{}' not found", service),
            detail: None,
        }
    }

    /// No such action under the service
    pub fn action_not_found(service: &str, action: &str) -> Self {
        Self {
            code: DispatchCode::ActionNotFound,
            message: format!("Action '{}.{}' not found", service, action),
            detail: None,
        }
    }

    /// Arguments failed validation; carries the nested error tree
    pub fn parameter_validation(error: ErrorNode) -> Self {
        Self {
            code: DispatchCode::ParameterValidation,
            message: format!("Request parameters failed validation: {}", error),
            detail: Some(error.to_value()),
        }
    }

    /// Handler signaled failure; carries its error payload
    pub fn service_call(payload: Value) -> Self {
        Self {
            code: DispatchCode::ServiceCall,
            message: "Service call failed".into(),
            detail: Some(payload),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DispatchCode {
        self.code
    }

    /// Returns the log/Display message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured detail, if any
    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    /// Renders the wire error body: the code plus nested detail
    pub fn to_value(&self) -> Value {
        let mut body = json!({ "code": self.code.code() });
        if let Some(detail) = &self.detail {
            body["error"] = detail.clone();
        }
        body
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for DispatchError {}

/// Result type for dispatch pipeline steps
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Error carrier returned by handlers: a message plus an optional
/// structured payload.
///
/// `SERVICE_CALL_ERROR` unwraps one level: the payload travels on the
/// wire if present, otherwise the message does.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    payload: Option<Value>,
}

impl HandlerError {
    /// Create a carrier with a message only
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    /// Create a carrier with a structured payload
    pub fn with_payload(message: impl Into<String>, payload: Value) -> Self {
        Self {
            message: message.into(),
            payload: Some(payload),
        }
    }

    /// Returns the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured payload, if any
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub(crate) fn into_error_payload(self) -> Value {
        match self.payload {
            Some(payload) => payload,
            None => json!({ "message": self.message }),
        }
    }
}
