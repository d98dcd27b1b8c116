//! Request envelope.
//!
//! Externally supplied and immutable per dispatch. Field presence is
//! checked by the pipeline, not at deserialization, so a malformed
//! envelope still gets its own structured outcome.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One request: service, action, and arbitrary structured arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Target service name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Target action name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Action arguments; absent arguments check as null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

impl RequestEnvelope {
    /// Create an envelope with arguments
    pub fn new(service: impl Into<String>, action: impl Into<String>, args: Value) -> Self {
        Self {
            service: Some(service.into()),
            action: Some(action.into()),
            args: Some(args),
        }
    }

    /// Parse an envelope from an untyped value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    // Empty strings count as missing, matching the truthiness test the
    // original request check applied.
    pub(crate) fn service_name(&self) -> Option<&str> {
        self.service.as_deref().filter(|s| !s.is_empty())
    }

    pub(crate) fn action_name(&self) -> Option<&str> {
        self.action.as_deref().filter(|s| !s.is_empty())
    }
}
