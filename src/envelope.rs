// The fixed response envelope, the only wire shape clients observe.

use serde::Serialize;
use serde_json::{json, Value};

use crate::serialize::{serialize, Payload};

/// Exactly one of `{"payload": ...}` or `{"error": "..."}`. Never both
/// keys, never any other top-level key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Payload(Value),
    Error(String),
}

impl Envelope {
    /// Success envelope; serializes the payload into a JSON-safe value.
    pub fn payload(payload: Payload) -> Self {
        Envelope::Payload(serialize(payload))
    }

    /// Failure envelope around a client-visible message.
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(message.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Envelope::Payload(payload) => json!({ "payload": payload }),
            Envelope::Error(message) => json!({ "error": message }),
        }
    }
}
