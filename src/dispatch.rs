// Request lifecycle: receive, run the verb-specific operation, serialize,
// wrap. This is the single boundary where failures are caught and
// classified; handler code above it never needs its own top-level catch.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, error};

use crate::envelope::Envelope;
use crate::error::{HandlerError, PublicError, PublicKind, INTERNAL_ERROR_MESSAGE};
use crate::serialize::Payload;

/// HTTP-shaped verb of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

/// One inbound operation: verb, named path parameters, optional raw body.
/// Immutable for the duration of one dispatch, discarded afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    pub verb: Verb,
    params: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            params: HashMap::new(),
            body: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Decode the body as JSON. A missing or malformed body is a client
    /// problem, not an internal one.
    pub fn json_body(&self) -> Result<Value, PublicError> {
        let bytes = self
            .body
            .as_deref()
            .ok_or_else(|| PublicError::invalid("request body is required"))?;
        serde_json::from_slice(bytes)
            .map_err(|err| PublicError::invalid(format!("invalid JSON body: {}", err)))
    }
}

/// Terminal state of one dispatch. Exactly one is reached per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    PublicFailed(PublicKind),
    InternalFailed,
}

/// What a dispatch produces: the wire envelope, plus the terminal state for
/// callers that decide status codes (the envelope body never varies with
/// the status policy).
#[derive(Debug)]
pub struct Reply {
    pub outcome: Outcome,
    pub envelope: Envelope,
}

impl Reply {
    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }
}

/// Run one handler operation and produce exactly one envelope. Public
/// messages pass through verbatim; anything else is logged in full and
/// replaced with the fixed generic message. No retries on either path.
pub fn dispatch<F>(request: &Request, handler: F) -> Reply
where
    F: FnOnce(&Request) -> Result<Payload, HandlerError>,
{
    match handler(request) {
        Ok(payload) => Reply {
            outcome: Outcome::Succeeded,
            envelope: Envelope::payload(payload),
        },
        Err(HandlerError::Public(err)) => {
            debug!(
                verb = request.verb.as_str(),
                kind = ?err.kind,
                "request rejected: {}",
                err.message
            );
            Reply {
                outcome: Outcome::PublicFailed(err.kind),
                envelope: Envelope::error(err.message),
            }
        }
        Err(HandlerError::Internal(err)) => {
            error!(
                verb = request.verb.as_str(),
                "handler failed: {:#}",
                err
            );
            Reply {
                outcome: Outcome::InternalFailed,
                envelope: Envelope::error(INTERNAL_ERROR_MESSAGE),
            }
        }
    }
}
