// Error taxonomy: client-caused failures whose messages are safe to
// surface, versus everything else.

use thiserror::Error;

use crate::store::StoreError;

/// Fixed client-visible text for Internal failures. The real detail is
/// logged server-side and never crosses the wire.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error occurred";

/// Classification of a client-visible failure, for callers that layer
/// status codes on top of the envelope. The wire envelope itself carries
/// only the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKind {
    /// Malformed or incomplete client input.
    Invalid,
    /// The requested object does not exist.
    NotFound,
    /// Empty collection where the list handler forbids empty results.
    EmptyList,
}

/// A client-caused failure whose message is surfaced verbatim.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PublicError {
    pub kind: PublicKind,
    pub message: String,
}

impl PublicError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: PublicKind::Invalid,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: PublicKind::NotFound,
            message: message.into(),
        }
    }

    pub fn empty_list(message: impl Into<String>) -> Self {
        Self {
            kind: PublicKind::EmptyList,
            message: message.into(),
        }
    }
}

/// Everything a handler operation can fail with.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Propagates its message verbatim to the client.
    #[error("{0}")]
    Public(#[from] PublicError),

    /// Logged in full, replaced by [`INTERNAL_ERROR_MESSAGE`] on the wire.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        match err {
            // A missing object is client-fixable, so it surfaces as a
            // public "not found" rather than an opaque failure.
            StoreError::NotFound => HandlerError::Public(PublicError::not_found("not found")),
            StoreError::Backend(err) => HandlerError::Internal(err),
        }
    }
}
