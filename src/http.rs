// Axum glue. The core is framework-agnostic; this is the one place that
// knows about HTTP methods and status codes. Status policy: the envelope
// body is identical regardless of status, so callers that always return
// 200 can use `Reply::into_envelope` instead.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::dispatch::{Outcome, Reply, Request, Verb};
use crate::error::PublicKind;

/// Map an HTTP method onto a dispatchable verb.
pub fn verb_for_method(method: &Method) -> Option<Verb> {
    match method.as_str() {
        "GET" => Some(Verb::Get),
        "POST" => Some(Verb::Post),
        "PUT" => Some(Verb::Put),
        "PATCH" => Some(Verb::Patch),
        "DELETE" => Some(Verb::Delete),
        _ => None,
    }
}

/// Build a dispatchable request from extracted HTTP parts. `None` means the
/// method has no verb mapping and the route should answer 405 itself.
pub fn build_request<I>(method: &Method, params: I, body: &[u8]) -> Option<Request>
where
    I: IntoIterator<Item = (String, String)>,
{
    let verb = verb_for_method(method)?;
    let mut request = Request::new(verb);
    for (name, value) in params {
        request = request.with_param(name, value);
    }
    if !body.is_empty() {
        request = request.with_body(body.to_vec());
    }
    Some(request)
}

/// Status code for a dispatch outcome.
pub fn status_for(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Succeeded => StatusCode::OK,
        Outcome::PublicFailed(PublicKind::Invalid) => StatusCode::BAD_REQUEST,
        Outcome::PublicFailed(PublicKind::NotFound)
        | Outcome::PublicFailed(PublicKind::EmptyList) => StatusCode::NOT_FOUND,
        Outcome::InternalFailed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (status_for(self.outcome), Json(self.envelope)).into_response()
    }
}
