// Collection retrieval with an empty-result policy.

use crate::dispatch::{dispatch, Reply, Request, Verb};
use crate::error::{HandlerError, PublicError};
use crate::serialize::Payload;
use crate::store::Store;

/// Immutable list-handler configuration.
#[derive(Debug, Clone)]
pub struct ListConfig {
    /// When false, an empty collection is rejected with a distinctly tagged
    /// public error so callers can layer 404-style behavior on it.
    pub allow_empty: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { allow_empty: true }
    }
}

pub struct ListHandler<S: Store> {
    store: S,
    config: ListConfig,
}

impl<S: Store> ListHandler<S> {
    pub fn new(store: S, config: ListConfig) -> Self {
        Self { store, config }
    }

    pub fn handle(&self, request: &Request) -> Reply {
        dispatch(request, |req| match req.verb {
            Verb::Get => self.list(req),
            _ => Err(PublicError::invalid("method not allowed").into()),
        })
    }

    /// Return the lazy collection; serialization is what materializes it.
    pub fn list(&self, _request: &Request) -> Result<Payload, HandlerError> {
        let mut objects = self.store.query()?;
        if !self.config.allow_empty && objects.is_empty() {
            return Err(PublicError::empty_list("empty list is not allowed").into());
        }
        Ok(Payload::Collection(objects))
    }
}
