// Single-entity create/read/update/delete over one store.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::dispatch::{dispatch, Reply, Request, Verb};
use crate::error::{HandlerError, PublicError};
use crate::serialize::Payload;
use crate::store::{DomainObject, Store};

/// Immutable per-handler configuration.
#[derive(Debug, Clone)]
pub struct CrudConfig {
    /// Name of the path parameter holding the primary key.
    pub pk_param: String,
    /// Optional allow-list; on create/update, fields not on the list are
    /// silently dropped. `None` applies everything.
    pub allowed_fields: Option<HashSet<String>>,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            pk_param: "pk".to_string(),
            allowed_fields: None,
        }
    }
}

impl CrudConfig {
    pub fn allow_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

pub struct CrudHandler<S: Store> {
    store: S,
    config: CrudConfig,
}

impl<S: Store> CrudHandler<S> {
    pub fn new(store: S, config: CrudConfig) -> Self {
        Self { store, config }
    }

    /// Route on the request verb and wrap the operation in `dispatch`.
    pub fn handle(&self, request: &Request) -> Reply {
        dispatch(request, |req| match req.verb {
            Verb::Get => self.read(req),
            Verb::Post => self.create(req),
            Verb::Put | Verb::Patch => self.update(req),
            Verb::Delete => self.delete(req),
        })
    }

    /// Fetch one object by primary key.
    pub fn read(&self, request: &Request) -> Result<Payload, HandlerError> {
        let pk = self.require_pk(request)?;
        let object = self.store.fetch(pk)?;
        Ok(Payload::Object(object))
    }

    /// Construct a new object from the body fields, save it, and return the
    /// canonical re-fetched form (so e.g. a client-sent date string comes
    /// back normalized).
    pub fn create(&self, request: &Request) -> Result<Payload, HandlerError> {
        let fields = self.body_fields(request)?;
        let mut object = self.store.construct();
        self.apply_fields(object.as_mut(), fields);
        let pk = self.store.save(object)?;
        let canonical = self.store.fetch(&pk)?;
        Ok(Payload::Object(canonical))
    }

    /// Partial update: only fields present in the body are touched, omitted
    /// fields keep their prior values. Returns the canonical re-fetched
    /// object.
    pub fn update(&self, request: &Request) -> Result<Payload, HandlerError> {
        let pk = self.require_pk(request)?.to_string();
        let fields = self.body_fields(request)?;
        let mut object = self.store.fetch(&pk)?;
        self.apply_fields(object.as_mut(), fields);
        let pk = self.store.save(object)?;
        let canonical = self.store.fetch(&pk)?;
        Ok(Payload::Object(canonical))
    }

    /// Delete by primary key. The response echoes the identifier from the
    /// request, not the deleted object (which no longer exists).
    pub fn delete(&self, request: &Request) -> Result<Payload, HandlerError> {
        let pk = self.require_pk(request)?.to_string();
        let object = self.store.fetch(&pk)?;
        self.store.delete(object)?;

        let mut map = BTreeMap::new();
        map.insert("id".to_string(), Payload::Value(Value::String(pk)));
        Ok(Payload::Map(map))
    }

    fn require_pk<'a>(&self, request: &'a Request) -> Result<&'a str, HandlerError> {
        request.param(&self.config.pk_param).ok_or_else(|| {
            PublicError::invalid(format!("{} is not specified", self.config.pk_param)).into()
        })
    }

    fn body_fields(&self, request: &Request) -> Result<Map<String, Value>, HandlerError> {
        match request.json_body()? {
            Value::Object(map) => Ok(map),
            _ => Err(PublicError::invalid("request body must be a JSON object").into()),
        }
    }

    fn apply_fields(&self, object: &mut dyn DomainObject, fields: Map<String, Value>) {
        for (name, value) in fields {
            if let Some(allowed) = &self.config.allowed_fields {
                if !allowed.contains(&name) {
                    continue;
                }
            }
            object.set_field(&name, value);
        }
    }
}
