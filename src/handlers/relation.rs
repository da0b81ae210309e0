// Many-to-many relation mutation: bulk add/remove of target objects on a
// named relation field of an owner object.

use std::collections::HashSet;

use serde_json::Value;

use crate::dispatch::{dispatch, Reply, Request, Verb};
use crate::error::{HandlerError, PublicError};
use crate::serialize::Payload;
use crate::store::{DomainObject, RelationTargets, Store};

/// Immutable relation-handler configuration.
#[derive(Debug, Clone)]
pub struct RelationConfig {
    /// Name of the path parameter holding the owner's primary key.
    pub pk_param: String,
    /// Name of the many-to-many field on the owner object.
    pub field_name: String,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            pk_param: "pk".to_string(),
            field_name: "targets".to_string(),
        }
    }
}

enum Mutation {
    Add,
    Remove,
}

/// Mutates one named relation of an owner type against a target type. The
/// two stores may be the same type for self-referential relations.
pub struct RelationHandler<S: Store, T: Store> {
    owners: S,
    targets: T,
    config: RelationConfig,
}

impl<S: Store, T: Store> RelationHandler<S, T> {
    pub fn new(owners: S, targets: T, config: RelationConfig) -> Self {
        Self {
            owners,
            targets,
            config,
        }
    }

    /// Route on the request verb and wrap the operation in `dispatch`.
    pub fn handle(&self, request: &Request) -> Reply {
        dispatch(request, |req| match req.verb {
            Verb::Post => self.add_targets(req),
            Verb::Put => self.replace_targets(req),
            Verb::Delete => self.remove_targets(req),
            Verb::Get | Verb::Patch => {
                Err(PublicError::invalid("method not allowed").into())
            }
        })
    }

    /// Bulk-add the matched targets, save, return the canonical owner.
    pub fn add_targets(&self, request: &Request) -> Result<Payload, HandlerError> {
        self.mutate(request, Mutation::Add)
    }

    /// PUT is kept as an alias of the add operation, not a true set-replace.
    pub fn replace_targets(&self, request: &Request) -> Result<Payload, HandlerError> {
        self.add_targets(request)
    }

    /// Bulk-remove the matched targets, save, return the canonical owner.
    pub fn remove_targets(&self, request: &Request) -> Result<Payload, HandlerError> {
        self.mutate(request, Mutation::Remove)
    }

    fn mutate(&self, request: &Request, mutation: Mutation) -> Result<Payload, HandlerError> {
        let pk = request
            .param(&self.config.pk_param)
            .ok_or_else(|| {
                PublicError::invalid(format!("{} is not specified", self.config.pk_param))
            })?
            .to_string();
        let pks = self.target_pks(request)?;

        let mut owner = self.owners.fetch(&pk)?;
        // A lookup filter: identifiers with no matching target are simply
        // not part of the mutation set.
        let found: Vec<_> = self.targets.filter_by_pks(&pks)?.collect();

        let relation = owner.relation(&self.config.field_name)?;
        match mutation {
            Mutation::Add => relation.add(found),
            Mutation::Remove => relation.remove(found),
        }

        let pk = self.owners.save(owner)?;
        let canonical = self.owners.fetch(&pk)?;
        Ok(Payload::Object(canonical))
    }

    /// Decode `{"pks": [...]}` from the body. Entries may be strings or
    /// numbers; anything else is a client error.
    fn target_pks(&self, request: &Request) -> Result<HashSet<String>, HandlerError> {
        let body = request.json_body()?;
        let entries = body
            .get("pks")
            .and_then(Value::as_array)
            .ok_or_else(|| PublicError::invalid("request body must contain a \"pks\" array"))?;

        entries
            .iter()
            .map(|entry| match entry {
                Value::String(pk) => Ok(pk.clone()),
                Value::Number(pk) => Ok(pk.to_string()),
                other => Err(PublicError::invalid(format!(
                    "\"pks\" entries must be identifiers, got {}",
                    other
                ))
                .into()),
            })
            .collect()
    }
}
