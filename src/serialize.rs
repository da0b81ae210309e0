// Polymorphic serialization of handler results into JSON-safe values.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::store::QueryResult;

/// Capability every domain object supports: conversion to its canonical
/// plain mapping. Keys are field names, plus a `pk` key holding the
/// identifier. The result is assumed to be JSON-safe already.
pub trait Serializable {
    fn as_dict(&self) -> Map<String, Value>;
}

/// A handler result before serialization.
///
/// Variant order is the serializer's resolution order: capability dispatch
/// first, then mappings, then sequences and lazy query results, then JSON
/// primitives passed through unchanged. Structures nest arbitrarily deep.
pub enum Payload {
    /// A domain object; serialized via its [`Serializable`] capability.
    Object(Box<dyn Serializable>),
    /// A mapping; each value is serialized recursively, keys preserved.
    Map(BTreeMap<String, Payload>),
    /// A finite sequence; each element is serialized recursively, in order.
    List(Vec<Payload>),
    /// A lazy result set; serialization is what triggers iteration.
    Collection(QueryResult),
    /// Already a JSON primitive (string, number, boolean, null).
    Value(Value),
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Object(_) => f.write_str("Payload::Object"),
            Payload::Map(map) => write!(f, "Payload::Map({} entries)", map.len()),
            Payload::List(items) => write!(f, "Payload::List({} items)", items.len()),
            Payload::Collection(_) => f.write_str("Payload::Collection"),
            Payload::Value(value) => write!(f, "Payload::Value({})", value),
        }
    }
}

/// Convert a payload into a JSON-safe value, recursively. Total: every
/// variant serializes, and nothing is mutated along the way (payloads are
/// consumed, collections are iterated exactly once).
pub fn serialize(payload: Payload) -> Value {
    match payload {
        Payload::Object(object) => Value::Object(object.as_dict()),
        Payload::Map(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, serialize(value)))
                .collect(),
        ),
        Payload::List(items) => Value::Array(items.into_iter().map(serialize).collect()),
        Payload::Collection(result) => {
            Value::Array(result.map(|object| Value::Object(object.as_dict())).collect())
        }
        Payload::Value(value) => value,
    }
}
