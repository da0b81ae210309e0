// Shared fixture for the integration suites: a typed playlist/track domain
// with in-memory stores implementing the persistence traits.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use json_crud::serialize::Serializable;
use json_crud::store::{DomainObject, QueryResult, RelationTargets, Store, StoreError};

/// A playlist with a many-to-many "tracks" relation.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    pub pk: Option<String>,
    pub name: Option<String>,
    pub published_on: Option<String>,
    pub tracks: BTreeSet<String>,
}

impl Serializable for Playlist {
    fn as_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("name".into(), json!(self.name));
        dict.insert("published_on".into(), json!(self.published_on));
        dict.insert(
            "tracks".into(),
            Value::Array(self.tracks.iter().cloned().map(Value::String).collect()),
        );
        dict.insert("pk".into(), json!(self.pk));
        dict
    }
}

impl DomainObject for Playlist {
    fn pk(&self) -> Option<String> {
        self.pk.clone()
    }

    fn set_field(&mut self, name: &str, value: Value) {
        match name {
            "name" => self.name = value.as_str().map(str::to_string),
            "published_on" => self.published_on = value.as_str().map(str::to_string),
            // fields the model does not know are dropped here; coercion
            // belongs to the store
            _ => {}
        }
    }

    fn relation(&mut self, field: &str) -> Result<&mut dyn RelationTargets, StoreError> {
        match field {
            "tracks" => Ok(&mut self.tracks),
            other => Err(StoreError::Backend(anyhow!(
                "playlist has no relation {:?}",
                other
            ))),
        }
    }
}

#[derive(Clone, Default)]
pub struct PlaylistStore {
    playlists: Arc<Mutex<BTreeMap<String, Playlist>>>,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, pk: &str) -> bool {
        self.playlists.lock().unwrap().contains_key(pk)
    }
}

/// Accepts both a bare date and a full RFC 3339 timestamp; stores the
/// canonical RFC 3339 UTC form either way.
fn normalize_published_on(raw: &str) -> Result<String, StoreError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| StoreError::Backend(anyhow!("unrepresentable date {:?}", raw)))?;
        return Ok(midnight.and_utc().to_rfc3339());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc).to_rfc3339())
        .map_err(|err| StoreError::Backend(anyhow!("invalid published_on {:?}: {}", raw, err)))
}

impl Store for PlaylistStore {
    fn fetch(&self, pk: &str) -> Result<Box<dyn DomainObject>, StoreError> {
        let playlists = self.playlists.lock().unwrap();
        let playlist = playlists.get(pk).ok_or(StoreError::NotFound)?;
        Ok(Box::new(playlist.clone()))
    }

    fn construct(&self) -> Box<dyn DomainObject> {
        Box::new(Playlist::default())
    }

    fn save(&self, object: Box<dyn DomainObject>) -> Result<String, StoreError> {
        let dict = object.as_dict();
        let pk = match dict.get("pk") {
            Some(Value::String(pk)) => pk.clone(),
            _ => Uuid::new_v4().to_string(),
        };
        let playlist = Playlist {
            pk: Some(pk.clone()),
            name: dict.get("name").and_then(Value::as_str).map(str::to_string),
            published_on: match dict.get("published_on").and_then(Value::as_str) {
                Some(raw) => Some(normalize_published_on(raw)?),
                None => None,
            },
            tracks: dict
                .get("tracks")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        };
        self.playlists.lock().unwrap().insert(pk.clone(), playlist);
        Ok(pk)
    }

    fn delete(&self, object: Box<dyn DomainObject>) -> Result<(), StoreError> {
        let pk = object.pk().ok_or(StoreError::NotFound)?;
        self.playlists
            .lock()
            .unwrap()
            .remove(&pk)
            .ok_or(StoreError::NotFound)?;
        Ok(())
    }

    fn query(&self) -> Result<QueryResult, StoreError> {
        let playlists = self.playlists.lock().unwrap();
        let items: Vec<Box<dyn DomainObject>> = playlists
            .values()
            .map(|playlist| Box::new(playlist.clone()) as Box<dyn DomainObject>)
            .collect();
        Ok(QueryResult::new(items.into_iter()))
    }

    fn filter_by_pks(&self, pks: &HashSet<String>) -> Result<QueryResult, StoreError> {
        let playlists = self.playlists.lock().unwrap();
        let items: Vec<Box<dyn DomainObject>> = playlists
            .values()
            .filter(|playlist| {
                playlist
                    .pk
                    .as_ref()
                    .map(|pk| pks.contains(pk))
                    .unwrap_or(false)
            })
            .map(|playlist| Box::new(playlist.clone()) as Box<dyn DomainObject>)
            .collect();
        Ok(QueryResult::new(items.into_iter()))
    }
}

/// Relation target: a track with a title and no relations of its own.
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub pk: Option<String>,
    pub title: Option<String>,
}

impl Serializable for Track {
    fn as_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("title".into(), json!(self.title));
        dict.insert("pk".into(), json!(self.pk));
        dict
    }
}

impl DomainObject for Track {
    fn pk(&self) -> Option<String> {
        self.pk.clone()
    }

    fn set_field(&mut self, name: &str, value: Value) {
        if name == "title" {
            self.title = value.as_str().map(str::to_string);
        }
    }

    fn relation(&mut self, field: &str) -> Result<&mut dyn RelationTargets, StoreError> {
        Err(StoreError::Backend(anyhow!(
            "track has no relation {:?}",
            field
        )))
    }
}

#[derive(Clone, Default)]
pub struct TrackStore {
    tracks: Arc<Mutex<BTreeMap<String, Track>>>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one track directly, bypassing the handler path.
    pub fn seed(&self, pk: &str, title: &str) {
        self.tracks.lock().unwrap().insert(
            pk.to_string(),
            Track {
                pk: Some(pk.to_string()),
                title: Some(title.to_string()),
            },
        );
    }
}

impl Store for TrackStore {
    fn fetch(&self, pk: &str) -> Result<Box<dyn DomainObject>, StoreError> {
        let tracks = self.tracks.lock().unwrap();
        let track = tracks.get(pk).ok_or(StoreError::NotFound)?;
        Ok(Box::new(track.clone()))
    }

    fn construct(&self) -> Box<dyn DomainObject> {
        Box::new(Track::default())
    }

    fn save(&self, object: Box<dyn DomainObject>) -> Result<String, StoreError> {
        let dict = object.as_dict();
        let pk = match dict.get("pk") {
            Some(Value::String(pk)) => pk.clone(),
            _ => Uuid::new_v4().to_string(),
        };
        let track = Track {
            pk: Some(pk.clone()),
            title: dict.get("title").and_then(Value::as_str).map(str::to_string),
        };
        self.tracks.lock().unwrap().insert(pk.clone(), track);
        Ok(pk)
    }

    fn delete(&self, object: Box<dyn DomainObject>) -> Result<(), StoreError> {
        let pk = object.pk().ok_or(StoreError::NotFound)?;
        self.tracks
            .lock()
            .unwrap()
            .remove(&pk)
            .ok_or(StoreError::NotFound)?;
        Ok(())
    }

    fn query(&self) -> Result<QueryResult, StoreError> {
        let tracks = self.tracks.lock().unwrap();
        let items: Vec<Box<dyn DomainObject>> = tracks
            .values()
            .map(|track| Box::new(track.clone()) as Box<dyn DomainObject>)
            .collect();
        Ok(QueryResult::new(items.into_iter()))
    }

    fn filter_by_pks(&self, pks: &HashSet<String>) -> Result<QueryResult, StoreError> {
        let tracks = self.tracks.lock().unwrap();
        let items: Vec<Box<dyn DomainObject>> = tracks
            .values()
            .filter(|track| track.pk.as_ref().map(|pk| pks.contains(pk)).unwrap_or(false))
            .map(|track| Box::new(track.clone()) as Box<dyn DomainObject>)
            .collect();
        Ok(QueryResult::new(items.into_iter()))
    }
}
