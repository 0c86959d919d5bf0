//! Typed wrappers over the generic engine.
//!
//! Entity structs from `corkboard-types` round-trip through the JSON
//! records the engine stores. Readers skip rows that no longer decode
//! into the expected shape, the same tolerance extended to dangling
//! foreign keys.

use anyhow::{Result, bail};
use corkboard_types::{Draft, Table};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Store;
use crate::engine::{OrderBy, Record};

fn to_record(value: &impl Serialize) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => bail!("expected an object payload, got {other}"),
    }
}

fn decode<T: DeserializeOwned>(record: Record) -> Option<T> {
    serde_json::from_value(Value::Object(record)).ok()
}

impl Store {
    /// Inserts a draft and returns the stored entity with its assigned
    /// id and timestamps.
    pub fn create<D: Draft>(&self, draft: &D) -> Result<D::Entity>
    where
        D::Entity: DeserializeOwned,
    {
        let stored = self.insert(D::Entity::NAME, to_record(draft)?)?;
        match decode(stored) {
            Some(entity) => Ok(entity),
            None => bail!("stored record did not decode as {}", D::Entity::NAME),
        }
    }

    pub fn get<T>(&self, id: i64) -> Result<Option<T>>
    where
        T: Table + DeserializeOwned,
    {
        Ok(self.find_by_id(T::NAME, id)?.and_then(decode))
    }

    pub fn list_where<T>(&self, predicate: &Record) -> Result<Vec<T>>
    where
        T: Table + DeserializeOwned,
    {
        let rows = self.find_by(T::NAME, predicate)?;
        Ok(rows.into_iter().filter_map(decode).collect())
    }

    pub fn list_all<T>(&self, order: Option<OrderBy>) -> Result<Vec<T>>
    where
        T: Table + DeserializeOwned,
    {
        let rows = self.find_all(T::NAME, order)?;
        Ok(rows.into_iter().filter_map(decode).collect())
    }

    /// Patches individual fields of an entity. The patch is an open
    /// record on purpose: partial updates have no natural typed shape.
    pub fn modify<T>(&self, id: i64, patch: Record) -> Result<Option<T>>
    where
        T: Table + DeserializeOwned,
    {
        Ok(self.update(T::NAME, id, patch)?.and_then(decode))
    }

    pub fn remove<T>(&self, id: i64) -> Result<Option<T>>
    where
        T: Table + DeserializeOwned,
    {
        Ok(self.delete(T::NAME, id)?.and_then(decode))
    }
}
