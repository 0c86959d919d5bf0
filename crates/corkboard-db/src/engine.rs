//! Generic CRUD over any table name.
//!
//! Records are plain JSON objects; the engine only interprets the
//! `id`, `created_at` and `updated_at` keys. Missing tables and missing
//! records are ordinary results (`None` / empty vec), never errors.
//! Errors surface only when the substrate itself fails.

use std::cmp::Ordering;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde_json::Value;

use crate::Store;
use crate::kv;

/// One stored record: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Single-field predicate shorthand for [`Store::find_by`] and friends.
pub fn by(field: &str, value: impl Into<Value>) -> Record {
    let mut predicate = Record::new();
    predicate.insert(field.to_string(), value.into());
    predicate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Single-field sort for [`Store::find_all`].
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads a record's id through a normalizer: numeric ids are taken as
/// written, string ids (seen in payloads imported from the browser
/// store) are parsed. Everything else has no id.
pub(crate) fn record_id(record: &Record) -> Option<i64> {
    normalize_id(record.get("id")?)
}

fn normalize_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Field equality with numbers compared numerically, so an integer `1`
/// matches a float `1.0` regardless of how the payload was serialized.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Predicate match for reads: a null predicate value matches a field
/// that is null or missing entirely.
fn matches_loose(record: &Record, predicate: &Record) -> bool {
    predicate.iter().all(|(key, expected)| {
        if expected.is_null() {
            record.get(key).is_none_or(Value::is_null)
        } else {
            record.get(key).is_some_and(|v| values_equal(v, expected))
        }
    })
}

/// Predicate match for `delete_by`: null matches only an explicit null
/// field, never an absent one.
fn matches_strict(record: &Record, predicate: &Record) -> bool {
    predicate
        .iter()
        .all(|(key, expected)| record.get(key).is_some_and(|v| values_equal(v, expected)))
}

/// Relational comparison used for sorting. Values of different shapes
/// compare as equal, which leaves their stored order untouched.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

pub(crate) fn insert_tx(
    conn: &Connection,
    namespace: &str,
    table: &str,
    mut fields: Record,
) -> Result<Record> {
    let id = kv::next_id(conn, namespace, table)?;
    let stamp = now_stamp();
    // engine-owned keys win over caller-supplied ones
    fields.insert("id".to_string(), Value::from(id));
    fields.insert("created_at".to_string(), Value::String(stamp.clone()));
    fields.insert("updated_at".to_string(), Value::String(stamp));

    let mut rows = kv::records(conn, namespace, table)?;
    rows.push(fields.clone());
    kv::save(conn, namespace, table, &rows)?;
    Ok(fields)
}

impl Store {
    /// Appends a record, assigning its id from the table sequence and
    /// stamping `created_at`/`updated_at`. Caller-supplied values for
    /// those three keys are overwritten.
    pub fn insert(&self, table: &str, fields: Record) -> Result<Record> {
        self.with_conn(|conn| insert_tx(conn, &self.namespace, table, fields))
    }

    /// First record whose id equals `id`, if any.
    pub fn find_by_id(&self, table: &str, id: i64) -> Result<Option<Record>> {
        let rows = self.table_records(table)?;
        Ok(rows.into_iter().find(|r| record_id(r) == Some(id)))
    }

    /// Every record matching all predicate fields, in stored order.
    pub fn find_by(&self, table: &str, predicate: &Record) -> Result<Vec<Record>> {
        let rows = self.table_records(table)?;
        Ok(rows
            .into_iter()
            .filter(|r| matches_loose(r, predicate))
            .collect())
    }

    /// All records, optionally sorted by one field. The sort is stable;
    /// ties keep their stored order.
    pub fn find_all(&self, table: &str, order: Option<OrderBy>) -> Result<Vec<Record>> {
        let mut rows = self.table_records(table)?;
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let left = a.get(&order.field).unwrap_or(&Value::Null);
                let right = b.get(&order.field).unwrap_or(&Value::Null);
                let ordering = compare_values(left, right);
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        Ok(rows)
    }

    /// Shallow-merges `fields` over the record with this id and stamps
    /// `updated_at`. Returns `None` without creating anything if the id
    /// does not exist. `id` and `created_at` are not patchable.
    pub fn update(&self, table: &str, id: i64, fields: Record) -> Result<Option<Record>> {
        self.with_conn(|conn| {
            let mut rows = kv::records(conn, &self.namespace, table)?;
            let Some(idx) = rows.iter().position(|r| record_id(r) == Some(id)) else {
                return Ok(None);
            };
            for (key, value) in fields {
                if key == "id" || key == "created_at" {
                    continue;
                }
                rows[idx].insert(key, value);
            }
            rows[idx].insert("updated_at".to_string(), Value::String(now_stamp()));
            kv::save(conn, &self.namespace, table, &rows)?;
            Ok(Some(rows[idx].clone()))
        })
    }

    /// Removes the first record with this id and returns it.
    pub fn delete(&self, table: &str, id: i64) -> Result<Option<Record>> {
        self.with_conn(|conn| {
            let mut rows = kv::records(conn, &self.namespace, table)?;
            let Some(idx) = rows.iter().position(|r| record_id(r) == Some(id)) else {
                return Ok(None);
            };
            let removed = rows.remove(idx);
            kv::save(conn, &self.namespace, table, &rows)?;
            Ok(Some(removed))
        })
    }

    /// Removes every record matching the predicate (strict null
    /// semantics) and returns them in stored order. The table is only
    /// rewritten when something actually matched.
    pub fn delete_by(&self, table: &str, predicate: &Record) -> Result<Vec<Record>> {
        self.with_conn(|conn| {
            let mut rows = kv::records(conn, &self.namespace, table)?;
            let mut removed = Vec::new();
            for idx in (0..rows.len()).rev() {
                if matches_strict(&rows[idx], predicate) {
                    removed.push(rows.remove(idx));
                }
            }
            if removed.is_empty() {
                return Ok(removed);
            }
            removed.reverse();
            kv::save(conn, &self.namespace, table, &rows)?;
            Ok(removed)
        })
    }
}
