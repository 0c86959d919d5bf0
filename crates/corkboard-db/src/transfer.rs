//! Whole-store export and import.
//!
//! The exchange format is one JSON object mapping table names to their
//! record arrays, the same shape a browser build of this store exports.

use std::collections::HashMap;

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::Record;
use crate::{Store, TABLES, kv};

impl Store {
    /// Serializes every known table into one JSON object keyed by table
    /// name.
    pub fn export_all(&self) -> Result<String> {
        self.with_conn(|conn| {
            let mut out = serde_json::Map::new();
            for table in TABLES {
                let rows = kv::records(conn, &self.namespace, table)?;
                out.insert(
                    (*table).to_string(),
                    Value::Array(rows.into_iter().map(Value::Object).collect()),
                );
            }
            Ok(serde_json::to_string(&out)?)
        })
    }

    /// Wholesale-replaces each known table present in the payload.
    /// Unknown table names are ignored and known tables absent from the
    /// payload keep their contents. Sequences are left alone: imported
    /// ids are kept as-is and later inserts continue from the existing
    /// counters. Returns `Ok(false)`, changing nothing, when the
    /// payload does not parse into table arrays of records.
    pub fn import_all(&self, payload: &str) -> Result<bool> {
        let parsed: HashMap<String, Vec<Record>> = match serde_json::from_str(payload) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("rejected import payload: {err}");
                return Ok(false);
            }
        };

        let applied = self.with_conn(|conn| {
            let mut applied = 0;
            for table in TABLES {
                if let Some(rows) = parsed.get(*table) {
                    kv::save(conn, &self.namespace, table, rows)?;
                    applied += 1;
                }
            }
            Ok(applied)
        })?;
        info!("import replaced {applied} tables");
        Ok(true)
    }
}
