//! Record store primitives.
//!
//! Each logical table is one row in a SQLite `kv` table, keyed
//! `<namespace>_<table>` and holding the whole record array as JSON.
//! `<namespace>_<table>_sequence` holds the next id as a decimal
//! string, and `<namespace>_initialized` is the bootstrap marker. A
//! payload lifted out of the browser build of this store drops straight
//! into these keys.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::Store;
use crate::engine::Record;

pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );",
    )?;
    Ok(())
}

pub(crate) fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

pub(crate) fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )?;
    Ok(())
}

pub(crate) fn table_key(namespace: &str, table: &str) -> String {
    format!("{namespace}_{table}")
}

pub(crate) fn sequence_key(namespace: &str, table: &str) -> String {
    format!("{namespace}_{table}_sequence")
}

pub(crate) fn init_key(namespace: &str) -> String {
    format!("{namespace}_initialized")
}

/// Stored records of one table. A table that was never written, or
/// whose payload no longer parses, reads as empty rather than failing.
pub(crate) fn records(conn: &Connection, namespace: &str, table: &str) -> Result<Vec<Record>> {
    let Some(raw) = get(conn, &table_key(namespace, table))? else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_str(&raw).unwrap_or_default())
}

pub(crate) fn save(conn: &Connection, namespace: &str, table: &str, rows: &[Record]) -> Result<()> {
    let raw = serde_json::to_string(rows)?;
    put(conn, &table_key(namespace, table), &raw)
}

/// Hands out the next id for a table and advances the counter. Counters
/// start at 1 and only move forward, so an id is never reassigned even
/// after the record that held it is deleted.
pub(crate) fn next_id(conn: &Connection, namespace: &str, table: &str) -> Result<i64> {
    let key = sequence_key(namespace, table);
    let current = get(conn, &key)?
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1);
    put(conn, &key, &(current + 1).to_string())?;
    Ok(current)
}

impl Store {
    /// Raw contents of one table, in stored order.
    pub fn table_records(&self, table: &str) -> Result<Vec<Record>> {
        self.with_conn(|conn| records(conn, &self.namespace, table))
    }

    /// Wholesale-replaces a table's stored records. Last writer wins.
    pub fn save_records(&self, table: &str, rows: &[Record]) -> Result<()> {
        self.with_conn(|conn| save(conn, &self.namespace, table, rows))
    }

    /// Claims the next id from the table's sequence.
    pub fn next_record_id(&self, table: &str) -> Result<i64> {
        self.with_conn(|conn| next_id(conn, &self.namespace, table))
    }

    pub fn is_initialized(&self) -> Result<bool> {
        self.with_conn(|conn| {
            Ok(get(conn, &init_key(&self.namespace))?.as_deref() == Some("true"))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig};

    fn empty_store() -> Store {
        Store::open_in_memory(StoreConfig::new("unused.db").namespace("test").seed_demo(false))
            .unwrap()
    }

    #[test]
    fn missing_table_reads_as_empty() {
        let store = empty_store();
        assert!(store.table_records("no_such_table").unwrap().is_empty());
    }

    #[test]
    fn sequence_starts_at_one_and_advances() {
        let store = empty_store();
        assert_eq!(store.next_record_id("cards").unwrap(), 1);
        assert_eq!(store.next_record_id("cards").unwrap(), 2);
        // independent per table
        assert_eq!(store.next_record_id("lists").unwrap(), 1);
    }

    #[test]
    fn save_then_read_round_trips() {
        let store = empty_store();
        let rows = vec![
            serde_json::json!({"id": 1, "title": "a"})
                .as_object()
                .unwrap()
                .clone(),
        ];
        store.save_records("lists", &rows).unwrap();
        assert_eq!(store.table_records("lists").unwrap(), rows);
    }

    #[test]
    fn bootstrap_marker_is_set_even_without_demo_rows() {
        let store = empty_store();
        assert!(store.is_initialized().unwrap());
        assert!(store.table_records("users").unwrap().is_empty());
    }
}
