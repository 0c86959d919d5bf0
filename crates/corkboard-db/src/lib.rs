//! Data-access layer for the corkboard kanban application.
//!
//! Records live as JSON arrays under namespaced keys in a single SQLite
//! key-value table, one key per logical table plus one per-table id
//! sequence. A generic CRUD engine operates on those arrays by table
//! name; typed wrappers and hand-rolled join queries sit on top. The
//! key layout is compatible with payloads exported from the browser
//! build of the store.

mod engine;
mod kv;
mod queries;
mod seed;
mod tables;
mod transfer;

pub use engine::{Direction, OrderBy, Record, by};

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Every table the store knows about. Seeding creates each of these up
/// front; import ignores any name outside this set.
pub const TABLES: &[&str] = &[
    "users",
    "boards",
    "board_members",
    "lists",
    "cards",
    "labels",
    "card_labels",
    "card_assignees",
    "checklist_items",
    "comments",
    "attachments",
    "activity_log",
];

const DEFAULT_NAMESPACE: &str = "corkboard";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Prefix for every storage key, e.g. `corkboard_cards`.
    pub namespace: String,
    /// Populate the sample workspace on first open.
    pub seed_demo: bool,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            seed_demo: true,
        }
    }

    pub fn from_env() -> Self {
        let db_path = std::env::var("CORKBOARD_DB_PATH").unwrap_or_else(|_| "corkboard.db".into());
        let namespace =
            std::env::var("CORKBOARD_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.into());
        let seed_demo = std::env::var("CORKBOARD_SEED_DEMO")
            .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
            .unwrap_or(true);
        Self {
            db_path: PathBuf::from(db_path),
            namespace,
            seed_demo,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn seed_demo(mut self, seed_demo: bool) -> Self {
        self.seed_demo = seed_demo;
        self
    }
}

/// Handle to one corkboard store. Constructed once at session start and
/// passed to whatever needs data access; there is no ambient global.
pub struct Store {
    conn: Mutex<Connection>,
    namespace: String,
}

impl Store {
    pub fn open(config: StoreConfig) -> Result<Self> {
        let conn = Connection::open(&config.db_path)?;

        // WAL mode for concurrent readers on the same file
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = Self::from_conn(conn, &config)?;
        info!("corkboard store opened at {}", config.db_path.display());
        Ok(store)
    }

    /// Ephemeral store for tests and scratch sessions.
    pub fn open_in_memory(config: StoreConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_conn(conn, &config)
    }

    fn from_conn(conn: Connection, config: &StoreConfig) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            namespace: config.namespace.clone(),
        };
        store.with_conn(kv::ensure_schema)?;
        store.bootstrap(config.seed_demo)?;
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Runs `f` with the connection locked. Every public operation goes
    /// through here once, so a full read-modify-write cycle is never
    /// interleaved with another caller's.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("store lock poisoned: {}", e))?;
        f(&conn)
    }
}
