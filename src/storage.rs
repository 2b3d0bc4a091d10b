// 💾 Persistence Adapter - Ledger + display name in a durable key-value store
//
// Two string-keyed entries, overwritten together on every write:
//   expense-tracker-transactions → JSON array of transactions
//   expense-tracker-username     → plain display name
//
// Both land in one batch or neither does. No schema versions, single writer.

use crate::ledger::Ledger;
use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

pub const TRANSACTIONS_KEY: &str = "expense-tracker-transactions";
pub const USERNAME_KEY: &str = "expense-tracker-username";

// ============================================================================
// KEY-VALUE STORE
// ============================================================================

/// Minimal durable string store the adapter writes through
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Write every entry, or none of them when any write fails
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        (**self).set_many(entries)
    }
}

/// SQLite-backed store: one `kv` table in a WAL-journaled file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`, creating parent directories
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        info!("opened store at {}", path.display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_store(&conn)?;
        Ok(Self { conn })
    }
}

const UPSERT_SQL: &str = "INSERT INTO kv (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                    updated_at = CURRENT_TIMESTAMP";

pub fn setup_store(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("journal_mode = {}", mode);

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .with_context(|| format!("Failed to read key '{}'", key))?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(UPSERT_SQL, params![key, value])
            .with_context(|| format!("Failed to write key '{}'", key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to remove key '{}'", key))?;
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        // Dropping the transaction on an early return rolls it back
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(UPSERT_SQL, params![key, value])
                .with_context(|| format!("Failed to write key '{}'", key))?;
        }
        tx.commit().context("Failed to commit write batch")?;
        Ok(())
    }
}

/// Volatile store for tests and `--memory` runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

// ============================================================================
// PERSISTENCE ADAPTER
// ============================================================================

/// What was found in storage at startup
#[derive(Debug, Clone, PartialEq)]
pub struct StoredState {
    pub ledger: Ledger,
    /// None when no name was ever saved
    pub user_name: Option<String>,
}

pub struct Persistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read ledger and name; absent keys mean empty ledger / no name
    pub fn load(&self) -> Result<StoredState> {
        let ledger = match self.store.get(TRANSACTIONS_KEY)? {
            Some(json) => serde_json::from_str::<Ledger>(&json)
                .with_context(|| format!("Stored data under '{}' is not a valid transaction list", TRANSACTIONS_KEY))?,
            None => Ledger::new(),
        };
        let user_name = self.store.get(USERNAME_KEY)?;

        debug!(
            "loaded {} transactions, name {}",
            ledger.len(),
            if user_name.is_some() { "present" } else { "absent" }
        );

        Ok(StoredState { ledger, user_name })
    }

    /// Overwrite both entries with the current state in one batch
    pub fn save(&mut self, ledger: &Ledger, user_name: &str) -> Result<()> {
        let json = serde_json::to_string(ledger)?;
        self.store
            .set_many(&[(TRANSACTIONS_KEY, json.as_str()), (USERNAME_KEY, user_name)])
            .context("Failed to save ledger and name")?;
        Ok(())
    }
}
