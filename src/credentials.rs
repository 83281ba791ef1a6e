//! Durable credential storage.
//!
//! The console keeps one credential triple {access token, user id, password}
//! per API origin so a restarted process can resume its session without
//! prompting. The triple is written and cleared as a unit — a partially
//! cleared row would let a stale token masquerade as a live session.
//!
//! Storage is abstracted behind a trait so tests run against an in-memory
//! impl; the real backend is a small SQLite database with the same
//! `user_version` migration scheme used elsewhere.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Current schema version. Increment when making schema changes.
const SCHEMA_VERSION: i32 = 1;

/// The persisted session triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: String,
    pub user_id: String,
    pub password: String,
}

/// Contract of the credential substrate: durable key-value rows, synchronous
/// read/write, keyed per API origin.
pub trait CredentialStore: Send + Sync {
    /// Read the triple for this origin, None when absent.
    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Write the triple for this origin (upsert semantics, all three fields
    /// together).
    fn save(&self, credentials: &StoredCredentials) -> Result<()>;

    /// Remove the triple for this origin. Idempotent.
    fn clear(&self) -> Result<()>;
}

/// SQLite-backed credential store.
///
/// Uses a `Mutex<Connection>` because `rusqlite::Connection` is not `Sync`.
/// Callers on async paths wrap operations in `tokio::task::spawn_blocking`.
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
    origin: String,
}

impl SqliteCredentialStore {
    /// Open or create the credential database at the given path.
    pub fn open(path: &Path, origin: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open credential database at {:?}", path))?;
        let store = Self {
            conn: Mutex::new(conn),
            origin: origin.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database (for testing).
    pub fn open_in_memory(origin: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to open in-memory credential database")?;
        let store = Self {
            conn: Mutex::new(conn),
            origin: origin.to_string(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");

        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if current_version > SCHEMA_VERSION {
            anyhow::bail!(
                "Credential database schema version {} is newer than supported version {}",
                current_version,
                SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS credentials (
                    origin       TEXT PRIMARY KEY,
                    access_token TEXT NOT NULL,
                    user_id      TEXT NOT NULL,
                    password     TEXT NOT NULL
                )",
            )
            .context("Failed to create credentials table")?;
        }

        if current_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.query_row(
            "SELECT access_token, user_id, password FROM credentials WHERE origin = ?1",
            params![self.origin],
            |row| {
                Ok(StoredCredentials {
                    access_token: row.get(0)?,
                    user_id: row.get(1)?,
                    password: row.get(2)?,
                })
            },
        )
        .optional()
        .context("Failed to read credentials")
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute(
            "INSERT INTO credentials (origin, access_token, user_id, password)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(origin) DO UPDATE SET
                 access_token = excluded.access_token,
                 user_id = excluded.user_id,
                 password = excluded.password",
            params![
                self.origin,
                credentials.access_token,
                credentials.user_id,
                credentials.password
            ],
        )
        .context("Failed to write credentials")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute(
            "DELETE FROM credentials WHERE origin = ?1",
            params![self.origin],
        )
        .context("Failed to clear credentials")?;
        Ok(())
    }
}

/// In-memory credential store for tests.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.inner.lock().expect("mutex poisoned").clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.inner.lock().expect("mutex poisoned") = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().expect("mutex poisoned") = None;
        Ok(())
    }
}
