use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::schema::SCHEMA;
use crate::error::{Error, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MEMORY_ADDRESS: &str = ":memory:";

/// A bucketed key-value database in a single SQLite file.
///
/// Reads go through [`SqliteKv::view`], writes through [`SqliteKv::update`],
/// which runs the closure inside one transaction and commits only when it
/// returns `Ok`.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if db_path.as_os_str() == MEMORY_ADDRESS {
            return Self::open_in_memory();
        }

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::initialize(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn view<T, F>(&self, bucket: &str, f: F) -> Result<T>
    where
        F: FnOnce(&Bucket<'_>) -> Result<T>,
    {
        let conn = self.conn();
        f(&Bucket {
            conn: &*conn,
            name: bucket,
        })
    }

    pub fn update<T, F>(&self, bucket: &str, f: F) -> Result<T>
    where
        F: FnOnce(&Bucket<'_>) -> Result<T>,
    {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let out = f(&Bucket {
            conn: &*tx,
            name: bucket,
        })?;
        tx.commit()?;
        Ok(out)
    }
}

/// A named key space inside a [`SqliteKv`], valid for one view or update.
pub struct Bucket<'a> {
    conn: &'a Connection,
    name: &'a str,
}

impl Bucket<'_> {
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE bucket = ?1 AND key = ?2",
                params![self.name, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM kv WHERE bucket = ?1 AND key = ?2",
            params![self.name, key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (bucket, key, value, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.name, key, value],
        )?;
        Ok(())
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM kv WHERE bucket = ?1 AND key = ?2",
            params![self.name, key],
        )?;
        Ok(rows > 0)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv WHERE bucket = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![self.name], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(Error::from))
            .transpose()
    }

    pub fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.put(key, &bytes)
    }
}
