//! SQLite connection management for the cookie jar.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and automatically runs schema migrations on open.

use rusqlite::{params, Connection};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::migrations;
use crate::types::cookie::StoredCookie;

/// Cookie jar database wrapper.
///
/// The `Database` struct owns a `rusqlite::Connection` and ensures that
/// all required tables and indexes are created when the database is opened.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        migrations::run_all(&db.conn)?;
        Ok(db)
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// The database is discarded when the `Database` is dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        migrations::run_all(&db.conn)?;
        Ok(db)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Reads every cookie in the jar, ordered by domain, path and name.
    pub fn load_cookies(&self) -> Result<Vec<StoredCookie>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, domain, path, raw FROM cookies ORDER BY domain, path, name")?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredCookie {
                name: row.get(0)?,
                domain: row.get(1)?,
                path: row.get(2)?,
                raw: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    /// Replaces the jar contents with `cookies` in a single transaction.
    ///
    /// Readers never observe a half-written jar.
    pub fn replace_cookies(&self, cookies: &[StoredCookie]) -> Result<(), rusqlite::Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cookies", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR REPLACE INTO cookies (name, domain, path, raw, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for cookie in cookies {
                insert.execute(params![cookie.name, cookie.domain, cookie.path, cookie.raw, now])?;
            }
        }
        tx.commit()
    }
}
