use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::domain::Sector;
use crate::errors::{DigestError, DigestResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sectors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    query TEXT,
    feed_url TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS seen_deals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    sector TEXT NOT NULL,
    published_on TEXT NOT NULL,
    seen_at TEXT NOT NULL,
    UNIQUE (link, published_on)
);

CREATE INDEX IF NOT EXISTS idx_seen_deals_seen_at ON seen_deals(seen_at);
"#;

/// Bumped once the default sectors have been written, so a user who removes
/// every sector does not get them back on the next run.
const SEEDED_VERSION: i64 = 1;

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> DigestResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Self::seed_defaults(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Unseeded in-memory database
    pub fn in_memory() -> DigestResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DigestError> {
        self.conn
            .lock()
            .map_err(|_| DigestError::Database(rusqlite::Error::InvalidQuery))
    }

    fn seed_defaults(conn: &Connection) -> DigestResult<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SEEDED_VERSION {
            return Ok(());
        }

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sectors", [], |row| row.get(0))?;
        if count == 0 {
            for sector in Sector::defaults() {
                conn.execute(
                    "INSERT INTO sectors (name, query, feed_url, position) VALUES (?1, ?2, ?3, ?4)",
                    (&sector.name, &sector.query, &sector.feed_url, sector.position),
                )?;
            }
            tracing::info!("Seeded default sectors");
        }

        conn.execute_batch(&format!("PRAGMA user_version = {};", SEEDED_VERSION))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sector_count(storage: &SqliteStorage) -> i64 {
        let conn = storage.connection().unwrap();
        conn.query_row("SELECT COUNT(*) FROM sectors", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_in_memory_has_tables_but_no_sectors() {
        let storage = SqliteStorage::in_memory().unwrap();
        let conn = storage.connection().unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('sectors', 'seen_deals')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        drop(conn);

        assert_eq!(tables, 2);
        assert_eq!(sector_count(&storage), 0);
    }

    #[test]
    fn test_file_database_seeded_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("digest.db");

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(sector_count(&storage), 4);

        storage
            .connection()
            .unwrap()
            .execute("DELETE FROM sectors", [])
            .unwrap();
        drop(storage);

        // Reopening must not bring the defaults back
        let reopened = SqliteStorage::new(&path).unwrap();
        assert_eq!(sector_count(&reopened), 0);
    }
}
