use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{CaviarError, Result};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| CaviarError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            CaviarError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

impl Store for SqliteStore {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let value = conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO local_state (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    fn remove_value(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM local_state WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn entries_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM local_state WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;

        let entries = stmt
            .query_map(params![prefix], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_value() {
        let store = SqliteStore::in_memory().unwrap();
        store.set_value("caviar-reading-issue-1", "4").unwrap();
        assert_eq!(
            store.get_value("caviar-reading-issue-1").unwrap(),
            Some("4".to_string())
        );
    }

    #[test]
    fn test_get_missing_value() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get_value("nope").unwrap(), None);
    }

    #[test]
    fn test_set_value_overwrites() {
        let store = SqliteStore::in_memory().unwrap();
        store.set_value("k", "1").unwrap();
        store.set_value("k", "2").unwrap();
        assert_eq!(store.get_value("k").unwrap(), Some("2".to_string()));
        assert_eq!(store.entries_with_prefix("k").unwrap().len(), 1);
    }

    #[test]
    fn test_remove_value() {
        let store = SqliteStore::in_memory().unwrap();
        store.set_value("k", "1").unwrap();
        assert!(store.remove_value("k").unwrap());
        assert!(!store.remove_value("k").unwrap());
        assert_eq!(store.get_value("k").unwrap(), None);
    }

    #[test]
    fn test_entries_with_prefix_is_literal() {
        let store = SqliteStore::in_memory().unwrap();
        store.set_value("caviar-reading-b", "2").unwrap();
        store.set_value("caviar-reading-a", "1").unwrap();
        store.set_value("caviar_reading_x", "9").unwrap();
        store.set_value("other", "0").unwrap();

        let entries = store.entries_with_prefix("caviar-reading-").unwrap();
        assert_eq!(
            entries,
            vec![
                ("caviar-reading-a".to_string(), "1".to_string()),
                ("caviar-reading-b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caviar.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.set_value("caviar-reading-issue-7", "12").unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(
            reopened.get_value("caviar-reading-issue-7").unwrap(),
            Some("12".to_string())
        );
    }
}
