use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// On-disk copy of fulfilled entities, one row per (slice, key)
///
/// Lets the app start warm and browse what it last saw while offline.
/// Values are stored as JSON so record shapes can grow without a migration;
/// rows that no longer decode are skipped on load.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
}

impl SnapshotStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entities (
                slice TEXT NOT NULL,
                key TEXT NOT NULL,
                data TEXT NOT NULL,
                cached_at INTEGER NOT NULL,
                PRIMARY KEY (slice, key)
            )",
            [],
        )?;
        Ok(())
    }

    pub fn save<V: Serialize>(&self, slice: &str, key: &str, value: &V) -> Result<()> {
        let data = serde_json::to_string(value)?;
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO entities (slice, key, data, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![slice, key, data, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Write many entries in one transaction
    pub fn save_all<V: Serialize>(&self, slice: &str, entries: &[(String, V)]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO entities (slice, key, data, cached_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (key, value) in entries {
                let data = serde_json::to_string(value)?;
                stmt.execute(params![slice, key, data, now])?;
            }
        }
        tx.commit()?;

        debug!(slice, count = entries.len(), "Snapshot saved");
        Ok(entries.len())
    }

    pub fn load<V: DeserializeOwned>(&self, slice: &str, key: &str) -> Result<Option<V>> {
        let data: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT data FROM entities WHERE slice = ?1 AND key = ?2",
                params![slice, key],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub fn load_all<V: DeserializeOwned>(&self, slice: &str) -> Result<Vec<(String, V)>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT key, data FROM entities WHERE slice = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![slice], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (key, data) = row?;
            match serde_json::from_str(&data) {
                Ok(value) => entries.push((key, value)),
                Err(e) => warn!(slice, key = %key, "Skipping unreadable snapshot row: {}", e),
            }
        }

        Ok(entries)
    }

    pub fn remove(&self, slice: &str, key: &str) -> Result<bool> {
        let removed = self.conn.lock().execute(
            "DELETE FROM entities WHERE slice = ?1 AND key = ?2",
            params![slice, key],
        )?;
        Ok(removed > 0)
    }

    pub fn clear(&self, slice: &str) -> Result<usize> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM entities WHERE slice = ?1", params![slice])?;
        Ok(removed)
    }

    pub fn count(&self, slice: &str) -> Result<usize> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM entities WHERE slice = ?1",
            params![slice],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete rows cached longer ago than `max_age`
    pub fn prune_older_than(&self, max_age: chrono::Duration) -> Result<usize> {
        let cutoff = (chrono::Utc::now() - max_age).timestamp();
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM entities WHERE cached_at < ?1", params![cutoff])?;
        if removed > 0 {
            debug!(removed, "Pruned stale snapshot rows");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Quote {
        id: String,
        text: String,
    }

    fn quote(id: &str, text: &str) -> Quote {
        Quote {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = SnapshotStore::in_memory().unwrap();
        store.save("quotes", "Q1", &quote("Q1", "Lift heavy")).unwrap();

        let loaded: Option<Quote> = store.load("quotes", "Q1").unwrap();
        assert_eq!(loaded, Some(quote("Q1", "Lift heavy")));

        let missing: Option<Quote> = store.load("quotes", "Q2").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_slices_are_separate() {
        let store = SnapshotStore::in_memory().unwrap();
        store
            .save_all(
                "quotes",
                &[
                    ("Q1".to_string(), quote("Q1", "one")),
                    ("Q2".to_string(), quote("Q2", "two")),
                ],
            )
            .unwrap();
        store.save("favourites", "Q1", &quote("Q1", "one")).unwrap();

        assert_eq!(store.count("quotes").unwrap(), 2);
        assert_eq!(store.clear("favourites").unwrap(), 1);
        assert_eq!(store.count("quotes").unwrap(), 2);

        let all: Vec<(String, Quote)> = store.load_all("quotes").unwrap();
        assert_eq!(all[0].0, "Q1");
        assert_eq!(all[1].1.text, "two");
    }

    #[test]
    fn test_unreadable_rows_are_skipped() {
        let store = SnapshotStore::in_memory().unwrap();
        store.save("quotes", "Q1", &quote("Q1", "ok")).unwrap();
        store.save("quotes", "Q2", &"just a string").unwrap();

        let all: Vec<(String, Quote)> = store.load_all("quotes").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "Q1");
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.db");

        {
            let store = SnapshotStore::open(&path).unwrap();
            store.save("quotes", "Q1", &quote("Q1", "persisted")).unwrap();
        }

        let store = SnapshotStore::open(&path).unwrap();
        let loaded: Option<Quote> = store.load("quotes", "Q1").unwrap();
        assert_eq!(loaded.unwrap().text, "persisted");
        assert!(store.remove("quotes", "Q1").unwrap());
        assert!(!store.remove("quotes", "Q1").unwrap());
    }

    #[test]
    fn test_prune() {
        let store = SnapshotStore::in_memory().unwrap();
        store.save("quotes", "Q1", &quote("Q1", "fresh")).unwrap();

        assert_eq!(store.prune_older_than(chrono::Duration::hours(1)).unwrap(), 0);
        assert_eq!(store.prune_older_than(chrono::Duration::seconds(-5)).unwrap(), 1);
        assert_eq!(store.count("quotes").unwrap(), 0);
    }
}
