use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::sync::MutexGuard;
use tracing::warn;

use crate::error::{MoodshelfError, Result};
use crate::mapper::decode_timestamp;
use crate::models::{LibraryFilterState, SmartShelf};

use super::Repository;

pub trait SmartShelfRepository: Repository<Entity = SmartShelf, Id = String> {
    fn list(&self) -> Result<Vec<SmartShelf>>;
    fn rename(&self, id: &str, name: &str) -> Result<SmartShelf>;
}

pub struct SqliteSmartShelfRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> SqliteSmartShelfRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn row_to_shelf(row: &rusqlite::Row) -> rusqlite::Result<SmartShelf> {
        let id: String = row.get(0)?;
        let filter_json: Option<String> = row.get(2)?;
        let filter = match filter_json.as_deref().map(serde_json::from_str::<LibraryFilterState>) {
            Some(Ok(filter)) => filter,
            Some(Err(e)) => {
                warn!(shelf = %id, "Unreadable shelf filter, using an empty filter: {e}");
                LibraryFilterState::default()
            }
            None => LibraryFilterState::default(),
        };

        let created_at = shelf_timestamp(&id, "created_at", row.get(3)?);
        let updated_at = shelf_timestamp(&id, "updated_at", row.get(4)?);

        Ok(SmartShelf {
            id,
            name: row.get(1)?,
            filter,
            created_at,
            updated_at,
        })
    }
}

/// Stored shelf timestamp, or the Unix epoch when the column cannot be read.
fn shelf_timestamp(shelf: &str, column: &str, raw: Option<String>) -> DateTime<Utc> {
    match decode_timestamp(raw.as_deref()) {
        Some(ts) => ts,
        None => {
            warn!(shelf, column, raw = ?raw, "Unreadable shelf timestamp, using the Unix epoch");
            DateTime::<Utc>::default()
        }
    }
}

impl<'a> Repository for SqliteSmartShelfRepository<'a> {
    type Entity = SmartShelf;
    type Id = String;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, filter_json, created_at, updated_at
             FROM smart_shelves WHERE id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_shelf) {
            Ok(shelf) => Ok(Some(shelf)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, shelf: &Self::Entity) -> Result<()> {
        let filter_json = serde_json::to_string(&shelf.filter)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO smart_shelves (id, name, filter_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                shelf.id,
                shelf.name,
                filter_json,
                shelf.created_at.to_rfc3339(),
                shelf.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM smart_shelves WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> SmartShelfRepository for SqliteSmartShelfRepository<'a> {
    fn list(&self) -> Result<Vec<SmartShelf>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, filter_json, created_at, updated_at
             FROM smart_shelves ORDER BY name COLLATE NOCASE",
        )?;
        let shelves = stmt
            .query_map([], Self::row_to_shelf)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(shelves)
    }

    fn rename(&self, id: &str, name: &str) -> Result<SmartShelf> {
        let mut shelf = self
            .find_by_id(&id.to_string())?
            .ok_or_else(|| MoodshelfError::ShelfNotFound(id.to_string()))?;
        shelf.rename(name)?;
        self.save(&shelf)?;
        Ok(shelf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoodTag, ReadableType};
    use crate::storage::database::open_in_memory;

    #[test]
    fn test_save_find_list() {
        let pool = open_in_memory().unwrap();
        let repo = SqliteSmartShelfRepository::new(pool.get_connection());

        let filter = LibraryFilterState {
            types: vec![ReadableType::Fanfic],
            mood_tags: vec![MoodTag::Cozy],
            ..Default::default()
        };
        let shelf = SmartShelf::new("cozy fics", filter.clone()).unwrap();
        repo.save(&shelf).unwrap();
        repo.save(&SmartShelf::new("All books", LibraryFilterState::default()).unwrap())
            .unwrap();

        let loaded = repo.find_by_id(&shelf.id).unwrap().unwrap();
        assert_eq!(loaded, shelf);

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["All books", "cozy fics"]);
    }

    #[test]
    fn test_rename() {
        let pool = open_in_memory().unwrap();
        let repo = SqliteSmartShelfRepository::new(pool.get_connection());
        let shelf = SmartShelf::new("Old", LibraryFilterState::default()).unwrap();
        repo.save(&shelf).unwrap();

        let renamed = repo.rename(&shelf.id, "New").unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(repo.find_by_id(&shelf.id).unwrap().unwrap().name, "New");

        let err = repo.rename("missing", "X").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_corrupt_filter_falls_back() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        conn.execute(
            "INSERT INTO smart_shelves (id, name, filter_json) VALUES ('s', 'Broken', '[1,2')",
            [],
        )
        .unwrap();
        let repo = SqliteSmartShelfRepository::new(conn);

        let shelf = repo.find_by_id(&"s".to_string()).unwrap().unwrap();
        assert!(shelf.filter.is_empty());
    }

    #[test]
    fn test_corrupt_timestamp_falls_back_to_epoch() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        conn.execute(
            "INSERT INTO smart_shelves (id, name, created_at) VALUES ('s', 'Dated', 'last tuesday')",
            [],
        )
        .unwrap();
        let repo = SqliteSmartShelfRepository::new(conn);

        let shelf = repo.find_by_id(&"s".to_string()).unwrap().unwrap();
        assert_eq!(shelf.created_at, DateTime::<Utc>::default());
        assert_ne!(shelf.updated_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_shelf_timestamp_parses_both_formats() {
        let rfc = shelf_timestamp("s", "created_at", Some("2025-06-01T12:00:00+00:00".to_string()));
        let sqlite = shelf_timestamp("s", "created_at", Some("2025-06-01 12:00:00".to_string()));
        assert_eq!(rfc, sqlite);
        assert_eq!(shelf_timestamp("s", "updated_at", None), DateTime::<Utc>::default());
    }

    #[test]
    fn test_delete() {
        let pool = open_in_memory().unwrap();
        let repo = SqliteSmartShelfRepository::new(pool.get_connection());
        let shelf = SmartShelf::new("Temp", LibraryFilterState::default()).unwrap();
        repo.save(&shelf).unwrap();
        assert!(repo.delete(&shelf.id).unwrap());
        assert!(repo.find_by_id(&shelf.id).unwrap().is_none());
    }
}
