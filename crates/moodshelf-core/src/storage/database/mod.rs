mod connection;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use migrations::{Migration, get_applied_versions, run_migrations, run_migrations_up_to};
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use crate::error::{MoodshelfError, Result};
use crate::models::{LibraryFilterState, ReadableItem, ReadableStatus, SmartShelf};

use super::queries::{LibraryStats, LibraryStatsQuery};
use super::repositories::{
    ReadableRepository, Repository, SmartShelfRepository, SqliteReadableRepository,
    SqliteSmartShelfRepository,
};

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// The readable store. Every load passes through the row mapper, so callers
/// only ever see reconciled [`ReadableItem`]s.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    fn readables(&self) -> SqliteReadableRepository<'_> {
        SqliteReadableRepository::new(self.pool.get_connection())
    }

    fn shelves(&self) -> SqliteSmartShelfRepository<'_> {
        SqliteSmartShelfRepository::new(self.pool.get_connection())
    }

    // ─── Readables ─────────────────────────────────────────

    pub fn upsert_readable(&self, item: &ReadableItem) -> Result<()> {
        self.readables().save(item)
    }

    pub fn get_readable(&self, id: &str) -> Result<ReadableItem> {
        self.readables()
            .find_by_id(&id.to_string())?
            .ok_or_else(|| MoodshelfError::ItemNotFound(id.to_string()))
    }

    pub fn list_readables(&self, limit: usize, offset: usize) -> Result<Vec<ReadableItem>> {
        self.readables().list(limit, offset)
    }

    pub fn list_all_readables(&self) -> Result<Vec<ReadableItem>> {
        self.readables().list_all()
    }

    /// Items still in the queue: to read or in progress.
    pub fn list_open_readables(&self) -> Result<Vec<ReadableItem>> {
        self.readables()
            .list_by_status(&[ReadableStatus::ToRead, ReadableStatus::InProgress])
    }

    pub fn delete_readable(&self, id: &str) -> Result<()> {
        if !self.readables().delete(&id.to_string())? {
            return Err(MoodshelfError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn count_readables(&self) -> Result<usize> {
        self.readables().count()
    }

    pub fn stats(&self) -> Result<LibraryStats> {
        LibraryStatsQuery::new(self.pool.get_connection()).get_stats()
    }

    // ─── Smart shelves ─────────────────────────────────────

    pub fn create_shelf(&self, name: &str, filter: LibraryFilterState) -> Result<SmartShelf> {
        let shelf = SmartShelf::new(name, filter)?;
        self.shelves().save(&shelf)?;
        Ok(shelf)
    }

    pub fn get_shelf(&self, id: &str) -> Result<SmartShelf> {
        self.shelves()
            .find_by_id(&id.to_string())?
            .ok_or_else(|| MoodshelfError::ShelfNotFound(id.to_string()))
    }

    /// Finds a shelf by id, or by case-insensitive name.
    pub fn find_shelf(&self, id_or_name: &str) -> Result<SmartShelf> {
        if let Some(shelf) = self.shelves().find_by_id(&id_or_name.to_string())? {
            return Ok(shelf);
        }
        let needle = id_or_name.trim().to_lowercase();
        self.list_shelves()?
            .into_iter()
            .find(|s| s.name.to_lowercase() == needle)
            .ok_or_else(|| MoodshelfError::ShelfNotFound(id_or_name.to_string()))
    }

    pub fn list_shelves(&self) -> Result<Vec<SmartShelf>> {
        self.shelves().list()
    }

    pub fn rename_shelf(&self, id: &str, name: &str) -> Result<SmartShelf> {
        self.shelves().rename(id, name)
    }

    pub fn delete_shelf(&self, id: &str) -> Result<()> {
        if !self.shelves().delete(&id.to_string())? {
            return Err(MoodshelfError::ShelfNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Resolves a shelf's filter against the current library.
    pub fn list_readables_for_shelf(&self, id: &str) -> Result<Vec<ReadableItem>> {
        let shelf = self.get_shelf(id)?;
        let items = self.list_all_readables()?;
        Ok(shelf.filter.apply(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoodTag, ReadableKind, ReadableType};
    use crate::suggestion::{SuggestionContext, SuggestionFilters, run_suggestion_engine};

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();

        let mut book = ReadableItem::new_book("Book A", "Author A");
        book.priority = 3;
        book.mood_tags = vec![MoodTag::Cozy, MoodTag::Mysterious];
        db.upsert_readable(&book).unwrap();

        let mut fic = ReadableItem::new_fanfic("Fanfic B", "Author B");
        fic.priority = 5;
        fic.mood_tags = vec![MoodTag::Epic];
        if let ReadableKind::Fanfic(details) = &mut fic.kind {
            details.chapter_count = Some(10);
            details.complete = Some(false);
        }
        db.upsert_readable(&fic).unwrap();

        let mut done = ReadableItem::new_book("Done", "C");
        done.status = ReadableStatus::Finished;
        db.upsert_readable(&done).unwrap();

        db
    }

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count_readables().unwrap(), 0);
    }

    #[test]
    fn test_get_missing_readable() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_readable("nope"),
            Err(MoodshelfError::ItemNotFound(_))
        ));
        assert!(db.delete_readable("nope").is_err());
    }

    #[test]
    fn test_open_readables_exclude_finished() {
        let db = seeded();
        assert_eq!(db.count_readables().unwrap(), 3);
        assert_eq!(db.list_open_readables().unwrap().len(), 2);
    }

    #[test]
    fn test_open_readables_match_mapped_status() {
        let db = Database::open_in_memory().unwrap();
        db.pool
            .get_connection()
            .execute_batch(
                "INSERT INTO readables (id, type, title, status) VALUES ('a', 'book', 'A', NULL);
                 INSERT INTO readables (id, type, title, status) VALUES ('b', 'fanfic', 'B', 'in-progress');",
            )
            .unwrap();

        let open = db.list_open_readables().unwrap();
        let mapped_open = db
            .list_all_readables()
            .unwrap()
            .iter()
            .filter(|i| i.status.is_open())
            .count();
        assert_eq!(open.len(), 2);
        assert_eq!(open.len(), mapped_open);

        let stats = db.stats().unwrap();
        assert_eq!((stats.to_read, stats.in_progress), (1, 1));
    }

    #[test]
    fn test_shelf_lifecycle() {
        let db = seeded();
        let shelf = db
            .create_shelf(
                "Fics",
                LibraryFilterState {
                    types: vec![ReadableType::Fanfic],
                    ..Default::default()
                },
            )
            .unwrap();

        let items = db.list_readables_for_shelf(&shelf.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Fanfic B");

        assert_eq!(db.find_shelf("fics").unwrap().id, shelf.id);
        db.rename_shelf(&shelf.id, "Fan works").unwrap();
        assert_eq!(db.get_shelf(&shelf.id).unwrap().name, "Fan works");

        db.delete_shelf(&shelf.id).unwrap();
        assert!(db.get_shelf(&shelf.id).unwrap_err().is_not_found());
        assert!(db.list_shelves().unwrap().is_empty());
    }

    #[test]
    fn test_suggestion_over_stored_queue() {
        let db = seeded();
        let items = db.list_open_readables().unwrap();
        let ctx = SuggestionContext {
            mood_tags: vec![MoodTag::Epic],
            filters: SuggestionFilters {
                include_books: false,
                ..Default::default()
            },
        };

        let result = run_suggestion_engine(&items, &ctx, &mut || 0.3).unwrap();
        assert_eq!(result.item.title, "Fanfic B");
        // 10 (epic) + 25 (priority 5), no type nudge with books excluded
        assert_eq!(result.score, 35);

        let fic = result.item.as_fanfic().unwrap();
        assert_eq!(fic.available_chapters, Some(10));
        assert_eq!(fic.total_chapters, None);
    }
}
