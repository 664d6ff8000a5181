use rusqlite::{Connection, named_params, params};
use std::sync::MutexGuard;

use crate::error::Result;
use crate::mapper::{
    BuildRowOptions, READABLE_COLUMNS, ReadableRow, build_row_from_domain, map_row_to_domain,
};
use crate::models::{ReadableItem, ReadableStatus};

use super::Repository;

pub trait ReadableRepository: Repository<Entity = ReadableItem, Id = String> {
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ReadableItem>>;
    fn list_all(&self) -> Result<Vec<ReadableItem>>;

    /// Matches on the status the mapper reads, so missing, unknown and
    /// dashed values land where the domain model puts them.
    fn list_by_status(&self, statuses: &[ReadableStatus]) -> Result<Vec<ReadableItem>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let items = self.list_all()?;
        Ok(items
            .into_iter()
            .filter(|item| statuses.contains(&item.status))
            .collect())
    }

    fn count(&self) -> Result<usize>;

    /// Stores `row` verbatim, bypassing the mapper's write-side reconciliation.
    fn save_row(&self, row: &ReadableRow) -> Result<()>;
}

pub struct SqliteReadableRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> SqliteReadableRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<ReadableItem> {
        ReadableRow::from_sql(row).map(|r| map_row_to_domain(&r))
    }

    fn query_items(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ReadableItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let items = stmt
            .query_map(params, Self::row_to_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

impl<'a> Repository for SqliteReadableRepository<'a> {
    type Entity = ReadableItem;
    type Id = String;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let sql = format!("SELECT {READABLE_COLUMNS} FROM readables WHERE id = ?1");
        let mut items = self.query_items(&sql, params![id])?;
        Ok(items.pop())
    }

    fn save(&self, item: &Self::Entity) -> Result<()> {
        let row = build_row_from_domain(item, &BuildRowOptions::default());
        self.save_row(&row)
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM readables WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl<'a> ReadableRepository for SqliteReadableRepository<'a> {
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<ReadableItem>> {
        let sql = format!(
            "SELECT {READABLE_COLUMNS} FROM readables
             ORDER BY updated_at DESC LIMIT ?1 OFFSET ?2"
        );
        self.query_items(&sql, params![limit as i64, offset as i64])
    }

    fn list_all(&self) -> Result<Vec<ReadableItem>> {
        let sql = format!("SELECT {READABLE_COLUMNS} FROM readables ORDER BY updated_at DESC");
        self.query_items(&sql, [])
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM readables", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn save_row(&self, row: &ReadableRow) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO readables ({READABLE_COLUMNS})
                 VALUES (:id, :title, :author, :description, :status, :priority, :source,
                         :source_id, :page_count, :current_page, :ao3_work_id, :ao3_url,
                         :fandoms_json, :relationships_json, :characters_json, :ao3_tags_json,
                         :rating, :warnings_json, :chapter_count, :current_chapter,
                         :available_chapters, :total_chapters, :is_complete, :word_count,
                         :genres_json, :mood_tags_json, :created_at, :updated_at, :started_at,
                         :finished_at, :dnf_at, :notes, :progress_percent,
                         :time_current_seconds, :time_total_seconds, :progress_mode, :type)"
            ),
            named_params! {
                ":id": row.id,
                ":title": row.title,
                ":author": row.author,
                ":description": row.description,
                ":status": row.status,
                ":priority": row.priority,
                ":source": row.source,
                ":source_id": row.source_id,
                ":page_count": row.page_count,
                ":current_page": row.current_page,
                ":ao3_work_id": row.ao3_work_id,
                ":ao3_url": row.ao3_url,
                ":fandoms_json": row.fandoms_json,
                ":relationships_json": row.relationships_json,
                ":characters_json": row.characters_json,
                ":ao3_tags_json": row.ao3_tags_json,
                ":rating": row.rating,
                ":warnings_json": row.warnings_json,
                ":chapter_count": row.chapter_count,
                ":current_chapter": row.current_chapter,
                ":available_chapters": row.available_chapters,
                ":total_chapters": row.total_chapters,
                ":is_complete": row.is_complete,
                ":word_count": row.word_count,
                ":genres_json": row.genres_json,
                ":mood_tags_json": row.mood_tags_json,
                ":created_at": row.created_at,
                ":updated_at": row.updated_at,
                ":started_at": row.started_at,
                ":finished_at": row.finished_at,
                ":dnf_at": row.dnf_at,
                ":notes": row.notes,
                ":progress_percent": row.progress_percent,
                ":time_current_seconds": row.time_current_seconds,
                ":time_total_seconds": row.time_total_seconds,
                ":progress_mode": row.progress_mode,
                ":type": row.readable_type,
            },
        )?;
        Ok(())
    }
}
