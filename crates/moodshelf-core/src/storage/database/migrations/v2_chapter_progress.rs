use rusqlite::Connection;

use super::Migration;
use crate::error::Result;
use crate::storage::database::schema;

/// Splits fan-work chapter progress into available/total columns. Existing
/// `chapter_count` values are left alone; the row mapper reconciles them.
pub struct V2ChapterProgress;

impl Migration for V2ChapterProgress {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Add available_chapters, total_chapters and is_complete columns to readables"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        schema::add_chapter_progress_columns(conn)
    }
}
