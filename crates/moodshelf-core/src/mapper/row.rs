use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

/// Column list of the `readables` table, in [`ReadableRow`] field order.
pub const READABLE_COLUMNS: &str = "id, title, author, description, status, priority, source, \
     source_id, page_count, current_page, ao3_work_id, ao3_url, fandoms_json, relationships_json, \
     characters_json, ao3_tags_json, rating, warnings_json, chapter_count, current_chapter, \
     available_chapters, total_chapters, is_complete, word_count, genres_json, mood_tags_json, \
     created_at, updated_at, started_at, finished_at, dnf_at, notes, progress_percent, \
     time_current_seconds, time_total_seconds, progress_mode, type";

/// A stored readable: one flat record covering both books and fan works.
///
/// List-valued fields are JSON arrays encoded as text. Columns that do not
/// apply to the row's `type` are null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadableRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i64>,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub page_count: Option<i64>,
    pub current_page: Option<i64>,
    pub ao3_work_id: Option<String>,
    pub ao3_url: Option<String>,
    pub fandoms_json: Option<String>,
    pub relationships_json: Option<String>,
    pub characters_json: Option<String>,
    pub ao3_tags_json: Option<String>,
    pub rating: Option<String>,
    pub warnings_json: Option<String>,
    pub chapter_count: Option<i64>,
    pub current_chapter: Option<i64>,
    pub available_chapters: Option<i64>,
    pub total_chapters: Option<i64>,
    pub is_complete: Option<i64>,
    pub word_count: Option<i64>,
    pub genres_json: Option<String>,
    pub mood_tags_json: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub dnf_at: Option<String>,
    pub notes: Option<String>,
    pub progress_percent: Option<f64>,
    pub time_current_seconds: Option<i64>,
    pub time_total_seconds: Option<i64>,
    pub progress_mode: Option<String>,
    #[serde(rename = "type")]
    pub readable_type: String,
}

impl ReadableRow {
    /// Reads a row selected with [`READABLE_COLUMNS`].
    ///
    /// Values of an unexpected SQLite type decode to `None` rather than
    /// failing; only a missing column is an error.
    pub fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: text(row, "id")?.unwrap_or_default(),
            title: text(row, "title")?.unwrap_or_default(),
            author: text(row, "author")?.unwrap_or_default(),
            description: text(row, "description")?,
            status: text(row, "status")?,
            priority: integer(row, "priority")?,
            source: text(row, "source")?,
            source_id: text(row, "source_id")?,
            page_count: integer(row, "page_count")?,
            current_page: integer(row, "current_page")?,
            ao3_work_id: text(row, "ao3_work_id")?,
            ao3_url: text(row, "ao3_url")?,
            fandoms_json: text(row, "fandoms_json")?,
            relationships_json: text(row, "relationships_json")?,
            characters_json: text(row, "characters_json")?,
            ao3_tags_json: text(row, "ao3_tags_json")?,
            rating: text(row, "rating")?,
            warnings_json: text(row, "warnings_json")?,
            chapter_count: integer(row, "chapter_count")?,
            current_chapter: integer(row, "current_chapter")?,
            available_chapters: integer(row, "available_chapters")?,
            total_chapters: integer(row, "total_chapters")?,
            is_complete: integer(row, "is_complete")?,
            word_count: integer(row, "word_count")?,
            genres_json: text(row, "genres_json")?,
            mood_tags_json: text(row, "mood_tags_json")?,
            created_at: text(row, "created_at")?,
            updated_at: text(row, "updated_at")?,
            started_at: text(row, "started_at")?,
            finished_at: text(row, "finished_at")?,
            dnf_at: text(row, "dnf_at")?,
            notes: text(row, "notes")?,
            progress_percent: real(row, "progress_percent")?,
            time_current_seconds: integer(row, "time_current_seconds")?,
            time_total_seconds: integer(row, "time_total_seconds")?,
            progress_mode: text(row, "progress_mode")?,
            readable_type: text(row, "type")?.unwrap_or_default(),
        })
    }
}

fn text(row: &rusqlite::Row<'_>, column: &str) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(column)? {
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

fn integer(row: &rusqlite::Row<'_>, column: &str) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(column)? {
        ValueRef::Integer(n) => Some(n),
        ValueRef::Real(f) if f.is_finite() => Some(f.trunc() as i64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse().ok()),
        _ => None,
    })
}

fn real(row: &rusqlite::Row<'_>, column: &str) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(column)? {
        ValueRef::Real(f) if f.is_finite() => Some(f),
        ValueRef::Integer(n) => Some(n as f64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite()),
        _ => None,
    })
}
